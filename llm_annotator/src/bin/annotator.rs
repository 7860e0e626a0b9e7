//! `annotator`: annotate a JSON dataset with labels from a target vocabulary.
//!
//! ```text
//! $ annotator --config config/config.yaml annotate
//! $ annotator --config config/config.yaml evaluate
//! ```
//!
//! Every run is described by the config file. `--debug` raises the log level to show the
//! prompts and replies.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use llm_annotator::{commands, config::AnnotatorConfig};

#[derive(Debug, Parser)]
#[command(name = "annotator", version)]
struct Cli {
    /// YAML config file
    #[arg(long, short = 'c', value_name = "PATH", default_value = "config/config.yaml")]
    config: PathBuf,

    /// Log prompts and replies (overrides general.debug)
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Annotate every publication and write the annotated dataset
    Annotate,

    /// Print count statistics for the annotated dataset
    Evaluate,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AnnotatorConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let mut logging = config.logging_config(cli.debug);
    logging.load_logger()?;

    match cli.cmd {
        Cmd::Annotate => {
            let summary = commands::annotate(&config).await?;
            println!("{summary}");
        }
        Cmd::Evaluate => {
            let report = commands::evaluate(&config)?;
            println!("{report}");
        }
    }
    Ok(())
}
