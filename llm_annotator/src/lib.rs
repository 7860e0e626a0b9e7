//! # llm_annotator: controlled-vocabulary annotation with an LLM
//!
//! Annotates documents with labels drawn from a fixed target vocabulary. The vocabulary is
//! taught to the model over a multi-turn chat, the reply is matched back to the vocabulary,
//! and oversized answers are narrowed by re-asking with the model's own proposal until at
//! most `num_targets` labels remain.
//!
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! use llm_annotator::prelude::*;
//!
//! let backend = LlmInterface::scripted().reply("Security").init()?;
//! let config = AnnotationConfig {
//!     prompt: PromptConfig {
//!         num_targets: 1,
//!         ..PromptConfig::default()
//!     },
//!     ..AnnotationConfig::default()
//! };
//! let annotator = LlmAnnotator::new(backend)
//!     .target_annotator(vec!["Networks".into(), "Security".into()], config)?;
//!
//! let outcome = annotator.annotate("A paper about firewalls.").await?;
//! assert_eq!(outcome.targets, vec!["Security"]);
//! assert_eq!(outcome.iterations, 1);
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod config;
pub mod dataset;
pub mod prelude;
pub mod workflows;

#[allow(unused_imports)]
pub(crate) use anyhow::{anyhow, bail, Result};
#[allow(unused_imports)]
pub(crate) use tracing::{debug, error, info, span, trace, warn, Level};

use llm_interface::llms::LlmBackend;
use std::sync::Arc;
use workflows::annotate::{AnnotationConfig, AnnotationError, TargetAnnotator};

pub struct LlmAnnotator {
    pub backend: Arc<LlmBackend>,
}

impl LlmAnnotator {
    pub fn new(backend: Arc<LlmBackend>) -> Self {
        Self { backend }
    }

    /// An annotator for one vocabulary. Fails on an invalid config or a vocabulary with
    /// duplicate canonical forms.
    pub fn target_annotator(
        &self,
        targets: Vec<String>,
        config: AnnotationConfig,
    ) -> Result<TargetAnnotator, AnnotationError> {
        TargetAnnotator::new(self.backend.clone(), targets, config)
    }
}
