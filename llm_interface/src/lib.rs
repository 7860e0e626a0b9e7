//! # llm_interface: The Backend for the llm_annotator Crate
//!
//! Backends that evaluate multi-turn conversations against an LLM. Every backend is wrapped
//! in an [`llms::LlmBackend`] and shared as an `Arc`. Conversations run inside a
//! [`llms::ChatSession`], and a backend allows only one open session at a time.
//!
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! use llm_interface::LlmInterface;
//!
//! let backend = LlmInterface::scripted().reply("Networks").init()?;
//! let prompts = vec!["Add Networks.".to_string(), "Which one?".to_string()];
//! let reply = backend.eval_prompt_list(&prompts).await?;
//! assert_eq!(reply, "Networks");
//! # Ok(())
//! # }
//! ```

#[allow(unused_imports)]
pub(crate) use anyhow::{anyhow, bail, Error, Result};
#[allow(unused_imports)]
pub(crate) use tracing::{debug, error, info, span, trace, warn, Level};

pub mod llms;
pub mod logging;
pub mod requests;

pub use logging::{i_ln, i_nln, LoggingConfig};

pub struct LlmInterface {}

impl LlmInterface {
    /// Any server exposing `POST /chat/completions` (llama.cpp server, vLLM, OpenAI).
    pub fn openai_compatible() -> llms::api::openai_compatible::OpenAiCompatibleBackendBuilder {
        llms::api::openai_compatible::OpenAiCompatibleBackendBuilder::default()
    }

    /// A local Ollama daemon (`POST /api/chat`).
    pub fn ollama() -> llms::api::ollama::OllamaBackendBuilder {
        llms::api::ollama::OllamaBackendBuilder::default()
    }

    /// An in-process backend with canned replies. Used for tests and dry runs.
    pub fn scripted() -> llms::scripted::ScriptedBackendBuilder {
        llms::scripted::ScriptedBackendBuilder::default()
    }
}
