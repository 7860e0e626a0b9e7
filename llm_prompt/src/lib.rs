//! # llm_prompt: Chunked multi-turn annotation prompts
//!
//! The llm_prompt crate is a workspace member of the llm_annotator project.
//!
//! A target vocabulary is usually too large to paste into a single prompt, so it is
//! delivered to the model over several turns of one conversation:
//!
//! 1. a scene-setting prompt announcing that a `targets_list` will be assembled
//! 2. one prompt per chunk of at most `targets_per_prompt` labels, adding them to the list
//! 3. a closing prompt with the document, asking for up to `num_targets` labels from the list
//!
//! A conversation never carries more than `targets_per_prompt * prompts_per_chat` labels.
//! Larger vocabularies are spread over several conversations ([`ChatPromptList`]s).
//!
//! ```rust
//! use llm_prompt::{PromptBuilder, PromptConfig};
//!
//! let config = PromptConfig {
//!     num_targets: 1,
//!     targets_per_prompt: 3,
//!     prompts_per_chat: 2,
//!     ..PromptConfig::default()
//! };
//! let builder = PromptBuilder::new(config)?;
//! let targets: Vec<String> = ["Networks", "Security"].iter().map(|t| t.to_string()).collect();
//! let chats = builder.build_chat_prompt_lists("A paper about firewalls.", &targets)?;
//!
//! assert_eq!(chats.len(), 1);
//! assert_eq!(chats[0].prompts.len(), 3);
//! assert!(chats[0].final_prompt().contains("A paper about firewalls."));
//! # Ok::<(), llm_prompt::PromptError>(())
//! ```

// Internal modules
mod builder;
mod chat_prompt_list;
mod config;
mod templates;

// Internal imports
#[allow(unused_imports)]
pub(crate) use tracing::{debug, error, info, span, trace, warn, Level};

// Public exports
pub use builder::PromptBuilder;
pub use chat_prompt_list::{ChatPromptList, PromptChunk};
pub use config::{PromptConfig, PromptError};
