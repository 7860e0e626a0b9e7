// Internal modules
mod client;
mod config;
mod error;

// Public modules
pub mod ollama;
pub mod openai_compatible;

// Internal imports
use super::*;

// Internal exports
pub(crate) use client::ApiClient;
pub(crate) use config::ApiConfigTrait;

// Public exports
pub use config::{ApiConfig, LlmApiConfigTrait};
pub use error::{ApiError, ClientError};
