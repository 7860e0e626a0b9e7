// Internal modules
mod error;
mod message;
mod req_components;

// Public exports
pub use error::CompletionError;
pub use message::{ChatMessage, ChatRole};
pub use req_components::{RequestConfig, RequestConfigTrait};
