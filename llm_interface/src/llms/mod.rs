// Public modules
pub mod api;
pub mod scripted;

// Internal modules
mod session;

// Internal imports
use crate::requests::*;
use std::sync::Arc;

// Public exports
pub use api::{
    ollama::{OllamaBackend, OllamaBackendBuilder, OllamaConfig},
    openai_compatible::{
        OpenAiCompatibleBackend, OpenAiCompatibleBackendBuilder, OpenAiCompatibleConfig,
    },
    ApiConfig, ApiError, ClientError, LlmApiConfigTrait,
};
pub use scripted::{ScriptedBackend, ScriptedBackendBuilder};
pub use session::{ChatSession, SessionSlot};

pub enum LlmBackend {
    OpenAiCompatible(api::openai_compatible::OpenAiCompatibleBackend),
    Ollama(api::ollama::OllamaBackend),
    Scripted(scripted::ScriptedBackend),
}

impl LlmBackend {
    /// Starts a conversation. A backend holds at most one open session; the slot is released
    /// when the session is closed or dropped.
    pub fn open_session(self: &Arc<Self>) -> crate::Result<ChatSession, CompletionError> {
        if !self.session_slot().acquire() {
            return Err(CompletionError::SessionAlreadyOpen {
                model_id: self.model_id().to_owned(),
            });
        }
        crate::trace!("Opened chat session with {}", self.model_id());
        Ok(ChatSession::new(Arc::clone(self)))
    }

    /// Sends `prompts` in order within one session and returns the reply to the last one.
    /// The earlier replies only build up conversational context.
    pub async fn eval_prompt_list(
        self: &Arc<Self>,
        prompts: &[String],
    ) -> crate::Result<String, CompletionError> {
        let Some((last, context)) = prompts.split_last() else {
            return Err(CompletionError::EmptyPromptList);
        };
        let mut session = self.open_session()?;
        for prompt in context {
            session.generate(prompt).await?;
        }
        let reply = session.generate(last).await?;
        session.close();
        Ok(reply)
    }

    pub(crate) async fn chat_request(
        &self,
        messages: &[ChatMessage],
    ) -> crate::Result<String, CompletionError> {
        match self {
            LlmBackend::OpenAiCompatible(b) => b.chat_request(messages).await,
            LlmBackend::Ollama(b) => b.chat_request(messages).await,
            LlmBackend::Scripted(b) => b.chat_request(messages),
        }
    }

    pub fn session_slot(&self) -> &SessionSlot {
        match self {
            LlmBackend::OpenAiCompatible(b) => &b.session_slot,
            LlmBackend::Ollama(b) => &b.session_slot,
            LlmBackend::Scripted(b) => &b.session_slot,
        }
    }

    /// Sessions opened over the lifetime of the backend.
    pub fn sessions_opened(&self) -> usize {
        self.session_slot().sessions_opened()
    }

    pub fn model_id(&self) -> &str {
        match self {
            LlmBackend::OpenAiCompatible(b) => b.model_id(),
            LlmBackend::Ollama(b) => b.model_id(),
            LlmBackend::Scripted(b) => b.model_id(),
        }
    }

    pub fn scripted(&self) -> crate::Result<&scripted::ScriptedBackend> {
        match self {
            LlmBackend::Scripted(b) => Ok(b),
            _ => crate::bail!("Backend is not scripted"),
        }
    }
}

impl std::fmt::Debug for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            LlmBackend::OpenAiCompatible(_) => "OpenAiCompatible",
            LlmBackend::Ollama(_) => "Ollama",
            LlmBackend::Scripted(_) => "Scripted",
        };
        f.debug_struct("LlmBackend")
            .field("kind", &kind)
            .field("model_id", &self.model_id())
            .field("session_open", &self.session_slot().is_open())
            .finish()
    }
}
