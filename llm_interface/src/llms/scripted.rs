use super::{LlmBackend, SessionSlot};
use crate::requests::{ChatMessage, CompletionError};
use std::sync::{Arc, Mutex};

pub type Responder = dyn Fn(&[ChatMessage]) -> String + Send + Sync;

enum Script {
    /// One reply per session, in order. The last reply repeats once the list runs out.
    Replies(Vec<String>),
    /// Computes the reply from the conversation so far.
    Responder(Arc<Responder>),
}

/// A deterministic in-process backend. Every prompt it receives is recorded.
pub struct ScriptedBackend {
    script: Script,
    model_id: String,
    pub(crate) session_slot: SessionSlot,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Every user prompt received so far, across all sessions.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub(crate) fn chat_request(
        &self,
        messages: &[ChatMessage],
    ) -> crate::Result<String, CompletionError> {
        if let Some(prompt) = messages.last() {
            self.prompts
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(prompt.content.clone());
        }
        match &self.script {
            Script::Replies(replies) => {
                let session = self.session_slot.sessions_opened().saturating_sub(1);
                replies
                    .get(session)
                    .or_else(|| replies.last())
                    .cloned()
                    .ok_or(CompletionError::ReponseContentEmpty)
            }
            Script::Responder(responder) => Ok((**responder)(messages)),
        }
    }
}

#[derive(Default)]
pub struct ScriptedBackendBuilder {
    replies: Vec<String>,
    responder: Option<Arc<Responder>>,
    model_id: Option<String>,
}

impl ScriptedBackendBuilder {
    /// Adds the reply for the next session.
    pub fn reply<S: Into<String>>(mut self, reply: S) -> Self {
        self.replies.push(reply.into());
        self
    }

    pub fn replies<I, S>(mut self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replies.extend(replies.into_iter().map(Into::into));
        self
    }

    /// Answers every prompt with `responder(conversation)`. Takes precedence over replies.
    pub fn responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&[ChatMessage]) -> String + Send + Sync + 'static,
    {
        let responder: Arc<Responder> = Arc::new(responder);
        self.responder = Some(responder);
        self
    }

    pub fn model_id<S: Into<String>>(mut self, model_id: S) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn init(self) -> crate::Result<Arc<LlmBackend>> {
        let script = match self.responder {
            Some(responder) => Script::Responder(responder),
            None if self.replies.is_empty() => {
                crate::bail!("A scripted backend needs at least one reply or a responder")
            }
            None => Script::Replies(self.replies),
        };
        Ok(Arc::new(LlmBackend::Scripted(ScriptedBackend {
            script,
            model_id: self.model_id.unwrap_or_else(|| "scripted".to_string()),
            session_slot: SessionSlot::default(),
            prompts: Mutex::new(Vec::new()),
        })))
    }
}
