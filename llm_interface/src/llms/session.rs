use super::LlmBackend;
use crate::requests::{ChatMessage, CompletionError};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

/// Tracks the single chat session a backend may have open.
#[derive(Debug, Default)]
pub struct SessionSlot {
    open: AtomicBool,
    opened: AtomicUsize,
}

impl SessionSlot {
    pub(crate) fn acquire(&self) -> bool {
        let acquired = self
            .open
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if acquired {
            self.opened.fetch_add(1, Ordering::AcqRel);
        }
        acquired
    }

    pub(crate) fn release(&self) {
        self.open.store(false, Ordering::Release);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::Acquire)
    }
}

/// One conversation with the model. Every prompt is sent together with the turns before it.
pub struct ChatSession {
    backend: Arc<LlmBackend>,
    messages: Vec<ChatMessage>,
    open: bool,
}

impl ChatSession {
    pub(crate) fn new(backend: Arc<LlmBackend>) -> Self {
        Self {
            backend,
            messages: Vec::new(),
            open: true,
        }
    }

    /// Appends `prompt` as a user turn, sends the conversation, and returns the trimmed reply.
    /// A failed request leaves the conversation as it was.
    pub async fn generate(&mut self, prompt: &str) -> crate::Result<String, CompletionError> {
        if !self.open {
            return Err(CompletionError::SessionClosed);
        }
        crate::debug!("Prompt: {}", prompt);
        self.messages.push(ChatMessage::user(prompt));
        let reply = match self.backend.chat_request(&self.messages).await {
            Ok(reply) => reply.trim().to_owned(),
            Err(e) => {
                self.messages.pop();
                return Err(e);
            }
        };
        crate::debug!("Reply: {}", reply);
        self.messages.push(ChatMessage::assistant(reply.as_str()));
        Ok(reply)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.open {
            self.open = false;
            self.backend.session_slot().release();
            crate::trace!("Closed chat session with {}", self.backend.model_id());
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Display for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "ChatSession with {}:", self.backend.model_id())?;
        for message in &self.messages {
            crate::i_nln(f, format_args!("{:?}: {:?}", message.role, message.content))?;
        }
        Ok(())
    }
}
