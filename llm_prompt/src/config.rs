use llm_utils::ChunkError;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("invalid {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("cannot build a chat prompt list without targets")]
    EmptyTargets,
    #[error(transparent)]
    Chunk(#[from] ChunkError),
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// The values that shape the prompt sequence. Built once per run and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptConfig {
    /// The noun used for a document in the prompt wording, e.g. "publication".
    pub document_name: String,
    /// The noun used for a target in the prompt wording, e.g. "subject".
    pub target_name: String,
    /// Maximum number of targets the model is asked to return.
    pub num_targets: usize,
    /// Maximum number of targets added to the `targets_list` per prompt.
    pub targets_per_prompt: usize,
    /// Maximum number of target-adding prompts per conversation.
    pub prompts_per_chat: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            document_name: "document".to_owned(),
            target_name: "target".to_owned(),
            num_targets: 3,
            targets_per_prompt: 10,
            prompts_per_chat: 5,
        }
    }
}

impl PromptConfig {
    pub fn targets_per_chat(&self) -> usize {
        self.targets_per_prompt.saturating_mul(self.prompts_per_chat)
    }

    pub fn validate(&self) -> Result<(), PromptError> {
        for (field, value) in [
            ("num_targets", self.num_targets),
            ("targets_per_prompt", self.targets_per_prompt),
            ("prompts_per_chat", self.prompts_per_chat),
        ] {
            if value == 0 {
                return Err(PromptError::InvalidConfig {
                    field,
                    reason: "must be an integer > 0".to_owned(),
                });
            }
        }
        Ok(())
    }
}
