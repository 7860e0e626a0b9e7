use llm_interface::requests::CompletionError;
use llm_prompt::PromptError;
use llm_utils::CanonicalError;

#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    #[error("invalid {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error(transparent)]
    DuplicateCanonicalTarget(#[from] CanonicalError),
    #[error("LLM request failed: {0}")]
    Completion(#[from] CompletionError),
    #[error(
        "no result with at most {num_targets} targets after {iterations} passes; the smallest had {}",
        .smallest.len()
    )]
    DidNotConverge {
        iterations: usize,
        num_targets: usize,
        smallest: Vec<String>,
    },
    #[error(transparent)]
    Prompt(PromptError),
}

impl From<PromptError> for AnnotationError {
    fn from(e: PromptError) -> Self {
        match e {
            PromptError::InvalidConfig { field, reason } => Self::InvalidConfig { field, reason },
            e => Self::Prompt(e),
        }
    }
}
