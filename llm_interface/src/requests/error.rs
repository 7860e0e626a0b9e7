#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("ClientError: {0}")]
    ClientError(#[from] crate::llms::api::ClientError),
    #[error("SessionAlreadyOpen: backend {model_id} already has an open chat session")]
    SessionAlreadyOpen { model_id: String },
    #[error("SessionClosed: the chat session was closed")]
    SessionClosed,
    #[error("EmptyPromptList: a chat needs at least one prompt")]
    EmptyPromptList,
    #[error("ReponseContentEmpty: Response had no content")]
    ReponseContentEmpty,
}
