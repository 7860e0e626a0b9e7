pub use crate::{
    config::AnnotatorConfig,
    dataset::{FieldKeys, Publication},
    workflows::{
        annotate::{
            count_matching, AnnotationConfig, AnnotationError, AnnotationOutcome,
            AnnotationStatus, NonConvergencePolicy, TargetAnnotator,
        },
        evaluate::{EvaluationReport, Stats},
    },
    LlmAnnotator,
};
pub use llm_interface::{llms::LlmBackend, LlmInterface, LoggingConfig};
pub use llm_prompt::{PromptBuilder, PromptConfig};
pub use llm_utils::{canonicalize, CanonicalTargetMap};
