//! The refinement loop that annotates one document.
//!
//! A pass sends the document together with the candidate vocabulary to the model, one chat per
//! `targets_per_prompt * prompts_per_chat` candidates, and unions the parsed replies. If the
//! union holds more than `num_targets` labels, it becomes the candidate vocabulary of the next
//! pass, so the model has to down-select from its own proposal.
//!
//! The model is not obliged to shrink its answer, so the loop is bounded by `max_iterations`
//! and, when `detect_cycles` is set, stops as soon as a pass repeats an earlier result. What is
//! returned then is decided by the [`NonConvergencePolicy`].

mod error;
pub mod parser;

use llm_interface::llms::LlmBackend;
use llm_prompt::{PromptBuilder, PromptConfig};
use llm_utils::CanonicalTargetMap;
use serde::Deserialize;
use std::{collections::HashSet, sync::Arc};

pub use error::AnnotationError;
pub use parser::{parse, parse_response, ParsedResponse};

/// What to return when the loop stops without reaching `num_targets`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonConvergencePolicy {
    /// Fail with [`AnnotationError::DidNotConverge`].
    Error,
    /// The smallest pass result, the earliest one on ties.
    #[default]
    SmallestSeen,
    /// The smallest pass result cut down to `num_targets` labels.
    Truncate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationConfig {
    pub prompt: PromptConfig,
    /// Upper bound on query passes per document.
    pub max_iterations: usize,
    pub non_convergence: NonConvergencePolicy,
    /// Stop when a pass returns the same set as an earlier pass.
    pub detect_cycles: bool,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            prompt: PromptConfig::default(),
            max_iterations: 10,
            non_convergence: NonConvergencePolicy::default(),
            detect_cycles: true,
        }
    }
}

impl AnnotationConfig {
    pub fn validate(&self) -> Result<(), AnnotationError> {
        self.prompt.validate()?;
        if self.max_iterations == 0 {
            return Err(AnnotationError::InvalidConfig {
                field: "max_iterations",
                reason: "must be an integer > 0".to_owned(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationStatus {
    /// A pass returned at most `num_targets` labels.
    Converged,
    /// `max_iterations` passes ran without converging.
    BoundReached,
    /// A pass repeated an earlier result.
    CycleDetected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationOutcome {
    /// Original spellings, deduplicated, in the order the model first named them.
    pub targets: Vec<String>,
    /// Query passes run.
    pub iterations: usize,
    pub status: AnnotationStatus,
}

impl AnnotationOutcome {
    pub fn converged(&self) -> bool {
        self.status == AnnotationStatus::Converged
    }
}

impl std::fmt::Display for AnnotationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "AnnotationOutcome:")?;
        llm_interface::i_nln(f, format_args!("status: {:?}", self.status))?;
        llm_interface::i_nln(f, format_args!("iterations: {}", self.iterations))?;
        llm_interface::i_nln(f, format_args!("targets: {}", self.targets.join(", ")))
    }
}

/// Annotates documents against one fixed vocabulary.
pub struct TargetAnnotator {
    backend: Arc<LlmBackend>,
    targets: Vec<String>,
    targets_map: CanonicalTargetMap,
    builder: PromptBuilder,
    config: AnnotationConfig,
}

impl TargetAnnotator {
    /// Validates `config` and the vocabulary. Nothing is sent to the model here.
    pub fn new(
        backend: Arc<LlmBackend>,
        targets: Vec<String>,
        config: AnnotationConfig,
    ) -> Result<Self, AnnotationError> {
        config.validate()?;
        let targets_map = CanonicalTargetMap::build(&targets)?;
        let builder = PromptBuilder::new(config.prompt.clone())?;
        Ok(Self {
            backend,
            targets,
            targets_map,
            builder,
            config,
        })
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn targets_map(&self) -> &CanonicalTargetMap {
        &self.targets_map
    }

    pub fn config(&self) -> &AnnotationConfig {
        &self.config
    }

    pub async fn annotate(&self, document: &str) -> Result<AnnotationOutcome, AnnotationError> {
        let num_targets = self.config.prompt.num_targets;
        let mut candidates = self.targets.clone();
        let mut results: Vec<Vec<String>> = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            crate::debug!(
                "Query pass {iteration} with {} candidate targets",
                candidates.len()
            );
            let result = self.query_pass(document, &candidates).await?;
            if result.len() <= num_targets {
                crate::debug!("Extracted the following targets: {:?}", result);
                return Ok(AnnotationOutcome {
                    targets: result,
                    iterations: iteration,
                    status: AnnotationStatus::Converged,
                });
            }

            let repeated = self.config.detect_cycles
                && results.iter().any(|earlier| same_targets(earlier, &result));
            results.push(result);
            if repeated {
                crate::warn!("Pass {iteration} repeated an earlier result; stopping");
                return self.stop_unconverged(results, iteration, AnnotationStatus::CycleDetected);
            }

            crate::debug!("The document needs another iteration of prompts.");
            candidates = results[results.len() - 1].clone();
        }

        crate::warn!(
            "No result with at most {num_targets} targets after {} passes",
            self.config.max_iterations
        );
        self.stop_unconverged(
            results,
            self.config.max_iterations,
            AnnotationStatus::BoundReached,
        )
    }

    /// One pass over `candidates`: every chat is evaluated in order and the parsed replies are
    /// merged without duplicates. Only labels among `candidates` can come back.
    pub async fn query_pass(
        &self,
        document: &str,
        candidates: &[String],
    ) -> Result<Vec<String>, AnnotationError> {
        let candidates_map = CanonicalTargetMap::build(candidates)?;
        let chats = self.builder.build_chat_prompt_lists(document, candidates)?;

        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for (i, chat) in chats.iter().enumerate() {
            crate::debug!("Running prompt list {}/{}.{}", i + 1, chats.len(), chat);
            let response = self.backend.eval_prompt_list(&chat.prompts).await?;
            crate::debug!("Obtained the following result: {response}");
            let parsed =
                parse_response(&response, &candidates_map, &self.config.prompt.target_name);
            for target in parsed.targets {
                if seen.insert(target.clone()) {
                    result.push(target);
                }
            }
        }
        Ok(result)
    }

    fn stop_unconverged(
        &self,
        results: Vec<Vec<String>>,
        iterations: usize,
        status: AnnotationStatus,
    ) -> Result<AnnotationOutcome, AnnotationError> {
        let num_targets = self.config.prompt.num_targets;
        let smallest = results
            .into_iter()
            .min_by_key(Vec::len)
            .unwrap_or_default();
        let targets = match self.config.non_convergence {
            NonConvergencePolicy::Error => {
                return Err(AnnotationError::DidNotConverge {
                    iterations,
                    num_targets,
                    smallest,
                })
            }
            NonConvergencePolicy::SmallestSeen => smallest,
            NonConvergencePolicy::Truncate => {
                let mut smallest = smallest;
                smallest.truncate(num_targets);
                smallest
            }
        };
        Ok(AnnotationOutcome {
            targets,
            iterations,
            status,
        })
    }
}

fn same_targets(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && {
        let a: HashSet<&String> = a.iter().collect();
        b.iter().all(|target| a.contains(target))
    }
}

/// How many annotated targets also appear in the ground truth.
pub fn count_matching(annotated: &[String], ground_truth: &[String]) -> usize {
    annotated
        .iter()
        .filter(|target| ground_truth.contains(target))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_interface::LlmInterface;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn config(num_targets: usize) -> AnnotationConfig {
        AnnotationConfig {
            prompt: PromptConfig {
                document_name: "publication".to_owned(),
                target_name: "subject".to_owned(),
                num_targets,
                targets_per_prompt: 2,
                prompts_per_chat: 2,
            },
            ..AnnotationConfig::default()
        }
    }

    #[test]
    fn same_targets_ignores_order() {
        assert!(same_targets(&strings(&["A", "B"]), &strings(&["B", "A"])));
        assert!(!same_targets(&strings(&["A", "B"]), &strings(&["A", "C"])));
        assert!(!same_targets(&strings(&["A"]), &strings(&["A", "B"])));
    }

    #[test]
    fn count_matching_is_exact() {
        let annotated = strings(&["Robotics", "Internet", "Software"]);
        let ground_truth = strings(&["internet", "Robotics"]);
        assert_eq!(count_matching(&annotated, &ground_truth), 1);
        assert_eq!(count_matching(&[], &ground_truth), 0);
    }

    #[test]
    fn zero_max_iterations_is_rejected() {
        let backend = LlmInterface::scripted().reply("A").init().unwrap();
        let config = AnnotationConfig {
            max_iterations: 0,
            ..config(1)
        };
        assert!(matches!(
            TargetAnnotator::new(backend, strings(&["A"]), config),
            Err(AnnotationError::InvalidConfig {
                field: "max_iterations",
                ..
            })
        ));
    }

    #[test]
    fn invalid_prompt_values_are_config_errors() {
        let backend = LlmInterface::scripted().reply("A").init().unwrap();
        let mut config = config(1);
        config.prompt.num_targets = 0;
        assert!(matches!(
            TargetAnnotator::new(backend, strings(&["A"]), config),
            Err(AnnotationError::InvalidConfig {
                field: "num_targets",
                ..
            })
        ));
    }

    #[test]
    fn duplicate_vocabulary_fails_before_any_call() {
        let backend = LlmInterface::scripted().reply("Cat").init().unwrap();
        let result = TargetAnnotator::new(backend.clone(), strings(&["Cat", "cat "]), config(1));
        assert!(matches!(
            result,
            Err(AnnotationError::DuplicateCanonicalTarget(_))
        ));
        assert_eq!(backend.sessions_opened(), 0);
    }

    #[tokio::test]
    async fn query_pass_spans_chats_and_dedupes() {
        // 5 targets at 2 per prompt and 2 prompts per chat make 2 chats.
        let backend = LlmInterface::scripted()
            .replies(["B, A, Z", "a, E"])
            .init()
            .unwrap();
        let annotator = TargetAnnotator::new(
            backend.clone(),
            strings(&["A", "B", "C", "D", "E"]),
            config(3),
        )
        .unwrap();
        let result = annotator
            .query_pass("doc", annotator.targets())
            .await
            .unwrap();
        assert_eq!(result, strings(&["B", "A", "E"]));
        assert_eq!(backend.sessions_opened(), 2);
    }

    #[tokio::test]
    async fn query_pass_only_returns_candidates() {
        let backend = LlmInterface::scripted().reply("A, B, C").init().unwrap();
        let annotator =
            TargetAnnotator::new(backend, strings(&["A", "B", "C"]), config(1)).unwrap();
        let result = annotator
            .query_pass("doc", &strings(&["A", "C"]))
            .await
            .unwrap();
        assert_eq!(result, strings(&["A", "C"]));
    }

    #[tokio::test]
    async fn empty_vocabulary_converges_without_calls() {
        let backend = LlmInterface::scripted().reply("A").init().unwrap();
        let annotator = TargetAnnotator::new(backend.clone(), Vec::new(), config(1)).unwrap();
        let outcome = annotator.annotate("doc").await.unwrap();
        assert!(outcome.targets.is_empty());
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.converged());
        assert_eq!(backend.sessions_opened(), 0);
    }

    #[test]
    fn outcome_display_lists_targets() {
        let outcome = AnnotationOutcome {
            targets: strings(&["Robotics", "Internet"]),
            iterations: 2,
            status: AnnotationStatus::Converged,
        };
        let rendered = outcome.to_string();
        assert!(rendered.contains("    targets: Robotics, Internet"));
        assert!(rendered.contains("    iterations: 2"));
    }
}
