//! The `annotate` and `evaluate` runs behind the `annotator` binary.

use crate::{
    config::AnnotatorConfig,
    dataset,
    workflows::{
        annotate::{count_matching, TargetAnnotator},
        evaluate::{EvaluationError, EvaluationReport},
    },
};
use anyhow::Context;
use llm_interface::llms::LlmBackend;
use std::{path::PathBuf, sync::Arc, time::Duration};

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotateSummary {
    pub publications: usize,
    /// Publications whose refinement loop stopped before reaching `num_targets`.
    pub unconverged: usize,
    pub annotated_path: PathBuf,
    pub duration: Duration,
}

impl std::fmt::Display for AnnotateSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "AnnotateSummary:")?;
        llm_interface::i_nln(f, format_args!("publications: {}", self.publications))?;
        llm_interface::i_nln(f, format_args!("unconverged: {}", self.unconverged))?;
        llm_interface::i_nln(
            f,
            format_args!("annotated_path: {}", self.annotated_path.display()),
        )?;
        llm_interface::i_nln(f, format_args!("duration: {:?}", self.duration))
    }
}

/// Annotates every publication with the configured backend and writes the annotated dataset.
pub async fn annotate(config: &AnnotatorConfig) -> crate::Result<AnnotateSummary> {
    let backend = config
        .backend
        .init()
        .context("failed to initialize the LLM backend")?;
    annotate_with(config, backend).await
}

/// Like [`annotate`], against an already built backend.
pub async fn annotate_with(
    config: &AnnotatorConfig,
    backend: Arc<LlmBackend>,
) -> crate::Result<AnnotateSummary> {
    let annotated_path = config.annotated_path();
    dataset::ensure_absent(&annotated_path)?;

    let keys = config.field_keys();
    let targets = dataset::load_targets(config.targets_path())?;
    let mut publications = dataset::load_publications(config.metadata_path())?;
    let annotator = TargetAnnotator::new(backend, targets, config.annotation_config())?;
    crate::info!(
        "Annotating {} publications against {} targets",
        publications.len(),
        annotator.targets().len()
    );

    let start = std::time::Instant::now();
    let total = publications.len();
    let mut unconverged = 0;
    for (i, publication) in publications.iter_mut().enumerate() {
        crate::info!("Processing publication {}/{}:", i + 1, total);
        let outcome = annotator
            .annotate(publication.document(&keys)?)
            .await
            .with_context(|| format!("failed to annotate publication {}", i + 1))?;
        crate::debug!("{outcome}");
        if !outcome.converged() {
            unconverged += 1;
        }
        publication.set_annotation(&keys, &outcome.targets);

        if let Some(ground_truth) = publication.ground_truth(&keys)? {
            let matching = count_matching(&outcome.targets, &ground_truth);
            crate::info!("{matching} of these could be found in the evaluation data.");
        }
    }
    let duration = start.elapsed();
    crate::info!("The annotation of all documents took {duration:?}");

    dataset::save_publications(&annotated_path, &publications)?;
    crate::info!("Saved the annotated dataset to {}", annotated_path.display());
    Ok(AnnotateSummary {
        publications: total,
        unconverged,
        annotated_path,
        duration,
    })
}

/// Reduces the annotated dataset to count statistics. Needs `has_evaluation_data`.
pub fn evaluate(config: &AnnotatorConfig) -> crate::Result<EvaluationReport> {
    let keys = config.field_keys();
    if keys.evaluation_data.is_none() {
        return Err(EvaluationError::NoEvaluationData.into());
    }
    let publications = dataset::load_annotated(config.annotated_path())?;
    Ok(EvaluationReport::build(&publications, &keys)?)
}
