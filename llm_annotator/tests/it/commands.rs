use llm_annotator::{
    commands,
    config::AnnotatorConfig,
    dataset::{self, DatasetError},
    workflows::evaluate::EvaluationError,
};
use serde_json::json;
use std::path::Path;

use super::*;

fn write_dataset(dir: &Path) -> crate::Result<()> {
    std::fs::create_dir_all(dir.join("data"))?;
    std::fs::write(
        dir.join("data/targets.json"),
        serde_json::to_string(&json!(["Networks", "Security"]))?,
    )?;
    std::fs::write(
        dir.join("data/metadata.json"),
        serde_json::to_string(&json!([
            {"id": 1, "abstract": "A paper about firewalls.", "subjects": ["Security"]},
            {"id": 2, "abstract": "A paper about intrusion detection.", "subjects": ["Networks"]}
        ]))?,
    )?;
    Ok(())
}

fn config(dir: &Path, has_evaluation_data: bool) -> crate::Result<AnnotatorConfig> {
    let yaml = format!(
        "dataset:\n  document_index: abstract\n  annotation_index: annotated\n  \
         has_evaluation_data: {has_evaluation_data}\n\
         prompt:\n  num_targets: 1\n\
         backend:\n  kind: scripted\n  replies: [Security]\n"
    );
    Ok(AnnotatorConfig::parse(&yaml, dir)?)
}

#[tokio::test]
async fn test_annotate_then_evaluate() -> crate::Result<()> {
    let dir = tempfile::tempdir()?;
    write_dataset(dir.path())?;
    let config = config(dir.path(), true)?;

    let summary = commands::annotate(&config).await?;
    assert_eq!(summary.publications, 2);
    assert_eq!(summary.unconverged, 0);
    assert_eq!(summary.annotated_path, dir.path().join("data/annotated_metadata.json"));

    let annotated = dataset::load_annotated(&summary.annotated_path)?;
    let keys = config.field_keys();
    assert_eq!(annotated.len(), 2);
    for publication in &annotated {
        assert_eq!(publication.annotation(&keys)?, strings(&["Security"]));
    }
    let fields: Vec<&String> = annotated[0].0.keys().collect();
    assert_eq!(fields, vec!["id", "abstract", "subjects", "annotated"]);

    let report = commands::evaluate(&config)?;
    assert_eq!(report.publications, 2);
    assert_eq!(report.targets_count.avg, 1.0);
    assert_eq!(report.matching_count.avg, 0.5);
    assert_eq!(report.matching_count.min, 0);
    assert_eq!(report.matching_count.max, 1);
    Ok(())
}

#[tokio::test]
async fn test_annotate_refuses_to_overwrite() -> crate::Result<()> {
    let dir = tempfile::tempdir()?;
    write_dataset(dir.path())?;
    let config = config(dir.path(), false)?;
    std::fs::write(config.annotated_path(), "[]")?;

    let backend = config.backend.init()?;
    let err = commands::annotate_with(&config, backend.clone())
        .await
        .err()
        .ok_or_else(|| anyhow!("annotate overwrote an existing file"))?;
    assert!(matches!(
        err.downcast_ref::<DatasetError>(),
        Some(DatasetError::AlreadyExists { .. })
    ));
    assert_eq!(backend.sessions_opened(), 0);
    assert_eq!(std::fs::read_to_string(config.annotated_path())?, "[]");
    Ok(())
}

#[test]
fn test_evaluate_needs_evaluation_data() -> crate::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = config(dir.path(), false)?;
    let err = commands::evaluate(&config)
        .err()
        .ok_or_else(|| anyhow!("evaluate ran without evaluation data"))?;
    assert!(matches!(
        err.downcast_ref::<EvaluationError>(),
        Some(EvaluationError::NoEvaluationData)
    ));
    Ok(())
}
