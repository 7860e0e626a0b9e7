use std::sync::Arc;

use super::*;

fn annotator(
    backend: &Arc<LlmBackend>,
    targets: &[&str],
    config: AnnotationConfig,
) -> crate::Result<TargetAnnotator> {
    Ok(LlmAnnotator::new(backend.clone()).target_annotator(strings(targets), config)?)
}

#[tokio::test]
async fn test_single_pass_end_to_end() -> crate::Result<()> {
    let backend = LlmInterface::scripted().reply("Security").init()?;
    let annotator = annotator(&backend, &["Networks", "Security"], annotation_config(1))?;

    let outcome = annotator.annotate(DOCUMENT).await?;
    assert_eq!(outcome.targets, strings(&["Security"]));
    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.status, AnnotationStatus::Converged);

    let prompts = backend.scripted()?.prompts();
    assert_eq!(prompts.len(), 3);
    assert_eq!(
        prompts[1],
        "Here are some targets that should be added to the targets_list: Networks, Security. \
         Please use the exact spelling that I provide to you."
    );
    assert!(prompts[2].contains("Given the following document: A paper about firewalls.\n"));
    assert_eq!(backend.sessions_opened(), 1);
    assert!(!backend.session_slot().is_open());
    Ok(())
}

#[tokio::test]
async fn test_converges_in_one_pass() -> crate::Result<()> {
    let backend = LlmInterface::scripted().reply("b, E").init()?;
    let annotator = annotator(&backend, &["A", "B", "C", "D", "E"], annotation_config(2))?;

    let outcome = annotator.annotate(DOCUMENT).await?;
    assert_eq!(outcome.targets, strings(&["B", "E"]));
    assert_eq!(outcome.iterations, 1);
    assert!(outcome.converged());
    Ok(())
}

#[tokio::test]
async fn test_narrows_with_the_previous_answer() -> crate::Result<()> {
    let backend = LlmInterface::scripted()
        .replies(["A, B, C", "C, B"])
        .init()?;
    let annotator = annotator(&backend, &["A", "B", "C", "D", "E"], annotation_config(2))?;

    let outcome = annotator.annotate(DOCUMENT).await?;
    assert_eq!(outcome.targets, strings(&["C", "B"]));
    assert_eq!(outcome.iterations, 2);
    assert_eq!(backend.sessions_opened(), 2);

    // The second pass only teaches the first pass's answer.
    let prompts = backend.scripted()?.prompts();
    assert_eq!(prompts.len(), 6);
    assert!(prompts[1].contains(": A, B, C, D, E."));
    assert!(prompts[4].contains(": A, B, C."));
    Ok(())
}

#[tokio::test]
async fn test_chat_without_matches_is_not_an_error() -> crate::Result<()> {
    // 7 targets at 2 per prompt and 2 prompts per chat: "G" is only taught in the second chat.
    let backend = LlmInterface::scripted().responder(|messages| {
        if messages.iter().any(|m| m.content.contains(": G.")) {
            "G".to_string()
        } else {
            "Nothing fits.".to_string()
        }
    });
    let backend = backend.init()?;
    let config = AnnotationConfig {
        prompt: PromptConfig {
            num_targets: 1,
            targets_per_prompt: 2,
            prompts_per_chat: 2,
            ..PromptConfig::default()
        },
        ..AnnotationConfig::default()
    };
    let annotator = annotator(&backend, &["A", "B", "C", "D", "E", "F", "G"], config)?;

    let outcome = annotator.annotate(DOCUMENT).await?;
    assert_eq!(outcome.targets, strings(&["G"]));
    assert_eq!(backend.sessions_opened(), 2);
    Ok(())
}

#[tokio::test]
async fn test_repeated_answer_stops_as_a_cycle() -> crate::Result<()> {
    let backend = LlmInterface::scripted().reply("A, B, C").init()?;
    let annotator = annotator(&backend, &["A", "B", "C", "D"], annotation_config(2))?;

    let outcome = annotator.annotate(DOCUMENT).await?;
    assert_eq!(outcome.status, AnnotationStatus::CycleDetected);
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.targets, strings(&["A", "B", "C"]));
    assert_eq!(backend.sessions_opened(), 2);
    Ok(())
}

#[tokio::test]
async fn test_bound_returns_smallest_seen() -> crate::Result<()> {
    let backend = LlmInterface::scripted()
        .replies(["A, B, C, D", "A, B, C"])
        .init()?;
    let config = AnnotationConfig {
        max_iterations: 3,
        detect_cycles: false,
        ..annotation_config(2)
    };
    let annotator = annotator(&backend, &["A", "B", "C", "D", "E"], config)?;

    let outcome = annotator.annotate(DOCUMENT).await?;
    assert_eq!(outcome.status, AnnotationStatus::BoundReached);
    assert_eq!(outcome.iterations, 3);
    assert_eq!(outcome.targets, strings(&["A", "B", "C"]));
    assert_eq!(backend.sessions_opened(), 3);
    Ok(())
}

#[tokio::test]
async fn test_truncate_policy() -> crate::Result<()> {
    let backend = LlmInterface::scripted().reply("C, A, B").init()?;
    let config = AnnotationConfig {
        non_convergence: NonConvergencePolicy::Truncate,
        ..annotation_config(2)
    };
    let annotator = annotator(&backend, &["A", "B", "C"], config)?;

    let outcome = annotator.annotate(DOCUMENT).await?;
    assert_eq!(outcome.targets, strings(&["C", "A"]));
    assert!(!outcome.converged());
    Ok(())
}

#[tokio::test]
async fn test_error_policy() -> crate::Result<()> {
    let backend = LlmInterface::scripted().reply("A, B, C").init()?;
    let config = AnnotationConfig {
        non_convergence: NonConvergencePolicy::Error,
        ..annotation_config(1)
    };
    let annotator = annotator(&backend, &["A", "B", "C"], config)?;

    match annotator.annotate(DOCUMENT).await {
        Err(AnnotationError::DidNotConverge {
            iterations,
            num_targets,
            smallest,
        }) => {
            assert_eq!(iterations, 2);
            assert_eq!(num_targets, 1);
            assert_eq!(smallest, strings(&["A", "B", "C"]));
        }
        other => bail!("expected DidNotConverge, got {other:?}"),
    }
    assert!(!backend.session_slot().is_open());
    Ok(())
}
