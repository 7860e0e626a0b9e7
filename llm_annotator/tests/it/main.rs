//
mod annotate;
mod commands;

#[allow(unused_imports)]
use anyhow::{anyhow, bail, Error, Result};
use llm_annotator::prelude::*;

const DOCUMENT: &str = "A paper about firewalls.";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn annotation_config(num_targets: usize) -> AnnotationConfig {
    AnnotationConfig {
        prompt: PromptConfig {
            num_targets,
            ..PromptConfig::default()
        },
        ..AnnotationConfig::default()
    }
}
