use llm_utils::CanonicalTargetMap;

/// What one model reply yielded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    /// Number of comma separated tokens in the reply.
    pub candidates: usize,
    /// Tokens that matched the vocabulary, as original spellings, in reply order.
    pub targets: Vec<String>,
}

/// Splits `response` on commas and keeps the tokens whose canonical form is in `targets_map`.
///
/// Matching is exact after canonicalization. Anything else the model wrote is dropped.
/// Repeated labels stay repeated; deduplication is the caller's job.
pub fn parse_response(
    response: &str,
    targets_map: &CanonicalTargetMap,
    target_name: &str,
) -> ParsedResponse {
    let tokens: Vec<&str> = response.split(',').collect();
    if tokens.len() == 1 {
        crate::info!("Extracted 1 {target_name} candidate from the LLM response.");
    } else {
        crate::info!(
            "Extracted {} {target_name} candidates from the LLM response.",
            tokens.len()
        );
    }

    let targets: Vec<String> = tokens
        .iter()
        .filter_map(|token| targets_map.resolve(token))
        .map(str::to_owned)
        .collect();
    if targets.len() == 1 {
        crate::info!("1 {target_name} candidate was found in the given {target_name}s.");
    } else {
        crate::info!(
            "{} {target_name} candidates were found in the given {target_name}s.",
            targets.len()
        );
    }

    ParsedResponse {
        candidates: tokens.len(),
        targets,
    }
}

pub fn parse(response: &str, targets_map: &CanonicalTargetMap) -> Vec<String> {
    parse_response(response, targets_map, "target").targets
}
