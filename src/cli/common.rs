//! Shared argument parsing for CLI commands.
//!
//! Provider and artifact names arrive as free-form strings. Parsing lives
//! here so both commands reject unknown names the same way, with a
//! "did you mean" suggestion when a known name is close enough.

use anyhow::{Result, anyhow};
use strsim::levenshtein;

use crate::models::{ArtifactType, ProviderType};

/// Maximum edit distance considered close enough to suggest, as a
/// percentage of the input length.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// The closest candidate within the similarity threshold, when any.
pub(crate) fn closest_match<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|candidate| (*candidate, levenshtein(input, candidate)))
        .filter(|(_, distance)| *distance <= input.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Parse an artifact type name, suggesting the closest known type on failure.
pub(crate) fn parse_artifact(input: &str) -> Result<ArtifactType> {
    input.parse().map_err(|_| {
        let names: Vec<&str> = ArtifactType::ALL.iter().map(|artifact| artifact.as_str()).collect();
        match closest_match(&input.to_lowercase(), &names) {
            Some(suggestion) => {
                anyhow!("unknown artifact type '{input}'. Did you mean '{suggestion}'?")
            }
            None => anyhow!(
                "unknown artifact type '{input}'. Valid types: {}",
                names.join(", ")
            ),
        }
    })
}

/// Parse a comma-separated provider list, where `all` selects every
/// supported provider. Duplicates collapse, order is preserved.
pub(crate) fn parse_providers(input: &str) -> Result<Vec<ProviderType>> {
    if input.trim().eq_ignore_ascii_case("all") {
        return Ok(ProviderType::ALL.to_vec());
    }

    let mut providers = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let provider: ProviderType = part.parse().map_err(|_| {
            let names: Vec<&str> =
                ProviderType::ALL.iter().map(|provider| provider.as_str()).collect();
            match closest_match(&part.to_lowercase(), &names) {
                Some(suggestion) => {
                    anyhow!("unknown provider '{part}'. Did you mean '{suggestion}'?")
                }
                None => anyhow!(
                    "unknown provider '{part}'. Valid providers: {}",
                    names.join(", ")
                ),
            }
        })?;
        if !providers.contains(&provider) {
            providers.push(provider);
        }
    }

    if providers.is_empty() {
        anyhow::bail!("no providers given (use provider names or 'all')");
    }
    Ok(providers)
}
