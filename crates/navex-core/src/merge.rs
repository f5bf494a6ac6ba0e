//! Multi-source candidate merging.
//!
//! Rule candidates are authoritative. A second source (entity recognition,
//! behind the [`EntityCandidateSource`] trait) can confirm a rule value or
//! contribute fields the rules missed; it never overrides a rule value.

use tracing::warn;

use crate::rules::FieldCandidate;

/// A pluggable secondary candidate producer.
///
/// Implementations must be deterministic for a given text; the engine
/// shares them across threads.
pub trait EntityCandidateSource: Send + Sync {
    fn name(&self) -> &str;

    fn candidates(&self, text: &str) -> Vec<FieldCandidate>;
}

/// Source that never produces anything, for rule-only deployments.
pub struct NoopEntitySource;

impl EntityCandidateSource for NoopEntitySource {
    fn name(&self) -> &str {
        "noop"
    }

    fn candidates(&self, _text: &str) -> Vec<FieldCandidate> {
        Vec::new()
    }
}

/// Merge rule candidates with secondary candidates.
///
/// Per field: the rule value always wins; agreement raises nothing but
/// keeps the higher confidence of the two; disagreement keeps the rule
/// value and records a warning. Secondary-only fields are appended as-is.
pub fn merge(
    rule_candidates: Vec<FieldCandidate>,
    other_candidates: Vec<FieldCandidate>,
    warnings: &mut Vec<String>,
) -> Vec<FieldCandidate> {
    let mut merged = rule_candidates;

    for other in other_candidates {
        match merged.iter_mut().find(|c| c.field == other.field) {
            Some(existing) => {
                if existing.value != other.value {
                    warn!(
                        field = %other.field,
                        rule_value = %existing.value,
                        other_value = %other.value,
                        "valeurs en conflit entre sources"
                    );
                    warnings.push(format!(
                        "valeurs en conflit pour le champ '{}': '{}' (règle) vs '{}' ({})",
                        other.field, existing.value, other.value, other.rule_id
                    ));
                }
                if other.confidence > existing.confidence {
                    existing.confidence = other.confidence;
                }
            }
            None => merged.push(other),
        }
    }

    merged
}
