//! Confidence aggregation and status decision.
//!
//! The aggregate is a weighted average of per-field confidences, with a
//! penalty for each missing mandatory field, clamped to [0, 1].

use crate::models::aide::ExtractionStatus;
use crate::models::config::ExtractionConfig;
use crate::rules::{fields, FieldCandidate};

/// Aggregate field candidates into an overall confidence and a status.
///
/// No candidate at all yields `(0.0, Skipped)`. The status is `Success`
/// only when the aggregate reaches the threshold and at least one
/// mandatory field is present; otherwise `Partial`.
pub fn score(
    candidates: &[FieldCandidate],
    config: &ExtractionConfig,
) -> (f32, ExtractionStatus) {
    let filled: Vec<&FieldCandidate> = candidates.iter().filter(|c| !c.value.is_empty()).collect();
    if filled.is_empty() {
        return (0.0, ExtractionStatus::Skipped);
    }

    let mut weighted_sum = 0.0f32;
    let mut weight_sum = 0.0f32;
    for candidate in &filled {
        let weight = config.weight(&candidate.field);
        weighted_sum += weight * candidate.confidence;
        weight_sum += weight;
    }
    let mut aggregate = if weight_sum > 0.0 {
        weighted_sum / weight_sum
    } else {
        0.0
    };

    let mandatory_present = fields::MANDATORY
        .iter()
        .filter(|f| filled.iter().any(|c| c.field == **f))
        .count();
    let missing = fields::MANDATORY.len() - mandatory_present;
    aggregate -= config.missing_mandatory_penalty * missing as f32;
    let aggregate = aggregate.clamp(0.0, 1.0);

    let status = if aggregate >= config.confidence_threshold && mandatory_present > 0 {
        ExtractionStatus::Success
    } else {
        ExtractionStatus::Partial
    };

    (aggregate, status)
}
