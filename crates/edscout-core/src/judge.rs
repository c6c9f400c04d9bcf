//! Judge stage: weighted aggregation and the invest/hold decision.
//!
//! The numeric rule is ground truth: invest iff the weighted total meets the
//! accept threshold AND every raw category score meets the floor. The floor
//! check deliberately uses raw scores, not weighted contributions: one very
//! weak category vetoes an otherwise strong average. Both functions are pure:
//! the same scores always yield the same verdict regardless of the order the
//! scoring stages completed in.

use std::collections::BTreeMap;

use crate::domain::config::{DecisionThresholds, EngineConfig};
use crate::domain::error::{EvalError, Result};
use crate::domain::record::{Category, Decision, EvidenceRecord, Verdict};

/// Weighted total over the configured categories, rounded half-up.
///
/// Categories missing from `scores` contribute zero; callers that need the
/// all-present precondition enforce it before calling (see
/// [`JudgeStage::evaluate`]).
pub fn weighted_total(scores: &BTreeMap<Category, u8>, weights: &BTreeMap<Category, f64>) -> u8 {
    let sum: f64 = weights
        .iter()
        .map(|(category, weight)| weight * f64::from(scores.get(category).copied().unwrap_or(0)))
        .sum();
    // Round half-up: 76.5 -> 77.
    (sum + 0.5).floor().clamp(0.0, 100.0) as u8
}

/// Apply the conjunctive decision rule to a complete score vector.
pub fn decide(
    scores: &BTreeMap<Category, u8>,
    weights: &BTreeMap<Category, f64>,
    thresholds: &DecisionThresholds,
) -> Verdict {
    let total = weighted_total(scores, weights);
    let floor_met = weights
        .keys()
        .all(|category| scores.get(category).copied().unwrap_or(0) >= thresholds.category_floor);

    let decision = if total >= thresholds.accept_total && floor_met {
        Decision::Invest
    } else {
        Decision::Hold
    };

    Verdict {
        total,
        decision,
        rationale: None,
    }
}

/// Aggregator stage over an evidence record.
#[derive(Debug, Clone)]
pub struct JudgeStage {
    weights: BTreeMap<Category, f64>,
    thresholds: DecisionThresholds,
}

impl JudgeStage {
    pub fn new(weights: BTreeMap<Category, f64>, thresholds: DecisionThresholds) -> Self {
        Self {
            weights,
            thresholds,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.weights.clone(), config.thresholds)
    }

    /// Compute the verdict for a record.
    ///
    /// Precondition (the fan-in join): every weighted category must already
    /// be scored. A missing category is a scheduling bug and surfaces as
    /// [`EvalError::MissingFinding`].
    pub fn evaluate(&self, record: &EvidenceRecord) -> Result<Verdict> {
        for category in self.weights.keys() {
            if record.score(*category).is_none() {
                return Err(EvalError::MissingFinding {
                    candidate: record.candidate_id().to_string(),
                    category: *category,
                });
            }
        }
        Ok(decide(&record.scores(), &self.weights, &self.thresholds))
    }
}
