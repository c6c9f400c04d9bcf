//! Engine configuration: category weights, decision thresholds, topology.
//!
//! Thresholds and weights are data, not constants: the defaults below match
//! the most common screening profile but callers may supply their own.
//! Validation runs before any candidate is processed; a bad configuration is
//! the one class of error that aborts a run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::error::{EvalError, Result};
use crate::domain::record::Category;

/// Tolerance when checking that weights sum to 1.0.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Pass/fail thresholds for the judge stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionThresholds {
    /// Minimum weighted total (0–100) for an invest decision.
    pub accept_total: u8,

    /// Minimum raw score (0–100) every individual category must reach.
    /// A single category below the floor vetoes an otherwise strong total.
    pub category_floor: u8,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            accept_total: 70,
            category_floor: 50,
        }
    }
}

/// How scoring stages are scheduled within one candidate's evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Stages run one after another in declared order.
    Sequential,

    /// Stages run as independent concurrent tasks; the judge waits on a
    /// barrier join until every stage has returned.
    FanOut,
}

/// Complete engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Category weights. Must cover every configured category and sum to 1.0.
    pub weights: BTreeMap<Category, f64>,

    pub thresholds: DecisionThresholds,

    pub topology: Topology,

    /// Defensive ceiling on ranked-retry iterations. Pool exhaustion is the
    /// normal loop terminator; this only guards against wiring mistakes.
    pub max_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            thresholds: DecisionThresholds::default(),
            topology: Topology::FanOut,
            max_steps: 64,
        }
    }
}

impl EngineConfig {
    /// The categories this configuration evaluates, in canonical order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.weights.keys().copied()
    }

    /// Validate the configuration. Must be called before any candidate is
    /// processed; violations abort the run.
    pub fn validate(&self) -> Result<()> {
        if self.weights.is_empty() {
            return Err(EvalError::InvalidConfig(
                "no category weights configured".to_string(),
            ));
        }

        for (category, weight) in &self.weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(EvalError::InvalidConfig(format!(
                    "weight for {category} must be a non-negative finite number, got {weight}"
                )));
            }
        }

        let sum: f64 = self.weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(EvalError::InvalidConfig(format!(
                "category weights must sum to 1.0 (got {sum:.6})"
            )));
        }

        if self.thresholds.accept_total > 100 || self.thresholds.category_floor > 100 {
            return Err(EvalError::InvalidConfig(format!(
                "thresholds must be within 0–100 (accept_total={}, category_floor={})",
                self.thresholds.accept_total, self.thresholds.category_floor
            )));
        }

        if self.max_steps == 0 {
            return Err(EvalError::InvalidConfig(
                "max_steps must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Override the scheduling topology.
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Override the decision thresholds.
    pub fn with_thresholds(mut self, thresholds: DecisionThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// Default weight profile for the six-category screen.
pub fn default_weights() -> BTreeMap<Category, f64> {
    [
        (Category::Technology, 0.20),
        (Category::LearningEffectiveness, 0.20),
        (Category::Market, 0.25),
        (Category::Competition, 0.15),
        (Category::GrowthPotential, 0.10),
        (Category::Risk, 0.10),
    ]
    .into_iter()
    .collect()
}
