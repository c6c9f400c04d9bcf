//! Domain models for EdScout.
//!
//! Canonical definitions for the core entities:
//! - `EvidenceRecord`: per-candidate evaluation state
//! - `EngineConfig`: weights, thresholds, scheduling topology
//! - `CategoryProfile`: per-category search query and checklist

pub mod config;
pub mod criteria;
pub mod error;
pub mod record;

// Re-export main types and errors
pub use config::{
    default_weights, DecisionThresholds, EngineConfig, Topology, WEIGHT_EPSILON,
};
pub use criteria::{default_profiles, CategoryProfile};
pub use error::{EvalError, Result};
pub use record::{
    Category, CategoryFinding, Decision, EvidenceRecord, ReportArtifact, StageUpdate, Verdict,
};
