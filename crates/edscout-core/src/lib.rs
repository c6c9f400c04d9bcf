//! EdScout Core Library
//!
//! Re-exports the evaluation engine components for programmatic access.

pub mod collab;
pub mod domain;
pub mod engine;
pub mod gate;
pub mod judge;
pub mod obs;
pub mod pool;
pub mod report;
pub mod stage;
pub mod telemetry;

pub use domain::{
    default_profiles, default_weights, Category, CategoryFinding, CategoryProfile, Decision,
    DecisionThresholds, EngineConfig, EvalError, EvidenceRecord, ReportArtifact, Result,
    StageUpdate, Topology, Verdict,
};

pub use collab::{
    CategoryScorer, CollabError, ContextProvider, GateReviewer, ReportRenderer, ScoredCategory,
    VerdictNarrator,
};

pub use engine::{Collaborators, RunOutcome, Screening, Workflow};
pub use gate::{default_gates, summarize, ChainOutcome, Gate, GateDecision, ValidationChain};
pub use judge::{decide, weighted_total, JudgeStage};
pub use pool::{PoolEntry, RankedPool};
pub use report::{
    load_ranked_table_json, render_ranked_table_csv, write_ranked_table_csv,
    write_ranked_table_json, write_report_md, RankedRow, RankedTableArtifact,
    RANKED_TABLE_SCHEMA_VERSION,
};
pub use stage::{ScoringStage, FALLBACK_SCORE, NO_CONTEXT};
pub use telemetry::{LogFormat, LogOptions};

/// Crate version, surfaced by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
