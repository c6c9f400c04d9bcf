//! Collaborator trait boundaries.
//!
//! The engine drives external services: web search, LLM scoring, gate
//! review, report rendering: through these async traits. Implementations
//! live in `edscout-collab`; tests use in-memory stubs. Prompt construction,
//! response parsing, and timeouts are implementation details behind these
//! seams, never engine concerns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::record::{Category, EvidenceRecord, Verdict};

/// Errors a collaborator may surface. The engine absorbs these into
/// fallback data; they never abort an evaluation.
#[derive(Debug, thiserror::Error)]
pub enum CollabError {
    /// The backing service could not be reached or refused the request.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The service responded, but the payload could not be interpreted.
    #[error("malformed collaborator response: {0}")]
    Malformed(String),
}

/// Structured result of scoring one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoredCategory {
    /// Raw score. The stage clamps it into 0–100; collaborators should
    /// already normalize their internal scale before returning.
    pub score: u8,
    pub evidence: String,
}

/// Gathers free-text context about a candidate for one category's query.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    async fn get_context(&self, candidate_id: &str, query: &str)
        -> Result<String, CollabError>;
}

/// Scores a candidate against one category's checklist.
#[async_trait]
pub trait CategoryScorer: Send + Sync {
    async fn score_category(
        &self,
        candidate_id: &str,
        category: Category,
        checklist: &[String],
        context: &str,
    ) -> Result<ScoredCategory, CollabError>;
}

/// Answers a single pass/fail gate question about an evaluated candidate.
///
/// Implementations must resolve ambiguous or unparseable model output to
/// `Ok(false)`; `Err` is reserved for transport-level failures. The
/// validation chain treats both as a failed gate.
#[async_trait]
pub trait GateReviewer: Send + Sync {
    async fn review(
        &self,
        candidate_id: &str,
        summary: &str,
        gate_description: &str,
    ) -> Result<bool, CollabError>;
}

/// Renders the final report text from a finalized record.
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    async fn render_report(&self, record: &EvidenceRecord) -> Result<String, CollabError>;
}

/// Produces a natural-language rationale for a verdict.
///
/// The rationale is descriptive only; the numeric decision rule is ground
/// truth and a narrator can never change it.
#[async_trait]
pub trait VerdictNarrator: Send + Sync {
    async fn narrate(
        &self,
        record: &EvidenceRecord,
        verdict: &Verdict,
    ) -> Result<String, CollabError>;
}
