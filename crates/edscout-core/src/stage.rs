//! Scoring stage: one category, one partial update.
//!
//! A stage reads only the candidate identity, gathers context, asks the
//! scoring collaborator to grade the category checklist, and returns a
//! [`StageUpdate`]. It never mutates shared state and never reads another
//! category's score, which is what makes fan-out scheduling safe without
//! locks. Collaborator failures are absorbed here: a failed category gets
//! the documented fallback score and an evidence note, never an error.

use tracing::warn;

use crate::collab::{CategoryScorer, ContextProvider};
use crate::domain::criteria::CategoryProfile;
use crate::domain::record::{Category, CategoryFinding, StageUpdate};

/// Score assigned when the scoring collaborator fails or returns garbage:
/// the midpoint of the valid 0–100 range.
pub const FALLBACK_SCORE: u8 = 50;

/// Marker substituted when context retrieval fails or comes back empty.
pub const NO_CONTEXT: &str = "no context available";

/// A single category's scoring stage.
#[derive(Debug, Clone)]
pub struct ScoringStage {
    profile: CategoryProfile,
}

impl ScoringStage {
    pub fn new(profile: CategoryProfile) -> Self {
        Self { profile }
    }

    pub fn category(&self) -> Category {
        self.profile.category
    }

    /// Run the stage for one candidate.
    ///
    /// Always returns an update: retrieval failure degrades to the
    /// [`NO_CONTEXT`] marker, scoring failure degrades to
    /// [`FALLBACK_SCORE`] with the failure reason recorded as evidence.
    pub async fn run(
        &self,
        candidate_id: &str,
        context_provider: &dyn ContextProvider,
        scorer: &dyn CategoryScorer,
    ) -> StageUpdate {
        let category = self.profile.category;

        let context = match context_provider
            .get_context(candidate_id, &self.profile.search_query)
            .await
        {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => NO_CONTEXT.to_string(),
            Err(e) => {
                warn!(
                    candidate = %candidate_id,
                    category = %category,
                    error = %e,
                    "context retrieval failed, scoring without context"
                );
                NO_CONTEXT.to_string()
            }
        };

        match scorer
            .score_category(candidate_id, category, &self.profile.checklist, &context)
            .await
        {
            Ok(scored) => StageUpdate {
                category,
                finding: CategoryFinding {
                    score: scored.score.min(100),
                    evidence: scored.evidence,
                },
            },
            Err(e) => {
                warn!(
                    candidate = %candidate_id,
                    category = %category,
                    error = %e,
                    "scoring failed, using fallback score"
                );
                Self::fallback(category, &e.to_string())
            }
        }
    }

    /// The degraded update used when scoring cannot complete.
    pub fn fallback(category: Category, reason: &str) -> StageUpdate {
        StageUpdate {
            category,
            finding: CategoryFinding {
                score: FALLBACK_SCORE,
                evidence: format!("scoring unavailable ({reason}); fallback score applied"),
            },
        }
    }
}
