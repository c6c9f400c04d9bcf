//! Per-candidate evaluation state.
//!
//! The [`EvidenceRecord`] is the shared state one workflow pass threads
//! through its stages. Scoring stages never touch it directly: they return
//! [`StageUpdate`]s which the engine merges, so each category field has
//! exactly one writer and fan-out execution needs no locks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::domain::error::{EvalError, Result};

/// Evaluation categories. A closed set: every configured weight, scoring
/// stage, and report column refers to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Technology,
    LearningEffectiveness,
    Market,
    Competition,
    GrowthPotential,
    Risk,
}

impl Category {
    /// All categories in canonical (declaration) order.
    pub const ALL: [Category; 6] = [
        Category::Technology,
        Category::LearningEffectiveness,
        Category::Market,
        Category::Competition,
        Category::GrowthPotential,
        Category::Risk,
    ];

    /// Stable snake_case name, matching the serde representation.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Technology => "technology",
            Category::LearningEffectiveness => "learning_effectiveness",
            Category::Market => "market",
            Category::Competition => "competition",
            Category::GrowthPotential => "growth_potential",
            Category::Risk => "risk",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single category's score plus the justification written by the stage
/// that produced it. Scores are 0–100.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryFinding {
    pub score: u8,
    pub evidence: String,
}

/// Partial update returned by a scoring stage.
///
/// A stage only ever produces an update for its own category; the engine
/// merges updates into the record. Merge order is irrelevant because the
/// category keys are disjoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageUpdate {
    pub category: Category,
    pub finding: CategoryFinding,
}

/// The binary outcome of the judge stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Invest,
    Hold,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Invest => f.write_str("invest"),
            Decision::Hold => f.write_str("hold"),
        }
    }
}

/// Aggregate result written once by the judge stage.
///
/// `total` and `decision` are pure functions of the category scores and the
/// configured weights/thresholds. `rationale` is descriptive text from an
/// LLM collaborator and never overrides the numeric rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verdict {
    pub total: u8,
    pub decision: Decision,
    pub rationale: Option<String>,
}

/// Rendered report text and where it was persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportArtifact {
    pub text: String,
    pub path: Option<PathBuf>,
}

/// Shared evaluation state for one candidate in one workflow pass.
///
/// # Invariants
///
/// - `candidate_id` is immutable once set.
/// - Each category is written at most once per pass ([`Self::apply_update`]
///   rejects a second write).
/// - An absent category means "not yet scored", which is distinct from a
///   score of 0.
/// - `verdict` is written exactly once, by the judge, and only after every
///   configured category is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceRecord {
    candidate_id: String,
    findings: BTreeMap<Category, CategoryFinding>,
    verdict: Option<Verdict>,
    report: Option<ReportArtifact>,
}

impl EvidenceRecord {
    /// Create an empty record for a candidate.
    pub fn new(candidate_id: impl Into<String>) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            findings: BTreeMap::new(),
            verdict: None,
            report: None,
        }
    }

    pub fn candidate_id(&self) -> &str {
        &self.candidate_id
    }

    /// Merge a stage's partial update into the record.
    ///
    /// Fails if the category was already written: a duplicate writer is a
    /// wiring bug, not a recoverable scoring failure.
    pub fn apply_update(&mut self, update: StageUpdate) -> Result<()> {
        if self.findings.contains_key(&update.category) {
            return Err(EvalError::DuplicateFinding {
                candidate: self.candidate_id.clone(),
                category: update.category,
            });
        }
        self.findings.insert(update.category, update.finding);
        Ok(())
    }

    pub fn finding(&self, category: Category) -> Option<&CategoryFinding> {
        self.findings.get(&category)
    }

    /// Score for a category, or `None` if not yet scored.
    pub fn score(&self, category: Category) -> Option<u8> {
        self.findings.get(&category).map(|f| f.score)
    }

    /// Snapshot of all scores present so far.
    pub fn scores(&self) -> BTreeMap<Category, u8> {
        self.findings.iter().map(|(c, f)| (*c, f.score)).collect()
    }

    pub fn findings(&self) -> impl Iterator<Item = (Category, &CategoryFinding)> {
        self.findings.iter().map(|(c, f)| (*c, f))
    }

    /// Whether every given category has been scored.
    pub fn has_all<I: IntoIterator<Item = Category>>(&self, categories: I) -> bool {
        categories
            .into_iter()
            .all(|c| self.findings.contains_key(&c))
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    /// Record the judge's verdict. Single-writer: a second call is an error.
    pub fn set_verdict(&mut self, verdict: Verdict) -> Result<()> {
        if self.verdict.is_some() {
            return Err(EvalError::VerdictAlreadySet(self.candidate_id.clone()));
        }
        self.verdict = Some(verdict);
        Ok(())
    }

    pub fn report(&self) -> Option<&ReportArtifact> {
        self.report.as_ref()
    }

    /// Attach the rendered report. Terminal stage only.
    pub fn set_report(&mut self, report: ReportArtifact) {
        self.report = Some(report);
    }
}
