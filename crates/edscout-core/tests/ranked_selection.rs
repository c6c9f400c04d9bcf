//! Ranked-retry workflow tests: screening, best-first selection through the
//! validation chain, pool exhaustion, and the persisted ranked table.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use edscout_core::{
    load_ranked_table_json, Category, CategoryScorer, CollabError, Collaborators, ContextProvider,
    EngineConfig, EvidenceRecord, GateReviewer, RankedTableArtifact, ReportRenderer, RunOutcome,
    ScoredCategory, Topology, Workflow,
};

// --- stub collaborators ---

struct StaticContext;

#[async_trait]
impl ContextProvider for StaticContext {
    async fn get_context(&self, _: &str, _: &str) -> Result<String, CollabError> {
        Ok("context".to_string())
    }
}

/// Gives every category of a candidate the same score, looked up by
/// candidate id. Unknown candidates fail outright so screening records an
/// errored pool entry for them.
struct PerCandidateScorer {
    flat_scores: BTreeMap<&'static str, u8>,
}

#[async_trait]
impl CategoryScorer for PerCandidateScorer {
    async fn score_category(
        &self,
        candidate: &str,
        category: Category,
        _: &[String],
        _: &str,
    ) -> Result<ScoredCategory, CollabError> {
        match self.flat_scores.get(candidate) {
            Some(score) => Ok(ScoredCategory {
                score: *score,
                evidence: format!("{category} graded"),
            }),
            None => Err(CollabError::Unavailable(format!(
                "no data for {candidate}"
            ))),
        }
    }
}

/// Approves only the named candidate, counting every review call.
struct SelectiveReviewer {
    approve: &'static str,
    calls: AtomicUsize,
}

impl SelectiveReviewer {
    fn new(approve: &'static str) -> Self {
        Self {
            approve,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl GateReviewer for SelectiveReviewer {
    async fn review(&self, candidate: &str, _: &str, _: &str) -> Result<bool, CollabError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(candidate == self.approve)
    }
}

struct RejectAll;

#[async_trait]
impl GateReviewer for RejectAll {
    async fn review(&self, _: &str, _: &str, _: &str) -> Result<bool, CollabError> {
        Ok(false)
    }
}

struct HeaderRenderer;

#[async_trait]
impl ReportRenderer for HeaderRenderer {
    async fn render_report(&self, record: &EvidenceRecord) -> Result<String, CollabError> {
        Ok(format!("# {}\n", record.candidate_id()))
    }
}

// --- fixtures ---

fn candidates() -> Vec<String> {
    ["Alpha", "Beta", "Gamma", "Delta"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Beta outranks Gamma outranks Alpha; Delta has no scorer data and errors.
fn scorer() -> Arc<PerCandidateScorer> {
    Arc::new(PerCandidateScorer {
        flat_scores: [("Alpha", 72), ("Beta", 90), ("Gamma", 85)]
            .into_iter()
            .collect(),
    })
}

fn workflow(reviewer: Arc<dyn GateReviewer>) -> Workflow {
    let collab = Collaborators {
        context: Arc::new(StaticContext),
        scorer: scorer(),
        reviewer,
        renderer: Arc::new(HeaderRenderer),
        narrator: None,
    };
    let config = EngineConfig {
        topology: Topology::Sequential,
        ..EngineConfig::default()
    };
    Workflow::new(config, collab).unwrap()
}

// --- tests ---

#[tokio::test]
async fn screening_ranks_all_candidates_and_flags_failures() {
    let workflow = workflow(Arc::new(RejectAll));
    let screening = workflow.screen(&candidates()).await.unwrap();

    let order: Vec<&str> = screening
        .pool
        .entries()
        .iter()
        .map(|e| e.candidate_id.as_str())
        .collect();
    assert_eq!(order, ["Beta", "Gamma", "Alpha", "Delta"]);

    let delta = &screening.pool.entries()[3];
    assert!(delta.error.is_some());
    assert_eq!(delta.total_score, 0);
    // Errored candidates carry no record.
    assert!(!screening.records.contains_key("Delta"));
}

#[tokio::test]
async fn top_ranked_rejection_falls_through_to_next_candidate() {
    let reviewer = Arc::new(SelectiveReviewer::new("Gamma"));
    let workflow = workflow(reviewer.clone());

    match workflow.run_ranked(&candidates()).await.unwrap() {
        RunOutcome::Invested { record } => {
            // Beta was selected first and rejected at its first gate;
            // Gamma then cleared all six.
            assert_eq!(record.candidate_id(), "Gamma");
            assert!(record.report().is_some());
        }
        other => panic!("expected invest, got {other:?}"),
    }
    assert_eq!(reviewer.calls.load(Ordering::SeqCst), 1 + 6);
}

#[tokio::test]
async fn exhausted_pool_terminates_with_no_candidate() {
    let workflow = workflow(Arc::new(RejectAll));

    match workflow.run_ranked(&candidates()).await.unwrap() {
        RunOutcome::NoCandidate => {}
        other => panic!("expected no-candidate, got {other:?}"),
    }
}

#[tokio::test]
async fn errored_candidates_are_never_validated() {
    let reviewer = Arc::new(SelectiveReviewer::new("nobody"));
    let workflow = workflow(reviewer.clone());

    let outcome = workflow.run_ranked(&candidates()).await.unwrap();
    assert!(matches!(outcome, RunOutcome::NoCandidate));
    // Three selectable candidates, one gate call each before rejection;
    // Delta is skipped without a single review.
    assert_eq!(reviewer.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn step_ceiling_cuts_off_retry_before_pool_exhaustion() {
    let reviewer = Arc::new(SelectiveReviewer::new("nobody"));
    let collab = Collaborators {
        context: Arc::new(StaticContext),
        scorer: scorer(),
        reviewer: reviewer.clone(),
        renderer: Arc::new(HeaderRenderer),
        narrator: None,
    };
    let config = EngineConfig {
        topology: Topology::Sequential,
        max_steps: 1,
        ..EngineConfig::default()
    };
    let workflow = Workflow::new(config, collab).unwrap();

    // Three selectable candidates remain, but the ceiling allows exactly
    // one validation attempt before the run terminates.
    match workflow.run_ranked(&candidates()).await.unwrap() {
        RunOutcome::NoCandidate => {}
        other => panic!("expected no-candidate, got {other:?}"),
    }
    assert_eq!(reviewer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn ranked_table_round_trips_through_json() {
    let workflow = workflow(Arc::new(RejectAll));
    let screening = workflow.screen(&candidates()).await.unwrap();
    let artifact = RankedTableArtifact::from_pool(&screening.pool);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ranked.json");
    edscout_core::write_ranked_table_json(&path, &artifact).unwrap();
    let loaded = load_ranked_table_json(&path).unwrap();

    assert_eq!(loaded.rows, artifact.rows);
    let order: Vec<&str> = loaded.rows.iter().map(|r| r.candidate_id.as_str()).collect();
    assert_eq!(order, ["Beta", "Gamma", "Alpha", "Delta"]);
}
