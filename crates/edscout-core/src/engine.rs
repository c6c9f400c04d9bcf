//! Workflow engine: composes scoring stages, judge, validation chain, and
//! selector into a run.
//!
//! Two topologies for one candidate's evaluation: a pure sequential chain,
//! or fan-out: every scoring stage spawned as an independent Tokio task
//! with the judge behind a barrier join. Stages return partial updates over
//! disjoint categories, so the merge is order-independent and needs no
//! locks.
//!
//! Two driving modes: `run_single` evaluates one candidate to a terminal
//! invest/hold outcome; `run_ranked` screens a whole pool, then walks the
//! ranking through the validation chain until a candidate clears or the
//! pool is exhausted. Pool exhaustion is the normal loop terminator; a
//! configured step ceiling guards against wiring mistakes.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::collab::{
    CategoryScorer, ContextProvider, GateReviewer, ReportRenderer, VerdictNarrator,
};
use crate::domain::config::{EngineConfig, Topology};
use crate::domain::criteria::CategoryProfile;
use crate::domain::error::{EvalError, Result};
use crate::domain::record::{Decision, EvidenceRecord, ReportArtifact, StageUpdate};
use crate::gate::{Gate, ValidationChain};
use crate::judge::JudgeStage;
use crate::obs::{self, CandidateSpan};
use crate::pool::{PoolEntry, RankedPool};
use crate::report;
use crate::stage::ScoringStage;

/// The external services a workflow drives.
#[derive(Clone)]
pub struct Collaborators {
    pub context: Arc<dyn ContextProvider>,
    pub scorer: Arc<dyn CategoryScorer>,
    pub reviewer: Arc<dyn GateReviewer>,
    pub renderer: Arc<dyn ReportRenderer>,

    /// Optional verdict narrator; absence just means no rationale text.
    pub narrator: Option<Arc<dyn VerdictNarrator>>,
}

/// Terminal outcome of a workflow run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// A candidate cleared every check; report rendered and attached.
    Invested { record: EvidenceRecord },

    /// Single-candidate mode: the candidate did not meet the bar.
    Held { record: EvidenceRecord },

    /// Ranked mode: no selectable candidate cleared the chain. A normal
    /// terminal outcome, not an error.
    NoCandidate,
}

impl RunOutcome {
    fn label(&self) -> &'static str {
        match self {
            RunOutcome::Invested { .. } => "invested",
            RunOutcome::Held { .. } => "held",
            RunOutcome::NoCandidate => "no_candidate",
        }
    }
}

/// Result of the bulk screening pass: the ranked pool plus the full
/// evidence records backing each successful entry.
pub struct Screening {
    pub pool: RankedPool,
    pub records: BTreeMap<String, EvidenceRecord>,
}

/// A configured evaluation workflow.
pub struct Workflow {
    config: EngineConfig,
    profiles: Vec<CategoryProfile>,
    chain: ValidationChain,
    judge: JudgeStage,
    collab: Collaborators,
    report_dir: Option<PathBuf>,
}

impl Workflow {
    /// Build a workflow with the default category profiles and gate chain.
    ///
    /// Configuration errors abort here, before any candidate is processed;
    /// they are the only hard failure path in the engine.
    pub fn new(config: EngineConfig, collab: Collaborators) -> Result<Self> {
        Self::with_profiles(
            config,
            collab,
            crate::domain::criteria::default_profiles(),
            crate::gate::default_gates(),
        )
    }

    /// Build a workflow with explicit profiles and gates.
    pub fn with_profiles(
        config: EngineConfig,
        collab: Collaborators,
        profiles: Vec<CategoryProfile>,
        gates: Vec<Gate>,
    ) -> Result<Self> {
        config.validate()?;

        // Keep only profiles for weighted categories; every weighted
        // category must have exactly one.
        let profiles: Vec<CategoryProfile> = profiles
            .into_iter()
            .filter(|p| config.weights.contains_key(&p.category))
            .collect();

        for category in config.categories() {
            let count = profiles.iter().filter(|p| p.category == category).count();
            if count != 1 {
                return Err(EvalError::InvalidConfig(format!(
                    "category {category} must have exactly one profile, found {count}"
                )));
            }
        }

        let judge = JudgeStage::from_config(&config);
        Ok(Self {
            config,
            profiles,
            chain: ValidationChain::new(gates),
            judge,
            collab,
            report_dir: None,
        })
    }

    /// Persist rendered reports under this directory.
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate one candidate: run all scoring stages under the configured
    /// topology, merge their updates, and record the judge's verdict.
    pub async fn evaluate_candidate(&self, candidate_id: &str) -> Result<EvidenceRecord> {
        let _span = CandidateSpan::enter(candidate_id);
        let topology = match self.config.topology {
            Topology::Sequential => "sequential",
            Topology::FanOut => "fan_out",
        };
        obs::emit_candidate_started(candidate_id, topology);

        let updates = match self.config.topology {
            Topology::Sequential => self.run_stages_sequential(candidate_id).await,
            Topology::FanOut => self.run_stages_fan_out(candidate_id).await,
        };

        let mut record = EvidenceRecord::new(candidate_id);
        for update in updates {
            obs::emit_stage_scored(candidate_id, update.category.name(), update.finding.score);
            record.apply_update(update)?;
        }

        // Fan-in join: the judge only runs once every stage has reported.
        let mut verdict = self.judge.evaluate(&record)?;

        if let Some(narrator) = &self.collab.narrator {
            match narrator.narrate(&record, &verdict).await {
                Ok(text) => verdict.rationale = Some(text),
                // Rationale is descriptive only; losing it is not a failure.
                Err(e) => warn!(candidate = %candidate_id, error = %e, "narration failed"),
            }
        }

        obs::emit_verdict(candidate_id, verdict.total, &verdict.decision.to_string());
        record.set_verdict(verdict)?;
        Ok(record)
    }

    async fn run_stages_sequential(&self, candidate_id: &str) -> Vec<StageUpdate> {
        let mut updates = Vec::with_capacity(self.profiles.len());
        for profile in &self.profiles {
            let stage = ScoringStage::new(profile.clone());
            updates.push(
                stage
                    .run(
                        candidate_id,
                        self.collab.context.as_ref(),
                        self.collab.scorer.as_ref(),
                    )
                    .await,
            );
        }
        updates
    }

    /// Spawn every scoring stage as an independent task and barrier-join.
    ///
    /// A stage that panics degrades to the fallback update for its category
    /// so a single stage can never abort the candidate's evaluation.
    async fn run_stages_fan_out(&self, candidate_id: &str) -> Vec<StageUpdate> {
        let mut tasks: Vec<JoinHandle<StageUpdate>> = Vec::with_capacity(self.profiles.len());

        for profile in &self.profiles {
            let stage = ScoringStage::new(profile.clone());
            let context = Arc::clone(&self.collab.context);
            let scorer = Arc::clone(&self.collab.scorer);
            let candidate = candidate_id.to_string();

            tasks.push(tokio::spawn(async move {
                stage
                    .run(&candidate, context.as_ref(), scorer.as_ref())
                    .await
            }));
        }

        // Barrier join: wait for every stage, in declared order.
        let joined = join_all(tasks).await;

        let mut updates = Vec::with_capacity(joined.len());
        for (result, profile) in joined.into_iter().zip(&self.profiles) {
            match result {
                Ok(update) => updates.push(update),
                Err(e) => {
                    warn!(
                        candidate = %candidate_id,
                        category = %profile.category,
                        error = %e,
                        "scoring task aborted, using fallback"
                    );
                    updates.push(ScoringStage::fallback(profile.category, "task aborted"));
                }
            }
        }
        updates
    }

    /// Single-candidate mode: evaluate, then report or hold.
    pub async fn run_single(&self, candidate_id: &str) -> Result<RunOutcome> {
        let run_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        obs::emit_run_started(&run_id, "single", 1);

        let mut record = self.evaluate_candidate(candidate_id).await?;

        let decision = record
            .verdict()
            .map(|v| v.decision)
            .unwrap_or(Decision::Hold);

        let outcome = match decision {
            Decision::Invest => {
                self.finalize_report(&mut record).await;
                RunOutcome::Invested { record }
            }
            Decision::Hold => RunOutcome::Held { record },
        };

        obs::emit_run_finished(&run_id, outcome.label(), start.elapsed().as_millis() as u64);
        Ok(outcome)
    }

    /// Bulk screening pass: evaluate every candidate once, building the
    /// ranked pool. A candidate whose evaluation fails structurally becomes
    /// an error-flagged, score-0 entry: the pass itself never aborts.
    pub async fn screen(&self, candidates: &[String]) -> Result<Screening> {
        let mut entries = Vec::with_capacity(candidates.len());
        let mut records = BTreeMap::new();

        for candidate in candidates {
            match self.evaluate_candidate(candidate).await {
                Ok(record) => {
                    entries.push(PoolEntry::from_record(&record));
                    records.insert(candidate.clone(), record);
                }
                Err(e) => {
                    warn!(candidate = %candidate, error = %e, "screening failed for candidate");
                    entries.push(PoolEntry::failed(candidate.clone(), e.to_string()));
                }
            }
        }

        Ok(Screening {
            pool: RankedPool::rank(entries),
            records,
        })
    }

    /// Ranked-retry mode: screen the pool, then validate candidates best
    /// first until one clears the gate chain or the pool is exhausted.
    ///
    /// Candidates are never re-scored within a run; the chain reads the
    /// screening-time record. Strictly sequential across candidates.
    pub async fn run_ranked(&self, candidates: &[String]) -> Result<RunOutcome> {
        let run_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        obs::emit_run_started(&run_id, "ranked", candidates.len());

        let mut screening = self.screen(candidates).await?;
        let mut steps = 0usize;
        let mut ceiling_hit = false;

        while let Some(entry) = screening.pool.select_next() {
            steps += 1;
            if steps > self.config.max_steps {
                obs::emit_step_ceiling(self.config.max_steps);
                ceiling_hit = true;
                break;
            }

            let candidate_id = entry.candidate_id.clone();
            let Some(record) = screening.records.get(&candidate_id) else {
                // Selectable entries always have a record; skip defensively.
                continue;
            };

            info!(candidate = %candidate_id, rank_step = steps, "validating ranked candidate");
            let outcome = self
                .chain
                .run(record, self.collab.reviewer.as_ref())
                .await;

            if outcome.cleared() {
                if let Some(mut record) = screening.records.remove(&candidate_id) {
                    self.finalize_report(&mut record).await;
                    let outcome = RunOutcome::Invested { record };
                    obs::emit_run_finished(
                        &run_id,
                        outcome.label(),
                        start.elapsed().as_millis() as u64,
                    );
                    return Ok(outcome);
                }
            }
            // Rejected: the candidate stays in the pool for audit but is
            // never selected again; move on.
        }

        // Exhaustion and the ceiling are distinct termination reasons.
        if !ceiling_hit {
            obs::emit_pool_exhausted(screening.pool.len());
        }
        let outcome = RunOutcome::NoCandidate;
        obs::emit_run_finished(&run_id, outcome.label(), start.elapsed().as_millis() as u64);
        Ok(outcome)
    }

    /// Render and (if configured) persist the report. Invoked exactly once
    /// per terminal invest outcome; renderer failure degrades to a missing
    /// report rather than aborting a run that already reached a verdict.
    async fn finalize_report(&self, record: &mut EvidenceRecord) {
        match self.collab.renderer.render_report(record).await {
            Ok(text) => {
                let path = match &self.report_dir {
                    Some(dir) => match report::write_report_md(dir, record, &text) {
                        Ok(path) => Some(path),
                        Err(e) => {
                            warn!(candidate = %record.candidate_id(), error = %e, "report write failed");
                            None
                        }
                    },
                    None => None,
                };
                record.set_report(ReportArtifact { text, path });
            }
            Err(e) => {
                warn!(candidate = %record.candidate_id(), error = %e, "report rendering failed");
            }
        }
    }
}
