//! Structured observability hooks for evaluation lifecycle events.
//!
//! This module provides:
//! - Candidate-scoped tracing spans via the `CandidateSpan` RAII guard
//! - Emission functions for key lifecycle events: candidate start/finish,
//!   stage scores, verdicts, gate checks, pool exhaustion
//!
//! Events are emitted at `info!` level; degraded paths use `warn!`.

use tracing::{info, warn};

/// RAII guard that enters a candidate-scoped tracing span for the duration
/// of one evaluation pass.
pub struct CandidateSpan {
    _span: tracing::span::EnteredSpan,
}

impl CandidateSpan {
    /// Create and enter a span tagged with the candidate id.
    pub fn enter(candidate_id: &str) -> Self {
        let span = tracing::info_span!("edscout.candidate", candidate = %candidate_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: evaluation of a candidate started.
pub fn emit_candidate_started(candidate_id: &str, topology: &str) {
    info!(event = "candidate.started", candidate = %candidate_id, topology = %topology);
}

/// Emit event: one scoring stage returned.
pub fn emit_stage_scored(candidate_id: &str, category: &str, score: u8) {
    info!(
        event = "stage.scored",
        candidate = %candidate_id,
        category = %category,
        score = score,
    );
}

/// Emit event: judge verdict recorded.
pub fn emit_verdict(candidate_id: &str, total: u8, decision: &str) {
    info!(
        event = "judge.verdict",
        candidate = %candidate_id,
        total = total,
        decision = %decision,
    );
}

/// Emit event: a validation gate was checked.
pub fn emit_gate_checked(candidate_id: &str, gate: &str, passed: bool) {
    info!(
        event = "gate.checked",
        candidate = %candidate_id,
        gate = %gate,
        passed = passed,
    );
}

/// Emit event: the ranked pool ran out of selectable candidates.
pub fn emit_pool_exhausted(evaluated: usize) {
    info!(event = "pool.exhausted", evaluated = evaluated);
}

/// Emit event: the retry loop was cut off by the step ceiling before the
/// pool was exhausted.
pub fn emit_step_ceiling(max_steps: usize) {
    warn!(event = "run.step_ceiling", max_steps = max_steps);
}

/// Emit event: a full workflow run started.
pub fn emit_run_started(run_id: &str, mode: &str, candidates: usize) {
    info!(
        event = "run.started",
        run_id = %run_id,
        mode = %mode,
        candidates = candidates,
    );
}

/// Emit event: a full workflow run finished.
pub fn emit_run_finished(run_id: &str, outcome: &str, duration_ms: u64) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        outcome = %outcome,
        duration_ms = duration_ms,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_span_create() {
        // Just ensure CandidateSpan::enter doesn't panic
        let _span = CandidateSpan::enter("AlphaEd");
    }
}
