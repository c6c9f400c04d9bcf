//! Validation chain: ordered pass/fail gates with short-circuit rejection.
//!
//! Applied to a selected candidate's aggregate record in ranked-retry mode.
//! Gates run in strict declared order; the first failure rejects the
//! candidate and no later gate is invoked. A gate whose own execution fails
//! (collaborator error) counts as a failed gate, never a silent pass.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::collab::GateReviewer;
use crate::domain::record::EvidenceRecord;
use crate::obs;

/// A single named gate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Gate {
    pub name: String,

    /// The pass/fail question handed to the gate reviewer.
    pub description: String,
}

impl Gate {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Outcome of one gate evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateDecision {
    pub gate: String,
    pub passed: bool,

    /// Why the gate resolved the way it did (reviewer verdict or error).
    pub detail: String,
}

/// Terminal result of running a chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChainOutcome {
    /// Every gate passed, in order.
    Cleared(Vec<GateDecision>),

    /// Gate `index` failed; later gates were never invoked.
    RejectedAt {
        index: usize,
        decisions: Vec<GateDecision>,
    },
}

impl ChainOutcome {
    pub fn cleared(&self) -> bool {
        matches!(self, ChainOutcome::Cleared(_))
    }

    pub fn decisions(&self) -> &[GateDecision] {
        match self {
            ChainOutcome::Cleared(d) => d,
            ChainOutcome::RejectedAt { decisions, .. } => decisions,
        }
    }
}

/// An ordered sequence of gates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationChain {
    gates: Vec<Gate>,
}

impl ValidationChain {
    pub fn new(gates: Vec<Gate>) -> Self {
        Self { gates }
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Run the chain over a candidate's aggregate record.
    ///
    /// Gates execute sequentially in declared order. The record itself is
    /// read-only here; each gate sees the same summary.
    pub async fn run(&self, record: &EvidenceRecord, reviewer: &dyn GateReviewer) -> ChainOutcome {
        let candidate = record.candidate_id();
        let summary = summarize(record);
        let mut decisions = Vec::with_capacity(self.gates.len());

        for (index, gate) in self.gates.iter().enumerate() {
            let decision = match reviewer.review(candidate, &summary, &gate.description).await {
                Ok(true) => GateDecision {
                    gate: gate.name.clone(),
                    passed: true,
                    detail: "reviewer approved".to_string(),
                },
                Ok(false) => GateDecision {
                    gate: gate.name.clone(),
                    passed: false,
                    detail: "reviewer rejected".to_string(),
                },
                // Conservative default: a gate that cannot be evaluated fails.
                Err(e) => {
                    warn!(
                        candidate = %candidate,
                        gate = %gate.name,
                        error = %e,
                        "gate evaluation failed, treating as rejection"
                    );
                    GateDecision {
                        gate: gate.name.clone(),
                        passed: false,
                        detail: format!("gate evaluation failed: {e}"),
                    }
                }
            };

            obs::emit_gate_checked(candidate, &decision.gate, decision.passed);
            let passed = decision.passed;
            decisions.push(decision);

            if !passed {
                return ChainOutcome::RejectedAt { index, decisions };
            }
        }

        ChainOutcome::Cleared(decisions)
    }
}

/// Compact plain-text view of a record for gate reviewers.
pub fn summarize(record: &EvidenceRecord) -> String {
    let mut out = format!("candidate: {}\n", record.candidate_id());
    for (category, finding) in record.findings() {
        out.push_str(&format!("{category}: {}/100\n", finding.score));
    }
    if let Some(verdict) = record.verdict() {
        out.push_str(&format!(
            "weighted total: {}/100, decision: {}\n",
            verdict.total, verdict.decision
        ));
    }
    out
}

/// The standard business-fit gate chain applied to the top-ranked candidate.
pub fn default_gates() -> Vec<Gate> {
    vec![
        Gate::new(
            "purpose",
            "The company's primary goal is rapid market-share capture and long-term \
             market dominance, ahead of short-term profitability.",
        ),
        Gate::new(
            "growth_speed",
            "Growth targets and track record substantially exceed the industry average, \
             with credible potential for explosive (10x) growth.",
        ),
        Gate::new(
            "idea",
            "The core technology or service is clearly innovative, differentiated, and \
             hard to imitate.",
        ),
        Gate::new(
            "uncertainty",
            "The venture carries the high market, technology, and customer uncertainty \
             characteristic of a true startup.",
        ),
        Gate::new(
            "funding",
            "Financing is investment-driven (VC or angel), with a history of or credible \
             plan for sizable fundraising.",
        ),
        Gate::new(
            "final_goal",
            "Leadership has a clear exit strategy toward M&A or IPO at a scale investors \
             can expect returns from.",
        ),
    ]
}
