//! Ranked candidate pool and cursor-based selection.
//!
//! Built once per run after the bulk screening pass. Entries are
//! stable-sorted by total score descending (ties keep insertion order) and
//! are never re-scored or removed: errored entries stay in the pool for the
//! audit artifact and are simply skipped by selection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::record::{Category, EvidenceRecord};

/// One evaluated candidate in the pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolEntry {
    pub candidate_id: String,

    /// Weighted total from the judge, or 0 for errored entries.
    pub total_score: u8,

    pub category_scores: BTreeMap<Category, u8>,

    /// Present when screening failed for this candidate. Errored entries
    /// are kept for audit but never selected.
    pub error: Option<String>,
}

impl PoolEntry {
    /// Build an entry from a judged record.
    pub fn from_record(record: &EvidenceRecord) -> Self {
        Self {
            candidate_id: record.candidate_id().to_string(),
            total_score: record.verdict().map(|v| v.total).unwrap_or(0),
            category_scores: record.scores(),
            error: None,
        }
    }

    /// Build an error-flagged entry for a candidate that could not be
    /// screened. Scored 0 and skippable, but retained in the pool.
    pub fn failed(candidate_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            total_score: 0,
            category_scores: BTreeMap::new(),
            error: Some(reason.into()),
        }
    }

    /// Whether the selector may yield this entry.
    pub fn is_selectable(&self) -> bool {
        self.error.is_none() && self.total_score > 0
    }
}

/// Candidates ordered by total score descending, consumed via a cursor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedPool {
    entries: Vec<PoolEntry>,
    cursor: usize,
}

impl RankedPool {
    /// Rank a set of entries. Stable sort: ties keep insertion order.
    pub fn rank(mut entries: Vec<PoolEntry>) -> Self {
        entries.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        Self { entries, cursor: 0 }
    }

    /// Advance the cursor to the next selectable entry, skipping errored
    /// and zero-score entries without evaluating them.
    ///
    /// `None` means the pool is exhausted: the normal terminal condition
    /// for the retry loop, not an error.
    pub fn select_next(&mut self) -> Option<&PoolEntry> {
        while self.cursor < self.entries.len() {
            let index = self.cursor;
            self.cursor += 1;
            if self.entries[index].is_selectable() {
                return Some(&self.entries[index]);
            }
        }
        None
    }

    /// All entries in ranked order, including errored ones.
    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, total: u8) -> PoolEntry {
        PoolEntry {
            candidate_id: id.to_string(),
            total_score: total,
            category_scores: BTreeMap::new(),
            error: None,
        }
    }

    #[test]
    fn ranking_sorts_by_total_descending() {
        let pool = RankedPool::rank(vec![entry("B", 85), entry("C", 90), entry("A", 70)]);
        let order: Vec<&str> = pool
            .entries()
            .iter()
            .map(|e| e.candidate_id.as_str())
            .collect();
        assert_eq!(order, ["C", "B", "A"]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let pool = RankedPool::rank(vec![
            entry("first", 80),
            entry("second", 80),
            entry("third", 80),
        ]);
        let order: Vec<&str> = pool
            .entries()
            .iter()
            .map(|e| e.candidate_id.as_str())
            .collect();
        assert_eq!(order, ["first", "second", "third"]);
    }

    #[test]
    fn selector_skips_errored_and_exhausts() {
        // [("A", 0, error), ("B", 85), ("C", 90)] ranks to [C, B, A];
        // selection yields C, then B, then None.
        let mut pool = RankedPool::rank(vec![
            PoolEntry::failed("A", "context retrieval failed"),
            entry("B", 85),
            entry("C", 90),
        ]);

        assert_eq!(pool.select_next().unwrap().candidate_id, "C");
        assert_eq!(pool.select_next().unwrap().candidate_id, "B");
        assert!(pool.select_next().is_none());
        assert!(pool.select_next().is_none(), "exhaustion is sticky");
    }

    #[test]
    fn zero_score_entries_are_skipped() {
        let mut pool = RankedPool::rank(vec![entry("Z", 0), entry("B", 40)]);
        assert_eq!(pool.select_next().unwrap().candidate_id, "B");
        assert!(pool.select_next().is_none());
    }

    #[test]
    fn errored_entries_are_retained_for_audit() {
        let pool = RankedPool::rank(vec![PoolEntry::failed("A", "boom"), entry("B", 50)]);
        assert_eq!(pool.len(), 2);
        assert!(pool.entries()[1].error.is_some());
        assert_eq!(pool.entries()[1].total_score, 0);
    }
}
