//! Persisted artifacts: the ranked evaluation table and report files.
//!
//! The ranked table is the canonical audit output of a full-pool screening
//! pass: one row per evaluated candidate, sorted by total score descending,
//! with errored candidates retained. JSON is the storage format; CSV is an
//! export view of the same rows.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::record::{Category, EvidenceRecord};
use crate::pool::RankedPool;

/// Schema version written into every ranked-table artifact.
pub const RANKED_TABLE_SCHEMA_VERSION: &str = "1.0";

/// One row of the ranked table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedRow {
    pub candidate_id: String,
    pub total_score: u8,
    pub category_scores: BTreeMap<Category, u8>,

    /// Screening failure reason, if any. Errored rows are kept for audit.
    pub error: Option<String>,
}

/// Canonical ranked evaluation table, persisted once per screening pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedTableArtifact {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,

    /// Rows in ranked order (total score descending, ties stable).
    pub rows: Vec<RankedRow>,
}

impl RankedTableArtifact {
    /// Snapshot a ranked pool into an artifact, preserving pool order.
    pub fn from_pool(pool: &RankedPool) -> Self {
        Self {
            schema_version: RANKED_TABLE_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            rows: pool
                .entries()
                .iter()
                .map(|entry| RankedRow {
                    candidate_id: entry.candidate_id.clone(),
                    total_score: entry.total_score,
                    category_scores: entry.category_scores.clone(),
                    error: entry.error.clone(),
                })
                .collect(),
        }
    }
}

/// Write the ranked table in pretty JSON format.
pub fn write_ranked_table_json(path: &Path, artifact: &RankedTableArtifact) -> Result<()> {
    let content = serde_json::to_string_pretty(artifact).context("serialize ranked table")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Load a previously written ranked table.
pub fn load_ranked_table_json(path: &Path) -> Result<RankedTableArtifact> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
    serde_json::from_str(&content).context("parse ranked table")
}

/// Render the ranked table as CSV for spreadsheet export.
///
/// Columns: candidate, total, one column per category in canonical order,
/// then the error flag. Row order matches the artifact.
pub fn render_ranked_table_csv(artifact: &RankedTableArtifact) -> String {
    let mut out = String::from("candidate_id,total_score");
    for category in Category::ALL {
        out.push(',');
        out.push_str(category.name());
    }
    out.push_str(",error\n");

    for row in &artifact.rows {
        out.push_str(&csv_field(&row.candidate_id));
        out.push_str(&format!(",{}", row.total_score));
        for category in Category::ALL {
            match row.category_scores.get(&category) {
                Some(score) => out.push_str(&format!(",{score}")),
                None => out.push(','),
            }
        }
        out.push(',');
        if let Some(error) = &row.error {
            out.push_str(&csv_field(error));
        }
        out.push('\n');
    }
    out
}

/// Write the CSV export next to callers' chosen path.
pub fn write_ranked_table_csv(path: &Path, artifact: &RankedTableArtifact) -> Result<()> {
    std::fs::write(path, render_ranked_table_csv(artifact))
        .with_context(|| format!("write {:?}", path))?;
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Persist a rendered report as a timestamped markdown file under `dir`.
///
/// Returns the written path. Creates `dir` if needed.
pub fn write_report_md(dir: &Path, record: &EvidenceRecord, text: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("create report dir {:?}", dir))?;

    let filename = format!(
        "{}_evaluation_{}.md",
        sanitize_filename(record.candidate_id()),
        Utc::now().format("%Y%m%d_%H%M%S"),
    );
    let path = dir.join(filename);
    std::fs::write(&path, text).with_context(|| format!("write report {:?}", path))?;
    Ok(path)
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolEntry;

    fn artifact() -> RankedTableArtifact {
        let pool = RankedPool::rank(vec![
            PoolEntry {
                candidate_id: "AlphaEd".to_string(),
                total_score: 77,
                category_scores: [(Category::Technology, 80), (Category::Market, 85)]
                    .into_iter()
                    .collect(),
                error: None,
            },
            PoolEntry::failed("Beta, Inc".to_string(), "context retrieval failed"),
            PoolEntry {
                candidate_id: "Gamma".to_string(),
                total_score: 90,
                category_scores: BTreeMap::new(),
                error: None,
            },
        ]);
        RankedTableArtifact::from_pool(&pool)
    }

    #[test]
    fn artifact_preserves_ranked_order() {
        let a = artifact();
        let order: Vec<&str> = a.rows.iter().map(|r| r.candidate_id.as_str()).collect();
        assert_eq!(order, ["Gamma", "AlphaEd", "Beta, Inc"]);
        assert_eq!(a.schema_version, RANKED_TABLE_SCHEMA_VERSION);
    }

    #[test]
    fn json_round_trip_preserves_rows_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranked.json");

        let original = artifact();
        write_ranked_table_json(&path, &original).unwrap();
        let loaded = load_ranked_table_json(&path).unwrap();

        assert_eq!(loaded.rows, original.rows);
        assert_eq!(loaded.schema_version, original.schema_version);
    }

    #[test]
    fn csv_render_quotes_and_orders_columns() {
        let csv = render_ranked_table_csv(&artifact());
        let mut lines = csv.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("candidate_id,total_score,technology,"));
        assert!(header.ends_with(",error"));

        let first = lines.next().unwrap();
        assert!(first.starts_with("Gamma,90,"));

        // Comma in the candidate name gets quoted.
        let errored = csv
            .lines()
            .find(|l| l.contains("Beta"))
            .expect("errored row present");
        assert!(errored.starts_with("\"Beta, Inc\",0,"));
        assert!(errored.ends_with("context retrieval failed"));
    }

    #[test]
    fn csv_file_matches_rendered_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranked.csv");

        let a = artifact();
        write_ranked_table_csv(&path, &a).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_ranked_table_csv(&a));
        assert!(written.starts_with("candidate_id,total_score,"));
    }

    #[test]
    fn report_file_lands_in_dir_with_sanitized_name() {
        let dir = tempfile::tempdir().unwrap();
        let record = EvidenceRecord::new("Alpha/Ed Labs");

        let path = write_report_md(dir.path(), &record, "# report").unwrap();
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("Alpha_Ed_Labs_evaluation_"));
        assert!(name.ends_with(".md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# report");
    }
}
