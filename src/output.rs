//! Machine-readable export of the final tables.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::evaluator::types::{EvaluationRow, SourceSummaryRow};

/// Combined JSON artifact with both final tables.
#[derive(Serialize)]
pub struct RatingIndex<'a> {
    pub generated_at: DateTime<Utc>,
    pub evaluations: &'a [EvaluationRow],
    pub sources: &'a [SourceSummaryRow],
}

/// Writes the per-(typology, source) evaluation table as CSV.
pub fn write_evaluation_csv(path: &Path, rows: &[EvaluationRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "Evaluation table written");
    Ok(())
}

/// Writes the per-source summary table as CSV.
pub fn write_summary_csv(path: &Path, rows: &[SourceSummaryRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "Summary table written");
    Ok(())
}

/// Writes both tables as one timestamped JSON document.
pub fn write_json_index(
    path: &Path,
    rows: &[EvaluationRow],
    sources: &[SourceSummaryRow],
) -> Result<()> {
    let index = RatingIndex {
        generated_at: Utc::now(),
        evaluations: rows,
        sources,
    };
    std::fs::write(path, serde_json::to_string_pretty(&index)?)?;
    info!(path = %path.display(), "JSON index written");
    Ok(())
}
