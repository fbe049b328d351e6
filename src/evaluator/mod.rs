//! Sample evaluation and quality scoring.
//!
//! This module scores chunks of raw event records per (typology, data source)
//! pair, folds the per-batch partial tables into one evaluation table,
//! normalizes each dimension, grades it against configured thresholds, and
//! derives per-source quality, diversity, and exclusivity.

pub mod aggregate;
pub mod level;
pub mod normalize;
pub mod quality;
pub mod scorer;
pub mod types;
pub mod utility;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::config::{SourceConfig, TypologyConfig};
use crate::reader::BatchReader;

use self::aggregate::EvaluationAccumulator;
use self::types::{EvaluationRow, SourceSummaryRow};

/// Per-run scalar inputs gathered once from the operator.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationOptions {
    /// Value separator byte for the delimited sample files.
    pub separator: u8,
    /// Period of time the sample refers to, in days.
    pub period_days: f64,
    /// Maximum number of rows handled per batch.
    pub batch_size: usize,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        EvaluationOptions {
            separator: b',',
            period_days: 365.0,
            batch_size: crate::reader::DEFAULT_BATCH_SIZE,
        }
    }
}

/// Final output of a run: the per-(typology, source) evaluation table and
/// the per-source summary table, both ready for rendering.
#[derive(Debug)]
pub struct EvaluationOutcome {
    pub rows: Vec<EvaluationRow>,
    pub sources: Vec<SourceSummaryRow>,
}

/// Runs the whole pipeline over a set of sample files.
///
/// Batches are scored independently and folded into a running accumulator,
/// so memory stays bounded by one batch plus the accumulated table.
/// Normalization, grading, and scoring run strictly after the fold, since
/// typology maxima and per-source totals are only known globally.
pub fn evaluate_sample(
    files: &[PathBuf],
    sources: &SourceConfig,
    typologies: &TypologyConfig,
    opts: &EvaluationOptions,
) -> Result<EvaluationOutcome> {
    let mut acc = EvaluationAccumulator::new();
    let mut batch_count = 0usize;

    for path in files {
        let mut reader = BatchReader::open(path, opts.separator, opts.batch_size)?;
        while let Some(batch) = reader.next_batch()? {
            batch_count += 1;
            debug!(
                file = %path.display(),
                batch = batch_count,
                rows = batch.len(),
                "Scoring batch"
            );
            let partial = scorer::score_batch(&batch, sources, typologies)?;
            acc.absorb(partial);
        }
    }

    let mut rows = acc.finish()?;
    info!(
        pairs = rows.len(),
        batches = batch_count,
        "Aggregation complete"
    );

    normalize::normalize(&mut rows, typologies, opts.period_days)?;
    level::classify(&mut rows, typologies)?;
    quality::score_quality(&mut rows);
    quality::score_exclusivity(&mut rows);
    let summaries = quality::summarize_sources(&rows);

    Ok(EvaluationOutcome {
        rows,
        sources: summaries,
    })
}
