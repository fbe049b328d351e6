//! Per-batch dimension scoring.
//!
//! Produces one partial [`EvaluationRow`] per distinct (typology, source)
//! pair present in a batch. Raw counters only; normalization and grading
//! need global knowledge and run after the fold.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{Context, Result, bail};
use tracing::warn;

use crate::config::{SourceConfig, TypologyConfig};
use crate::reader::{FIELD_FIABILITY, FIELD_SEVERITY, FIELD_SOURCE, FIELD_TYPOLOGY, RecordBatch};

use super::types::EvaluationRow;
use super::utility::fold_diacritics;

/// Mandatory-field layout and truthfulness reference for one typology,
/// resolved once per batch.
struct TypologyContext {
    mandatory_cols: Vec<usize>,
    truthfulness_reference: f64,
}

/// Standardizes a raw fiability or severity cell into the three-tier domain.
///
/// Null or non-numeric cells become the unknown sentinel 1. Numeric values
/// at or below 1 are kept as-is so a genuinely low reading still counts as
/// unknown. Above that: (1, 4] -> 3, (4, 8) -> 6, [8, ..) -> 9.
pub fn recode_tier(raw: Option<&str>) -> f64 {
    let value = raw
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|x| !x.is_nan());
    match value {
        None => 1.0,
        Some(x) if x <= 1.0 => x,
        Some(x) if x <= 4.0 => 3.0,
        Some(x) if x < 8.0 => 6.0,
        Some(_) => 9.0,
    }
}

/// Scores one batch into a partial evaluation table.
///
/// Pairs whose source is missing from the source configuration are skipped
/// with a warning. A batch in which no pair resolves at all is fatal: the
/// configuration does not cover the sample.
pub fn score_batch(
    batch: &RecordBatch,
    sources: &SourceConfig,
    typologies: &TypologyConfig,
) -> Result<Vec<EvaluationRow>> {
    let col = |name: &str| -> Result<usize> {
        batch.column_index(name).with_context(|| {
            format!("settings are not valid for data sample: column '{name}' not present")
        })
    };
    let typology_col = col(FIELD_TYPOLOGY)?;
    let source_col = col(FIELD_SOURCE)?;
    let fiability_col = col(FIELD_FIABILITY)?;
    let severity_col = col(FIELD_SEVERITY)?;

    // Distinct (typology, source) pairs present in this batch.
    let mut pairs: BTreeSet<(String, String)> = BTreeSet::new();
    for i in 0..batch.len() {
        if let (Some(typology), Some(source)) =
            (batch.cell(i, typology_col), batch.cell(i, source_col))
        {
            pairs.insert((typology.to_string(), source.to_string()));
        }
    }

    let mut rows: BTreeMap<(String, String), EvaluationRow> = BTreeMap::new();
    for (typology, source) in &pairs {
        match sources.resolve(source) {
            Ok(attrs) => {
                rows.insert(
                    (typology.clone(), source.clone()),
                    EvaluationRow::new(typology, source, &attrs),
                );
            }
            Err(e) => {
                warn!(source = %source, error = %e, "Data source configuration could not be loaded, pair skipped");
            }
        }
    }

    if rows.is_empty() {
        bail!("settings are not valid for data sample: no configured data source present");
    }

    // Mandatory-field columns and truthfulness reference, per typology.
    let mut contexts: HashMap<String, TypologyContext> = HashMap::new();
    for (typology, _) in rows.keys() {
        if contexts.contains_key(typology) {
            continue;
        }
        let fields = typologies.mandatory_fields(typology)?;
        let mut mandatory_cols = Vec::with_capacity(fields.len());
        for field in &fields {
            let idx = batch.column_index(field).with_context(|| {
                format!(
                    "settings are not valid for data sample: mandatory field '{field}' of typology '{typology}' not present"
                )
            })?;
            mandatory_cols.push(idx);
        }
        let truthfulness_reference = typologies.get_f64(typology, "truthfulness_reference")?;
        contexts.insert(
            typology.clone(),
            TypologyContext {
                mandatory_cols,
                truthfulness_reference,
            },
        );
    }

    // Single pass over the batch accumulating every dimension counter.
    for i in 0..batch.len() {
        let (Some(typology), Some(source)) =
            (batch.cell(i, typology_col), batch.cell(i, source_col))
        else {
            continue;
        };
        let Some(row) = rows.get_mut(&(typology.to_string(), source.to_string())) else {
            continue; // source skipped above
        };
        let ctx = &contexts[typology];

        let fiability = recode_tier(batch.cell(i, fiability_col));
        let severity = recode_tier(batch.cell(i, severity_col));

        row.quantity += 1;

        let present = ctx
            .mandatory_cols
            .iter()
            .filter(|&&c| batch.cell(i, c).is_some())
            .count() as u64;
        row.info_cell_count += present;
        if present == ctx.mandatory_cols.len() as u64 {
            row.completeness_count += 1;
        }

        if fiability >= ctx.truthfulness_reference {
            row.truthful_count += 1;
        }
        if fiability <= 1.0 {
            row.unknown_truthfulness_count += 1;
        }

        if severity >= 8.0 {
            row.severity_high += 1;
        } else if severity >= 5.0 {
            row.severity_medium += 1;
        } else if severity >= 2.0 {
            row.severity_low += 1;
        } else {
            row.severity_unknown += 1;
        }
    }

    let mut partial: Vec<EvaluationRow> = rows
        .into_values()
        .map(|mut row| {
            row.mandatory_field_count = contexts[&row.typology].mandatory_cols.len() as u64;
            row.typology = fold_diacritics(&row.typology);
            row
        })
        .collect();
    partial.sort_by(|a, b| (&a.typology, &a.source).cmp(&(&b.typology, &b.source)));

    Ok(partial)
}
