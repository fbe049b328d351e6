//! Fold of per-batch partial tables into the canonical evaluation table.

use std::collections::BTreeMap;

use anyhow::{Result, bail};

use super::types::EvaluationRow;

/// Running accumulator keyed by (typology, source).
///
/// Additive counters sum; static attributes are kept from the first
/// occurrence of a key, since they are constant per pair. Absorbing is
/// commutative and associative over the additive fields, so any batch or
/// file partition of the sample folds to the same table.
#[derive(Debug, Default)]
pub struct EvaluationAccumulator {
    rows: BTreeMap<(String, String), EvaluationRow>,
}

impl EvaluationAccumulator {
    pub fn new() -> Self {
        EvaluationAccumulator::default()
    }

    /// Folds one partial table into the accumulator.
    pub fn absorb(&mut self, partial: Vec<EvaluationRow>) {
        for row in partial {
            let key = (row.typology.clone(), row.source.clone());
            match self.rows.get_mut(&key) {
                Some(acc) => {
                    acc.quantity += row.quantity;
                    acc.completeness_count += row.completeness_count;
                    acc.info_cell_count += row.info_cell_count;
                    acc.truthful_count += row.truthful_count;
                    acc.unknown_truthfulness_count += row.unknown_truthfulness_count;
                    acc.severity_high += row.severity_high;
                    acc.severity_medium += row.severity_medium;
                    acc.severity_low += row.severity_low;
                    acc.severity_unknown += row.severity_unknown;
                    // Constant per typology; overwritten, never summed.
                    acc.mandatory_field_count = row.mandatory_field_count;
                }
                None => {
                    self.rows.insert(key, row);
                }
            }
        }
    }

    /// Consumes the accumulator and returns the table sorted by
    /// (typology, source). An empty table is fatal: no recognizable source
    /// appeared in the whole sample.
    pub fn finish(self) -> Result<Vec<EvaluationRow>> {
        if self.rows.is_empty() {
            bail!("no configured data source was found in the whole sample");
        }
        Ok(self.rows.into_values().collect())
    }
}
