//! Normalization of the aggregated evaluation table.
//!
//! Pure passes over the full table only: typology maxima and per-source
//! totals are global, so nothing here can run on a partial batch. A zero
//! divisor yields `None` instead of infinity; the classifier grades those
//! as Bad.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::config::TypologyConfig;

use super::types::EvaluationRow;
use super::utility::round_to;

fn ratio(numerator: f64, denominator: f64, decimals: u32) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(round_to(numerator / denominator, decimals))
    }
}

/// Populates every normalized field of the table, in dependency order.
pub fn normalize(
    rows: &mut [EvaluationRow],
    typologies: &TypologyConfig,
    period_days: f64,
) -> Result<()> {
    // Information level first: cells per record, before the per-field pass.
    for row in rows.iter_mut() {
        row.info_level = ratio(row.info_cell_count as f64, row.quantity as f64, 3);
    }

    // Largest quantity any single source contributes per typology.
    let mut typology_max: BTreeMap<&str, u64> = BTreeMap::new();
    for row in rows.iter() {
        let max = typology_max.entry(row.typology.as_str()).or_insert(0);
        *max = (*max).max(row.quantity);
    }
    let typology_max: BTreeMap<String, u64> = typology_max
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

    // Total quantity each source contributes across all its typologies;
    // price per record is tied to the source's whole volume.
    let mut source_total: BTreeMap<String, u64> = BTreeMap::new();
    for row in rows.iter() {
        *source_total.entry(row.source.clone()).or_insert(0) += row.quantity;
    }

    for row in rows.iter_mut() {
        let quantity = row.quantity as f64;

        row.quantity_normalized = ratio(quantity, typology_max[&row.typology] as f64, 3);
        row.completeness_normalized = ratio(row.completeness_count as f64, quantity, 3);
        row.info_level_normalized = row
            .info_level
            .and_then(|level| ratio(level, row.mandatory_field_count as f64, 3));
        row.truthful_normalized = ratio(row.truthful_count as f64, quantity, 3);
        row.unknown_truthfulness_normalized =
            ratio(row.unknown_truthfulness_count as f64, quantity, 3);
        row.severity_high_normalized = ratio(row.severity_high as f64, quantity, 3);
        row.severity_medium_normalized = ratio(row.severity_medium as f64, quantity, 3);
        row.severity_low_normalized = ratio(row.severity_low as f64, quantity, 3);
        row.severity_unknown_normalized = ratio(row.severity_unknown as f64, quantity, 3);

        let total = source_total[&row.source] as f64;
        row.price_per_record = ratio(row.unit_price * period_days, total * 365.0, 6);

        let reference = typologies.get_f64(&row.typology, "price_per_record_reference")?;
        row.price_per_record_normalized = row
            .price_per_record
            .and_then(|price| ratio(price, reference, 6));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceAttributes;

    fn attrs(unit_price: f64) -> SourceAttributes {
        SourceAttributes {
            source_type: "Commercial".into(),
            obsolescence_rating: "Medium".into(),
            false_positive_rate: "0.02".into(),
            duplicate_rate: "0.01".into(),
            frequency: "01:00:00".into(),
            consistency: "High".into(),
            unit_price,
            manual_rating: "8".into(),
        }
    }

    fn typologies(reference_price: &str) -> TypologyConfig {
        TypologyConfig::from_toml_str(&format!(
            "[default]\nprice_per_record_reference = \"{reference_price}\"\n"
        ))
        .unwrap()
    }

    fn row(typology: &str, source: &str, quantity: u64, unit_price: f64) -> EvaluationRow {
        let mut r = EvaluationRow::new(typology, source, &attrs(unit_price));
        r.quantity = quantity;
        r.mandatory_field_count = 2;
        r
    }

    #[test]
    fn test_quantity_and_completeness_scenario() {
        // Typology "Bot" from S1 (400 records, 380 complete) and
        // S2 (100 records, 50 complete); typology max quantity is 400.
        let mut s1 = row("Bot", "S1", 400, 1000.0);
        s1.completeness_count = 380;
        let mut s2 = row("Bot", "S2", 100, 1000.0);
        s2.completeness_count = 50;
        let mut rows = vec![s1, s2];

        normalize(&mut rows, &typologies("0.5"), 365.0).unwrap();

        assert_eq!(rows[0].quantity_normalized, Some(1.0));
        assert_eq!(rows[1].quantity_normalized, Some(0.25));
        assert_eq!(rows[0].completeness_normalized, Some(0.95));
        assert_eq!(rows[1].completeness_normalized, Some(0.5));
    }

    #[test]
    fn test_info_level_two_stage_division() {
        let mut r = row("Bot", "S1", 4, 1000.0);
        r.info_cell_count = 6; // 6 non-null cells over 4 records, 2 fields
        let mut rows = vec![r];

        normalize(&mut rows, &typologies("0.5"), 365.0).unwrap();

        assert_eq!(rows[0].info_level, Some(1.5));
        assert_eq!(rows[0].info_level_normalized, Some(0.75));
    }

    #[test]
    fn test_price_uses_source_total_across_typologies() {
        // S1 contributes 400 Bot + 100 Malware records; price per record
        // divides by the whole 500, not the per-typology count.
        let mut rows = vec![
            row("Bot", "S1", 400, 730.0),
            row("Malware", "S1", 100, 730.0),
        ];

        normalize(&mut rows, &typologies("0.5"), 365.0).unwrap();

        // 730 * 365 / (500 * 365) = 1.46
        assert_eq!(rows[0].price_per_record, Some(1.46));
        assert_eq!(rows[1].price_per_record, Some(1.46));
        assert_eq!(rows[0].price_per_record_normalized, Some(2.92));
    }

    #[test]
    fn test_period_scales_price() {
        let mut rows = vec![row("Bot", "S1", 100, 365.0)];
        normalize(&mut rows, &typologies("1"), 36.5).unwrap();
        // 365 * 36.5 / (100 * 365) = 0.365
        assert_eq!(rows[0].price_per_record, Some(0.365));
    }

    #[test]
    fn test_zero_reference_price_yields_none() {
        let mut rows = vec![row("Bot", "S1", 100, 1000.0)];
        normalize(&mut rows, &typologies("0"), 365.0).unwrap();
        assert!(rows[0].price_per_record.is_some());
        assert_eq!(rows[0].price_per_record_normalized, None);
    }

    #[test]
    fn test_zero_quantity_yields_none_not_infinity() {
        let mut rows = vec![row("Bot", "S1", 0, 1000.0)];
        normalize(&mut rows, &typologies("0.5"), 365.0).unwrap();
        assert_eq!(rows[0].completeness_normalized, None);
        assert_eq!(rows[0].info_level, None);
        assert_eq!(rows[0].price_per_record, None);
    }

    #[test]
    fn test_missing_reference_key_is_fatal() {
        let cfg = TypologyConfig::from_toml_str("[default]\n").unwrap();
        let mut rows = vec![row("Bot", "S1", 100, 1000.0)];
        assert!(normalize(&mut rows, &cfg, 365.0).is_err());
    }
}
