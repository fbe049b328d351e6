//! Quality scoring, exclusivity, and per-source summaries.

use std::collections::{BTreeMap, BTreeSet};

use super::types::{EvaluationRow, Grade, SourceSummaryRow};
use super::utility::{mean, round_to};

/// Number of dimensions that score into the quality mean.
const SCORED_DIMENSIONS: usize = 8;

/// Weighted quality per row: mean of grade weights over the eight scored
/// dimensions. An ungraded dimension contributes zero; with grading run
/// beforehand that never happens.
pub fn score_quality(rows: &mut [EvaluationRow]) {
    for row in rows.iter_mut() {
        let sum: f64 = row
            .grades()
            .iter()
            .map(|g| g.map_or(0.0, Grade::weight))
            .sum();
        row.quality = round_to(sum / SCORED_DIMENSIONS as f64, 3);
    }
}

/// Fills each row's exclusivity: the other sources that also cover the
/// row's typology, comma-joined, empty when the source is the sole
/// provider.
pub fn score_exclusivity(rows: &mut [EvaluationRow]) {
    let mut coverage: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for row in rows.iter() {
        coverage
            .entry(row.typology.clone())
            .or_default()
            .push(row.source.clone());
    }

    for row in rows.iter_mut() {
        let others: Vec<&str> = coverage[&row.typology]
            .iter()
            .filter(|s| *s != &row.source)
            .map(String::as_str)
            .collect();
        row.exclusivity = others.join(", ");
    }
}

/// Aggregates the evaluation table into one summary row per source and
/// ranks them: total, then quality, then diversity, descending, with the
/// source name as the final ascending tie-break.
pub fn summarize_sources(rows: &[EvaluationRow]) -> Vec<SourceSummaryRow> {
    let total_typologies = rows
        .iter()
        .map(|r| r.typology.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let mut by_source: BTreeMap<&str, Vec<&EvaluationRow>> = BTreeMap::new();
    for row in rows {
        by_source.entry(row.source.as_str()).or_default().push(row);
    }

    let mut summaries: Vec<SourceSummaryRow> = by_source
        .into_iter()
        .map(|(source, source_rows)| {
            let first = source_rows[0];
            let qualities: Vec<f64> = source_rows.iter().map(|r| r.quality).collect();
            let quality = round_to(mean(&qualities), 3);
            let diversity = round_to(source_rows.len() as f64 / total_typologies as f64, 3);
            SourceSummaryRow {
                source: source.to_string(),
                source_type: first.source_type.clone(),
                typologies_covered: source_rows.len() as u64,
                obsolescence_rating: first.obsolescence_rating.clone(),
                false_positive_rate: first.false_positive_rate.clone(),
                duplicate_rate: first.duplicate_rate.clone(),
                unit_price: round_to(first.unit_price, 2),
                manual_rating: first.manual_rating.clone(),
                quality,
                diversity,
                total: round_to(quality + diversity, 3),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then(b.quality.total_cmp(&a.quality))
            .then(b.diversity.total_cmp(&a.diversity))
            .then(a.source.cmp(&b.source))
    });
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceAttributes;

    fn attrs() -> SourceAttributes {
        SourceAttributes {
            source_type: "Commercial".into(),
            obsolescence_rating: "Medium".into(),
            false_positive_rate: "0.02".into(),
            duplicate_rate: "0.01".into(),
            frequency: "01:00:00".into(),
            consistency: "High".into(),
            unit_price: 1200.456,
            manual_rating: "8".into(),
        }
    }

    fn graded_row(typology: &str, source: &str, grade: Grade) -> EvaluationRow {
        let mut r = EvaluationRow::new(typology, source, &attrs());
        r.quantity = 1;
        r.quantity_grade = Some(grade);
        r.completeness_grade = Some(grade);
        r.info_level_grade = Some(grade);
        r.truthfulness_grade = Some(grade);
        r.unknown_truthfulness_grade = Some(grade);
        r.frequency_grade = Some(grade);
        r.consistency_grade = Some(grade);
        r.price_grade = Some(grade);
        r
    }

    #[test]
    fn test_quality_extremes() {
        let mut rows = vec![
            graded_row("Bot", "S1", Grade::Good),
            graded_row("Bot", "S2", Grade::Bad),
        ];
        score_quality(&mut rows);
        assert_eq!(rows[0].quality, 1.0);
        assert_eq!(rows[1].quality, -1.0);
    }

    #[test]
    fn test_quality_mixed_grades() {
        let mut row = graded_row("Bot", "S1", Grade::Good);
        row.unknown_truthfulness_grade = Some(Grade::Acceptable);
        row.price_grade = Some(Grade::Bad);
        let mut rows = vec![row];
        score_quality(&mut rows);
        // 6*1 + 0.5 - 1 = 5.5 over 8
        assert_eq!(rows[0].quality, 0.688);
    }

    #[test]
    fn test_quality_within_bounds() {
        for grade in [Grade::Bad, Grade::Acceptable, Grade::Good] {
            let mut rows = vec![graded_row("Bot", "S1", grade)];
            score_quality(&mut rows);
            assert!(rows[0].quality >= -1.0 && rows[0].quality <= 1.0);
        }
    }

    #[test]
    fn test_exclusivity_lists_co_coverage() {
        let mut rows = vec![
            graded_row("Bot", "S1", Grade::Good),
            graded_row("Bot", "S2", Grade::Good),
            graded_row("Bot", "S3", Grade::Good),
            graded_row("Malware", "S1", Grade::Good),
        ];
        score_exclusivity(&mut rows);

        assert_eq!(rows[0].exclusivity, "S2, S3");
        assert_eq!(rows[1].exclusivity, "S1, S3");
        assert_eq!(rows[2].exclusivity, "S1, S2");
        // Sole provider of Malware.
        assert_eq!(rows[3].exclusivity, "");
    }

    #[test]
    fn test_exclusivity_is_symmetric() {
        let mut rows = vec![
            graded_row("Bot", "S1", Grade::Good),
            graded_row("Bot", "S2", Grade::Good),
        ];
        score_exclusivity(&mut rows);
        assert!(rows[0].exclusivity.contains("S2"));
        assert!(rows[1].exclusivity.contains("S1"));
    }

    #[test]
    fn test_summary_diversity_and_total() {
        let mut rows = vec![
            graded_row("Bot", "S1", Grade::Good),
            graded_row("Malware", "S1", Grade::Good),
            graded_row("Bot", "S2", Grade::Bad),
        ];
        score_quality(&mut rows);
        let summaries = summarize_sources(&rows);

        let s1 = summaries.iter().find(|s| s.source == "S1").unwrap();
        assert_eq!(s1.typologies_covered, 2);
        assert_eq!(s1.quality, 1.0);
        assert_eq!(s1.diversity, 1.0);
        assert_eq!(s1.total, 2.0);
        assert_eq!(s1.unit_price, 1200.46);

        let s2 = summaries.iter().find(|s| s.source == "S2").unwrap();
        assert_eq!(s2.diversity, 0.5);
        assert!(s2.diversity > 0.0 && s2.diversity <= 1.0);
    }

    #[test]
    fn test_ranking_orders_by_total_then_name() {
        let mut rows = vec![
            graded_row("Bot", "Beta", Grade::Good),
            graded_row("Bot", "Alpha", Grade::Good),
            graded_row("Bot", "Gamma", Grade::Bad),
        ];
        score_quality(&mut rows);
        let summaries = summarize_sources(&rows);

        let order: Vec<&str> = summaries.iter().map(|s| s.source.as_str()).collect();
        // Alpha and Beta tie on every score; the name breaks the tie.
        assert_eq!(order, vec!["Alpha", "Beta", "Gamma"]);
    }
}
