//! Threshold classification of normalized dimensions into grades.
//!
//! Each graded dimension compares against two thresholds from the typology
//! configuration, `<dimension>_desired` and `<dimension>_minimum`. A missing
//! threshold is a configuration-completeness error and aborts the run.

use std::str::FromStr;

use anyhow::{Context, Result, anyhow};

use crate::config::TypologyConfig;

use super::types::{Consistency, EvaluationRow, Grade};

/// Converts an `hh:mm:ss` duration string to seconds.
///
/// Keeps the historical arithmetic `h*3600 + m*60 + h`: the hours field is
/// added where the seconds field belongs. Every compared duration goes
/// through the same conversion; published ratings depend on the literal
/// values.
pub fn duration_seconds(value: &str) -> Result<i64> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    if parts.len() < 2 {
        return Err(anyhow!("'{value}' is not an hh:mm:ss duration"));
    }
    let field = |i: usize| -> Result<i64> {
        parts[i]
            .parse()
            .with_context(|| format!("'{value}' is not an hh:mm:ss duration"))
    };
    let hours = field(0)?;
    let minutes = field(1)?;
    Ok(hours * 3600 + minutes * 60 + hours)
}

/// Higher is better: Good at or above desired, Acceptable at or above
/// minimum, Bad below (or undefined).
fn grade_higher(value: Option<f64>, desired: f64, minimum: f64) -> Grade {
    match value {
        Some(v) if v >= desired => Grade::Good,
        Some(v) if v >= minimum => Grade::Acceptable,
        _ => Grade::Bad,
    }
}

/// Lower is better: Good at or below desired, Acceptable at or below
/// minimum, Bad above (or undefined).
fn grade_lower(value: Option<f64>, desired: f64, minimum: f64) -> Grade {
    match value {
        Some(v) if v <= desired => Grade::Good,
        Some(v) if v <= minimum => Grade::Acceptable,
        _ => Grade::Bad,
    }
}

fn parse_consistency(raw: &str) -> Result<Consistency> {
    Consistency::from_str(raw).map_err(|e| anyhow!(e))
}

/// Grades every scored dimension of every row.
pub fn classify(rows: &mut [EvaluationRow], typologies: &TypologyConfig) -> Result<()> {
    for row in rows.iter_mut() {
        let typology = row.typology.clone();
        let thresholds = |dimension: &str| -> Result<(f64, f64)> {
            let desired = typologies.get_f64(&typology, &format!("{dimension}_desired"))?;
            let minimum = typologies.get_f64(&typology, &format!("{dimension}_minimum"))?;
            Ok((desired, minimum))
        };

        let (desired, minimum) = thresholds("quantity")?;
        row.quantity_grade = Some(grade_higher(row.quantity_normalized, desired, minimum));

        let (desired, minimum) = thresholds("completeness")?;
        row.completeness_grade = Some(grade_higher(row.completeness_normalized, desired, minimum));

        let (desired, minimum) = thresholds("info_level")?;
        row.info_level_grade = Some(grade_higher(row.info_level_normalized, desired, minimum));

        let (desired, minimum) = thresholds("truthfulness")?;
        row.truthfulness_grade = Some(grade_higher(row.truthful_normalized, desired, minimum));

        let (desired, minimum) = thresholds("unknown_truthfulness")?;
        row.unknown_truthfulness_grade = Some(grade_lower(
            row.unknown_truthfulness_normalized,
            desired,
            minimum,
        ));

        let observed = duration_seconds(&row.frequency)?;
        let desired = duration_seconds(typologies.get(&typology, "frequency_desired")?)?;
        let minimum = duration_seconds(typologies.get(&typology, "frequency_minimum")?)?;
        row.frequency_grade = Some(grade_lower(
            Some(observed as f64),
            desired as f64,
            minimum as f64,
        ));

        let observed = parse_consistency(&row.consistency)?.ordinal() as f64;
        let desired = parse_consistency(typologies.get(&typology, "consistency_desired")?)?;
        let minimum = parse_consistency(typologies.get(&typology, "consistency_minimum")?)?;
        row.consistency_grade = Some(grade_higher(
            Some(observed),
            desired.ordinal() as f64,
            minimum.ordinal() as f64,
        ));

        let (desired, minimum) = thresholds("price_per_record")?;
        row.price_grade = Some(grade_lower(
            row.price_per_record_normalized,
            desired,
            minimum,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceAttributes;

    #[test]
    fn test_duration_seconds_pinned_formula() {
        // The hours field is re-added in place of seconds; one hour is 3601.
        assert_eq!(duration_seconds("01:00:00").unwrap(), 3601);
        assert_eq!(duration_seconds("01:30:45").unwrap(), 5401);
        assert_eq!(duration_seconds("00:05:00").unwrap(), 300);
        assert_eq!(duration_seconds("24:00:00").unwrap(), 86424);
    }

    #[test]
    fn test_duration_seconds_rejects_garbage() {
        assert!(duration_seconds("daily").is_err());
        assert!(duration_seconds("1h30m").is_err());
    }

    #[test]
    fn test_grade_higher_boundaries() {
        assert_eq!(grade_higher(Some(0.9), 0.8, 0.5), Grade::Good);
        assert_eq!(grade_higher(Some(0.8), 0.8, 0.5), Grade::Good);
        assert_eq!(grade_higher(Some(0.79), 0.8, 0.5), Grade::Acceptable);
        assert_eq!(grade_higher(Some(0.5), 0.8, 0.5), Grade::Acceptable);
        assert_eq!(grade_higher(Some(0.49), 0.8, 0.5), Grade::Bad);
        assert_eq!(grade_higher(None, 0.8, 0.5), Grade::Bad);
    }

    #[test]
    fn test_grade_lower_boundaries() {
        assert_eq!(grade_lower(Some(0.1), 0.2, 0.5), Grade::Good);
        assert_eq!(grade_lower(Some(0.2), 0.2, 0.5), Grade::Good);
        assert_eq!(grade_lower(Some(0.3), 0.2, 0.5), Grade::Acceptable);
        assert_eq!(grade_lower(Some(0.5), 0.2, 0.5), Grade::Acceptable);
        assert_eq!(grade_lower(Some(0.51), 0.2, 0.5), Grade::Bad);
        assert_eq!(grade_lower(None, 0.2, 0.5), Grade::Bad);
    }

    fn full_typology_config() -> TypologyConfig {
        TypologyConfig::from_toml_str(
            r#"
[default]
quantity_desired = 0.8
quantity_minimum = 0.5
completeness_desired = 0.9
completeness_minimum = 0.6
info_level_desired = 0.8
info_level_minimum = 0.5
truthfulness_desired = 0.7
truthfulness_minimum = 0.4
unknown_truthfulness_desired = 0.1
unknown_truthfulness_minimum = 0.3
frequency_desired = "01:00:00"
frequency_minimum = "24:00:00"
consistency_desired = "High"
consistency_minimum = "Medium"
price_per_record_desired = 0.5
price_per_record_minimum = 1.0
"#,
        )
        .unwrap()
    }

    fn row() -> EvaluationRow {
        let attrs = SourceAttributes {
            source_type: "Commercial".into(),
            obsolescence_rating: "Medium".into(),
            false_positive_rate: "0.02".into(),
            duplicate_rate: "0.01".into(),
            frequency: "00:30:00".into(),
            consistency: "Very High".into(),
            unit_price: 1000.0,
            manual_rating: "8".into(),
        };
        let mut r = EvaluationRow::new("Bot", "S1", &attrs);
        r.quantity = 100;
        r.quantity_normalized = Some(1.0);
        r.completeness_normalized = Some(0.7);
        r.info_level_normalized = Some(0.4);
        r.truthful_normalized = Some(0.9);
        r.unknown_truthfulness_normalized = Some(0.2);
        r.price_per_record_normalized = Some(2.0);
        r
    }

    #[test]
    fn test_classify_grades_every_dimension() {
        let mut rows = vec![row()];
        classify(&mut rows, &full_typology_config()).unwrap();

        let r = &rows[0];
        assert_eq!(r.quantity_grade, Some(Grade::Good));
        assert_eq!(r.completeness_grade, Some(Grade::Acceptable));
        assert_eq!(r.info_level_grade, Some(Grade::Bad));
        assert_eq!(r.truthfulness_grade, Some(Grade::Good));
        assert_eq!(r.unknown_truthfulness_grade, Some(Grade::Acceptable));
        // 30 minutes beats the desired hourly cadence
        assert_eq!(r.frequency_grade, Some(Grade::Good));
        assert_eq!(r.consistency_grade, Some(Grade::Good));
        assert_eq!(r.price_grade, Some(Grade::Bad));

        // Totality: every graded dimension carries a grade.
        assert!(r.grades().iter().all(|g| g.is_some()));
    }

    #[test]
    fn test_undefined_normalized_value_grades_bad() {
        let mut r = row();
        r.completeness_normalized = None;
        r.price_per_record_normalized = None;
        let mut rows = vec![r];
        classify(&mut rows, &full_typology_config()).unwrap();

        assert_eq!(rows[0].completeness_grade, Some(Grade::Bad));
        assert_eq!(rows[0].price_grade, Some(Grade::Bad));
    }

    #[test]
    fn test_unknown_consistency_rating_is_fatal() {
        let mut r = row();
        r.consistency = "Excellent".into();
        let mut rows = vec![r];
        assert!(classify(&mut rows, &full_typology_config()).is_err());
    }

    #[test]
    fn test_missing_threshold_is_fatal() {
        let cfg = TypologyConfig::from_toml_str("[default]\nquantity_desired = 0.8\n").unwrap();
        let mut rows = vec![row()];
        assert!(classify(&mut rows, &cfg).is_err());
    }
}
