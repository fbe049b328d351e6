//! Rendering of the final tables into human-readable artifacts.
//!
//! Consumes the finished evaluation and summary tables read-only and writes
//! one HTML report per source, one per typology, a global ranking, and one
//! SVG comparison chart per (entity, dimension) under the output directory.

pub mod html;
pub mod plot;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::info;

use crate::evaluator::types::{Consistency, EvaluationRow, Grade, SourceSummaryRow};

use self::plot::Bar;

/// Plotted dimensions; `true` marks lower-is-better (plotted ascending).
const PLOT_DIMENSIONS: &[(&str, bool)] = &[
    ("Quantity", false),
    ("Completeness", false),
    ("Information level", false),
    ("Truthfulness", false),
    ("Unknown truthfulness", true),
    ("Consistency", false),
    ("Price per record", true),
];

fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn dimension_value(row: &EvaluationRow, dimension: &str) -> f64 {
    match dimension {
        "Quantity" => row.quantity as f64,
        "Completeness" => row.completeness_count as f64,
        "Information level" => row.info_level.unwrap_or(0.0),
        "Truthfulness" => row.truthful_count as f64,
        "Unknown truthfulness" => row.unknown_truthfulness_count as f64,
        "Consistency" => Consistency::from_str(&row.consistency)
            .map(|c| c.ordinal() as f64)
            .unwrap_or(0.0),
        "Price per record" => row.price_per_record.unwrap_or(0.0),
        _ => 0.0,
    }
}

fn dimension_grade(row: &EvaluationRow, dimension: &str) -> Option<Grade> {
    match dimension {
        "Quantity" => row.quantity_grade,
        "Completeness" => row.completeness_grade,
        "Information level" => row.info_level_grade,
        "Truthfulness" => row.truthfulness_grade,
        "Unknown truthfulness" => row.unknown_truthfulness_grade,
        "Consistency" => row.consistency_grade,
        "Price per record" => row.price_grade,
        _ => None,
    }
}

fn typology_of(row: &EvaluationRow) -> &str {
    &row.typology
}

fn source_of(row: &EvaluationRow) -> &str {
    &row.source
}

fn write_charts(
    dir: &Path,
    entity: &str,
    rows: &[&EvaluationRow],
    label: fn(&EvaluationRow) -> &str,
) -> Result<()> {
    fs::create_dir_all(dir)?;
    for (dimension, ascending) in PLOT_DIMENSIONS {
        let bars: Vec<Bar> = rows
            .iter()
            .map(|row| Bar {
                label: label(row).to_string(),
                value: dimension_value(row, dimension),
                grade: dimension_grade(row, dimension),
            })
            .collect();
        let title = format!("{dimension} in {entity}");
        let svg = plot::bar_chart(&title, &bars, *ascending);
        fs::write(dir.join(format!("{}.svg", slug(dimension))), svg)?;
    }
    Ok(())
}

/// Writes every rendered artifact under `output_dir`.
pub fn render_reports(
    output_dir: &Path,
    rows: &[EvaluationRow],
    sources: &[SourceSummaryRow],
) -> Result<()> {
    let sources_dir = output_dir.join("sources");
    let typologies_dir = output_dir.join("typologies");
    fs::create_dir_all(&sources_dir)
        .with_context(|| format!("output directory {} can not be created", output_dir.display()))?;
    fs::create_dir_all(&typologies_dir)?;

    fs::write(
        output_dir.join("ranking.html"),
        html::ranking_report(sources),
    )?;

    for summary in sources {
        // The table is already in (typology, source) order, so the filtered
        // view stays sorted by typology.
        let source_rows: Vec<&EvaluationRow> = rows
            .iter()
            .filter(|r| r.source == summary.source)
            .collect();
        let name = slug(&summary.source);
        fs::write(
            sources_dir.join(format!("{name}.html")),
            html::source_report(summary, &source_rows),
        )?;
        write_charts(
            &output_dir.join("plots").join("sources").join(&name),
            &summary.source,
            &source_rows,
            typology_of,
        )?;
    }

    let typologies: BTreeSet<&str> = rows.iter().map(|r| r.typology.as_str()).collect();
    for typology in &typologies {
        let mut typology_rows: Vec<&EvaluationRow> =
            rows.iter().filter(|r| r.typology == *typology).collect();
        typology_rows.sort_by(|a, b| {
            b.quality
                .total_cmp(&a.quality)
                .then_with(|| a.source.cmp(&b.source))
        });
        let name = slug(typology);
        fs::write(
            typologies_dir.join(format!("{name}.html")),
            html::typology_report(typology, &typology_rows),
        )?;
        write_charts(
            &output_dir.join("plots").join("typologies").join(&name),
            typology,
            &typology_rows,
            source_of,
        )?;
    }

    info!(
        sources = sources.len(),
        typologies = typologies.len(),
        output = %output_dir.display(),
        "Reports rendered"
    );
    Ok(())
}
