//! HTML document builders for the rendered reports.
//!
//! Documents are self-contained: one embedded stylesheet, tables built
//! directly from the final evaluation rows, and graded cells colored
//! green / amber / red.

use crate::evaluator::types::{EvaluationRow, Grade, SourceSummaryRow};

const STYLE: &str = "\
body { font-family: sans-serif; margin: 2em; }\n\
h1 { font-size: 1.4em; } h3 { margin-top: 1.6em; }\n\
table { border-collapse: collapse; width: 100%; margin-top: 0.5em; }\n\
td, th { border: 1px solid #444; padding: 4px 8px; text-align: center; }\n\
th { background: #222; color: #fff; }\n\
td.good { background: #c8e6c9; }\n\
td.acceptable { background: #fff9c4; }\n\
td.bad { background: #ffcdd2; }\n";

pub(crate) fn esc(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn page(title: &str, subtitle: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n\
         <h1>{title} {subtitle}</h1>\n{body}</body>\n</html>\n",
        title = esc(title),
        subtitle = esc(subtitle),
    )
}

fn header_row(names: &[&str]) -> String {
    let mut out = String::from("<tr>");
    for name in names {
        out.push_str(&format!("<th>{}</th>", esc(name)));
    }
    out.push_str("</tr>\n");
    out
}

fn plain_cell(value: &str) -> String {
    format!("<td>{}</td>", esc(value))
}

fn graded_cell(value: &str, grade: Option<Grade>) -> String {
    match grade {
        Some(g) => format!("<td class=\"{}\">{}</td>", g.css_class(), esc(value)),
        None => plain_cell(value),
    }
}

fn typology_of(row: &EvaluationRow) -> &str {
    &row.typology
}

fn source_of(row: &EvaluationRow) -> &str {
    &row.source
}

/// Raw per-typology (or per-source) dimension table.
fn raw_table(label: &str, rows: &[&EvaluationRow], key: fn(&EvaluationRow) -> &str) -> String {
    let mut out = String::from("<table>\n");
    out.push_str(&header_row(&[
        label,
        "Quantity",
        "Completeness",
        "Information level",
        "Truthfulness",
        "Unknown truthfulness",
        "Frequency",
        "Consistency",
        "Severity high",
        "Severity medium",
        "Severity low",
        "Severity unknown",
        "Price per record",
    ]));
    for row in rows {
        out.push_str("<tr>");
        out.push_str(&plain_cell(key(row)));
        out.push_str(&plain_cell(&row.quantity.to_string()));
        out.push_str(&plain_cell(&row.completeness_count.to_string()));
        out.push_str(&plain_cell(&fmt_opt(row.info_level)));
        out.push_str(&plain_cell(&row.truthful_count.to_string()));
        out.push_str(&plain_cell(&row.unknown_truthfulness_count.to_string()));
        out.push_str(&plain_cell(&row.frequency));
        out.push_str(&plain_cell(&row.consistency));
        out.push_str(&plain_cell(&row.severity_high.to_string()));
        out.push_str(&plain_cell(&row.severity_medium.to_string()));
        out.push_str(&plain_cell(&row.severity_low.to_string()));
        out.push_str(&plain_cell(&row.severity_unknown.to_string()));
        out.push_str(&plain_cell(&fmt_opt(row.price_per_record)));
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
    out
}

/// Normalized dimension table with level-colored cells.
fn normalized_table(
    label: &str,
    rows: &[&EvaluationRow],
    key: fn(&EvaluationRow) -> &str,
) -> String {
    let mut out = String::from("<table>\n");
    out.push_str(&header_row(&[
        label,
        "Quantity",
        "Completeness",
        "Information level",
        "Truthfulness",
        "Unknown truthfulness",
        "Frequency",
        "Consistency",
        "Severity high",
        "Severity medium",
        "Severity low",
        "Severity unknown",
        "Price per record",
    ]));
    for row in rows {
        out.push_str("<tr>");
        out.push_str(&plain_cell(key(row)));
        out.push_str(&graded_cell(
            &fmt_opt(row.quantity_normalized),
            row.quantity_grade,
        ));
        out.push_str(&graded_cell(
            &fmt_opt(row.completeness_normalized),
            row.completeness_grade,
        ));
        out.push_str(&graded_cell(
            &fmt_opt(row.info_level_normalized),
            row.info_level_grade,
        ));
        out.push_str(&graded_cell(
            &fmt_opt(row.truthful_normalized),
            row.truthfulness_grade,
        ));
        out.push_str(&graded_cell(
            &fmt_opt(row.unknown_truthfulness_normalized),
            row.unknown_truthfulness_grade,
        ));
        out.push_str(&graded_cell(&row.frequency, row.frequency_grade));
        out.push_str(&graded_cell(&row.consistency, row.consistency_grade));
        out.push_str(&plain_cell(&fmt_opt(row.severity_high_normalized)));
        out.push_str(&plain_cell(&fmt_opt(row.severity_medium_normalized)));
        out.push_str(&plain_cell(&fmt_opt(row.severity_low_normalized)));
        out.push_str(&plain_cell(&fmt_opt(row.severity_unknown_normalized)));
        out.push_str(&graded_cell(
            &fmt_opt(row.price_per_record_normalized),
            row.price_grade,
        ));
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
    out
}

/// One data source across the typologies it covers.
pub fn source_report(summary: &SourceSummaryRow, rows: &[&EvaluationRow]) -> String {
    let mut body = String::from("<h3>Data source overview</h3>\n<table>\n");
    body.push_str(&header_row(&[
        "Type",
        "Typologies",
        "Obsolescence rating",
        "False positive rate",
        "Duplicate rate",
        "Price",
        "Manual rating",
    ]));
    body.push_str("<tr>");
    body.push_str(&plain_cell(&summary.source_type));
    body.push_str(&plain_cell(&summary.typologies_covered.to_string()));
    body.push_str(&plain_cell(&summary.obsolescence_rating));
    body.push_str(&plain_cell(&summary.false_positive_rate));
    body.push_str(&plain_cell(&summary.duplicate_rate));
    body.push_str(&plain_cell(&summary.unit_price.to_string()));
    body.push_str(&plain_cell(&summary.manual_rating));
    body.push_str("</tr>\n</table>\n");

    body.push_str("<h3>Raw dimensions by typology</h3>\n");
    body.push_str(&raw_table("Typology", rows, typology_of));

    body.push_str("<h3>Normalized dimensions by typology</h3>\n");
    body.push_str(&normalized_table("Typology", rows, typology_of));

    body.push_str("<h3>Evaluation by typology</h3>\n<table>\n");
    body.push_str(&header_row(&["Typology", "Quality", "Exclusivity"]));
    for row in rows {
        body.push_str("<tr>");
        body.push_str(&plain_cell(&row.typology));
        body.push_str(&plain_cell(&row.quality.to_string()));
        body.push_str(&plain_cell(&row.exclusivity));
        body.push_str("</tr>\n");
    }
    body.push_str("</table>\n");

    body.push_str("<h3>Final evaluation</h3>\n<table>\n");
    body.push_str(&header_row(&["Quality", "Diversity", "Total"]));
    body.push_str(&format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n</table>\n",
        summary.quality, summary.diversity, summary.total
    ));

    page("Data source quality report", &summary.source, &body)
}

/// One typology across the data sources covering it.
pub fn typology_report(typology: &str, rows: &[&EvaluationRow]) -> String {
    let mut body = String::from("<h3>Raw dimensions by data source</h3>\n");
    body.push_str(&raw_table("Data source", rows, source_of));

    body.push_str("<h3>Normalized dimensions by data source</h3>\n");
    body.push_str(&normalized_table("Data source", rows, source_of));

    body.push_str("<h3>Data source classification</h3>\n<table>\n");
    body.push_str(&header_row(&["Data source", "Quality"]));
    for row in rows {
        body.push_str("<tr>");
        body.push_str(&plain_cell(&row.source));
        body.push_str(&plain_cell(&row.quality.to_string()));
        body.push_str("</tr>\n");
    }
    body.push_str("</table>\n");

    page("Typology quality report", typology, &body)
}

/// Global ranking of every data source.
pub fn ranking_report(sources: &[SourceSummaryRow]) -> String {
    let mut body = String::from("<h3>Data source classification</h3>\n<table>\n");
    body.push_str(&header_row(&[
        "Data source",
        "Type",
        "Price",
        "Quality",
        "Diversity",
        "Total",
    ]));
    for summary in sources {
        body.push_str("<tr>");
        body.push_str(&plain_cell(&summary.source));
        body.push_str(&plain_cell(&summary.source_type));
        body.push_str(&plain_cell(&summary.unit_price.to_string()));
        body.push_str(&plain_cell(&summary.quality.to_string()));
        body.push_str(&plain_cell(&summary.diversity.to_string()));
        body.push_str(&plain_cell(&summary.total.to_string()));
        body.push_str("</tr>\n");
    }
    body.push_str("</table>\n");

    page("Data source ranking", "", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceAttributes;

    fn row() -> EvaluationRow {
        let attrs = SourceAttributes {
            source_type: "Commercial".into(),
            obsolescence_rating: "Medium".into(),
            false_positive_rate: "0.02".into(),
            duplicate_rate: "0.01".into(),
            frequency: "01:00:00".into(),
            consistency: "High".into(),
            unit_price: 1000.0,
            manual_rating: "8".into(),
        };
        let mut r = EvaluationRow::new("Bot", "S1", &attrs);
        r.quantity = 400;
        r.quantity_normalized = Some(1.0);
        r.quantity_grade = Some(Grade::Good);
        r.completeness_normalized = Some(0.4);
        r.completeness_grade = Some(Grade::Bad);
        r.quality = 0.5;
        r.exclusivity = "S2".into();
        r
    }

    fn summary() -> SourceSummaryRow {
        SourceSummaryRow {
            source: "S1".into(),
            source_type: "Commercial".into(),
            typologies_covered: 1,
            obsolescence_rating: "Medium".into(),
            false_positive_rate: "0.02".into(),
            duplicate_rate: "0.01".into(),
            unit_price: 1000.0,
            manual_rating: "8".into(),
            quality: 0.5,
            diversity: 1.0,
            total: 1.5,
        }
    }

    #[test]
    fn test_source_report_colors_graded_cells() {
        let r = row();
        let html = source_report(&summary(), &[&r]);
        assert!(html.contains("<td class=\"good\">1</td>"));
        assert!(html.contains("<td class=\"bad\">0.4</td>"));
        assert!(html.contains("Final evaluation"));
    }

    #[test]
    fn test_typology_report_lists_sources() {
        let r = row();
        let html = typology_report("Bot", &[&r]);
        assert!(html.contains("Typology quality report"));
        assert!(html.contains("<td>S1</td>"));
        assert!(html.contains("<td>0.5</td>"));
    }

    #[test]
    fn test_ranking_report_lists_totals() {
        let html = ranking_report(&[summary()]);
        assert!(html.contains("<td>1.5</td>"));
    }

    #[test]
    fn test_markup_is_escaped() {
        let mut r = row();
        r.source = "<S1>".into();
        let html = typology_report("Bot", &[&r]);
        assert!(html.contains("&lt;S1&gt;"));
        assert!(!html.contains("<S1>"));
    }
}
