//! SVG bar charts comparing one quality dimension across sources or
//! typologies, colored by grade.

use crate::evaluator::types::Grade;

use super::html::esc;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;
const MARGIN_LEFT: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 70.0;
const MARGIN_TOP: f64 = 40.0;

/// One bar of a comparison chart.
#[derive(Debug, Clone)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub grade: Option<Grade>,
}

fn bar_color(grade: Option<Grade>) -> &'static str {
    match grade {
        Some(Grade::Good) => "#2e7d32",
        Some(Grade::Acceptable) => "#f9a825",
        Some(Grade::Bad) => "#c62828",
        None => "#78909c",
    }
}

/// Renders one dimension comparison as a standalone SVG document.
///
/// Bars are sorted best-first: descending by default, ascending for
/// lower-is-better dimensions.
pub fn bar_chart(title: &str, bars: &[Bar], ascending: bool) -> String {
    let mut bars: Vec<Bar> = bars.to_vec();
    bars.sort_by(|a, b| {
        if ascending {
            a.value.total_cmp(&b.value)
        } else {
            b.value.total_cmp(&a.value)
        }
    });

    let plot_width = WIDTH as f64 - MARGIN_LEFT - 10.0;
    let plot_height = HEIGHT as f64 - MARGIN_TOP - MARGIN_BOTTOM;
    let max = bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
    let scale = if max > 0.0 { plot_height / max } else { 0.0 };
    let slot = if bars.is_empty() {
        plot_width
    } else {
        plot_width / bars.len() as f64
    };
    let bar_width = (slot * 0.7).max(1.0);
    let baseline = MARGIN_TOP + plot_height;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
         viewBox=\"0 0 {WIDTH} {HEIGHT}\" font-family=\"sans-serif\">\n\
         <text x=\"{tx}\" y=\"24\" text-anchor=\"middle\" font-size=\"16\">{title}</text>\n\
         <line x1=\"{ml}\" y1=\"{baseline}\" x2=\"{lx}\" y2=\"{baseline}\" stroke=\"#444\"/>\n",
        tx = WIDTH / 2,
        title = esc(title),
        ml = MARGIN_LEFT,
        lx = MARGIN_LEFT + plot_width,
    );

    for (i, bar) in bars.iter().enumerate() {
        let x = MARGIN_LEFT + i as f64 * slot + (slot - bar_width) / 2.0;
        let height = bar.value * scale;
        let y = baseline - height;
        let label_x = x + bar_width / 2.0;

        svg.push_str(&format!(
            "<rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{bar_width:.1}\" height=\"{height:.1}\" fill=\"{color}\"/>\n",
            color = bar_color(bar.grade),
        ));
        svg.push_str(&format!(
            "<text x=\"{label_x:.1}\" y=\"{vy:.1}\" text-anchor=\"middle\" font-size=\"11\">{value}</text>\n",
            vy = y - 4.0,
            value = bar.value,
        ));
        svg.push_str(&format!(
            "<text x=\"{label_x:.1}\" y=\"{ly:.1}\" text-anchor=\"end\" font-size=\"11\" \
             transform=\"rotate(-45 {label_x:.1} {ly:.1})\">{label}</text>\n",
            ly = baseline + 14.0,
            label = esc(&bar.label),
        ));
    }

    svg.push_str("</svg>\n");
    svg
}
