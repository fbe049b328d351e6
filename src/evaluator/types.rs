//! Row types shared across the evaluation pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::config::SourceAttributes;

/// Discrete quality verdict for one dimension.
///
/// Exported numerically: Bad = 0, Acceptable = 1, Good = 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    Bad,
    Acceptable,
    Good,
}

impl Grade {
    pub fn code(self) -> u8 {
        match self {
            Grade::Bad => 0,
            Grade::Acceptable => 1,
            Grade::Good => 2,
        }
    }

    /// Weight of this grade in the quality score.
    pub fn weight(self) -> f64 {
        match self {
            Grade::Good => 1.0,
            Grade::Acceptable => 0.5,
            Grade::Bad => -1.0,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Grade::Good => "good",
            Grade::Acceptable => "acceptable",
            Grade::Bad => "bad",
        }
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Categorical consistency rating of a data source, totally ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Consistency {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Consistency {
    pub fn ordinal(self) -> u8 {
        match self {
            Consistency::Low => 0,
            Consistency::Medium => 1,
            Consistency::High => 2,
            Consistency::VeryHigh => 3,
        }
    }
}

impl FromStr for Consistency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Low" => Ok(Consistency::Low),
            "Medium" => Ok(Consistency::Medium),
            "High" => Ok(Consistency::High),
            "Very High" => Ok(Consistency::VeryHigh),
            other => Err(format!("unknown consistency rating '{other}'")),
        }
    }
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Consistency::Low => "Low",
            Consistency::Medium => "Medium",
            Consistency::High => "High",
            Consistency::VeryHigh => "Very High",
        };
        f.write_str(label)
    }
}

/// One evaluation row per (typology, data source) pair observed in the
/// sample and present in the source configuration.
///
/// Raw counters accumulate across batches; normalized values, grades, and
/// scores are populated after the full sample has been aggregated. A `None`
/// normalized value means the quotient was undefined (zero divisor) and
/// grades as Bad.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRow {
    pub typology: String,
    pub source: String,

    // Static attributes copied from the source configuration.
    pub source_type: String,
    pub obsolescence_rating: String,
    pub false_positive_rate: String,
    pub duplicate_rate: String,
    pub frequency: String,
    pub consistency: String,
    pub unit_price: f64,
    pub manual_rating: String,

    // Additive counters, summed across batches.
    pub quantity: u64,
    pub completeness_count: u64,
    pub info_cell_count: u64,
    pub truthful_count: u64,
    pub unknown_truthfulness_count: u64,
    pub severity_high: u64,
    pub severity_medium: u64,
    pub severity_low: u64,
    pub severity_unknown: u64,
    // Constant per (typology, config); overwritten, never summed.
    pub mandatory_field_count: u64,

    // Derived after aggregation.
    pub info_level: Option<f64>,
    pub quantity_normalized: Option<f64>,
    pub completeness_normalized: Option<f64>,
    pub info_level_normalized: Option<f64>,
    pub truthful_normalized: Option<f64>,
    pub unknown_truthfulness_normalized: Option<f64>,
    pub severity_high_normalized: Option<f64>,
    pub severity_medium_normalized: Option<f64>,
    pub severity_low_normalized: Option<f64>,
    pub severity_unknown_normalized: Option<f64>,
    pub price_per_record: Option<f64>,
    pub price_per_record_normalized: Option<f64>,

    pub quantity_grade: Option<Grade>,
    pub completeness_grade: Option<Grade>,
    pub info_level_grade: Option<Grade>,
    pub truthfulness_grade: Option<Grade>,
    pub unknown_truthfulness_grade: Option<Grade>,
    pub frequency_grade: Option<Grade>,
    pub consistency_grade: Option<Grade>,
    pub price_grade: Option<Grade>,

    pub quality: f64,
    /// Comma-joined list of the other sources covering this typology.
    pub exclusivity: String,
}

impl EvaluationRow {
    pub fn new(typology: &str, source: &str, attrs: &SourceAttributes) -> Self {
        EvaluationRow {
            typology: typology.to_string(),
            source: source.to_string(),
            source_type: attrs.source_type.clone(),
            obsolescence_rating: attrs.obsolescence_rating.clone(),
            false_positive_rate: attrs.false_positive_rate.clone(),
            duplicate_rate: attrs.duplicate_rate.clone(),
            frequency: attrs.frequency.clone(),
            consistency: attrs.consistency.clone(),
            unit_price: attrs.unit_price,
            manual_rating: attrs.manual_rating.clone(),
            quantity: 0,
            completeness_count: 0,
            info_cell_count: 0,
            truthful_count: 0,
            unknown_truthfulness_count: 0,
            severity_high: 0,
            severity_medium: 0,
            severity_low: 0,
            severity_unknown: 0,
            mandatory_field_count: 0,
            info_level: None,
            quantity_normalized: None,
            completeness_normalized: None,
            info_level_normalized: None,
            truthful_normalized: None,
            unknown_truthfulness_normalized: None,
            severity_high_normalized: None,
            severity_medium_normalized: None,
            severity_low_normalized: None,
            severity_unknown_normalized: None,
            price_per_record: None,
            price_per_record_normalized: None,
            quantity_grade: None,
            completeness_grade: None,
            info_level_grade: None,
            truthfulness_grade: None,
            unknown_truthfulness_grade: None,
            frequency_grade: None,
            consistency_grade: None,
            price_grade: None,
            quality: 0.0,
            exclusivity: String::new(),
        }
    }

    /// The eight graded dimensions that score into quality, in report order.
    pub fn grades(&self) -> [Option<Grade>; 8] {
        [
            self.quantity_grade,
            self.completeness_grade,
            self.info_level_grade,
            self.truthfulness_grade,
            self.unknown_truthfulness_grade,
            self.frequency_grade,
            self.consistency_grade,
            self.price_grade,
        ]
    }
}

/// Aggregate verdict for one data source over all the typologies it covers.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSummaryRow {
    pub source: String,
    pub source_type: String,
    pub typologies_covered: u64,
    pub obsolescence_rating: String,
    pub false_positive_rate: String,
    pub duplicate_rate: String,
    pub unit_price: f64,
    pub manual_rating: String,
    /// Mean quality over the source's typologies.
    pub quality: f64,
    /// Covered typologies over all distinct typologies observed.
    pub diversity: f64,
    pub total: f64,
}
