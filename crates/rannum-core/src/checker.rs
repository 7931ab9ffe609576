//! Randomness check against a table of expected metric ranges
//!
//! The bounds table lists, for each statistical metric, the range observed
//! for sequences of a pseudo-random generator. A sequence whose metrics
//! mostly fall inside those ranges is indistinguishable from generator
//! output on these statistics.
//!
//! Table format (CSV with header):
//!
//! ```text
//! metric,expected_mean,expected_std,bound_95_lower,bound_95_upper,bound_99_lower,bound_99_upper,interpretation
//! redundancy,0.008,0.004,0.001,0.020,0.000,0.028,High redundancy means predictable digits
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BoundsError;
use crate::features::FeatureVector;

/// Tabulated confidence level of the bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ConfidenceLevel {
    #[default]
    P95,
    P99,
}

impl ConfidenceLevel {
    pub fn percent(self) -> u8 {
        match self {
            ConfidenceLevel::P95 => 95,
            ConfidenceLevel::P99 => 99,
        }
    }
}

impl TryFrom<u8> for ConfidenceLevel {
    type Error = BoundsError;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        match percent {
            95 => Ok(ConfidenceLevel::P95),
            99 => Ok(ConfidenceLevel::P99),
            other => Err(BoundsError::UnsupportedLevel(other)),
        }
    }
}

impl From<ConfidenceLevel> for u8 {
    fn from(level: ConfidenceLevel) -> Self {
        level.percent()
    }
}

/// Expected range of one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBounds {
    pub metric: String,
    pub expected_mean: f64,
    pub expected_std: f64,
    pub bound_95_lower: f64,
    pub bound_95_upper: f64,
    pub bound_99_lower: f64,
    pub bound_99_upper: f64,
    #[serde(default)]
    pub interpretation: String,
}

impl MetricBounds {
    /// `(lower, upper)` at a confidence level
    pub fn range(&self, level: ConfidenceLevel) -> (f64, f64) {
        match level {
            ConfidenceLevel::P95 => (self.bound_95_lower, self.bound_95_upper),
            ConfidenceLevel::P99 => (self.bound_99_lower, self.bound_99_upper),
        }
    }

    /// `|value - mean| / std`, 0 when std is not positive
    pub fn std_distance(&self, value: f64) -> f64 {
        if self.expected_std > 0.0 {
            (value - self.expected_mean).abs() / self.expected_std
        } else {
            0.0
        }
    }
}

/// Which side of the range an outlier falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Below,
    Above,
}

/// How far outside its range an outlier lies, relative to the expected mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Moderate,
    High,
    Extreme,
}

impl Severity {
    pub fn from_relative_distance(relative_distance: f64) -> Self {
        if relative_distance > 1.0 {
            Severity::Extreme
        } else if relative_distance > 0.5 {
            Severity::High
        } else {
            Severity::Moderate
        }
    }

    pub fn is_severe(self) -> bool {
        self >= Severity::High
    }
}

/// Overall verdict of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assessment {
    HighlyLikelyRandom,
    LikelyRandom,
    PossiblyRandom,
    PossiblyNonRandom,
    LikelyNonRandom,
}

impl Assessment {
    /// Assessment for a fraction of metrics within bounds
    pub fn from_score(score: f64) -> Self {
        if score > 0.90 {
            Assessment::HighlyLikelyRandom
        } else if score > 0.80 {
            Assessment::LikelyRandom
        } else if score > 0.70 {
            Assessment::PossiblyRandom
        } else if score > 0.50 {
            Assessment::PossiblyNonRandom
        } else {
            Assessment::LikelyNonRandom
        }
    }
}

/// A metric inside its expected range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithinBounds {
    pub metric: String,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
    /// Distance from the expected mean in standard deviations
    pub distance_from_mean: f64,
}

/// A metric outside its expected range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    pub metric: String,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
    pub direction: Direction,
    pub distance_from_bound: f64,
    /// `distance_from_bound` divided by the expected mean (or 1 if the mean is not positive)
    pub relative_distance: f64,
    pub severity: Severity,
    pub std_distance: f64,
    pub interpretation: String,
}

/// Result of checking one sequence against the bounds table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomnessReport {
    /// Fraction of tested metrics within bounds (0 when nothing was tested)
    pub randomness_score: f64,
    pub assessment: Assessment,
    pub confidence_level: ConfidenceLevel,
    pub within_bounds: Vec<WithinBounds>,
    pub outliers: Vec<Outlier>,
    /// Tabulated metrics the feature vector does not contain
    pub missing_metrics: Vec<String>,
}

impl RandomnessReport {
    pub fn total_tested(&self) -> usize {
        self.within_bounds.len() + self.outliers.len()
    }

    pub fn outlier_count(&self) -> usize {
        self.outliers.len()
    }

    /// Outliers of High or Extreme severity
    pub fn severe_outliers(&self) -> impl Iterator<Item = &Outlier> {
        self.outliers.iter().filter(|o| o.severity.is_severe())
    }

    pub fn severe_outlier_count(&self) -> usize {
        self.severe_outliers().count()
    }

    /// Outliers, furthest from their range first
    pub fn outliers_by_distance(&self) -> Vec<&Outlier> {
        let mut sorted: Vec<&Outlier> = self.outliers.iter().collect();
        sorted.sort_by(|a, b| b.relative_distance.total_cmp(&a.relative_distance));
        sorted
    }
}

/// Bounds table loaded from CSV
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundsTable {
    rows: Vec<MetricBounds>,
}

impl BoundsTable {
    pub fn new(rows: Vec<MetricBounds>) -> Self {
        Self { rows }
    }

    /// Load a table from a CSV file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BoundsError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| BoundsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a table from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BoundsError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let rows = reader
            .deserialize::<MetricBounds>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[MetricBounds] {
        &self.rows
    }

    pub fn get(&self, metric: &str) -> Option<&MetricBounds> {
        self.rows.iter().find(|row| row.metric == metric)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Checks feature vectors against a bounds table
#[derive(Debug, Clone)]
pub struct RandomnessChecker {
    table: BoundsTable,
    level: ConfidenceLevel,
}

impl RandomnessChecker {
    pub fn new(table: BoundsTable, level: ConfidenceLevel) -> Self {
        Self { table, level }
    }

    pub fn table(&self) -> &BoundsTable {
        &self.table
    }

    pub fn level(&self) -> ConfidenceLevel {
        self.level
    }

    /// Check a feature vector at the configured level
    pub fn check(&self, features: &FeatureVector) -> RandomnessReport {
        check_metrics(&self.table, |name| features.get(name), self.level)
    }
}

/// Check a feature vector against a table at a given level
pub fn check(table: &BoundsTable, features: &FeatureVector, level: ConfidenceLevel) -> RandomnessReport {
    check_metrics(table, |name| features.get(name), level)
}

/// Check metrics provided by a lookup function
pub fn check_metrics<F>(table: &BoundsTable, lookup: F, level: ConfidenceLevel) -> RandomnessReport
where
    F: Fn(&str) -> Option<f64>,
{
    let mut within_bounds = Vec::new();
    let mut outliers = Vec::new();
    let mut missing_metrics = Vec::new();

    for row in table.rows() {
        let Some(value) = lookup(&row.metric) else {
            missing_metrics.push(row.metric.clone());
            continue;
        };
        let (lower, upper) = row.range(level);

        if lower <= value && value <= upper {
            within_bounds.push(WithinBounds {
                metric: row.metric.clone(),
                value,
                lower,
                upper,
                distance_from_mean: row.std_distance(value),
            });
            continue;
        }

        let (direction, distance_from_bound) = if value < lower {
            (Direction::Below, lower - value)
        } else {
            (Direction::Above, value - upper)
        };
        let scale = if row.expected_mean > 0.0 {
            row.expected_mean
        } else {
            1.0
        };
        let relative_distance = distance_from_bound / scale;

        outliers.push(Outlier {
            metric: row.metric.clone(),
            value,
            lower,
            upper,
            direction,
            distance_from_bound,
            relative_distance,
            severity: Severity::from_relative_distance(relative_distance),
            std_distance: row.std_distance(value),
            interpretation: row.interpretation.clone(),
        });
    }

    let tested = within_bounds.len() + outliers.len();
    let randomness_score = if tested > 0 {
        within_bounds.len() as f64 / tested as f64
    } else {
        0.0
    };

    RandomnessReport {
        randomness_score,
        assessment: Assessment::from_score(randomness_score),
        confidence_level: level,
        within_bounds,
        outliers,
        missing_metrics,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    const TABLE: &str = "\
metric,expected_mean,expected_std,bound_95_lower,bound_95_upper,bound_99_lower,bound_99_upper,interpretation
redundancy,0.008,0.004,0.001,0.020,0.000,0.028,Predictable digit choice
tpi,0.95,0.04,0.85,1.03,0.82,1.06,Monotonic runs
autocorr_lag1,0.0,0.058,-0.115,0.115,-0.15,0.15,Serial dependence
missing_metric,1.0,0.1,0.8,1.2,0.7,1.3,Not computed
";

    fn table() -> BoundsTable {
        BoundsTable::from_reader(TABLE.as_bytes()).unwrap()
    }

    fn metrics(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_load_table() {
        let table = table();
        assert_eq!(table.len(), 4);
        let tpi = table.get("tpi").unwrap();
        assert_eq!(tpi.range(ConfidenceLevel::P99), (0.82, 1.06));
        assert_eq!(tpi.interpretation, "Monotonic runs");
    }

    #[test]
    fn test_malformed_table() {
        let bad = "metric,expected_mean\nredundancy,abc\n";
        assert!(matches!(
            BoundsTable::from_reader(bad.as_bytes()),
            Err(BoundsError::Csv(_))
        ));
    }

    #[test]
    fn test_within_and_outliers() {
        let m = metrics(&[("redundancy", 0.045), ("tpi", 0.9), ("autocorr_lag1", -0.2)]);
        let report = check_metrics(&table(), |k| m.get(k).copied(), ConfidenceLevel::P95);

        assert_eq!(report.total_tested(), 3);
        assert_eq!(report.within_bounds.len(), 1);
        assert_eq!(report.missing_metrics, vec!["missing_metric".to_string()]);

        let redundancy = &report.outliers[0];
        assert_eq!(redundancy.direction, Direction::Above);
        assert!((redundancy.distance_from_bound - 0.025).abs() < 1e-12);
        // 0.025 / 0.008
        assert_eq!(redundancy.severity, Severity::Extreme);

        let autocorr = &report.outliers[1];
        assert_eq!(autocorr.direction, Direction::Below);
        // Mean is not positive so the distance is not rescaled
        assert!((autocorr.relative_distance - 0.085).abs() < 1e-12);
        assert_eq!(autocorr.severity, Severity::Moderate);

        assert_eq!(report.severe_outlier_count(), 1);
        assert!((report.randomness_score - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.assessment, Assessment::LikelyNonRandom);
    }

    #[test]
    fn test_level_changes_verdict() {
        let m = metrics(&[("autocorr_lag1", 0.13)]);
        let strict = check_metrics(&table(), |k| m.get(k).copied(), ConfidenceLevel::P95);
        let loose = check_metrics(&table(), |k| m.get(k).copied(), ConfidenceLevel::P99);
        assert_eq!(strict.outlier_count(), 1);
        assert_eq!(loose.outlier_count(), 0);
        assert_eq!(loose.randomness_score, 1.0);
        assert_eq!(loose.assessment, Assessment::HighlyLikelyRandom);
    }

    #[test]
    fn test_nothing_tested() {
        let report = check_metrics(&table(), |_| None, ConfidenceLevel::P95);
        assert_eq!(report.total_tested(), 0);
        assert_eq!(report.randomness_score, 0.0);
        assert_eq!(report.missing_metrics.len(), 4);
    }

    #[test]
    fn test_assessment_thresholds() {
        assert_eq!(Assessment::from_score(0.95), Assessment::HighlyLikelyRandom);
        assert_eq!(Assessment::from_score(0.90), Assessment::LikelyRandom);
        assert_eq!(Assessment::from_score(0.75), Assessment::PossiblyRandom);
        assert_eq!(Assessment::from_score(0.70), Assessment::PossiblyNonRandom);
        assert_eq!(Assessment::from_score(0.50), Assessment::LikelyNonRandom);
    }

    #[test]
    fn test_severity() {
        assert_eq!(Severity::from_relative_distance(1.01), Severity::Extreme);
        assert_eq!(Severity::from_relative_distance(1.0), Severity::High);
        assert_eq!(Severity::from_relative_distance(0.5), Severity::Moderate);
        assert!(Severity::High.is_severe());
        assert!(!Severity::Moderate.is_severe());
    }

    #[test]
    fn test_confidence_level_conversion() {
        assert_eq!(ConfidenceLevel::try_from(99).unwrap(), ConfidenceLevel::P99);
        assert!(matches!(
            ConfidenceLevel::try_from(90),
            Err(BoundsError::UnsupportedLevel(90))
        ));
        let json = serde_json::to_string(&ConfidenceLevel::P95).unwrap();
        assert_eq!(json, "95");
    }
}
