//! Bounds-table randomness check tests

mod common;

use std::collections::BTreeMap;

use common::fixtures::{constant_sequence, fixture_path, pi_digits};
use rannum_core::checker::{check, check_metrics};
use rannum_core::features::extract;
use rannum_core::{Assessment, BoundsError, BoundsTable, ConfidenceLevel, Direction, Severity};
use rstest::rstest;

fn bounds() -> BoundsTable {
    BoundsTable::from_path(fixture_path("randomness_bounds.csv")).unwrap()
}

#[test]
fn test_fixture_covers_statistical_features() {
    let table = bounds();
    assert_eq!(table.len(), 27);
    let report = check(&table, &extract(&pi_digits(), 1), ConfidenceLevel::P95);
    assert!(report.missing_metrics.is_empty());
    assert_eq!(report.total_tested(), 27);
}

#[test]
fn test_missing_bounds_file() {
    let err = BoundsTable::from_path(fixture_path("no_such_table.csv")).unwrap_err();
    assert!(matches!(err, BoundsError::Io { .. }));
}

#[test]
fn test_constant_sequence_is_non_random() {
    let report = check(&bounds(), &extract(&constant_sequence(3, 60), 1), ConfidenceLevel::P99);
    assert_eq!(report.assessment, Assessment::LikelyNonRandom);
    assert!(report.severe_outlier_count() >= 3);

    let freq3 = report.outliers.iter().find(|o| o.metric == "freq_3").unwrap();
    assert_eq!(freq3.direction, Direction::Above);
    assert_eq!(freq3.severity, Severity::Extreme);

    let tpi = report.outliers.iter().find(|o| o.metric == "tpi").unwrap();
    assert_eq!(tpi.direction, Direction::Below);
    assert!(!tpi.interpretation.is_empty());

    let sorted = report.outliers_by_distance();
    for pair in sorted.windows(2) {
        assert!(pair[0].relative_distance >= pair[1].relative_distance);
    }
}

#[rstest]
#[case(0.0, Assessment::HighlyLikelyRandom)]
#[case(0.14, Assessment::PossiblyNonRandom)]
#[case(-0.2, Assessment::PossiblyNonRandom)]
fn test_metric_map_check(#[case] autocorr: f64, #[case] expected: Assessment) {
    let metrics: BTreeMap<&str, f64> =
        BTreeMap::from([("autocorr_lag1", autocorr), ("freq_0", 0.1), ("freq_1", 0.1)]);
    let report = check_metrics(&bounds(), |m| metrics.get(m).copied(), ConfidenceLevel::P95);
    assert_eq!(report.total_tested(), 3);
    assert_eq!(report.missing_metrics.len(), 24);
    assert_eq!(report.assessment, expected);
}
