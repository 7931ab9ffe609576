//! Model parameter loading and caching tests

mod common;

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use common::fixtures::{fixture_path, load_fixture};
use rannum_core::{load_model_parameters, FeatureSchema, ModelCache, ModelLoadError, ModelParameters};
use rstest::rstest;
use tempfile::NamedTempFile;

#[test]
fn test_load_fixture_from_path() {
    let params = ModelParameters::from_path(fixture_path("model_params.json")).unwrap();
    assert_eq!(params.version(), Some("2024.1-full"));
    assert_eq!(params.weights().len(), 8);
    assert_eq!(params.bias(), -1.2);
    assert_eq!(params.mean_of("adjacent"), 0.28);
    // Transition weights have no normalization entries
    assert_eq!(params.mean_of("step1_trans_1_to_2"), 0.0);
    assert_eq!(params.std_of("step1_trans_1_to_2"), 1.0);
    assert!(params.unknown_features(&FeatureSchema::new(1)).is_empty());
}

#[test]
fn test_load_from_reader() {
    let json = load_fixture("model_params.json");
    let from_reader = load_model_parameters(json.as_bytes()).unwrap();
    let from_str = ModelParameters::from_json_str(&json).unwrap();
    assert_eq!(from_reader, from_str);
}

#[test]
fn test_load_from_temp_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"weight": {{"tpi": -0.5}}, "bias": 0.1}}"#).unwrap();

    let params = ModelParameters::from_path(file.path()).unwrap();
    assert_eq!(params.weight_of("tpi"), -0.5);
    assert!(params.version().is_none());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    match ModelParameters::from_path(&path) {
        Err(ModelLoadError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected Io error, got {:?}", other),
    }
}

#[rstest]
#[case(r#"{"bias": 0.0}"#, "weight")]
#[case(r#"{"weight": {"tpi": 1.0}}"#, "bias")]
#[case(r#"{"weight": null, "bias": 0.0}"#, "weight")]
fn test_missing_required_field(#[case] json: &str, #[case] field: &str) {
    match ModelParameters::from_json_str(json) {
        Err(ModelLoadError::MissingField { field: f }) => assert_eq!(f, field),
        other => panic!("expected MissingField, got {:?}", other),
    }
}

#[rstest]
#[case(r#"{"weight": {"tpi": "1"}, "bias": 0.0}"#, "weight", "tpi")]
#[case(r#"{"weight": {}, "bias": true}"#, "bias", "bias")]
#[case(r#"{"weight": {}, "bias": 0.0, "std": {"rp": [1]}}"#, "std", "rp")]
#[case(r#"{"weight": {}, "bias": 0.0, "mean": {"pl1": null}}"#, "mean", "pl1")]
fn test_non_numeric_value(#[case] json: &str, #[case] field: &str, #[case] key: &str) {
    match ModelParameters::from_json_str(json) {
        Err(ModelLoadError::NonNumeric { field: f, key: k }) => {
            assert_eq!(f, field);
            assert_eq!(k, key);
        }
        other => panic!("expected NonNumeric, got {:?}", other),
    }
}

#[rstest]
#[case("")]
#[case("[1, 2, 3]")]
#[case(r#"{"weight": [1.0], "bias": 0.0}"#)]
#[case(r#"{"weight": {}, "bias": 0.0, "version": 3}"#)]
fn test_malformed_artifact(#[case] json: &str) {
    assert!(matches!(
        ModelParameters::from_json_str(json),
        Err(ModelLoadError::Parse { .. })
    ));
}

#[test]
fn test_missing_normalization_is_not_an_error() {
    let params = ModelParameters::from_json_str(r#"{"weight": {"rp": 2.0}, "bias": 0.0}"#).unwrap();
    assert_eq!(params.normalize("rp", 0.25), 0.25);
}

#[test]
fn test_cache_single_flight() {
    static CACHE: ModelCache = ModelCache::new();
    let loads = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(8));
    let path = fixture_path("model_params.json");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let loads = Arc::clone(&loads);
            let barrier = Arc::clone(&barrier);
            let path = path.clone();
            thread::spawn(move || {
                barrier.wait();
                CACHE
                    .get_or_load(|| {
                        loads.fetch_add(1, Ordering::SeqCst);
                        ModelParameters::from_path(&path)
                    })
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<Arc<ModelParameters>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|p| Arc::ptr_eq(p, &results[0])));
}

#[test]
fn test_cache_retries_after_failure() {
    let cache = ModelCache::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("params.json");

    assert!(cache.get_or_load_path(&path).is_err());
    assert!(cache.get().is_none());

    std::fs::write(&path, r#"{"weight": {}, "bias": 1.5}"#).unwrap();
    let params = cache.get_or_load_path(&path).unwrap();
    assert_eq!(params.bias(), 1.5);
    assert!(cache.get().is_some());
}
