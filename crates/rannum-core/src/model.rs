//! Fitted model parameters and their loading
//!
//! The parameter artifact is a JSON object:
//!
//! ```json
//! {
//!   "version": "optional string",
//!   "weight": { "feature_name": 0.5 },
//!   "bias": -0.1,
//!   "mean": { "feature_name": 0.1 },
//!   "std": { "feature_name": 0.02 }
//! }
//! ```
//!
//! `weight` and `bias` are required. A feature missing from `mean` or `std`
//! normalizes with mean 0 and std 1.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{ModelLoadError, ModelLoadResult};
use crate::schema::FeatureSchema;

/// Immutable parameters of a fitted logistic model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    weight: BTreeMap<String, f64>,
    bias: f64,
    mean: BTreeMap<String, f64>,
    std: BTreeMap<String, f64>,
}

impl ModelParameters {
    /// Parameters with weights and bias only (identity normalization)
    pub fn new(weight: BTreeMap<String, f64>, bias: f64) -> Self {
        Self {
            version: None,
            weight,
            bias,
            mean: BTreeMap::new(),
            std: BTreeMap::new(),
        }
    }

    /// Set the normalization means
    pub fn with_mean(mut self, mean: BTreeMap<String, f64>) -> Self {
        self.mean = mean;
        self
    }

    /// Set the normalization standard deviations
    pub fn with_std(mut self, std: BTreeMap<String, f64>) -> Self {
        self.std = std;
        self
    }

    /// Tag the parameters with a version string
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Parse parameters from a JSON string
    pub fn from_json_str(json: &str) -> ModelLoadResult<Self> {
        let value: Value = serde_json::from_str(json).map_err(|e| ModelLoadError::Parse {
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    /// Read parameters from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> ModelLoadResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Build parameters from an already parsed JSON value
    pub fn from_value(value: Value) -> ModelLoadResult<Self> {
        let Value::Object(mut root) = value else {
            return Err(ModelLoadError::Parse {
                message: "model parameters must be a JSON object".to_string(),
            });
        };

        let weight = match root.remove("weight") {
            None | Some(Value::Null) => {
                return Err(ModelLoadError::MissingField {
                    field: "weight".to_string(),
                })
            }
            Some(v) => number_table("weight", v)?,
        };

        let bias = match root.remove("bias") {
            None | Some(Value::Null) => {
                return Err(ModelLoadError::MissingField {
                    field: "bias".to_string(),
                })
            }
            Some(v) => v.as_f64().ok_or_else(|| ModelLoadError::NonNumeric {
                field: "bias".to_string(),
                key: "bias".to_string(),
            })?,
        };

        let mean = optional_table("mean", &mut root)?;
        let std = optional_table("std", &mut root)?;

        let version = match root.remove("version") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                return Err(ModelLoadError::Parse {
                    message: format!("'version' must be a string, got {}", other),
                })
            }
        };

        let params = Self {
            version,
            weight,
            bias,
            mean,
            std,
        };
        info!(
            version = params.version.as_deref().unwrap_or("unversioned"),
            weights = params.weight.len(),
            "Loaded model parameters"
        );
        Ok(params)
    }

    /// Artifact version, if the artifact carried one
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Feature weights, sorted by name
    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weight
    }

    /// Intercept
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Weight of a feature, 0 when the model does not use it
    pub fn weight_of(&self, name: &str) -> f64 {
        self.weight.get(name).copied().unwrap_or(0.0)
    }

    /// Normalization mean of a feature (default 0)
    pub fn mean_of(&self, name: &str) -> f64 {
        self.mean.get(name).copied().unwrap_or(0.0)
    }

    /// Normalization standard deviation of a feature (default 1)
    pub fn std_of(&self, name: &str) -> f64 {
        self.std.get(name).copied().unwrap_or(1.0)
    }

    /// Normalize a raw feature value
    ///
    /// A non-positive std only centers the value.
    pub fn normalize(&self, name: &str, raw: f64) -> f64 {
        let centered = raw - self.mean_of(name);
        let std = self.std_of(name);
        if std > 0.0 {
            centered / std
        } else {
            centered
        }
    }

    /// Weight names the schema cannot produce, sorted
    pub fn unknown_features(&self, schema: &FeatureSchema) -> Vec<String> {
        self.weight
            .keys()
            .filter(|name| !schema.contains(name))
            .cloned()
            .collect()
    }
}

/// Read model parameters from any JSON source
pub fn load_model_parameters<R: Read>(reader: R) -> ModelLoadResult<ModelParameters> {
    let value: Value = serde_json::from_reader(reader).map_err(|e| ModelLoadError::Parse {
        message: e.to_string(),
    })?;
    ModelParameters::from_value(value)
}

fn number_table(field: &str, value: Value) -> ModelLoadResult<BTreeMap<String, f64>> {
    let Value::Object(entries) = value else {
        return Err(ModelLoadError::Parse {
            message: format!("'{}' must be an object of feature name to number", field),
        });
    };

    entries
        .into_iter()
        .map(|(key, v)| match v.as_f64() {
            Some(x) => Ok((key, x)),
            None => Err(ModelLoadError::NonNumeric {
                field: field.to_string(),
                key,
            }),
        })
        .collect()
}

fn optional_table(
    field: &str,
    root: &mut Map<String, Value>,
) -> ModelLoadResult<BTreeMap<String, f64>> {
    match root.remove(field) {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(v) => number_table(field, v),
    }
}

/// Process-wide holder for parameters that are loaded at most once
///
/// Concurrent first callers block while a single loader runs. A failed load
/// leaves the cache empty so a later call can try again.
#[derive(Debug, Default)]
pub struct ModelCache {
    slot: Mutex<Option<Arc<ModelParameters>>>,
}

impl ModelCache {
    /// Empty cache (usable in a `static`)
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Cached parameters, or the result of running `load` exactly once
    pub fn get_or_load<F>(&self, load: F) -> ModelLoadResult<Arc<ModelParameters>>
    where
        F: FnOnce() -> ModelLoadResult<ModelParameters>,
    {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(params) = slot.as_ref() {
            return Ok(Arc::clone(params));
        }
        let params = Arc::new(load()?);
        *slot = Some(Arc::clone(&params));
        Ok(params)
    }

    /// Cached parameters, or load them from a JSON file
    pub fn get_or_load_path(&self, path: impl AsRef<Path>) -> ModelLoadResult<Arc<ModelParameters>> {
        self.get_or_load(|| ModelParameters::from_path(path))
    }

    /// Currently cached parameters, without loading
    pub fn get(&self) -> Option<Arc<ModelParameters>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the cached parameters
    pub fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": "2024-06",
        "weight": {"redundancy": 2.0, "adjacent": -1.5},
        "bias": 0.25,
        "mean": {"redundancy": 0.1},
        "std": {"redundancy": 0.05}
    }"#;

    #[test]
    fn test_parse_sample() {
        let params = ModelParameters::from_json_str(SAMPLE).unwrap();
        assert_eq!(params.version(), Some("2024-06"));
        assert_eq!(params.bias(), 0.25);
        assert_eq!(params.weight_of("adjacent"), -1.5);
        assert_eq!(params.weight_of("tpi"), 0.0);
        assert_eq!(params.mean_of("adjacent"), 0.0);
        assert_eq!(params.std_of("adjacent"), 1.0);
    }

    #[test]
    fn test_normalize() {
        let params = ModelParameters::from_json_str(SAMPLE).unwrap();
        assert!((params.normalize("redundancy", 0.2) - 2.0).abs() < 1e-12);
        assert_eq!(params.normalize("adjacent", 0.4), 0.4);
    }

    #[test]
    fn test_zero_std_centers_only() {
        let params = ModelParameters::new(BTreeMap::new(), 0.0)
            .with_mean(BTreeMap::from([("tpi".to_string(), 0.5)]))
            .with_std(BTreeMap::from([("tpi".to_string(), 0.0)]));
        assert_eq!(params.normalize("tpi", 0.75), 0.25);
    }

    #[test]
    fn test_missing_bias() {
        let err = ModelParameters::from_json_str(r#"{"weight": {}}"#).unwrap_err();
        assert!(matches!(err, ModelLoadError::MissingField { ref field } if field == "bias"));
    }

    #[test]
    fn test_missing_weight() {
        let err = ModelParameters::from_json_str(r#"{"bias": 1.0}"#).unwrap_err();
        assert!(matches!(err, ModelLoadError::MissingField { ref field } if field == "weight"));
    }

    #[test]
    fn test_non_numeric_weight() {
        let err =
            ModelParameters::from_json_str(r#"{"weight": {"tpi": "high"}, "bias": 0}"#).unwrap_err();
        match err {
            ModelLoadError::NonNumeric { field, key } => {
                assert_eq!(field, "weight");
                assert_eq!(key, "tpi");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_bias() {
        let err = ModelParameters::from_json_str(r#"{"weight": {}, "bias": "0"}"#).unwrap_err();
        assert!(matches!(err, ModelLoadError::NonNumeric { .. }));
    }

    #[test]
    fn test_syntax_error() {
        let err = ModelParameters::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ModelLoadError::Parse { .. }));
    }

    #[test]
    fn test_unknown_features() {
        let params = ModelParameters::from_json_str(
            r#"{"weight": {"tpi": 1, "step5_trans_0_to_1": 1, "tpii": 1}, "bias": 0}"#,
        )
        .unwrap();
        let unknown = params.unknown_features(&FeatureSchema::new(4));
        assert_eq!(unknown, vec!["step5_trans_0_to_1".to_string(), "tpii".to_string()]);
        assert_eq!(params.unknown_features(&FeatureSchema::new(5)), vec!["tpii".to_string()]);
    }

    #[test]
    fn test_cache_failed_load_leaves_slot_empty() {
        let cache = ModelCache::new();
        let err = cache.get_or_load(|| ModelParameters::from_json_str("[]"));
        assert!(err.is_err());
        assert!(cache.get().is_none());

        let params = cache
            .get_or_load(|| ModelParameters::from_json_str(SAMPLE))
            .unwrap();
        let again = cache
            .get_or_load(|| panic!("loader must not run twice"))
            .unwrap();
        assert!(Arc::ptr_eq(&params, &again));

        cache.clear();
        assert!(cache.get().is_none());
    }
}
