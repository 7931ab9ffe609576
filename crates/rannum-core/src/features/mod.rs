//! Feature extraction: digit sequence → fixed-schema feature vector
//!
//! The engine is a pure function of the sequence and a [`FeatureConfig`].
//! The output always holds every key of the configured
//! [`FeatureSchema`], zero-filled where the sequence is too short for a
//! statistic to be defined.

pub mod statistical;
pub mod transition;

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ConfigError;
use crate::schema::{FeatureKey, FeatureSchema, StatFeature, STAT_FEATURE_COUNT};
use crate::sequence::DigitSequence;

/// Transition steps computed by the lightweight model
pub const LIGHTWEIGHT_MAX_STEP: usize = 4;

/// Transition steps computed by the full model
pub const FULL_MAX_STEP: usize = 5;

/// Largest transition step the engine accepts
pub const MAX_SUPPORTED_STEP: usize = 10;

/// Which consecutive digit pairs count towards the `adjacent` feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyPolicy {
    /// `|a - b| <= 1` (repeats included)
    #[default]
    WithinOne,
    /// `|a - b| == 1`
    ExactlyOne,
}

impl AdjacencyPolicy {
    /// Check whether an absolute difference counts as adjacent
    pub fn is_adjacent(self, abs_diff: u8) -> bool {
        match self {
            AdjacencyPolicy::WithinOne => abs_diff <= 1,
            AdjacencyPolicy::ExactlyOne => abs_diff == 1,
        }
    }
}

/// How transition counts become probabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionNormalization {
    /// Divide each cell by its row total: P(next = j | current = i)
    #[default]
    PerRow,
    /// Divide each cell by the number of transitions examined (N - s)
    Total,
}

/// Feature extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Transition matrices are computed for steps `1..=max_step`
    pub max_step: usize,
    /// Policy for the `adjacent` feature
    pub adjacency: AdjacencyPolicy,
    /// Normalization of transition matrices
    pub transition_normalization: TransitionNormalization,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self::full()
    }
}

impl FeatureConfig {
    /// 4-step configuration (427 features)
    pub fn lightweight() -> Self {
        Self {
            max_step: LIGHTWEIGHT_MAX_STEP,
            adjacency: AdjacencyPolicy::default(),
            transition_normalization: TransitionNormalization::default(),
        }
    }

    /// 5-step configuration (527 features)
    pub fn full() -> Self {
        Self {
            max_step: FULL_MAX_STEP,
            adjacency: AdjacencyPolicy::default(),
            transition_normalization: TransitionNormalization::default(),
        }
    }

    /// Schema produced under this configuration
    pub fn schema(&self) -> FeatureSchema {
        FeatureSchema::new(self.max_step)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_step == 0 || self.max_step > MAX_SUPPORTED_STEP {
            return Err(ConfigError::OutOfRange(format!(
                "max_step must be between 1 and {}, got {}",
                MAX_SUPPORTED_STEP, self.max_step
            )));
        }
        Ok(())
    }
}

/// A total mapping from feature name to value for one schema
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f64>,
}

impl FeatureVector {
    /// All-zero vector for a schema
    pub fn zeros(schema: FeatureSchema) -> Self {
        Self {
            schema,
            values: vec![0.0; schema.len()],
        }
    }

    /// Replace the value of a key; keys outside the schema are ignored
    pub fn with(mut self, key: FeatureKey, value: f64) -> Self {
        if let Some(idx) = key.index(self.schema.max_step()) {
            self.values[idx] = value;
        }
        self
    }

    /// Schema of this vector
    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    /// Value of a named feature, `None` if the name is not in the schema
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.index_of(name).map(|idx| self.values[idx])
    }

    /// Value of a typed key, `None` if the key is not in the schema
    pub fn get_key(&self, key: FeatureKey) -> Option<f64> {
        key.index(self.schema.max_step()).map(|idx| self.values[idx])
    }

    /// Value of a statistical feature (always present)
    pub fn stat(&self, feature: StatFeature) -> f64 {
        self.values[feature.index()]
    }

    /// Transition probability `step{step}_trans_{from}_to_{to}`
    pub fn transition(&self, step: usize, from: u8, to: u8) -> Option<f64> {
        self.get_key(FeatureKey::Transition { step, from, to })
    }

    /// The 27 statistical values in schema order
    pub fn statistical(&self) -> &[f64] {
        &self.values[..STAT_FEATURE_COUNT]
    }

    /// All values in schema order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the vector has no features (never true for a valid schema)
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys and values in schema order
    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, f64)> + '_ {
        self.schema.keys().zip(self.values.iter().copied())
    }

    /// Name-keyed copy of the vector
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(&key.to_string(), &value)?;
        }
        map.end()
    }
}

/// Feature extraction engine
#[derive(Debug, Clone, Default)]
pub struct FeatureEngine {
    config: FeatureConfig,
}

impl FeatureEngine {
    /// Create an engine for a configuration
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Schema of the vectors this engine produces
    pub fn schema(&self) -> FeatureSchema {
        self.config.schema()
    }

    /// Compute every feature of the schema for a sequence
    ///
    /// Deterministic and side-effect free. Empty and single-digit sequences
    /// are valid and produce the documented fallback values.
    pub fn extract(&self, seq: &DigitSequence) -> FeatureVector {
        let schema = self.schema();
        let mut values = Vec::with_capacity(schema.len());
        values.extend(statistical::statistical_features(seq, self.config.adjacency));
        values.extend(transition::transition_features(
            seq.digits(),
            self.config.max_step,
            self.config.transition_normalization,
        ));
        debug_assert_eq!(values.len(), schema.len());

        FeatureVector { schema, values }
    }
}

/// Extract features with default policies and transition steps `1..=max_step`
pub fn extract(seq: &DigitSequence, max_step: usize) -> FeatureVector {
    FeatureEngine::new(FeatureConfig {
        max_step,
        ..FeatureConfig::default()
    })
    .extract(seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_total_schema() {
        let seq = DigitSequence::new(vec![3, 1, 4, 1, 5, 9, 2, 6]).unwrap();
        let features = extract(&seq, 4);
        assert_eq!(features.len(), 427);
        assert!(features.get("step4_trans_9_to_9").is_some());
        assert!(features.get("step5_trans_0_to_0").is_none());
        assert!(features.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_with_and_get() {
        let v = FeatureVector::zeros(FeatureSchema::new(1))
            .with(FeatureKey::Stat(StatFeature::Tpi), 0.5)
            .with(FeatureKey::Transition { step: 1, from: 2, to: 3 }, 0.25)
            .with(FeatureKey::Transition { step: 2, from: 0, to: 0 }, 9.0);
        assert_eq!(v.get("tpi"), Some(0.5));
        assert_eq!(v.transition(1, 2, 3), Some(0.25));
        assert_eq!(v.transition(2, 0, 0), None);
    }

    #[test]
    fn test_serialize_as_map() {
        let seq = DigitSequence::new(vec![1, 2]).unwrap();
        let features = extract(&seq, 1);
        let json = serde_json::to_value(&features).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 127);
        assert_eq!(obj["freq_1"], 0.5);
        assert_eq!(obj["step1_trans_1_to_2"], 1.0);
    }

    #[test]
    fn test_config_validation() {
        assert!(FeatureConfig::full().validate().is_ok());
        assert!(FeatureConfig::lightweight().validate().is_ok());
        let bad = FeatureConfig {
            max_step: 0,
            ..FeatureConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_adjacency_policy() {
        assert!(AdjacencyPolicy::WithinOne.is_adjacent(0));
        assert!(!AdjacencyPolicy::ExactlyOne.is_adjacent(0));
        assert!(AdjacencyPolicy::ExactlyOne.is_adjacent(1));
        assert!(!AdjacencyPolicy::WithinOne.is_adjacent(2));
    }
}
