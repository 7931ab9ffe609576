//! UniFFI bindings for rannum-core.
//!
//! Exposes a classifier handle to Swift and Kotlin. The handle owns its
//! parameters; the UI collaborator passes the artifact JSON once and then
//! classifies digit arrays.

use std::sync::Arc;

use crate::checker::{Assessment, BoundsTable, ConfidenceLevel};
use crate::classifier::Classifier;
use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use crate::interpret::{FeedbackTier, Warning};
use crate::model::ModelParameters;
use crate::scoring::{FeatureContribution, Prediction};
use crate::sequence::DigitSequence;

/// Error type for the classifier handle, exposed via UniFFI.
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FfiClassifierError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
    #[error("Model parameters: {message}")]
    ModelLoad { message: String },
    #[error("Configuration: {message}")]
    Config { message: String },
    #[error("Bounds table: {message}")]
    Bounds { message: String },
}

impl From<ClassifierError> for FfiClassifierError {
    fn from(e: ClassifierError) -> Self {
        match e {
            ClassifierError::InvalidInput(e) => FfiClassifierError::InvalidInput {
                message: e.to_string(),
            },
            ClassifierError::ModelLoad(e) => FfiClassifierError::ModelLoad {
                message: e.to_string(),
            },
            ClassifierError::Config(e) => FfiClassifierError::Config {
                message: e.to_string(),
            },
            ClassifierError::Bounds(e) => FfiClassifierError::Bounds {
                message: e.to_string(),
            },
        }
    }
}

/// FFI-safe randomness assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiAssessment {
    HighlyLikelyRandom,
    LikelyRandom,
    PossiblyRandom,
    PossiblyNonRandom,
    LikelyNonRandom,
}

impl From<Assessment> for FfiAssessment {
    fn from(a: Assessment) -> Self {
        match a {
            Assessment::HighlyLikelyRandom => FfiAssessment::HighlyLikelyRandom,
            Assessment::LikelyRandom => FfiAssessment::LikelyRandom,
            Assessment::PossiblyRandom => FfiAssessment::PossiblyRandom,
            Assessment::PossiblyNonRandom => FfiAssessment::PossiblyNonRandom,
            Assessment::LikelyNonRandom => FfiAssessment::LikelyNonRandom,
        }
    }
}

/// Summary of a bounds-table check.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRandomnessSummary {
    pub randomness_score: f64,
    pub assessment: FfiAssessment,
    pub outlier_metrics: Vec<String>,
    pub severe_outlier_count: u32,
}

/// Result of classifying one sequence.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClassification {
    pub prediction: Prediction,
    pub ranked: Vec<FeatureContribution>,
    pub warnings: Vec<Warning>,
    pub tier: FeedbackTier,
    pub randomness: Option<FfiRandomnessSummary>,
}

/// Classifier bound to one parameter artifact.
#[derive(uniffi::Object)]
pub struct ClassifierHandle {
    classifier: Classifier,
}

#[uniffi::export]
impl ClassifierHandle {
    /// Create a handle with the default configuration
    #[uniffi::constructor]
    pub fn new(params_json: String) -> Result<Arc<Self>, FfiClassifierError> {
        Self::build(&params_json, ClassifierConfig::default(), None)
    }

    /// Create a handle with a TOML configuration
    #[uniffi::constructor]
    pub fn with_config(
        params_json: String,
        config_toml: String,
    ) -> Result<Arc<Self>, FfiClassifierError> {
        let config = ClassifierConfig::from_toml(&config_toml).map_err(ClassifierError::from)?;
        Self::build(&params_json, config, None)
    }

    /// Create a handle that also checks Human verdicts against a bounds table (CSV text)
    #[uniffi::constructor]
    pub fn with_bounds(
        params_json: String,
        bounds_csv: String,
    ) -> Result<Arc<Self>, FfiClassifierError> {
        let table = BoundsTable::from_reader(bounds_csv.as_bytes()).map_err(ClassifierError::from)?;
        Self::build(&params_json, ClassifierConfig::default(), Some(table))
    }

    /// Classify a digit array
    pub fn classify(&self, digits: Vec<u8>) -> Result<FfiClassification, FfiClassifierError> {
        let sequence = DigitSequence::new(digits).map_err(ClassifierError::from)?;
        let (prediction, explanation) = self.classifier.classify(&sequence)?;

        let randomness = explanation.randomness.map(|report| FfiRandomnessSummary {
            randomness_score: report.randomness_score,
            assessment: report.assessment.into(),
            severe_outlier_count: report.severe_outlier_count() as u32,
            outlier_metrics: report.outliers.into_iter().map(|o| o.metric).collect(),
        });

        Ok(FfiClassification {
            prediction,
            ranked: explanation.ranked,
            warnings: explanation.warnings,
            tier: explanation.tier,
            randomness,
        })
    }

    /// Number of features the handle computes per sequence
    pub fn feature_count(&self) -> u32 {
        self.classifier.schema().len() as u32
    }

    /// Version tag of the loaded parameters
    pub fn model_version(&self) -> Option<String> {
        self.classifier.params().version().map(str::to_string)
    }
}

/// Private helpers (not exported via UniFFI).
impl ClassifierHandle {
    fn build(
        params_json: &str,
        config: ClassifierConfig,
        bounds: Option<BoundsTable>,
    ) -> Result<Arc<Self>, FfiClassifierError> {
        let params = ModelParameters::from_json_str(params_json).map_err(ClassifierError::from)?;
        let mut classifier = Classifier::new(Arc::new(params), config)?;
        if let Some(table) = bounds {
            classifier = classifier.with_bounds(table, ConfidenceLevel::P95);
        }
        Ok(Arc::new(Self { classifier }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: &str = r#"{"version": "v1", "weight": {"adjacent": 3.0}, "bias": -0.5}"#;

    #[test]
    fn test_handle_classifies() {
        let handle = ClassifierHandle::new(PARAMS.to_string()).unwrap();
        assert_eq!(handle.feature_count(), 527);
        assert_eq!(handle.model_version().as_deref(), Some("v1"));

        let result = handle.classify(vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(result.ranked.len(), 1);
        assert!(result.randomness.is_none());
    }

    #[test]
    fn test_handle_errors() {
        assert!(matches!(
            ClassifierHandle::new("{}".to_string()),
            Err(FfiClassifierError::ModelLoad { .. })
        ));
        let handle = ClassifierHandle::new(PARAMS.to_string()).unwrap();
        assert!(matches!(
            handle.classify(vec![]),
            Err(FfiClassifierError::InvalidInput { .. })
        ));
        assert!(matches!(
            handle.classify(vec![11]),
            Err(FfiClassifierError::InvalidInput { .. })
        ));
    }
}
