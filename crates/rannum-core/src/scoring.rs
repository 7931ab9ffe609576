//! Logistic scoring of feature vectors

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::model::ModelParameters;

/// Raw scores are clamped to this magnitude before the logistic
pub const SCORE_CLAMP: f64 = 500.0;

/// Likely origin of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// Produced by a person
    Human,
    /// Produced by a pseudo-random generator
    Machine,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Human => write!(f, "human"),
            Label::Machine => write!(f, "machine"),
        }
    }
}

/// Model verdict for one sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct Prediction {
    /// Linear score before the logistic, clamped to [-500, 500]
    pub raw_score: f64,
    /// Probability of the Human class
    pub probability: f64,
    pub label: Label,
    /// `|probability - 0.5| * 2`
    pub confidence: f64,
}

impl Prediction {
    /// Build a prediction from an unclamped linear score
    pub fn from_score(score: f64) -> Self {
        let raw_score = if score.is_nan() {
            0.0
        } else {
            score.clamp(-SCORE_CLAMP, SCORE_CLAMP)
        };
        let probability = logistic(raw_score);
        let label = if probability > 0.5 {
            Label::Human
        } else {
            Label::Machine
        };
        Self {
            raw_score,
            probability,
            label,
            confidence: (probability - 0.5).abs() * 2.0,
        }
    }
}

/// Standard logistic function
pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Per-feature term of the linear score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FeatureContribution {
    pub name: String,
    pub raw_value: f64,
    pub normalized_value: f64,
    pub weight: f64,
    /// `weight * normalized_value`
    pub contribution: f64,
}

/// Contributions of every weighted feature present in the vector, in name order
pub fn contributions(features: &FeatureVector, params: &ModelParameters) -> Vec<FeatureContribution> {
    params
        .weights()
        .iter()
        .filter_map(|(name, &weight)| {
            let raw_value = features.get(name)?;
            let normalized_value = params.normalize(name, raw_value);
            Some(FeatureContribution {
                name: name.clone(),
                raw_value,
                normalized_value,
                weight,
                contribution: weight * normalized_value,
            })
        })
        .collect()
}

/// Score a feature vector with the given parameters
///
/// Weight names the vector does not contain contribute nothing.
pub fn predict(features: &FeatureVector, params: &ModelParameters) -> Prediction {
    let score = contributions(features, params)
        .iter()
        .fold(params.bias(), |acc, c| acc + c.contribution);
    Prediction::from_score(score)
}

/// Logistic model bound to shared parameters
#[derive(Debug, Clone)]
pub struct ScoringModel {
    params: Arc<ModelParameters>,
}

impl ScoringModel {
    pub fn new(params: Arc<ModelParameters>) -> Self {
        Self { params }
    }

    /// Parameters in use
    pub fn params(&self) -> &Arc<ModelParameters> {
        &self.params
    }

    /// Score a feature vector
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        predict(features, &self.params)
    }

    /// Per-feature contributions for a feature vector
    pub fn contributions(&self, features: &FeatureVector) -> Vec<FeatureContribution> {
        contributions(features, &self.params)
    }
}
