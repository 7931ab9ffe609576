//! Explanation of a prediction
//!
//! The interpreter ranks per-feature contributions, evaluates threshold
//! rules against raw feature values and maps the verdict to a feedback
//! tier. It never produces user-facing text; the tier and warning kinds are
//! identifiers for the presentation layer to render.

use serde::{Deserialize, Serialize};

use crate::checker::RandomnessReport;
use crate::error::ConfigError;
use crate::features::FeatureVector;
use crate::model::ModelParameters;
use crate::schema::{FeatureKey, StatFeature};
use crate::scoring::{contributions, FeatureContribution, Label, Prediction};

/// Default number of ranked contributions kept
pub const DEFAULT_TOP_K: usize = 10;

/// Qualitative observation about a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Some digits are strongly favoured
    HighRedundancy,
    /// Many consecutive digits differ by at most one
    SequentialSteps,
    /// Distances between repeated digits vary a lot
    IrregularRepetition,
    /// Neighbouring digits are correlated
    SerialCorrelation,
    /// Most and least frequent digits are far apart
    FrequencyImbalance,
}

/// Condition on a raw feature value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Bound {
    /// `value > threshold`
    Above { threshold: f64 },
    /// `value < threshold`
    Below { threshold: f64 },
    /// `|value| > threshold`
    AbsAbove { threshold: f64 },
}

impl Bound {
    /// Check whether a value breaks the bound
    pub fn is_violated(&self, value: f64) -> bool {
        match *self {
            Bound::Above { threshold } => value > threshold,
            Bound::Below { threshold } => value < threshold,
            Bound::AbsAbove { threshold } => value.abs() > threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        match *self {
            Bound::Above { threshold } | Bound::Below { threshold } | Bound::AbsAbove { threshold } => {
                threshold
            }
        }
    }
}

/// Emit `kind` when the raw value of `feature` breaks `bound`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningRule {
    pub feature: String,
    pub kind: WarningKind,
    pub bound: Bound,
}

impl WarningRule {
    pub fn new(feature: impl Into<String>, bound: Bound, kind: WarningKind) -> Self {
        Self {
            feature: feature.into(),
            bound,
            kind,
        }
    }

    /// Evaluate the rule, `None` when it does not fire or the feature is absent
    pub fn evaluate(&self, features: &FeatureVector) -> Option<Warning> {
        let value = features.get(&self.feature)?;
        self.bound.is_violated(value).then(|| Warning {
            kind: self.kind,
            feature: self.feature.clone(),
            value,
            threshold: self.bound.threshold(),
        })
    }

    /// Rules applied when the caller does not supply any
    pub fn defaults() -> Vec<WarningRule> {
        vec![
            WarningRule::new(
                StatFeature::Redundancy.name(),
                Bound::Above { threshold: 0.8 },
                WarningKind::HighRedundancy,
            ),
            WarningRule::new(
                StatFeature::Adjacent.name(),
                Bound::Above { threshold: 0.3 },
                WarningKind::SequentialSteps,
            ),
            WarningRule::new(
                StatFeature::RepetitionGapStd.name(),
                Bound::Above { threshold: 10.0 },
                WarningKind::IrregularRepetition,
            ),
            WarningRule::new(
                StatFeature::AutocorrLag1.name(),
                Bound::AbsAbove { threshold: 0.15 },
                WarningKind::SerialCorrelation,
            ),
            WarningRule::new(
                StatFeature::MaxMinRatio.name(),
                Bound::Above { threshold: 2.5 },
                WarningKind::FrequencyImbalance,
            ),
        ]
    }
}

/// A rule that fired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct Warning {
    pub kind: WarningKind,
    pub feature: String,
    pub value: f64,
    pub threshold: f64,
}

/// How decisive a verdict is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    Weak,
    Moderate,
    Strong,
}

/// Confidence cut-offs for the feedback bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceBands {
    /// Confidence above this is `Strong`
    pub strong: f64,
    /// Confidence above this (and not strong) is `Moderate`
    pub moderate: f64,
}

impl Default for ConfidenceBands {
    fn default() -> Self {
        Self {
            strong: 0.8,
            moderate: 0.6,
        }
    }
}

impl ConfidenceBands {
    /// Band of a confidence value
    pub fn band(&self, confidence: f64) -> ConfidenceBand {
        if confidence > self.strong {
            ConfidenceBand::Strong
        } else if confidence > self.moderate {
            ConfidenceBand::Moderate
        } else {
            ConfidenceBand::Weak
        }
    }

    /// Validate band cut-offs
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("strong", self.strong), ("moderate", self.moderate)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange(format!(
                    "{} band must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }
        if self.strong <= self.moderate {
            return Err(ConfigError::InvalidThresholds(
                "strong band must be greater than moderate band".to_string(),
            ));
        }
        Ok(())
    }
}

/// Identifier of the feedback the presentation layer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FeedbackTier {
    pub label: Label,
    pub band: ConfidenceBand,
}

/// Interpreter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    /// Number of ranked contributions kept
    pub top_k: usize,
    pub bands: ConfidenceBands,
    pub rules: Vec<WarningRule>,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            bands: ConfidenceBands::default(),
            rules: WarningRule::defaults(),
        }
    }
}

impl ExplainConfig {
    /// Validate bands and rule feature names
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bands.validate()?;
        for rule in &self.rules {
            if FeatureKey::parse(&rule.feature).is_none() {
                return Err(ConfigError::OutOfRange(format!(
                    "warning rule references unknown feature '{}'",
                    rule.feature
                )));
            }
            if !rule.bound.threshold().is_finite() {
                return Err(ConfigError::OutOfRange(format!(
                    "threshold for '{}' must be finite",
                    rule.feature
                )));
            }
        }
        Ok(())
    }
}

/// Everything the presentation layer needs to explain a verdict
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    /// Largest contributions first
    pub ranked: Vec<FeatureContribution>,
    pub warnings: Vec<Warning>,
    pub tier: FeedbackTier,
    /// Bounds-table check, present for Human verdicts when a table is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub randomness: Option<RandomnessReport>,
}

/// Rank contributions by descending magnitude and keep the first `top_k`
///
/// Ties keep name order.
pub fn rank_contributions(
    mut contributions: Vec<FeatureContribution>,
    top_k: usize,
) -> Vec<FeatureContribution> {
    contributions.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
    contributions.truncate(top_k);
    contributions
}

/// Explains predictions under a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    config: ExplainConfig,
}

impl Interpreter {
    pub fn new(config: ExplainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExplainConfig {
        &self.config
    }

    /// Explain a prediction made from `features` with `params`
    pub fn explain(
        &self,
        prediction: &Prediction,
        features: &FeatureVector,
        params: &ModelParameters,
    ) -> Explanation {
        let ranked = rank_contributions(contributions(features, params), self.config.top_k);
        let warnings = self
            .config
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(features))
            .collect();
        let tier = FeedbackTier {
            label: prediction.label,
            band: self.config.bands.band(prediction.confidence),
        };

        Explanation {
            ranked,
            warnings,
            tier,
            randomness: None,
        }
    }
}

/// Explain with default rules and bands
pub fn explain(
    prediction: &Prediction,
    features: &FeatureVector,
    params: &ModelParameters,
    top_k: usize,
) -> Explanation {
    Interpreter::new(ExplainConfig {
        top_k,
        ..ExplainConfig::default()
    })
    .explain(prediction, features, params)
}
