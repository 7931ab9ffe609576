//! End-to-end classification
//!
//! Straight-line composition of feature extraction, scoring and
//! interpretation. A [`Classifier`] holds no mutable state and can be shared
//! across threads.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::checker::{BoundsTable, ConfidenceLevel, RandomnessChecker};
use crate::config::ClassifierConfig;
use crate::error::{ClassifierResult, InvalidInputError, ModelLoadError};
use crate::features::{FeatureEngine, FeatureVector};
use crate::interpret::{Explanation, Interpreter};
use crate::model::ModelParameters;
use crate::schema::FeatureSchema;
use crate::scoring::{Label, Prediction, ScoringModel};
use crate::sequence::DigitSequence;

/// Feature engine, scoring model and interpreter bound to one set of parameters
#[derive(Debug, Clone)]
pub struct Classifier {
    engine: FeatureEngine,
    model: ScoringModel,
    interpreter: Interpreter,
    checker: Option<RandomnessChecker>,
}

impl Classifier {
    /// Build a classifier, validating the configuration against the parameters
    ///
    /// Weight names the feature schema cannot produce are logged, or rejected
    /// when `strict_schema` is set.
    pub fn new(params: Arc<ModelParameters>, config: ClassifierConfig) -> ClassifierResult<Self> {
        config.validate()?;

        let schema = config.features.schema();
        let unknown = params.unknown_features(&schema);
        if !unknown.is_empty() {
            if config.strict_schema {
                return Err(ModelLoadError::UnknownFeature { names: unknown }.into());
            }
            warn!(
                count = unknown.len(),
                names = %unknown.join(", "),
                "Model weights reference features outside the schema; they will contribute 0"
            );
        }

        Ok(Self {
            engine: FeatureEngine::new(config.features),
            model: ScoringModel::new(params),
            interpreter: Interpreter::new(config.explain),
            checker: None,
        })
    }

    /// Classifier with the default configuration
    pub fn with_defaults(params: Arc<ModelParameters>) -> ClassifierResult<Self> {
        Self::new(params, ClassifierConfig::default())
    }

    /// Attach a bounds table; Human verdicts then carry a randomness report
    pub fn with_bounds(mut self, table: BoundsTable, level: ConfidenceLevel) -> Self {
        self.checker = Some(RandomnessChecker::new(table, level));
        self
    }

    pub fn params(&self) -> &Arc<ModelParameters> {
        self.model.params()
    }

    pub fn schema(&self) -> FeatureSchema {
        self.engine.schema()
    }

    /// Feature vector of a sequence under this classifier's configuration
    pub fn extract(&self, sequence: &DigitSequence) -> FeatureVector {
        self.engine.extract(sequence)
    }

    /// Classify a validated sequence
    pub fn classify(&self, sequence: &DigitSequence) -> ClassifierResult<(Prediction, Explanation)> {
        if sequence.is_empty() {
            return Err(InvalidInputError::Empty.into());
        }

        let features = self.engine.extract(sequence);
        let prediction = self.model.predict(&features);
        let mut explanation = self
            .interpreter
            .explain(&prediction, &features, self.model.params());

        if prediction.label == Label::Human {
            explanation.randomness = self.checker.as_ref().map(|c| c.check(&features));
        }

        debug!(
            len = sequence.len(),
            raw_score = prediction.raw_score,
            probability = prediction.probability,
            label = %prediction.label,
            "Classified sequence"
        );
        Ok((prediction, explanation))
    }

    /// Validate raw integers and classify them
    pub fn classify_digits(&self, values: &[i64]) -> ClassifierResult<(Prediction, Explanation)> {
        let sequence = DigitSequence::from_values(values)?;
        self.classify(&sequence)
    }
}

/// Classify a sequence with default settings
pub fn classify(
    sequence: &DigitSequence,
    params: &ModelParameters,
) -> ClassifierResult<(Prediction, Explanation)> {
    if sequence.is_empty() {
        return Err(InvalidInputError::Empty.into());
    }

    let features = FeatureEngine::default().extract(sequence);
    let prediction = crate::scoring::predict(&features, params);
    let explanation = Interpreter::default().explain(&prediction, &features, params);
    Ok((prediction, explanation))
}
