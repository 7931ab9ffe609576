//! rannum-core - Human vs. machine classification of digit sequences
//!
//! Given a finite sequence of decimal digits, rannum estimates whether a
//! person typed it or a pseudo-random generator produced it, and explains
//! the verdict.
//!
//! # Pipeline
//!
//! - **FeatureEngine**: digit sequence → fixed-schema feature vector
//!   (27 statistical features plus 100 transition probabilities per step)
//! - **ScoringModel**: feature vector + fitted parameters → logistic prediction
//! - **Interpreter**: ranked contributions, threshold warnings, feedback tier
//! - **RandomnessChecker**: optional comparison with a table of expected
//!   metric ranges for generator output
//!
//! Every stage is a pure function. Parameters are loaded once and shared
//! through `Arc`; see [`ModelCache`] for single-flight loading.
//!
//! ```no_run
//! use std::sync::Arc;
//! use rannum_core::{Classifier, ClassifierConfig, ModelParameters};
//!
//! let params = ModelParameters::from_path("model_params.json")?;
//! let classifier = Classifier::new(Arc::new(params), ClassifierConfig::default())?;
//! let (prediction, explanation) = classifier.classify_digits(&[3, 1, 4, 1, 5, 9, 2, 6])?;
//! println!("{} ({:.2})", prediction.label, prediction.probability);
//! for c in &explanation.ranked {
//!     println!("{:>24} {:+.3}", c.name, c.contribution);
//! }
//! # Ok::<(), rannum_core::ClassifierError>(())
//! ```

pub mod checker;
pub mod classifier;
pub mod config;
pub mod error;
pub mod features;
pub mod interpret;
pub mod model;
pub mod schema;
pub mod scoring;
pub mod sequence;

#[cfg(feature = "uniffi")]
pub mod ffi;

pub use checker::{
    Assessment, BoundsTable, ConfidenceLevel, Direction, MetricBounds, Outlier, RandomnessChecker,
    RandomnessReport, Severity, WithinBounds,
};
pub use classifier::{classify, Classifier};
pub use config::ClassifierConfig;
pub use error::{
    BoundsError, ClassifierError, ClassifierResult, ConfigError, InvalidInputError, ModelLoadError,
    ModelLoadResult,
};
pub use features::{
    extract, AdjacencyPolicy, FeatureConfig, FeatureEngine, FeatureVector, TransitionNormalization,
};
pub use interpret::{
    explain, Bound, ConfidenceBand, ConfidenceBands, ExplainConfig, Explanation, FeedbackTier,
    Interpreter, Warning, WarningKind, WarningRule,
};
pub use model::{load_model_parameters, ModelCache, ModelParameters};
pub use schema::{FeatureKey, FeatureSchema, StatFeature};
pub use scoring::{predict, FeatureContribution, Label, Prediction, ScoringModel};
pub use sequence::DigitSequence;

#[cfg(feature = "uniffi")]
pub use ffi::{ClassifierHandle, FfiClassification, FfiClassifierError};

// Setup UniFFI when the feature is enabled
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
