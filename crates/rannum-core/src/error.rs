//! Error types for rannum-core
//!
//! Only two conditions are real failures:
//! - Malformed input sequences
//! - Malformed model parameter artifacts
//!
//! Configuration and bounds-table errors cover the optional collaborators.
//! Numeric degeneracies (empty statistics, zero variance) are never errors.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for classification
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The digit sequence was rejected
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Model parameters could not be loaded or do not fit the schema
    #[error("Failed to load model parameters: {0}")]
    ModelLoad(#[from] ModelLoadError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Bounds table errors
    #[error("Bounds table error: {0}")]
    Bounds(#[from] BoundsError),
}

/// Errors related to the input digit sequence
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInputError {
    /// Classification needs at least one digit
    #[error("Sequence is empty")]
    Empty,

    /// A value outside 0-9
    #[error("Value {value} at index {index} is not a digit (expected 0-9)")]
    DigitOutOfRange { index: usize, value: i64 },
}

/// Errors related to loading the parameter artifact
#[derive(Error, Debug)]
pub enum ModelLoadError {
    /// Artifact could not be read
    #[error("Failed to read model parameters from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact is not valid JSON or has the wrong shape
    #[error("Malformed model parameters: {message}")]
    Parse { message: String },

    /// Required top-level collection is absent
    #[error("Model parameters are missing required field '{field}'")]
    MissingField { field: String },

    /// A value that must be a number is not
    #[error("Non-numeric value in '{field}' for key '{key}'")]
    NonNumeric { field: String, key: String },

    /// Weight table names features the schema cannot produce
    #[error("Weight table references unknown features: {}", names.join(", "))]
    UnknownFeature { names: Vec<String> },
}

/// Configuration validation error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Threshold values are invalid relative to each other
    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// TOML or JSON could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Errors related to the randomness bounds table
#[derive(Error, Debug)]
pub enum BoundsError {
    /// File could not be opened
    #[error("Failed to read bounds table from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Row could not be parsed
    #[error("Bounds table parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Only 95% and 99% bounds are tabulated
    #[error("Unsupported confidence level: {0} (expected 95 or 99)")]
    UnsupportedLevel(u8),
}

/// Result type alias for classification
pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Result type alias for parameter loading
pub type ModelLoadResult<T> = Result<T, ModelLoadError>;
