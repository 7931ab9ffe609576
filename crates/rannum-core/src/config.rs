//! Configuration for rannum-core
//!
//! Groups the feature extraction, explanation and schema-check settings.
//! Every field has a default, so a partial TOML or JSON document is valid.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::features::FeatureConfig;
use crate::interpret::ExplainConfig;

/// Classifier configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Reject parameters whose weights name features the schema cannot produce
    pub strict_schema: bool,
    /// Feature extraction settings
    pub features: FeatureConfig,
    /// Ranking, warning rules and confidence bands
    pub explain: ExplainConfig,
}

impl ClassifierConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with the 4-step feature set
    pub fn lightweight() -> Self {
        Self {
            features: FeatureConfig::lightweight(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.features.validate()?;
        self.explain.validate()?;
        Ok(())
    }
}
