//! Summary statistics for small samples
//!
//! Provides the location/spread summaries used by the feature engine:
//! - Mean and sample (n - 1) variance, standard deviation
//! - Lag-1 autocorrelation of a numeric series
//!
//! Unlike a general-purpose summary, empty input yields zeros rather than
//! NaN so that the values can flow straight into a feature vector.

use serde::{Deserialize, Serialize};

/// Mean and sample spread of a numeric dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    /// Number of values
    pub count: usize,
    /// Mean (average), 0 for an empty sample
    pub mean: f64,
    /// Sample variance with Bessel's correction, 0 when count < 2
    pub variance: f64,
    /// Sample standard deviation, 0 when count < 2
    pub std_dev: f64,
}

impl SampleSummary {
    /// Compute the summary of a sample
    pub fn from_data(data: &[f64]) -> Self {
        let count = data.len();
        if count == 0 {
            return Self::empty();
        }

        let mean = data.iter().sum::<f64>() / count as f64;

        let variance = if count > 1 {
            data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64
        } else {
            0.0
        };

        Self {
            count,
            mean,
            variance,
            std_dev: variance.sqrt(),
        }
    }

    /// Compute the summary of integer observations (gaps, counts, step lengths)
    pub fn from_counts(data: &[usize]) -> Self {
        let values: Vec<f64> = data.iter().map(|&x| x as f64).collect();
        Self::from_data(&values)
    }

    fn empty() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            variance: 0.0,
            std_dev: 0.0,
        }
    }

    /// Check if the summary was built from an empty sample
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Coefficient of variation (std_dev / |mean|), 0 when the mean is 0
    pub fn cv(&self) -> f64 {
        if self.mean == 0.0 {
            return 0.0;
        }
        self.std_dev / self.mean.abs()
    }
}

/// Lag-1 autocorrelation of a series
///
/// `sum((x[i] - mu) * (x[i+1] - mu)) / sum((x[i] - mu)^2)`
///
/// Returns 0 when the series has fewer than two values or zero variance.
pub fn lag1_autocorrelation(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }

    let mu = series.iter().sum::<f64>() / series.len() as f64;
    let denominator: f64 = series.iter().map(|x| (x - mu).powi(2)).sum();
    if denominator == 0.0 {
        return 0.0;
    }

    let numerator: f64 = series
        .windows(2)
        .map(|pair| (pair[0] - mu) * (pair[1] - mu))
        .sum();

    numerator / denominator
}
