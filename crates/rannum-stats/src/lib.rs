//! rannum-stats - Statistical primitives for digit sequence analysis
//!
//! This crate provides the small numeric building blocks used by the
//! rannum feature engine:
//!
//! - **Summary**: count, mean and sample standard deviation
//! - **Entropy**: Shannon entropy and redundancy of a symbol distribution
//! - **Uniformity**: chi-square statistic against a uniform expectation
//! - **Autocorrelation**: lag-1 serial correlation
//!
//! # Degenerate inputs
//!
//! Every function returns a finite value for empty or constant input.
//! Callers downstream (logistic scoring) must never see NaN or infinity,
//! so the fallbacks are documented per function instead of surfacing
//! errors.

pub mod entropy;
pub mod summary;
pub mod uniformity;

pub use entropy::*;
pub use summary::*;
pub use uniformity::*;

// Setup UniFFI when the feature is enabled
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
