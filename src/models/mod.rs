//! Regression predictors backing the forecasting pipeline

use crate::error::Result;
use std::fmt::Debug;

/// Regression capability consumed by the forecasting pipeline.
///
/// Implementations must be deterministic for a given configuration and
/// seed: same inputs ⇒ same outputs. The pipeline isolates any error an
/// implementation returns and degrades to the average-based fallback, so
/// implementations are free to fail rather than guess.
pub trait Predictor: Debug {
    /// Fit the model to a supervised dataset
    fn train(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()>;

    /// Predict a target for each feature row
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod ensemble;
pub mod ridge;

pub use ensemble::BaggedRidge;
pub use ridge::RidgeRegression;
