//! Seeded bootstrap ensemble of ridge regressors

use crate::error::{ForecastError, Result};
use crate::models::ridge::{RidgeRegression, DEFAULT_LAMBDA};
use crate::models::Predictor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default number of ensemble members
pub const DEFAULT_ESTIMATORS: usize = 25;

/// Bootstrap-aggregated ridge regression.
///
/// Each member is fitted on a resample (with replacement) of the training
/// set drawn from a seeded RNG, and predictions are averaged across
/// members. Same inputs + same seed ⇒ same outputs. Training cost scales
/// with sample count × estimator count.
#[derive(Debug, Clone)]
pub struct BaggedRidge {
    /// Name of the model
    name: String,
    /// Number of ensemble members
    n_estimators: usize,
    /// L2 penalty handed to each member
    lambda: f64,
    /// RNG seed for bootstrap resampling
    seed: u64,
    /// Trained members; empty until trained
    members: Vec<RidgeRegression>,
}

impl BaggedRidge {
    /// Create a new bagged ridge ensemble
    pub fn new(n_estimators: usize, lambda: f64, seed: u64) -> Result<Self> {
        if n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "Ensemble needs at least one estimator".to_string(),
            ));
        }
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Lambda must be a non-negative finite number".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Bagged Ridge (estimators={}, seed={})", n_estimators, seed),
            n_estimators,
            lambda,
            seed,
            members: Vec::new(),
        })
    }

    /// Create an ensemble with default size and penalty
    pub fn with_seed(seed: u64) -> Self {
        Self {
            name: format!(
                "Bagged Ridge (estimators={}, seed={})",
                DEFAULT_ESTIMATORS, seed
            ),
            n_estimators: DEFAULT_ESTIMATORS,
            lambda: DEFAULT_LAMBDA,
            seed,
            members: Vec::new(),
        }
    }

    /// Whether the ensemble has been trained
    pub fn is_trained(&self) -> bool {
        !self.members.is_empty()
    }
}

impl Predictor for BaggedRidge {
    fn train(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        if features.is_empty() {
            return Err(ForecastError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        if features.len() != targets.len() {
            return Err(ForecastError::InvalidSeriesShape(format!(
                "feature rows ({}) don't match targets ({})",
                features.len(),
                targets.len()
            )));
        }

        let n = features.len();
        let mut members = Vec::with_capacity(self.n_estimators);

        for index in 0..self.n_estimators {
            // One RNG stream per member keeps resamples independent of
            // estimator count changes elsewhere in the ensemble
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(index as u64));

            let mut resampled_features = Vec::with_capacity(n);
            let mut resampled_targets = Vec::with_capacity(n);
            for _ in 0..n {
                let pick = rng.gen_range(0..n);
                resampled_features.push(features[pick].clone());
                resampled_targets.push(targets[pick]);
            }

            let mut member = RidgeRegression::new(self.lambda)?;
            member.train(&resampled_features, &resampled_targets)?;
            members.push(member);
        }

        self.members = members;
        Ok(())
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>> {
        if self.members.is_empty() {
            return Err(ForecastError::PredictorFailure(
                "ensemble has not been trained".to_string(),
            ));
        }

        let mut totals = vec![0.0; features.len()];
        for member in &self.members {
            let predictions = member.predict(features)?;
            for (total, prediction) in totals.iter_mut().zip(predictions.iter()) {
                *total += prediction;
            }
        }

        let count = self.members.len() as f64;
        Ok(totals.into_iter().map(|total| total / count).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
