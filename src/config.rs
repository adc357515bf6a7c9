//! Run configuration.
//!
//! Every field is required: the engine bakes in no defaults, so a config
//! file or caller must state the hour target, seed, weights and trial count
//! explicitly. Deserialization fails on a missing field.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Weights of the greedy scoring components.
///
/// See `scheduler::scoring` for how each weight enters the score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    /// Weight of the fill fraction (load balancing across sessions).
    pub occupancy: f64,
    /// Weight of the same-class/major share (clustering reward).
    pub class: f64,
    /// Weight of the roster heterogeneity (mixing penalty).
    pub hetero: f64,
    /// Weight of the week distance to the student's other sessions.
    pub spread: f64,
    /// Weight of reusing a weekday/period combination.
    pub slot: f64,
}

impl Weights {
    /// Creates a weight set.
    pub fn new(occupancy: f64, class: f64, hetero: f64, spread: f64, slot: f64) -> Self {
        Self {
            occupancy,
            class,
            hetero,
            spread,
            slot,
        }
    }

    /// All weights zero: every candidate scores the same and the first
    /// feasible session in input order wins.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0)
    }

    /// Rejects NaN, infinite and negative weights.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("occupancy", self.occupancy),
            ("class", self.class),
            ("hetero", self.hetero),
            ("spread", self.spread),
            ("slot", self.slot),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteWeight { name, value });
            }
            if value < 0.0 {
                return Err(ConfigError::NegativeWeight { name, value });
            }
        }
        Ok(())
    }
}

/// Configuration of one roster run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hour target for students without their own.
    pub required_hours: u32,
    /// Seed of the pseudo-random stream (ordering and swap sampling).
    pub seed: u64,
    /// Scoring weights.
    pub weights: Weights,
    /// Number of swap trials after construction. 0 disables the optimizer.
    pub swap_iterations: usize,
}

impl EngineConfig {
    /// Creates a configuration.
    pub fn new(required_hours: u32, seed: u64, weights: Weights, swap_iterations: usize) -> Self {
        Self {
            required_hours,
            seed,
            weights,
            swap_iterations,
        }
    }

    /// Sets the default hour target.
    pub fn with_required_hours(mut self, hours: u32) -> Self {
        self.required_hours = hours;
        self
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the weights.
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the swap trial count.
    pub fn with_swap_iterations(mut self, iterations: usize) -> Self {
        self.swap_iterations = iterations;
        self
    }

    /// Checks the weights.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()
    }
}
