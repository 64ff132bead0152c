use serde::{Deserialize, Serialize};

use crate::error::SplitMergeError;

/// Tuning for the single-observation split-merge strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SplitMergeConfig {
    /// Exponent in (0, 1] applied to component densities before
    /// allocation probabilities are normalized. Values near 1 favor splits,
    /// values near 0 favor merges.
    pub annealing_factor: f64,
    /// Length of the posterior chain used to draw parameters for a newly
    /// seeded component.
    pub posterior_sampling_steps: usize,
}

impl Default for SplitMergeConfig {
    fn default() -> Self {
        Self {
            annealing_factor: 1.0,
            posterior_sampling_steps: 10,
        }
    }
}

impl SplitMergeConfig {
    /// # Errors
    /// `InvalidArgument` if the annealing factor lies outside (0, 1] or no
    /// posterior sampling steps are requested.
    pub fn validate(&self) -> Result<(), SplitMergeError> {
        if !(self.annealing_factor > 0.0 && self.annealing_factor <= 1.0) {
            return Err(SplitMergeError::InvalidArgument(format!(
                "annealing_factor must lie in (0, 1], got {}",
                self.annealing_factor
            )));
        }
        if self.posterior_sampling_steps == 0 {
            return Err(SplitMergeError::InvalidArgument(
                "posterior_sampling_steps must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
