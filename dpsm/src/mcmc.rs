use rand::Rng;

use crate::error::SplitMergeError;

pub mod samplers;

/// Trait for Markov Chain Monte Carlo Samplers over models of data of type
/// `X`.
pub trait Sampler<M, X>: Sized {
    /// Step the Sampler.
    ///
    /// # Errors
    /// If the move cannot be carried out. Moves the sampler can recover from
    /// are skipped rather than reported.
    fn step<R: Rng>(&mut self, model: M, rng: &mut R) -> Result<M, SplitMergeError>;

    /// Warm-up the sampler
    ///
    /// # Errors
    /// On the first step that fails.
    fn multi_step<R: Rng>(
        &mut self,
        model: M,
        steps: usize,
        rng: &mut R,
    ) -> Result<M, SplitMergeError> {
        (0..steps).try_fold(model, |acc, _| self.step(acc, rng))
    }
}
