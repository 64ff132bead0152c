use std::fmt::Debug;

use rand::Rng;

use crate::error::SplitMergeError;

/// A single cluster of a mixture: its parameters and the global indices of
/// the data assigned to it.
pub trait MixtureComponent<X>: Clone + Debug {
    type Params: Clone + Debug + PartialEq;

    fn params(&self) -> &Self::Params;

    fn set_params(&mut self, params: Self::Params);

    /// Global indices of the data assigned to this component.
    fn members(&self) -> &[usize];

    /// Add the datum at global index `index` with value `x`.
    fn add_datum(&mut self, index: usize, x: &X);

    /// Remove the datum at `index`, returning whether it was a member.
    fn remove_datum(&mut self, index: usize, x: &X) -> bool;

    /// A component with the same parameters and no data.
    fn empty_like(&self) -> Self;

    /// Log density of `x` under the current parameters.
    fn ln_f(&self, x: &X) -> f64;

    /// Log density of the current parameters under the base measure.
    fn ln_prior(&self) -> f64;

    /// Log density of the current parameters under the base-measure
    /// posterior given the single observation `x`.
    fn ln_single_observation_posterior(&self, x: &X) -> f64;

    /// Replace the parameters with the end of a short posterior chain that
    /// starts at the current parameters and conditions on the member data.
    ///
    /// # Errors
    /// If the chain reaches a degenerate parameter value.
    fn sample_parameters<R: Rng>(
        &mut self,
        data: &[X],
        n_steps: usize,
        rng: &mut R,
    ) -> Result<(), SplitMergeError>;

    fn n(&self) -> usize {
        self.members().len()
    }

    fn is_empty(&self) -> bool {
        self.members().is_empty()
    }

    fn contains(&self, index: usize) -> bool {
        self.members().contains(&index)
    }
}
