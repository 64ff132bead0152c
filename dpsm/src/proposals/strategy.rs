use rand::Rng;

use super::Proposal;
use crate::error::SplitMergeError;
use crate::models::mixture::MixtureModel;

/// A mechanism for building split and merge proposals.
pub trait ProposalStrategy<X, M>
where
    M: MixtureModel<X>,
{
    /// Propose splitting the component holding both seeds into one holding
    /// `data_index_1` and one holding `data_index_2`.
    ///
    /// # Errors
    /// `PreconditionViolation` if the seeds are not distinct members of the
    /// same component, `NumericalDegeneracy` if the densities collapse.
    fn propose_split<R: Rng>(
        &self,
        model: &M,
        data_index_1: usize,
        data_index_2: usize,
        rng: &mut R,
    ) -> Result<Proposal<M::Component>, SplitMergeError>;

    /// Propose merging the components holding `data_index_1` and
    /// `data_index_2`.
    ///
    /// # Errors
    /// `PreconditionViolation` if the seeds share a component,
    /// `NumericalDegeneracy` if the densities collapse.
    fn propose_merge<R: Rng>(
        &self,
        model: &M,
        data_index_1: usize,
        data_index_2: usize,
        rng: &mut R,
    ) -> Result<Proposal<M::Component>, SplitMergeError>;
}
