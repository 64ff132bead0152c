use serde::{Deserialize, Serialize};

use crate::error::SplitMergeError;
use crate::models::mixture::ComponentHandle;

/// Relative tolerance when comparing the sums of the two mixing weight
/// vectors.
const MIXING_WEIGHT_TOLERANCE: f64 = 1E-8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    Split,
    Merge,
}

/// A component state taking part in a proposal, together with the slot it
/// occupies before (live handle) or after (pending handle) the move.
#[derive(Clone, Debug, PartialEq)]
pub struct ProposedComponent<C> {
    handle: ComponentHandle,
    component: C,
}

impl<C> ProposedComponent<C> {
    pub const fn new(handle: ComponentHandle, component: C) -> Self {
        Self { handle, component }
    }

    pub const fn handle(&self) -> ComponentHandle {
        self.handle
    }

    pub const fn index(&self) -> usize {
        self.handle.index()
    }

    pub const fn component(&self) -> &C {
        &self.component
    }

    pub fn into_component(self) -> C {
        self.component
    }
}

#[derive(Clone, Debug)]
struct ProposalComponents<C> {
    merged: ProposedComponent<C>,
    empty: ProposedComponent<C>,
    split1: ProposedComponent<C>,
    split2: ProposedComponent<C>,
}

/// The pieces of a checked proposal a model needs to commit it.
pub(crate) struct ProposalParts<C> {
    pub kind: ProposalKind,
    pub merged: ProposedComponent<C>,
    pub split1: ProposedComponent<C>,
    pub split2: ProposedComponent<C>,
    pub merged_mixing_weights: Vec<f64>,
    pub split_mixing_weights: Vec<f64>,
}

/// A candidate split or merge of mixture components.
///
/// A move is a transformation between the pairs `(split1, split2)` and
/// `(merged, empty)`. `merged` and `split1` are the same logical slot before
/// and after the move, as are `empty` and `split2`. In a merge, `split1` and
/// `split2` describe the current state and `merged`/`empty` the proposed one;
/// in a split the roles are reversed.
///
/// The constructor only records the move type and seeds. Callers populate
/// the components, mixing weights and proposal density ratio, then call
/// [`Proposal::check`].
#[derive(Clone, Debug)]
pub struct Proposal<C> {
    kind: ProposalKind,
    data_index_1: usize,
    data_index_2: usize,
    components: Option<ProposalComponents<C>>,
    merged_mixing_weights: Vec<f64>,
    split_mixing_weights: Vec<f64>,
    log_split_to_merge_probability_ratio: f64,
}

impl<C> Proposal<C> {
    /// # Arguments
    /// * `kind` - Whether this is a split or a merge.
    /// * `data_index_1` - Global index of the datum seeding `split1`.
    /// * `data_index_2` - Global index of the datum seeding `split2`.
    #[must_use]
    pub const fn new(kind: ProposalKind, data_index_1: usize, data_index_2: usize) -> Self {
        Self {
            kind,
            data_index_1,
            data_index_2,
            components: None,
            merged_mixing_weights: Vec::new(),
            split_mixing_weights: Vec::new(),
            log_split_to_merge_probability_ratio: f64::NAN,
        }
    }

    /// Record the four component states. No validation of their data is
    /// performed here.
    pub fn set_components(
        &mut self,
        merged: ProposedComponent<C>,
        empty: ProposedComponent<C>,
        split1: ProposedComponent<C>,
        split2: ProposedComponent<C>,
    ) {
        self.components = Some(ProposalComponents {
            merged,
            empty,
            split1,
            split2,
        });
    }

    /// Set the mixing weights for both configurations.
    ///
    /// `merged_mixing_weights` holds the weights of the merged configuration
    /// with a terminal entry for the `empty` component. `split_mixing_weights`
    /// holds the weights of the split configuration. Neither includes the
    /// remaining stick mass.
    ///
    /// # Errors
    /// `InvalidArgument` if the vectors differ in length or sum, or hold
    /// negative or non-finite weights.
    pub fn set_mixing_weights(
        &mut self,
        merged_mixing_weights: Vec<f64>,
        split_mixing_weights: Vec<f64>,
    ) -> Result<(), SplitMergeError> {
        if merged_mixing_weights.len() != split_mixing_weights.len() {
            return Err(SplitMergeError::InvalidArgument(format!(
                "mixing weight vectors differ in length: {} != {}",
                merged_mixing_weights.len(),
                split_mixing_weights.len()
            )));
        }
        if let Some(w) = merged_mixing_weights
            .iter()
            .chain(split_mixing_weights.iter())
            .find(|w| !w.is_finite() || **w < 0.0)
        {
            return Err(SplitMergeError::InvalidArgument(format!(
                "mixing weights must be finite and non-negative, got {w}"
            )));
        }

        let merged_sum: f64 = merged_mixing_weights.iter().sum();
        let split_sum: f64 = split_mixing_weights.iter().sum();
        let scale = merged_sum.abs().max(split_sum.abs()).max(1.0);
        if (merged_sum - split_sum).abs() > MIXING_WEIGHT_TOLERANCE * scale {
            return Err(SplitMergeError::InvalidArgument(format!(
                "mixing weight vectors differ in sum: {merged_sum} != {split_sum}"
            )));
        }

        self.merged_mixing_weights = merged_mixing_weights;
        self.split_mixing_weights = split_mixing_weights;
        Ok(())
    }

    pub fn set_log_proposal_density_ratio(&mut self, log_ratio: f64) {
        self.log_split_to_merge_probability_ratio = log_ratio;
    }

    #[must_use]
    pub const fn kind(&self) -> ProposalKind {
        self.kind
    }

    #[must_use]
    pub const fn is_merge(&self) -> bool {
        matches!(self.kind, ProposalKind::Merge)
    }

    #[must_use]
    pub const fn data_index_1(&self) -> usize {
        self.data_index_1
    }

    #[must_use]
    pub const fn data_index_2(&self) -> usize {
        self.data_index_2
    }

    #[must_use]
    pub fn merged(&self) -> Option<&ProposedComponent<C>> {
        self.components.as_ref().map(|c| &c.merged)
    }

    #[must_use]
    pub fn empty(&self) -> Option<&ProposedComponent<C>> {
        self.components.as_ref().map(|c| &c.empty)
    }

    #[must_use]
    pub fn split1(&self) -> Option<&ProposedComponent<C>> {
        self.components.as_ref().map(|c| &c.split1)
    }

    #[must_use]
    pub fn split2(&self) -> Option<&ProposedComponent<C>> {
        self.components.as_ref().map(|c| &c.split2)
    }

    #[must_use]
    pub fn merged_mixing_weights(&self) -> &[f64] {
        &self.merged_mixing_weights
    }

    #[must_use]
    pub fn split_mixing_weights(&self) -> &[f64] {
        &self.split_mixing_weights
    }

    #[must_use]
    pub fn merged_mixing_weight(&self) -> Option<f64> {
        self.merged()
            .and_then(|c| self.merged_mixing_weights.get(c.index()))
            .copied()
    }

    /// The terminal entry of the merged weights.
    #[must_use]
    pub fn empty_mixing_weight(&self) -> Option<f64> {
        self.merged_mixing_weights.last().copied()
    }

    #[must_use]
    pub fn split1_mixing_weight(&self) -> Option<f64> {
        self.split1()
            .and_then(|c| self.split_mixing_weights.get(c.index()))
            .copied()
    }

    #[must_use]
    pub fn split2_mixing_weight(&self) -> Option<f64> {
        self.split2()
            .and_then(|c| self.split_mixing_weights.get(c.index()))
            .copied()
    }

    /// Log of q(forward) / q(reverse) for the move this proposal describes,
    /// where q is the proposal density.
    #[must_use]
    pub const fn log_split_to_merge_probability_ratio(&self) -> f64 {
        self.log_split_to_merge_probability_ratio
    }

    /// # Errors
    /// `IncompleteProposal` naming the first field that has not been set.
    pub fn check(&self) -> Result<(), SplitMergeError> {
        if self.components.is_none() {
            return Err(SplitMergeError::IncompleteProposal("components"));
        }
        if self.merged_mixing_weights.is_empty() || self.split_mixing_weights.is_empty() {
            return Err(SplitMergeError::IncompleteProposal("mixing weights"));
        }
        if !self.log_split_to_merge_probability_ratio.is_finite() {
            return Err(SplitMergeError::IncompleteProposal(
                "log proposal density ratio",
            ));
        }
        Ok(())
    }

    pub(crate) fn into_parts(self) -> Result<ProposalParts<C>, SplitMergeError> {
        self.check()?;
        let components = self
            .components
            .ok_or(SplitMergeError::IncompleteProposal("components"))?;
        Ok(ProposalParts {
            kind: self.kind,
            merged: components.merged,
            split1: components.split1,
            split2: components.split2,
            merged_mixing_weights: self.merged_mixing_weights,
            split_mixing_weights: self.split_mixing_weights,
        })
    }
}
