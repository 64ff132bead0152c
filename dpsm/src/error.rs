use thiserror::Error;

/// Errors raised while building, checking or committing split-merge proposals.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitMergeError {
    /// The seed observations do not satisfy the same-component (split) or
    /// different-component (merge) requirement.
    #[error("seeds {data_index_1} and {data_index_2}: {reason}")]
    PreconditionViolation {
        data_index_1: usize,
        data_index_2: usize,
        reason: &'static str,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A proposal was used before all of its fields were populated.
    #[error("incomplete proposal: {0} is not set")]
    IncompleteProposal(&'static str),
    /// Component densities collapsed, e.g. a datum has zero density under
    /// both candidate components.
    #[error("numerical degeneracy: {0}")]
    NumericalDegeneracy(String),
    /// A proposal refers to a component slot which has changed since the
    /// proposal was built.
    #[error("component handle for slot {index} is stale")]
    StaleHandle { index: usize },
}

impl SplitMergeError {
    /// Whether the sampler may skip the move and continue the chain.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NumericalDegeneracy(_))
    }
}
