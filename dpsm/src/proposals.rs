//! Split-merge proposals for Dirichlet process mixtures.
//!
//! Two data points are chosen to seed the move. If they share a mixture
//! component, a split of that component is proposed; otherwise a merge of
//! their two components. A [`ProposalStrategy`] builds the [`Proposal`],
//! which the sampler scores and, if accepted, hands to the model to commit.

mod proposal;
mod single_observation;
mod strategy;

pub use proposal::{Proposal, ProposalKind, ProposedComponent};
pub use single_observation::SingleObservationSplitStrategy;
pub use strategy::ProposalStrategy;
