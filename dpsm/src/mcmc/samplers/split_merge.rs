use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SplitMergeError;
use crate::mcmc::Sampler;
use crate::models::component::MixtureComponent;
use crate::models::mixture::{component_ln_score, MixtureModel};
use crate::proposals::{Proposal, ProposalStrategy, ProposedComponent};

/// Running counts of the moves made by a [`SplitMergeSampler`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitMergeStats {
    pub proposed_splits: u64,
    pub accepted_splits: u64,
    pub proposed_merges: u64,
    pub accepted_merges: u64,
    /// Moves abandoned because the proposal degenerated.
    pub skipped: u64,
}

impl SplitMergeStats {
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.proposed_splits + self.proposed_merges + self.skipped
    }
}

/// Split-Merge Sampler
///
/// Reference: https://doi.org/10.1198/1061860043001
#[derive(Clone, Debug)]
pub struct SplitMergeSampler<S> {
    strategy: S,
    stats: SplitMergeStats,
}

impl<S> SplitMergeSampler<S> {
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            stats: SplitMergeStats::default(),
        }
    }

    pub const fn strategy(&self) -> &S {
        &self.strategy
    }

    pub const fn stats(&self) -> &SplitMergeStats {
        &self.stats
    }
}

fn touched_ln_score<X, C>(
    component: Option<&ProposedComponent<C>>,
    weight: Option<f64>,
    name: &'static str,
    data: &[X],
) -> Result<f64, SplitMergeError>
where
    C: MixtureComponent<X>,
{
    let component = component.ok_or(SplitMergeError::IncompleteProposal(name))?;
    let weight = weight.ok_or(SplitMergeError::IncompleteProposal(name))?;
    Ok(component_ln_score(component.component(), weight, data))
}

/// Log Metropolis-Hastings acceptance ratio of `proposal`.
///
/// Only the four components the move touches are scored; the rest of the
/// model is identical on both sides.
///
/// # Errors
/// `IncompleteProposal` if a component or its weight is missing.
pub fn log_acceptance_ratio<X, C>(
    proposal: &Proposal<C>,
    data: &[X],
) -> Result<f64, SplitMergeError>
where
    C: MixtureComponent<X>,
{
    proposal.check()?;

    let merged_score = touched_ln_score(
        proposal.merged(),
        proposal.merged_mixing_weight(),
        "merged",
        data,
    )? + touched_ln_score(
        proposal.empty(),
        proposal.empty_mixing_weight(),
        "empty",
        data,
    )?;
    let split_score = touched_ln_score(
        proposal.split1(),
        proposal.split1_mixing_weight(),
        "split1",
        data,
    )? + touched_ln_score(
        proposal.split2(),
        proposal.split2_mixing_weight(),
        "split2",
        data,
    )?;

    let delta = if proposal.is_merge() {
        merged_score - split_score
    } else {
        split_score - merged_score
    };
    Ok(delta - proposal.log_split_to_merge_probability_ratio())
}

impl<X, M, S> Sampler<M, X> for SplitMergeSampler<S>
where
    M: MixtureModel<X>,
    S: ProposalStrategy<X, M>,
{
    fn step<R: Rng>(&mut self, mut model: M, rng: &mut R) -> Result<M, SplitMergeError> {
        let n_data = model.data().len();
        if n_data < 2 {
            self.stats.skipped += 1;
            tracing::debug!(n_data, "too few data for a split-merge move");
            return Ok(model);
        }

        // choose two distinct points from the data
        let i = rng.random_range(0..n_data);
        let j = {
            let potential_j = rng.random_range(0..(n_data - 1));
            if potential_j >= i {
                potential_j + 1
            } else {
                potential_j
            }
        };

        let is_split = model.component_of(i) == model.component_of(j);
        let proposal = if is_split {
            self.stats.proposed_splits += 1;
            self.strategy.propose_split(&model, i, j, rng)
        } else {
            self.stats.proposed_merges += 1;
            self.strategy.propose_merge(&model, i, j, rng)
        };

        let proposal = match proposal {
            Ok(proposal) => proposal,
            Err(err) if err.is_recoverable() => {
                if is_split {
                    self.stats.proposed_splits -= 1;
                } else {
                    self.stats.proposed_merges -= 1;
                }
                self.stats.skipped += 1;
                tracing::debug!(i, j, error = %err, "skipping split-merge move");
                return Ok(model);
            }
            Err(err) => return Err(err),
        };

        let log_alpha = log_acceptance_ratio(&proposal, model.data())?;

        // Perform a Metropolis-Hastings accept-reject
        let u: f64 = rng.random();
        if u.ln() < log_alpha {
            model.commit(proposal)?;
            if is_split {
                self.stats.accepted_splits += 1;
            } else {
                self.stats.accepted_merges += 1;
            }
            tracing::debug!(i, j, is_split, log_alpha, "accepted split-merge move");
        } else {
            tracing::debug!(i, j, is_split, log_alpha, "rejected split-merge move");
        }

        Ok(model)
    }
}
