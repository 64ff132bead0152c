use rand::Rng;

use super::{Proposal, ProposalKind, ProposalStrategy, ProposedComponent};
use crate::config::SplitMergeConfig;
use crate::error::SplitMergeError;
use crate::models::component::MixtureComponent;
use crate::models::mixture::{ComponentHandle, MixtureModel};
use crate::utils::ln_normalize_pair;

/// Proposes splits by seeding a new component with a single observation.
///
/// The component being split keeps its parameters and becomes `split1`.
/// `split2` is seeded with the second observation and gets parameters from a
/// short posterior chain conditioned on that observation alone. Remaining
/// data are allocated between the two with probability proportional to
/// `f(y)^annealing_factor`, and the original mixing weight is divided in
/// proportion to the resulting counts.
///
/// Merges move all the data of `split2` into `split1`, which keeps its
/// parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SingleObservationSplitStrategy {
    annealing_factor: f64,
    posterior_sampling_steps: usize,
}

impl SingleObservationSplitStrategy {
    /// # Errors
    /// `InvalidArgument` if `annealing_factor` is outside (0, 1].
    pub fn new(annealing_factor: f64) -> Result<Self, SplitMergeError> {
        Self::from_config(&SplitMergeConfig {
            annealing_factor,
            ..SplitMergeConfig::default()
        })
    }

    /// # Errors
    /// If the configuration does not validate.
    pub fn from_config(config: &SplitMergeConfig) -> Result<Self, SplitMergeError> {
        config.validate()?;
        Ok(Self {
            annealing_factor: config.annealing_factor,
            posterior_sampling_steps: config.posterior_sampling_steps,
        })
    }

    #[must_use]
    pub const fn annealing_factor(&self) -> f64 {
        self.annealing_factor
    }

    #[must_use]
    pub const fn posterior_sampling_steps(&self) -> usize {
        self.posterior_sampling_steps
    }

    /// Log probabilities that a datum with log densities `ln_f_own` and
    /// `ln_f_other` is allocated to each of the two components.
    fn allocation_ln_probabilities(
        &self,
        ln_f_own: f64,
        ln_f_other: f64,
        data_index: usize,
    ) -> Result<(f64, f64), SplitMergeError> {
        ln_normalize_pair(
            self.annealing_factor * ln_f_own,
            self.annealing_factor * ln_f_other,
        )
        .ok_or_else(|| {
            SplitMergeError::NumericalDegeneracy(format!(
                "datum {data_index} has no usable density under either split component \
                 ({ln_f_own}, {ln_f_other})"
            ))
        })
    }

    /// Log of q(merged -> split) / q(split -> merged) for the partition
    /// described by `proposal`.
    ///
    /// Merging is deterministic, so this is the probability of the split:
    /// the density of the parameters of `split2` given its seed, plus
    /// `log_allocation_probability`, the log probability that the non-seed
    /// data were divided as they are.
    ///
    /// # Errors
    /// `IncompleteProposal` if `split2` is unset, `PreconditionViolation` if
    /// the second seed is not in `data`, `NumericalDegeneracy` if the ratio
    /// is not finite.
    pub fn split_log_proposal_density_ratio<X, C>(
        &self,
        proposal: &Proposal<C>,
        log_allocation_probability: f64,
        data: &[X],
    ) -> Result<f64, SplitMergeError>
    where
        C: MixtureComponent<X>,
    {
        let split2 = proposal
            .split2()
            .ok_or(SplitMergeError::IncompleteProposal("split2"))?;
        let seed = data.get(proposal.data_index_2()).ok_or(
            SplitMergeError::PreconditionViolation {
                data_index_1: proposal.data_index_1(),
                data_index_2: proposal.data_index_2(),
                reason: "second seed is not in the data",
            },
        )?;

        let ratio =
            log_allocation_probability + split2.component().ln_single_observation_posterior(seed);

        if ratio.is_finite() {
            Ok(ratio)
        } else {
            Err(SplitMergeError::NumericalDegeneracy(format!(
                "split proposal density ratio is {ratio}"
            )))
        }
    }

    /// Build one side of a split from `original`, holding only the seed at
    /// `data_index`.
    ///
    /// With `initialize_parameters` unset the parameters of `original` are
    /// kept. Otherwise they are replaced by a posterior draw given the seed,
    /// from a chain started at the parameters of `original`.
    ///
    /// # Errors
    /// If the parameter chain degenerates.
    pub fn initialize_split_proposal<X, C, R>(
        &self,
        original: &C,
        data: &[X],
        data_index: usize,
        initialize_parameters: bool,
        rng: &mut R,
    ) -> Result<C, SplitMergeError>
    where
        C: MixtureComponent<X>,
        R: Rng,
    {
        let mut component = original.empty_like();
        component.add_datum(data_index, &data[data_index]);
        if initialize_parameters {
            self.sample_parameters(&mut component, data, rng)?;
        }
        Ok(component)
    }

    /// Run the fixed-length posterior chain for `component`.
    ///
    /// # Errors
    /// If the parameter chain degenerates.
    pub fn sample_parameters<X, C, R>(
        &self,
        component: &mut C,
        data: &[X],
        rng: &mut R,
    ) -> Result<(), SplitMergeError>
    where
        C: MixtureComponent<X>,
        R: Rng,
    {
        component.sample_parameters(data, self.posterior_sampling_steps, rng)
    }

    /// Randomly assign each datum in `data_set` to `split1` or `split2`
    /// according to its posterior probability in an equally weighted
    /// two-component mixture, returning the log probability of the realized
    /// assignment.
    ///
    /// # Errors
    /// `NumericalDegeneracy` if a datum has no finite density under either
    /// component.
    pub fn allocate_data_between_split_components<X, C, R>(
        &self,
        split1: &mut C,
        split2: &mut C,
        data_set: &[usize],
        data: &[X],
        rng: &mut R,
    ) -> Result<f64, SplitMergeError>
    where
        C: MixtureComponent<X>,
        R: Rng,
    {
        let mut log_probability = 0.0;
        for &i in data_set {
            let x = &data[i];
            let (ln_p1, ln_p2) =
                self.allocation_ln_probabilities(split1.ln_f(x), split2.ln_f(x), i)?;

            let u: f64 = rng.random();
            if u < ln_p1.exp() {
                split1.add_datum(i, x);
                log_probability += ln_p1;
            } else {
                split2.add_datum(i, x);
                log_probability += ln_p2;
            }
        }
        Ok(log_probability)
    }

    /// The log probability that the union of the data in `split1` and
    /// `split2` would be allocated as observed, leaving out both seeds.
    ///
    /// # Errors
    /// `NumericalDegeneracy` if a datum has no finite density under either
    /// component.
    pub fn compute_log_partition_probability<X, C>(
        &self,
        split1: &C,
        split2: &C,
        data: &[X],
        data_index_1: usize,
        data_index_2: usize,
    ) -> Result<f64, SplitMergeError>
    where
        C: MixtureComponent<X>,
    {
        Ok(self.log_allocation_probability(split1, split2, data, data_index_1)?
            + self.log_allocation_probability(split2, split1, data, data_index_2)?)
    }

    /// The log probability that every datum of `component` except the seed
    /// at `data_index` would be allocated to it, in an equally weighted
    /// mixture with `other_component`.
    ///
    /// # Errors
    /// `NumericalDegeneracy` if a datum has no finite density under either
    /// component.
    pub fn log_allocation_probability<X, C>(
        &self,
        component: &C,
        other_component: &C,
        data: &[X],
        data_index: usize,
    ) -> Result<f64, SplitMergeError>
    where
        C: MixtureComponent<X>,
    {
        component
            .members()
            .iter()
            .filter(|&&i| i != data_index)
            .try_fold(0.0, |acc, &i| {
                let x = &data[i];
                let (ln_p, _) = self.allocation_ln_probabilities(
                    component.ln_f(x),
                    other_component.ln_f(x),
                    i,
                )?;
                Ok(acc + ln_p)
            })
    }
}

/// The components holding each seed.
fn seed_components<X, M>(
    model: &M,
    data_index_1: usize,
    data_index_2: usize,
) -> Result<(usize, usize), SplitMergeError>
where
    M: MixtureModel<X>,
{
    let violation = |reason: &'static str| SplitMergeError::PreconditionViolation {
        data_index_1,
        data_index_2,
        reason,
    };

    if data_index_1 == data_index_2 {
        return Err(violation("seed observations must be distinct"));
    }
    let c1 = model
        .component_of(data_index_1)
        .ok_or_else(|| violation("first seed is not assigned to a component"))?;
    let c2 = model
        .component_of(data_index_2)
        .ok_or_else(|| violation("second seed is not assigned to a component"))?;
    Ok((c1, c2))
}

fn live<X, M>(model: &M, index: usize) -> Result<(&M::Component, ComponentHandle), SplitMergeError>
where
    M: MixtureModel<X>,
{
    model
        .component(index)
        .zip(model.handle(index))
        .ok_or(SplitMergeError::StaleHandle { index })
}

impl<X, M> ProposalStrategy<X, M> for SingleObservationSplitStrategy
where
    M: MixtureModel<X>,
{
    fn propose_split<R: Rng>(
        &self,
        model: &M,
        data_index_1: usize,
        data_index_2: usize,
        rng: &mut R,
    ) -> Result<Proposal<M::Component>, SplitMergeError> {
        let (c, other) = seed_components::<X, M>(model, data_index_1, data_index_2)?;
        if c != other {
            return Err(SplitMergeError::PreconditionViolation {
                data_index_1,
                data_index_2,
                reason: "seeds must belong to the same component to propose a split",
            });
        }

        let (original, original_handle) = live::<X, M>(model, c)?;
        let data = model.data();

        // A copy of the original data without the seeds. The live component
        // is not modified.
        let remaining: Vec<usize> = original
            .members()
            .iter()
            .copied()
            .filter(|&i| i != data_index_1 && i != data_index_2)
            .collect();

        let mut split1 = self.initialize_split_proposal(original, data, data_index_1, false, rng)?;
        let mut split2 = self.initialize_split_proposal(original, data, data_index_2, true, rng)?;

        let log_allocation_probability = self.allocate_data_between_split_components(
            &mut split1,
            &mut split2,
            &remaining,
            data,
            rng,
        )?;

        // Divide the original weight in proportion to the realized counts.
        let k = model.n_components();
        let occupied = model.occupied_mixing_weights();
        let total = occupied[c];
        #[allow(clippy::cast_precision_loss)]
        let (n1, n2) = (split1.n() as f64, split2.n() as f64);

        let mut merged_mixing_weights = occupied.to_vec();
        merged_mixing_weights.push(0.0);

        let mut split_mixing_weights = occupied.to_vec();
        split_mixing_weights[c] = total * n1 / (n1 + n2);
        split_mixing_weights.push(total * n2 / (n1 + n2));

        let empty = split2.empty_like();

        let mut proposal = Proposal::new(ProposalKind::Split, data_index_1, data_index_2);
        proposal.set_components(
            ProposedComponent::new(original_handle, original.clone()),
            ProposedComponent::new(ComponentHandle::pending(k), empty),
            ProposedComponent::new(ComponentHandle::pending(c), split1),
            ProposedComponent::new(ComponentHandle::pending(k), split2),
        );
        proposal.set_mixing_weights(merged_mixing_weights, split_mixing_weights)?;

        let log_ratio =
            self.split_log_proposal_density_ratio(&proposal, log_allocation_probability, data)?;
        proposal.set_log_proposal_density_ratio(log_ratio);
        proposal.check()?;

        tracing::trace!(
            data_index_1,
            data_index_2,
            component = c,
            n1,
            n2,
            log_ratio,
            "proposed split"
        );
        Ok(proposal)
    }

    fn propose_merge<R: Rng>(
        &self,
        model: &M,
        data_index_1: usize,
        data_index_2: usize,
        _rng: &mut R,
    ) -> Result<Proposal<M::Component>, SplitMergeError> {
        let (a, b) = seed_components::<X, M>(model, data_index_1, data_index_2)?;
        if a == b {
            return Err(SplitMergeError::PreconditionViolation {
                data_index_1,
                data_index_2,
                reason: "seeds must belong to different components to propose a merge",
            });
        }

        let (split1, split1_handle) = live::<X, M>(model, a)?;
        let (split2, split2_handle) = live::<X, M>(model, b)?;
        let data = model.data();

        let log_partition_probability = self.compute_log_partition_probability(
            split1,
            split2,
            data,
            data_index_1,
            data_index_2,
        )?;

        // split1 always keeps its parameters.
        let mut merged = split1.clone();
        for &i in split2.members() {
            merged.add_datum(i, &data[i]);
        }
        let empty = split2.empty_like();

        let k = model.n_components();
        let occupied = model.occupied_mixing_weights();
        let split_mixing_weights = occupied.to_vec();
        let mut merged_mixing_weights = occupied.to_vec();
        merged_mixing_weights[a] += occupied[b];
        merged_mixing_weights.remove(b);
        merged_mixing_weights.push(0.0);

        let merged_index = if b < a { a - 1 } else { a };

        let mut proposal = Proposal::new(ProposalKind::Merge, data_index_1, data_index_2);
        proposal.set_components(
            ProposedComponent::new(ComponentHandle::pending(merged_index), merged),
            ProposedComponent::new(ComponentHandle::pending(k - 1), empty),
            ProposedComponent::new(split1_handle, split1.clone()),
            ProposedComponent::new(split2_handle, split2.clone()),
        );
        proposal.set_mixing_weights(merged_mixing_weights, split_mixing_weights)?;

        let log_ratio =
            -self.split_log_proposal_density_ratio(&proposal, log_partition_probability, data)?;
        proposal.set_log_proposal_density_ratio(log_ratio);
        proposal.check()?;

        tracing::trace!(
            data_index_1,
            data_index_2,
            component_1 = a,
            component_2 = b,
            log_ratio,
            "proposed merge"
        );
        Ok(proposal)
    }
}
