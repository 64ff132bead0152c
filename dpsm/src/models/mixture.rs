use std::fmt::Debug;

use super::component::MixtureComponent;
use super::Model;
use crate::error::SplitMergeError;
use crate::proposals::{Proposal, ProposalKind};
use crate::utils::NoPrettyPrint;

/// Reference to a component slot of a mixture model.
///
/// Live handles carry the generation of the slot they were minted from, so a
/// handle to a slot that has since been rewritten or shifted no longer
/// resolves. Pending handles name a slot a proposal will occupy once
/// committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComponentHandle {
    index: usize,
    generation: Option<u64>,
}

impl ComponentHandle {
    pub(crate) const fn live(index: usize, generation: u64) -> Self {
        Self {
            index,
            generation: Some(generation),
        }
    }

    #[must_use]
    pub const fn pending(index: usize) -> Self {
        Self {
            index,
            generation: None,
        }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn generation(&self) -> Option<u64> {
        self.generation
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.generation.is_none()
    }
}

/// The model side of a split-merge move.
pub trait MixtureModel<X> {
    type Component: MixtureComponent<X>;

    /// The global data store.
    fn data(&self) -> &[X];

    /// The number of occupied components.
    fn n_components(&self) -> usize;

    fn component(&self, index: usize) -> Option<&Self::Component>;

    /// A live handle to the component at `index`.
    fn handle(&self, index: usize) -> Option<ComponentHandle>;

    /// The component `handle` refers to, if it is still live.
    fn resolve(&self, handle: ComponentHandle) -> Option<&Self::Component>;

    /// The component index the datum at `data_index` is assigned to.
    fn component_of(&self, data_index: usize) -> Option<usize>;

    /// Mixing weights of the occupied components followed by a terminal slot
    /// holding all remaining stick mass.
    fn mixing_weights(&self) -> &[f64];

    /// Swap in the post-move state described by an accepted proposal.
    ///
    /// # Errors
    /// If the proposal is incomplete, refers to stale slots, or does not
    /// match the model's shape. The model is untouched on error.
    fn commit(&mut self, proposal: Proposal<Self::Component>) -> Result<(), SplitMergeError>;

    fn occupied_mixing_weights(&self) -> &[f64] {
        &self.mixing_weights()[..self.n_components()]
    }

    fn remaining_mass(&self) -> f64 {
        self.mixing_weights().last().copied().unwrap_or(0.0)
    }
}

/// Contribution of one component to the log posterior: the base-measure
/// density of its parameters plus, for each member, the log mixing weight
/// and log likelihood. Empty components contribute nothing.
pub fn component_ln_score<X, C>(component: &C, weight: f64, data: &[X]) -> f64
where
    C: MixtureComponent<X>,
{
    if component.is_empty() {
        return 0.0;
    }
    let ln_w = weight.ln();
    component.ln_prior()
        + component
            .members()
            .iter()
            .map(|&i| ln_w + component.ln_f(&data[i]))
            .sum::<f64>()
}

fn sorted(members: &[usize]) -> Vec<usize> {
    let mut members = members.to_vec();
    members.sort_unstable();
    members
}

#[derive(Clone, Debug)]
struct Slot<C> {
    component: C,
    generation: u64,
}

/// Dirichlet process mixture stored as an arena of occupied component slots.
#[derive(Clone)]
pub struct DirichletProcessMixture<X, C> {
    data: Vec<X>,
    assignments: Vec<Option<usize>>,
    slots: Vec<Slot<C>>,
    mixing_weights: Vec<f64>,
    next_generation: u64,
}

impl<X, C> Debug for DirichletProcessMixture<X, C>
where
    X: Debug,
    C: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let assignments: Vec<_> = self
            .assignments
            .iter()
            .map(|a| a.map_or_else(|| String::from("-"), |k| k.to_string()))
            .map(NoPrettyPrint::new)
            .collect();

        f.debug_struct("DirichletProcessMixture")
            .field("assignments", &NoPrettyPrint::new(assignments))
            .field("mixing_weights", &NoPrettyPrint::new(&self.mixing_weights))
            .field(
                "components",
                &self.slots.iter().map(|s| &s.component).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl<X, C> DirichletProcessMixture<X, C>
where
    C: MixtureComponent<X>,
{
    /// Create a mixture from its data, occupied components and mixing
    /// weights (one per component plus the remaining stick mass).
    ///
    /// # Errors
    /// `InvalidArgument` if the weights do not line up with the components,
    /// a component is empty, or the components do not assign every datum
    /// exactly once.
    pub fn new(
        data: Vec<X>,
        components: Vec<C>,
        mixing_weights: Vec<f64>,
    ) -> Result<Self, SplitMergeError> {
        if mixing_weights.len() != components.len() + 1 {
            return Err(SplitMergeError::InvalidArgument(format!(
                "expected {} mixing weights (one per component and the remaining mass), got {}",
                components.len() + 1,
                mixing_weights.len()
            )));
        }
        if let Some(w) = mixing_weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(SplitMergeError::InvalidArgument(format!(
                "mixing weights must be finite and non-negative, got {w}"
            )));
        }

        let mut assignments: Vec<Option<usize>> = vec![None; data.len()];
        for (k, component) in components.iter().enumerate() {
            if component.is_empty() {
                return Err(SplitMergeError::InvalidArgument(format!(
                    "component {k} has no data"
                )));
            }
            for &i in component.members() {
                match assignments.get_mut(i) {
                    None => {
                        return Err(SplitMergeError::InvalidArgument(format!(
                            "component {k} refers to datum {i}, but there are only {} data",
                            data.len()
                        )))
                    }
                    Some(Some(other)) => {
                        return Err(SplitMergeError::InvalidArgument(format!(
                            "datum {i} is assigned to both component {other} and {k}"
                        )))
                    }
                    Some(slot) => *slot = Some(k),
                }
            }
        }
        if let Some(i) = assignments.iter().position(Option::is_none) {
            return Err(SplitMergeError::InvalidArgument(format!(
                "datum {i} is not assigned to any component"
            )));
        }

        let slots: Vec<Slot<C>> = components
            .into_iter()
            .zip(0..)
            .map(|(component, generation)| Slot {
                component,
                generation,
            })
            .collect();
        let next_generation = slots.len() as u64;

        Ok(Self {
            data,
            assignments,
            slots,
            mixing_weights,
            next_generation,
        })
    }

    #[must_use]
    pub fn assignments(&self) -> &[Option<usize>] {
        &self.assignments
    }

    pub fn components(&self) -> impl Iterator<Item = &C> {
        self.slots.iter().map(|s| &s.component)
    }

    fn mint(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    fn live(&self, handle: ComponentHandle) -> Result<&C, SplitMergeError> {
        self.resolve(handle).ok_or(SplitMergeError::StaleHandle {
            index: handle.index(),
        })
    }

    /// Check a complete proposal against the current model without mutating
    /// anything.
    fn validate(&self, proposal: &Proposal<C>) -> Result<(), SplitMergeError> {
        proposal.check()?;

        let merged = proposal
            .merged()
            .ok_or(SplitMergeError::IncompleteProposal("merged"))?;
        let split1 = proposal
            .split1()
            .ok_or(SplitMergeError::IncompleteProposal("split1"))?;
        let split2 = proposal
            .split2()
            .ok_or(SplitMergeError::IncompleteProposal("split2"))?;

        let n_data = self.data.len();
        if let Some(i) = [merged, split1, split2]
            .into_iter()
            .flat_map(|c| c.component().members())
            .find(|&&i| i >= n_data)
        {
            return Err(SplitMergeError::InvalidArgument(format!(
                "proposal refers to datum {i}, but there are only {n_data} data"
            )));
        }

        let merged_members = sorted(merged.component().members());
        let mut split_members = sorted(split1.component().members());
        split_members.extend_from_slice(split2.component().members());
        split_members.sort_unstable();
        if split_members.windows(2).any(|w| w[0] == w[1]) {
            return Err(SplitMergeError::InvalidArgument(
                "split components share data".to_string(),
            ));
        }
        if merged_members != split_members {
            return Err(SplitMergeError::InvalidArgument(
                "merged component must hold exactly the data of split1 and split2".to_string(),
            ));
        }

        let k = self.n_components();
        let (n_split, expected_split2) = match proposal.kind() {
            ProposalKind::Split => {
                let live = self.live(merged.handle())?;
                if sorted(live.members()) != merged_members {
                    return Err(SplitMergeError::InvalidArgument(
                        "merged must hold the data of the component being split".to_string(),
                    ));
                }
                if split1.index() != merged.index() {
                    return Err(SplitMergeError::InvalidArgument(
                        "split1 must keep the slot of the component being split".to_string(),
                    ));
                }
                (k + 1, k)
            }
            ProposalKind::Merge => {
                for side in [split1, split2] {
                    let live = self.live(side.handle())?;
                    if sorted(live.members()) != sorted(side.component().members()) {
                        return Err(SplitMergeError::InvalidArgument(format!(
                            "component in slot {} does not hold the data of the live component",
                            side.index()
                        )));
                    }
                }
                let shift = usize::from(split2.index() < split1.index());
                if merged.index() != split1.index() - shift {
                    return Err(SplitMergeError::InvalidArgument(
                        "merged must take the slot of split1".to_string(),
                    ));
                }
                (k, split2.index())
            }
        };

        if split2.index() != expected_split2 {
            return Err(SplitMergeError::InvalidArgument(format!(
                "split2 must occupy slot {expected_split2}, not {}",
                split2.index()
            )));
        }
        if proposal.split_mixing_weights().len() != n_split {
            return Err(SplitMergeError::InvalidArgument(format!(
                "expected {n_split} split mixing weights, got {}",
                proposal.split_mixing_weights().len()
            )));
        }
        Ok(())
    }
}

impl<X, C> MixtureModel<X> for DirichletProcessMixture<X, C>
where
    C: MixtureComponent<X>,
{
    type Component = C;

    fn data(&self) -> &[X] {
        &self.data
    }

    fn n_components(&self) -> usize {
        self.slots.len()
    }

    fn component(&self, index: usize) -> Option<&C> {
        self.slots.get(index).map(|s| &s.component)
    }

    fn handle(&self, index: usize) -> Option<ComponentHandle> {
        self.slots
            .get(index)
            .map(|s| ComponentHandle::live(index, s.generation))
    }

    fn resolve(&self, handle: ComponentHandle) -> Option<&C> {
        let generation = handle.generation()?;
        self.slots
            .get(handle.index())
            .filter(|s| s.generation == generation)
            .map(|s| &s.component)
    }

    fn component_of(&self, data_index: usize) -> Option<usize> {
        self.assignments.get(data_index).copied().flatten()
    }

    fn mixing_weights(&self) -> &[f64] {
        &self.mixing_weights
    }

    fn commit(&mut self, proposal: Proposal<C>) -> Result<(), SplitMergeError> {
        self.validate(&proposal)?;

        let remaining_mass = self.remaining_mass();
        let parts = proposal.into_parts()?;

        match parts.kind {
            ProposalKind::Split => {
                let c = parts.split1.index();
                let generation = self.mint();
                self.slots[c] = Slot {
                    component: parts.split1.into_component(),
                    generation,
                };

                let new_index = self.slots.len();
                let split2 = parts.split2.into_component();
                for &i in split2.members() {
                    self.assignments[i] = Some(new_index);
                }
                let generation = self.mint();
                self.slots.push(Slot {
                    component: split2,
                    generation,
                });

                self.mixing_weights = parts.split_mixing_weights;
            }
            ProposalKind::Merge => {
                let removed = parts.split2.index();
                self.slots.remove(removed);
                for s in removed..self.slots.len() {
                    let generation = self.mint();
                    self.slots[s].generation = generation;
                }
                self.assignments
                    .iter_mut()
                    .flatten()
                    .filter(|z| **z > removed)
                    .for_each(|z| *z -= 1);

                let target = parts.merged.index();
                let merged = parts.merged.into_component();
                for &i in merged.members() {
                    self.assignments[i] = Some(target);
                }
                let generation = self.mint();
                self.slots[target] = Slot {
                    component: merged,
                    generation,
                };

                let mut weights = parts.merged_mixing_weights;
                // The terminal slot belongs to the vacated component.
                weights.pop();
                self.mixing_weights = weights;
            }
        }

        self.mixing_weights.push(remaining_mass);
        tracing::trace!(
            assignments = %crate::utils::assignment_string(&self.assignments),
            "committed split-merge proposal"
        );
        Ok(())
    }
}

impl<X, C> Model for DirichletProcessMixture<X, C>
where
    C: MixtureComponent<X>,
{
    fn ln_score(&self) -> f64 {
        self.slots
            .iter()
            .zip(self.mixing_weights.iter())
            .map(|(slot, &w)| component_ln_score(&slot.component, w, &self.data))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use rv::dist::{Gaussian, NormalGamma};
    use rv::traits::HasDensity;

    use super::{component_ln_score, ComponentHandle, DirichletProcessMixture, MixtureModel};
    use crate::error::SplitMergeError;
    use crate::models::component::MixtureComponent;
    use crate::models::gaussian::GaussianComponent;
    use crate::models::Model;
    use crate::proposals::{Proposal, ProposalKind, ProposedComponent};

    fn prior() -> NormalGamma {
        NormalGamma::new_unchecked(0.0, 1.0, 1.0, 1.0)
    }

    fn component<I: IntoIterator<Item = usize>>(mu: f64, members: I) -> GaussianComponent {
        GaussianComponent::with_members(prior(), Gaussian::new_unchecked(mu, 1.0), members)
    }

    fn three_components() -> DirichletProcessMixture<f64, GaussianComponent> {
        DirichletProcessMixture::new(
            vec![-5.0, -4.5, 0.0, 0.5, 5.0, 4.5],
            vec![
                component(-4.75, [0, 1]),
                component(0.25, [2, 3]),
                component(4.75, [4, 5]),
            ],
            vec![0.3, 0.3, 0.3, 0.1],
        )
        .expect("valid model")
    }

    /// Merge of components `a` and `b` built by hand.
    fn merge_proposal(
        model: &DirichletProcessMixture<f64, GaussianComponent>,
        a: usize,
        b: usize,
    ) -> Proposal<GaussianComponent> {
        let split1 = model.component(a).expect("live").clone();
        let split2 = model.component(b).expect("live").clone();
        let mut merged = split1.clone();
        for &i in split2.members() {
            merged.add_datum(i, &model.data()[i]);
        }
        let occupied = model.occupied_mixing_weights().to_vec();
        let mut merged_weights = occupied.clone();
        merged_weights[a] += occupied[b];
        merged_weights.remove(b);
        merged_weights.push(0.0);

        let k = model.n_components();
        let target = if b < a { a - 1 } else { a };
        let mut proposal =
            Proposal::new(ProposalKind::Merge, split1.members()[0], split2.members()[0]);
        proposal.set_components(
            ProposedComponent::new(ComponentHandle::pending(target), merged),
            ProposedComponent::new(ComponentHandle::pending(k - 1), split2.empty_like()),
            ProposedComponent::new(model.handle(a).expect("live"), split1),
            ProposedComponent::new(model.handle(b).expect("live"), split2),
        );
        proposal
            .set_mixing_weights(merged_weights, occupied)
            .expect("consistent weights");
        proposal.set_log_proposal_density_ratio(-1.0);
        proposal
    }

    /// Split of the component in `slot` built by hand from the given
    /// memberships.
    fn split_proposal(
        model: &DirichletProcessMixture<f64, GaussianComponent>,
        slot: usize,
        merged: Vec<usize>,
        split1: Vec<usize>,
        split2: Vec<usize>,
    ) -> Proposal<GaussianComponent> {
        let k = model.n_components();
        let occupied = model.occupied_mixing_weights().to_vec();
        let w = occupied[slot];
        let mut merged_weights = occupied.clone();
        merged_weights.push(0.0);
        let mut split_weights = occupied;
        split_weights[slot] = w / 2.0;
        split_weights.push(w / 2.0);

        let mut proposal = Proposal::new(ProposalKind::Split, split1[0], split2[0]);
        proposal.set_components(
            ProposedComponent::new(model.handle(slot).expect("live"), component(0.0, merged)),
            ProposedComponent::new(ComponentHandle::pending(k), component(0.0, [])),
            ProposedComponent::new(ComponentHandle::pending(slot), component(0.0, split1)),
            ProposedComponent::new(ComponentHandle::pending(k), component(0.0, split2)),
        );
        proposal
            .set_mixing_weights(merged_weights, split_weights)
            .expect("consistent weights");
        proposal.set_log_proposal_density_ratio(0.0);
        proposal
    }

    fn assert_rejected(
        model: &mut DirichletProcessMixture<f64, GaussianComponent>,
        proposal: Proposal<GaussianComponent>,
    ) {
        let assignments = model.assignments().to_vec();
        let weights = model.mixing_weights().to_vec();
        let n_components = model.n_components();

        let err = model.commit(proposal).expect_err("malformed proposal");
        assert!(matches!(err, SplitMergeError::InvalidArgument(_)), "{err}");

        assert_eq!(model.assignments(), assignments.as_slice());
        assert_eq!(model.mixing_weights(), weights.as_slice());
        assert_eq!(model.n_components(), n_components);
    }

    #[test]
    fn commit_rejects_overlapping_split() {
        let mut model = DirichletProcessMixture::new(
            vec![0.0, 1.0, 2.0],
            vec![component(1.0, [0, 1, 2])],
            vec![0.9, 0.1],
        )
        .expect("valid model");

        // Same counts as a real split, but datum 1 is in both halves and
        // datum 2 in neither.
        let proposal = split_proposal(&model, 0, vec![0, 1, 2], vec![0, 1], vec![1]);
        assert_rejected(&mut model, proposal);
    }

    #[test]
    fn commit_rejects_unknown_datum() {
        let mut model = DirichletProcessMixture::new(
            vec![0.0, 1.0, 2.0],
            vec![component(1.0, [0, 1, 2])],
            vec![0.9, 0.1],
        )
        .expect("valid model");

        let proposal = split_proposal(&model, 0, vec![0, 1, 99], vec![0, 1], vec![99]);
        assert_rejected(&mut model, proposal);
    }

    #[test]
    fn commit_rejects_split_of_other_data() {
        let mut model = three_components();

        // A consistent partition, but not of the data in slot 0.
        let proposal = split_proposal(&model, 0, vec![0, 2], vec![0], vec![2]);
        assert_rejected(&mut model, proposal);
    }

    #[test]
    fn commit_rejects_merge_of_other_data() {
        let mut model = three_components();

        let split1 = component(-4.75, [0]);
        let split2 = component(0.25, [2, 3]);
        let merged = component(-4.75, [0, 2, 3]);

        let mut proposal = Proposal::new(ProposalKind::Merge, 0, 2);
        proposal.set_components(
            ProposedComponent::new(ComponentHandle::pending(0), merged),
            ProposedComponent::new(ComponentHandle::pending(2), split2.empty_like()),
            ProposedComponent::new(model.handle(0).expect("live"), split1),
            ProposedComponent::new(model.handle(1).expect("live"), split2),
        );
        proposal
            .set_mixing_weights(vec![0.6, 0.3, 0.0], vec![0.3, 0.3, 0.3])
            .expect("consistent weights");
        proposal.set_log_proposal_density_ratio(0.0);

        assert_rejected(&mut model, proposal);
    }

    #[test]
    fn new_rejects_malformed_models() {
        let data = vec![0.0, 1.0, 2.0];

        let wrong_weights = DirichletProcessMixture::new(
            data.clone(),
            vec![component(0.0, [0, 1, 2])],
            vec![1.0],
        );
        assert!(matches!(wrong_weights, Err(SplitMergeError::InvalidArgument(_))));

        let double = DirichletProcessMixture::new(
            data.clone(),
            vec![component(0.0, [0, 1]), component(2.0, [1, 2])],
            vec![0.5, 0.5, 0.0],
        );
        assert!(double.is_err());

        let unassigned = DirichletProcessMixture::new(
            data.clone(),
            vec![component(0.0, [0, 1])],
            vec![0.9, 0.1],
        );
        assert!(unassigned.is_err());

        let out_of_range = DirichletProcessMixture::new(
            data.clone(),
            vec![component(0.0, [0, 1, 2, 3])],
            vec![0.9, 0.1],
        );
        assert!(out_of_range.is_err());

        let empty = DirichletProcessMixture::new(
            data.clone(),
            vec![component(0.0, [0, 1, 2]), component(1.0, [])],
            vec![0.5, 0.4, 0.1],
        );
        assert!(empty.is_err());

        let negative =
            DirichletProcessMixture::new(data, vec![component(0.0, [0, 1, 2])], vec![1.2, -0.2]);
        assert!(negative.is_err());
    }

    #[test]
    fn handles_resolve_until_rewritten() {
        let model = three_components();
        let handle = model.handle(1).expect("live");
        assert!(!handle.is_pending());
        assert_eq!(model.resolve(handle).map(|c| c.n()), Some(2));
        assert!(model.resolve(ComponentHandle::pending(1)).is_none());
        assert!(model.handle(3).is_none());
        assert::close(model.remaining_mass(), 0.1, 1E-12);
    }

    #[test]
    fn commit_merge_shifts_later_components() {
        let mut model = three_components();
        let third = model.handle(2).expect("live");
        let proposal = merge_proposal(&model, 1, 0);

        model.commit(proposal).expect("valid merge");

        assert_eq!(model.n_components(), 2);
        assert_eq!(
            model.assignments(),
            &[Some(0), Some(0), Some(0), Some(0), Some(1), Some(1)]
        );
        assert::close(model.mixing_weights().to_vec(), vec![0.6, 0.3, 0.1], 1E-12);
        // Merged keeps the parameters of split1.
        assert::close(model.component(0).expect("live").params().mu(), 0.25, 1E-12);
        // Shifted slots are re-minted.
        assert!(model.resolve(third).is_none());
        assert_eq!(model.component(1).map(|c| c.members().to_vec()), Some(vec![4, 5]));
    }

    #[test]
    fn stale_proposal_is_rejected_without_change() {
        let mut model = three_components();
        let first = merge_proposal(&model, 0, 1);
        let stale = merge_proposal(&model, 1, 2);

        model.commit(first).expect("valid merge");
        let before = model.assignments().to_vec();

        let err = model.commit(stale).expect_err("slot 2 moved");
        assert!(matches!(err, SplitMergeError::StaleHandle { .. }));
        assert_eq!(model.assignments(), before.as_slice());
        assert_eq!(model.n_components(), 2);
    }

    #[test]
    fn commit_split_appends_component() {
        let mut model = three_components();
        let original = model.component(2).expect("live").clone();
        let handle = model.handle(2).expect("live");

        let mut split1 = original.empty_like();
        split1.add_datum(4, &5.0);
        let mut split2 = original.empty_like();
        split2.add_datum(5, &4.5);

        let mut proposal = Proposal::new(ProposalKind::Split, 4, 5);
        proposal.set_components(
            ProposedComponent::new(handle, original.clone()),
            ProposedComponent::new(ComponentHandle::pending(3), split2.empty_like()),
            ProposedComponent::new(ComponentHandle::pending(2), split1),
            ProposedComponent::new(ComponentHandle::pending(3), split2),
        );
        proposal
            .set_mixing_weights(vec![0.3, 0.3, 0.3, 0.0], vec![0.3, 0.3, 0.15, 0.15])
            .expect("consistent weights");
        proposal.set_log_proposal_density_ratio(0.5);

        model.commit(proposal).expect("valid split");

        assert_eq!(model.n_components(), 4);
        assert_eq!(model.component_of(4), Some(2));
        assert_eq!(model.component_of(5), Some(3));
        assert::close(
            model.mixing_weights().to_vec(),
            vec![0.3, 0.3, 0.15, 0.15, 0.1],
            1E-12,
        );
        assert!(model.resolve(handle).is_none());
    }

    #[test]
    fn incomplete_proposal_is_rejected() {
        let mut model = three_components();
        let proposal = Proposal::new(ProposalKind::Merge, 0, 2);
        let err = model.commit(proposal).expect_err("incomplete");
        assert!(matches!(err, SplitMergeError::IncompleteProposal(_)));
        assert_eq!(model.n_components(), 3);
    }

    #[test]
    fn ln_score_sums_components() {
        let model = three_components();
        let expected: f64 = model
            .components()
            .zip(model.mixing_weights())
            .map(|(c, &w)| {
                c.ln_prior()
                    + c.members()
                        .iter()
                        .map(|&i| w.ln() + c.params().ln_f(&model.data()[i]))
                        .sum::<f64>()
            })
            .sum();
        assert::close(model.ln_score(), expected, 1E-10);

        let empty = component(0.0, []);
        assert_eq!(component_ln_score(&empty, 0.5, model.data()), 0.0);
    }
}
