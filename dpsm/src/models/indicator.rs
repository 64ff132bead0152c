//! Components whose densities are indicators of half-lines. Useful for
//! exercising allocation with exact zero densities.

use rand::Rng;

use super::component::MixtureComponent;
use crate::error::SplitMergeError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HalfLine {
    Negative,
    NonNegative,
}

impl HalfLine {
    pub(crate) fn of(x: f64) -> Self {
        if x < 0.0 {
            Self::Negative
        } else {
            Self::NonNegative
        }
    }
}

/// Density 1 on `half_line`, 0 elsewhere.
///
/// Sampling parameters moves the component to the half-line of its first
/// member unless it is pinned.
#[derive(Clone, Debug)]
pub(crate) struct IndicatorComponent {
    half_line: HalfLine,
    members: Vec<usize>,
    pinned: bool,
}

impl IndicatorComponent {
    pub(crate) fn new(half_line: HalfLine, members: Vec<usize>) -> Self {
        Self {
            half_line,
            members,
            pinned: false,
        }
    }

    pub(crate) fn pinned(half_line: HalfLine, members: Vec<usize>) -> Self {
        Self {
            half_line,
            members,
            pinned: true,
        }
    }
}

impl MixtureComponent<f64> for IndicatorComponent {
    type Params = HalfLine;

    fn params(&self) -> &HalfLine {
        &self.half_line
    }

    fn set_params(&mut self, params: HalfLine) {
        self.half_line = params;
    }

    fn members(&self) -> &[usize] {
        &self.members
    }

    fn add_datum(&mut self, index: usize, _x: &f64) {
        self.members.push(index);
    }

    fn remove_datum(&mut self, index: usize, _x: &f64) -> bool {
        let n = self.members.len();
        self.members.retain(|&i| i != index);
        n != self.members.len()
    }

    fn empty_like(&self) -> Self {
        Self {
            members: Vec::new(),
            ..self.clone()
        }
    }

    fn ln_f(&self, x: &f64) -> f64 {
        if HalfLine::of(*x) == self.half_line {
            0.0
        } else {
            f64::NEG_INFINITY
        }
    }

    fn ln_prior(&self) -> f64 {
        0.5_f64.ln()
    }

    fn ln_single_observation_posterior(&self, x: &f64) -> f64 {
        self.ln_f(x)
    }

    fn sample_parameters<R: Rng>(
        &mut self,
        data: &[f64],
        _n_steps: usize,
        _rng: &mut R,
    ) -> Result<(), SplitMergeError> {
        if self.pinned {
            return Ok(());
        }
        if let Some(&i) = self.members.first() {
            self.half_line = HalfLine::of(data[i]);
        }
        Ok(())
    }
}
