use rand::Rng;
use rv::data::DataOrSuffStat;
use rv::dist::{Gamma, Gaussian, NormalGamma};
use rv::traits::{ConjugatePrior, HasDensity, Sampleable};

use super::component::MixtureComponent;
use crate::error::SplitMergeError;

/// Univariate Gaussian component with a conjugate `NormalGamma` base measure.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianComponent {
    prior: NormalGamma,
    params: Gaussian,
    members: Vec<usize>,
}

impl GaussianComponent {
    #[must_use]
    pub const fn new(prior: NormalGamma, params: Gaussian) -> Self {
        Self {
            prior,
            params,
            members: Vec::new(),
        }
    }

    /// Create a component holding `members` of `data`.
    pub fn with_members<I: IntoIterator<Item = usize>>(
        prior: NormalGamma,
        params: Gaussian,
        members: I,
    ) -> Self {
        Self {
            prior,
            params,
            members: members.into_iter().collect(),
        }
    }

    #[must_use]
    pub const fn prior(&self) -> &NormalGamma {
        &self.prior
    }
}

fn degenerate<E: std::fmt::Debug>(e: E) -> SplitMergeError {
    SplitMergeError::NumericalDegeneracy(format!("{e:?}"))
}

impl MixtureComponent<f64> for GaussianComponent {
    type Params = Gaussian;

    fn params(&self) -> &Gaussian {
        &self.params
    }

    fn set_params(&mut self, params: Gaussian) {
        self.params = params;
    }

    fn members(&self) -> &[usize] {
        &self.members
    }

    fn add_datum(&mut self, index: usize, _x: &f64) {
        self.members.push(index);
    }

    fn remove_datum(&mut self, index: usize, _x: &f64) -> bool {
        self.members
            .iter()
            .position(|&i| i == index)
            .map(|pos| self.members.remove(pos))
            .is_some()
    }

    fn empty_like(&self) -> Self {
        Self::new(self.prior.clone(), self.params.clone())
    }

    fn ln_f(&self, x: &f64) -> f64 {
        self.params.ln_f(x)
    }

    fn ln_prior(&self) -> f64 {
        self.prior.ln_f(&self.params)
    }

    fn ln_single_observation_posterior(&self, x: &f64) -> f64 {
        let posterior = self
            .prior
            .posterior(&DataOrSuffStat::<'_, f64, Gaussian>::Data(&[*x]));
        posterior.ln_f(&self.params)
    }

    /// Gibbs sampling over (mu, rho = 1 / sigma^2) under the normal-gamma
    /// conditionals, starting from the current parameters.
    #[allow(clippy::cast_precision_loss)]
    fn sample_parameters<R: Rng>(
        &mut self,
        data: &[f64],
        n_steps: usize,
        rng: &mut R,
    ) -> Result<(), SplitMergeError> {
        let xs: Vec<f64> = self.members.iter().map(|&i| data[i]).collect();
        let n = xs.len() as f64;
        let sum_x: f64 = xs.iter().sum();

        let (m, r, s, v) = (self.prior.m(), self.prior.r(), self.prior.s(), self.prior.v());

        let mut mu = self.params.mu();
        let mut rho = self.params.sigma().powi(-2);

        let mu_mean = r.mul_add(m, sum_x) / (r + n);
        let rho_shape = (v + n + 1.0) / 2.0;

        for _ in 0..n_steps {
            let mu_sigma = (rho * (r + n)).sqrt().recip();
            mu = Gaussian::new(mu_mean, mu_sigma).map_err(degenerate)?.draw(rng);

            let sum_sq: f64 = xs.iter().map(|x| (x - mu).powi(2)).sum();
            let rho_rate = (r * (mu - m)).mul_add(mu - m, s + sum_sq) / 2.0;
            rho = Gamma::new(rho_shape, rho_rate).map_err(degenerate)?.draw(rng);
        }

        self.params = Gaussian::new(mu, rho.sqrt().recip()).map_err(degenerate)?;
        Ok(())
    }
}
