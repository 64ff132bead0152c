pub mod config;
pub mod error;
pub mod mcmc;
pub mod models;
pub mod proposals;

mod utils;

pub use config::SplitMergeConfig;
pub use error::SplitMergeError;
pub use mcmc::samplers::split_merge::{SplitMergeSampler, SplitMergeStats};
pub use mcmc::Sampler;
pub use models::component::MixtureComponent;
pub use models::gaussian::GaussianComponent;
pub use models::mixture::{ComponentHandle, DirichletProcessMixture, MixtureModel};
pub use models::Model;
pub use proposals::{
    Proposal, ProposalKind, ProposalStrategy, ProposedComponent, SingleObservationSplitStrategy,
};
