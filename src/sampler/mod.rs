pub mod balanced_sampler;
pub mod distribution;

pub use balanced_sampler::{BalancedSampler, Selection};
pub use distribution::{OrganCount, OrganDistribution};
