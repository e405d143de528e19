//! Configuration types for the genetic search engine.

use serde::{Deserialize, Serialize};

/// Engine-wide search configuration.
///
/// Every field can be changed between calls; changes take effect on the
/// next `solve`. Pool quotas are only checked by [`SearchConfig::validate`],
/// which the engine runs before doing any work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of individuals in the population.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// Number of individuals re-sampled near a better-ranked base each generation.
    #[serde(default = "default_pool_mutation")]
    pub pool_mutation: usize,
    /// Number of individuals re-sampled uniformly each generation.
    #[serde(default = "default_pool_random")]
    pub pool_random: usize,
    /// Neighborhood radius used for mutation. Zero selects a radius
    /// from the space extent on the first solve.
    #[serde(default)]
    pub range: f64,
    /// Step budget handed to the local refiner.
    #[serde(default = "default_max_improve_steps")]
    pub max_improve_steps: u32,
    /// When false, every state is treated as valid.
    #[serde(default = "default_validity_check")]
    pub validity_check: bool,
    /// Run the local refiner on the solution before returning it.
    #[serde(default)]
    pub try_improve: bool,
    /// Rule for picking the base state of each mutation.
    #[serde(default)]
    pub mutation_base: MutationBase,
    /// Sample one extra individual near each hint when seeding a fresh pool.
    #[serde(default)]
    pub seed_near_hints: bool,
    /// Seed for the engine's own selection RNG.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            pool_mutation: default_pool_mutation(),
            pool_random: default_pool_random(),
            range: 0.0,
            max_improve_steps: default_max_improve_steps(),
            validity_check: default_validity_check(),
            try_improve: false,
            mutation_base: MutationBase::default(),
            seed_near_hints: false,
            random_seed: None,
        }
    }
}

fn default_pool_size() -> usize {
    100
}
fn default_pool_mutation() -> usize {
    20
}
fn default_pool_random() -> usize {
    30
}
fn default_max_improve_steps() -> u32 {
    3
}
fn default_validity_check() -> bool {
    true
}

/// How mutation bases are chosen from the ranked pool.
///
/// Bases always come from the retained segment, or from the single best
/// individual when nothing is retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum MutationBase {
    /// The k-th mutation uses the (k mod retained)-th ranked individual.
    #[default]
    Cyclic,
    /// Uniformly random retained individual.
    Uniform,
    /// Random retained individual, probability proportional to reversed rank.
    RankWeighted,
}

impl SearchConfig {
    /// Number of individuals carried over unchanged each generation.
    ///
    /// Saturates at zero; call [`SearchConfig::validate`] first to reject
    /// quotas that exceed the pool.
    #[inline]
    pub fn pool_retained(&self) -> usize {
        self.pool_size
            .saturating_sub(self.pool_mutation)
            .saturating_sub(self.pool_random)
    }

    /// Validate pool quotas and range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::EmptyPool);
        }
        if self.pool_mutation.saturating_add(self.pool_random) > self.pool_size {
            return Err(ConfigError::QuotaExceedsPool {
                mutation: self.pool_mutation,
                random: self.pool_random,
                size: self.pool_size,
            });
        }
        if self.range < 0.0 || self.range.is_nan() {
            return Err(ConfigError::InvalidRange(self.range));
        }
        Ok(())
    }
}

/// Search configuration errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Pool size must be non-zero")]
    EmptyPool,
    #[error("Mutation ({mutation}) plus random ({random}) quotas exceed pool size {size}")]
    QuotaExceedsPool {
        mutation: usize,
        random: usize,
        size: usize,
    },
    #[error("Range must be a non-negative number, got {0}")]
    InvalidRange(f64),
    #[error("Solve time must be positive")]
    InvalidSolveTime,
}
