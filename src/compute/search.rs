//! Genetic search for a single state inside a goal region.
//!
//! Each generation the pool is ranked (valid first, then by goal distance),
//! the best-ranked individuals are kept, a quota is re-sampled near
//! better-ranked bases and another quota is re-sampled uniformly. The loop
//! stops as soon as the best individual satisfies the goal or the time
//! budget runs out.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, trace};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{ConfigError, MutationBase, SearchConfig};

use super::goal::GoalRegion;
use super::pool::{Individual, Pool};
use super::refine::{HillClimbing, LocalRefiner, RefineSettings};
use super::space::{RealVectorSampler, RealVectorSpace, StateSampler, StateSpace};

/// Fraction of the space extent used as mutation range when none is set.
const AUTO_RANGE_FACTOR: f64 = 0.2;

/// Number of top-ranked individuals refined when the budget runs out.
const FALLBACK_CANDIDATES: usize = 5;

/// Why the last solve stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The best-ranked individual satisfied the goal.
    Solved,
    /// The budget ran out, but refining a top individual reached the goal.
    SolvedByRefinement,
    /// The budget ran out without a satisfying individual.
    TimeExhausted,
}

/// Statistics from the last solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStats {
    /// Generation counter after the solve.
    pub generations: usize,
    /// Wall time spent in the solve (seconds).
    pub elapsed_seconds: f64,
    /// Goal distance of the best-ranked individual.
    pub best_distance: f64,
    /// Whether the best-ranked individual was valid.
    pub best_valid: bool,
    /// Reason for stopping.
    pub stop_reason: StopReason,
}

/// Genetic search over a state space.
///
/// Owns its pool across calls: a later `solve` reuses a pool of matching
/// size, [`GeneticSearch::clear`] discards it. An instance is meant for one
/// caller at a time; run one engine per thread for parallel search.
pub struct GeneticSearch<S: StateSpace, Sm, R> {
    space: Arc<S>,
    sampler: Sm,
    refiner: R,
    config: SearchConfig,
    rng: StdRng,
    pool: Pool<S::State>,
    generations: usize,
    stats: Option<SearchStats>,
}

/// Engine over a box-bounded real vector space with hill-climbing refinement.
pub type RealVectorSearch =
    GeneticSearch<RealVectorSpace, RealVectorSampler, HillClimbing<RealVectorSampler>>;

impl RealVectorSearch {
    /// Engine with samplers derived from `seed` (`None` seeds from entropy).
    pub fn real_vector(
        space: Arc<RealVectorSpace>,
        config: SearchConfig,
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let sampler = space.sampler(seed);
        let refiner = HillClimbing::new(space.sampler(seed.map(|s| s.wrapping_add(1))));
        Self::with_config(space, sampler, refiner, config)
    }
}

impl<S, Sm, R> GeneticSearch<S, Sm, R>
where
    S: StateSpace,
    Sm: StateSampler<S::State>,
    R: LocalRefiner<S>,
{
    /// Create an engine with the default configuration.
    pub fn new(space: Arc<S>, sampler: Sm, refiner: R) -> Self {
        let config = SearchConfig::default();
        let rng = selection_rng(config.random_seed);
        Self {
            space,
            sampler,
            refiner,
            config,
            rng,
            pool: Pool::default(),
            generations: 0,
            stats: None,
        }
    }

    /// Create an engine, rejecting an invalid configuration up front.
    pub fn with_config(
        space: Arc<S>,
        sampler: Sm,
        refiner: R,
        config: SearchConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut engine = Self::new(space, sampler, refiner);
        engine.rng = selection_rng(config.random_seed);
        engine.config = config;
        Ok(engine)
    }

    /// Find a state that is valid and satisfies `goal` within `solve_time`.
    ///
    /// On success the state is written to `result` and `Ok(true)` is
    /// returned; otherwise `result` is left untouched. The first
    /// `min(hint.len(), pool_size)` hints seed a fresh pool in order.
    pub fn solve(
        &mut self,
        solve_time: Duration,
        goal: &dyn GoalRegion<S::State>,
        result: &mut S::State,
        hint: &[S::State],
    ) -> Result<bool, ConfigError> {
        if solve_time.is_zero() {
            return Err(ConfigError::InvalidSolveTime);
        }
        self.config.validate()?;

        let start = Instant::now();
        // An unrepresentable deadline never expires.
        let deadline = start.checked_add(solve_time);

        self.configure_range();
        self.prepare_pool(goal, hint);

        let mut stop_reason = loop {
            self.pool.rank();
            if self.pool.best().is_some_and(|best| accepts(goal, best)) {
                break StopReason::Solved;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break StopReason::TimeExhausted;
            }
            self.step_generation(goal);
        };

        let solved = match stop_reason {
            StopReason::Solved => {
                if let Some(best) = self.pool.best() {
                    let mut candidate = best.state().clone();
                    let mut distance = best.distance();
                    if self.config.try_improve {
                        self.try_to_improve(goal, &mut candidate, &mut distance);
                    }
                    *result = candidate;
                }
                true
            }
            _ if self.config.try_improve => {
                let rescued = self.refine_fallback(goal, result);
                if rescued {
                    stop_reason = StopReason::SolvedByRefinement;
                }
                rescued
            }
            _ => false,
        };

        let elapsed = start.elapsed();
        let (best_distance, best_valid) = self
            .pool
            .best()
            .map_or((f64::INFINITY, false), |b| (b.distance(), b.is_valid()));
        info!(
            "GeneticSearch: solution {} after {} generations in {:.3}s (best distance {:.6})",
            if solved { "found" } else { "not found" },
            self.generations,
            elapsed.as_secs_f64(),
            best_distance
        );
        self.stats = Some(SearchStats {
            generations: self.generations,
            elapsed_seconds: elapsed.as_secs_f64(),
            best_distance,
            best_valid,
            stop_reason,
        });

        Ok(solved)
    }

    /// Discard the pool and reset the generation counter. Configuration is kept.
    pub fn clear(&mut self) {
        self.pool.clear();
        self.generations = 0;
        self.stats = None;
    }

    /// Pick a mutation range from the space extent when none is configured.
    fn configure_range(&mut self) {
        if self.config.range == 0.0 {
            self.config.range = AUTO_RANGE_FACTOR * self.space.maximum_extent();
            debug!("GeneticSearch: range automatically set to {}", self.config.range);
        }
    }

    /// Build a fresh pool, or re-seed and re-evaluate the existing one.
    fn prepare_pool(&mut self, goal: &dyn GoalRegion<S::State>, hint: &[S::State]) {
        let size = self.config.pool_size;
        let used = hint.len().min(size);
        if hint.len() > size {
            debug!(
                "GeneticSearch: using {} of {} hint states (pool size)",
                used,
                hint.len()
            );
        }

        if self.pool.len() == size {
            debug!("GeneticSearch: reusing pool of {} individuals", size);
            // The goal may have changed since the last call.
            let previous = self.pool.take();
            let mut refreshed = Vec::with_capacity(size);
            for (i, individual) in previous.into_iter().enumerate() {
                let mut state = individual.into_state();
                if let Some(h) = hint.get(i) {
                    state.clone_from(h);
                }
                refreshed.push(self.evaluate(goal, state));
            }
            self.pool.replace(refreshed);
            return;
        }

        debug!("GeneticSearch: initializing pool of {} individuals", size);
        self.pool = Pool::with_capacity(size);
        self.generations = 0;

        for h in &hint[..used] {
            let individual = self.evaluate(goal, h.clone());
            self.pool.push(individual);
        }

        if self.config.seed_near_hints && used > 0 {
            let near = used.min(size - used);
            for k in 0..near {
                let mut state = self.space.alloc_state();
                if let Some(base) = self.pool.get(k) {
                    self.sampler
                        .sample_uniform_near(&mut state, base.state(), self.config.range);
                }
                let individual = self.evaluate(goal, state);
                self.pool.push(individual);
            }
        }

        while self.pool.len() < size {
            let mut state = self.space.alloc_state();
            self.sampler.sample_uniform(&mut state);
            let individual = self.evaluate(goal, state);
            self.pool.push(individual);
        }
    }

    /// Replace the ranked pool with the next generation.
    ///
    /// Layout: retained (unchanged top ranks), then mutated, then uniformly
    /// re-sampled. States of discarded slots are reused as sample buffers.
    fn step_generation(&mut self, goal: &dyn GoalRegion<S::State>) {
        let retained = self.config.pool_retained();
        let range = self.config.range;
        let mut ranked = self.pool.take();

        let keep = retained.max(1).min(ranked.len());
        let mut spare: Vec<S::State> = ranked.drain(keep..).map(Individual::into_state).collect();

        let mut mutated = Vec::with_capacity(self.config.pool_mutation);
        for k in 0..self.config.pool_mutation {
            let base = self.mutation_base(k, keep);
            let mut state = spare.pop().unwrap_or_else(|| self.space.alloc_state());
            self.sampler
                .sample_uniform_near(&mut state, ranked[base].state(), range);
            mutated.push(self.evaluate(goal, state));
        }

        if retained == 0 {
            spare.extend(ranked.drain(..).map(Individual::into_state));
        }

        let mut next = ranked;
        next.reserve(self.config.pool_size.saturating_sub(next.len()));
        next.append(&mut mutated);
        for _ in 0..self.config.pool_random {
            let mut state = spare.pop().unwrap_or_else(|| self.space.alloc_state());
            self.sampler.sample_uniform(&mut state);
            next.push(self.evaluate(goal, state));
        }

        self.pool.replace(next);
        self.generations += 1;
        trace!(
            "GeneticSearch: generation {} best valid distance {:?}",
            self.generations,
            self.pool.best_valid_distance()
        );
    }

    /// Rank index of the base state for the `k`-th mutation among the top `keep`.
    fn mutation_base(&mut self, k: usize, keep: usize) -> usize {
        match self.config.mutation_base {
            MutationBase::Cyclic => k % keep,
            MutationBase::Uniform => self.rng.gen_range(0..keep),
            MutationBase::RankWeighted => {
                let total = keep * (keep + 1) / 2;
                let mut target = self.rng.gen_range(0..total);
                for i in 0..keep {
                    let weight = keep - i;
                    if target < weight {
                        return i;
                    }
                    target -= weight;
                }
                keep - 1
            }
        }
    }

    /// Refine `state` with the local refiner.
    ///
    /// The state is restored exactly unless the refiner reports an
    /// improvement that is valid and does not increase the goal distance.
    fn try_to_improve(
        &mut self,
        goal: &dyn GoalRegion<S::State>,
        state: &mut S::State,
        distance: &mut f64,
    ) -> bool {
        debug!("GeneticSearch: distance to goal before improvement: {}", distance);
        let started = Instant::now();
        let original = state.clone();
        let original_distance = *distance;

        let settings = RefineSettings {
            max_steps: self.config.max_improve_steps,
            check_validity: self.config.validity_check,
        };
        let extent = self.space.maximum_extent() / 10.0;
        let mut improved = false;
        for near in [extent, extent / 3.0, extent / 10.0] {
            improved |= self
                .refiner
                .try_to_improve(&*self.space, goal, state, distance, near, settings);
        }

        let refreshed = goal.distance_goal(state);
        let regressed = refreshed.is_nan() || refreshed > original_distance;
        if !improved || regressed || !self.valid(state) {
            *state = original;
            *distance = original_distance;
            debug!("GeneticSearch: improvement rejected, keeping original state");
            return false;
        }

        *distance = refreshed;
        debug!(
            "GeneticSearch: improvement took {} ms, distance to goal after improvement: {}",
            started.elapsed().as_millis(),
            distance
        );
        true
    }

    /// Refine the top valid individuals after the budget ran out.
    fn refine_fallback(&mut self, goal: &dyn GoalRegion<S::State>, result: &mut S::State) -> bool {
        let candidates: Vec<(S::State, f64)> = self
            .pool
            .iter()
            .take(FALLBACK_CANDIDATES)
            .filter(|i| i.is_valid())
            .map(|i| (i.state().clone(), i.distance()))
            .collect();

        for (mut state, mut distance) in candidates {
            if self.try_to_improve(goal, &mut state, &mut distance) && goal.is_satisfied(distance) {
                *result = state;
                return true;
            }
        }
        false
    }

    /// Evaluate fitness for a state that is about to enter the pool.
    fn evaluate(&self, goal: &dyn GoalRegion<S::State>, state: S::State) -> Individual<S::State> {
        let distance = goal.distance_goal(&state);
        let valid = self.valid(&state);
        Individual::evaluated(state, distance, valid)
    }

    /// Validity under the current policy; always true when checking is off.
    #[inline]
    fn valid(&self, state: &S::State) -> bool {
        !self.config.validity_check || self.space.is_valid(state)
    }
}

impl<S: StateSpace, Sm, R> GeneticSearch<S, Sm, R> {
    pub fn space(&self) -> &Arc<S> {
        &self.space
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Current population, best first after a solve.
    pub fn pool(&self) -> &Pool<S::State> {
        &self.pool
    }

    /// Generations run since the pool was created.
    pub fn generations(&self) -> usize {
        self.generations
    }

    /// Statistics of the last solve, if any since creation or `clear`.
    pub fn stats(&self) -> Option<&SearchStats> {
        self.stats.as_ref()
    }

    pub fn refiner(&self) -> &R {
        &self.refiner
    }

    pub fn refiner_mut(&mut self) -> &mut R {
        &mut self.refiner
    }

    pub fn set_max_improve_steps(&mut self, max_steps: u32) {
        self.config.max_improve_steps = max_steps;
    }

    pub fn max_improve_steps(&self) -> u32 {
        self.config.max_improve_steps
    }

    /// When false, states are not checked for validity.
    pub fn set_validity_check(&mut self, valid: bool) {
        self.config.validity_check = valid;
    }

    pub fn validity_check(&self) -> bool {
        self.config.validity_check
    }

    /// Refine solutions with the local refiner before returning them.
    pub fn set_try_improve(&mut self, flag: bool) {
        self.config.try_improve = flag;
    }

    pub fn try_improve(&self) -> bool {
        self.config.try_improve
    }

    pub fn set_pool_size(&mut self, size: usize) {
        self.config.pool_size = size;
    }

    pub fn pool_size(&self) -> usize {
        self.config.pool_size
    }

    pub fn set_pool_mutation_size(&mut self, size: usize) {
        self.config.pool_mutation = size;
    }

    pub fn pool_mutation_size(&self) -> usize {
        self.config.pool_mutation
    }

    pub fn set_pool_random_size(&mut self, size: usize) {
        self.config.pool_random = size;
    }

    pub fn pool_random_size(&self) -> usize {
        self.config.pool_random
    }

    /// Neighborhood radius for mutation; zero picks one on the next solve.
    pub fn set_range(&mut self, distance: f64) {
        self.config.range = distance;
    }

    pub fn range(&self) -> f64 {
        self.config.range
    }

    pub fn set_mutation_base(&mut self, base: MutationBase) {
        self.config.mutation_base = base;
    }

    pub fn mutation_base_rule(&self) -> MutationBase {
        self.config.mutation_base
    }

    pub fn set_seed_near_hints(&mut self, flag: bool) {
        self.config.seed_near_hints = flag;
    }

    /// Whether a fresh pool samples extra states near the hints.
    pub fn seed_near_hints(&self) -> bool {
        self.config.seed_near_hints
    }
}

/// Valid (under the policy the flag was computed with) and close enough.
fn accepts<St>(goal: &dyn GoalRegion<St>, individual: &Individual<St>) -> bool {
    individual.is_valid() && goal.is_satisfied(individual.distance())
}

fn selection_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
