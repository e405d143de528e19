//! Local refinement of single states (hill climbing).

use super::goal::GoalRegion;
use super::space::{StateSampler, StateSpace};

/// Budget and validity policy for one refinement call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefineSettings {
    /// Maximum number of consecutive non-improving samples per radius.
    pub max_steps: u32,
    /// Reject invalid candidates.
    pub check_validity: bool,
}

/// Bounded local search that moves one state toward a goal.
pub trait LocalRefiner<S: StateSpace> {
    /// Try to move `state` closer to `goal`, sampling within `near_distance`.
    ///
    /// On entry `distance` is the state's current goal distance; on return it
    /// describes the (possibly updated) state. Returns true if the state was
    /// improved.
    fn try_to_improve(
        &mut self,
        space: &S,
        goal: &dyn GoalRegion<S::State>,
        state: &mut S::State,
        distance: &mut f64,
        near_distance: f64,
        settings: RefineSettings,
    ) -> bool;
}

/// Refiner that never changes anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRefinement;

impl<S: StateSpace> LocalRefiner<S> for NoRefinement {
    fn try_to_improve(
        &mut self,
        _space: &S,
        _goal: &dyn GoalRegion<S::State>,
        _state: &mut S::State,
        _distance: &mut f64,
        _near_distance: f64,
        _settings: RefineSettings,
    ) -> bool {
        false
    }
}

/// Stochastic hill climbing.
///
/// Samples around the current state and keeps any sample that is closer to
/// the goal. After `max_steps` consecutive misses the sampling radius is
/// halved; the whole call is capped at `max_steps²` samples.
pub struct HillClimbing<Sm> {
    sampler: Sm,
}

impl<Sm> HillClimbing<Sm> {
    pub fn new(sampler: Sm) -> Self {
        Self { sampler }
    }

    pub fn sampler_mut(&mut self) -> &mut Sm {
        &mut self.sampler
    }
}

impl<S, Sm> LocalRefiner<S> for HillClimbing<Sm>
where
    S: StateSpace,
    Sm: StateSampler<S::State>,
{
    fn try_to_improve(
        &mut self,
        space: &S,
        goal: &dyn GoalRegion<S::State>,
        state: &mut S::State,
        distance: &mut f64,
        near_distance: f64,
        settings: RefineSettings,
    ) -> bool {
        let max_steps = settings.max_steps as u64;
        let budget = max_steps * max_steps;
        let mut near = near_distance;
        let mut candidate = space.alloc_state();
        let mut improved = false;
        let mut satisfied = goal.is_satisfied(*distance);
        let mut steps = 0u64;

        while steps < budget && !satisfied && near > 0.0 {
            let mut misses = 0u64;
            while misses < max_steps && steps < budget && !satisfied {
                steps += 1;
                self.sampler.sample_uniform_near(&mut candidate, state, near);
                let (reached, d) = goal.is_satisfied_state(&candidate);
                if d < *distance && (!settings.check_validity || space.is_valid(&candidate)) {
                    std::mem::swap(state, &mut candidate);
                    *distance = d;
                    improved = true;
                    satisfied = reached;
                    misses = 0;
                } else {
                    misses += 1;
                }
            }
            near /= 2.0;
        }

        improved
    }
}
