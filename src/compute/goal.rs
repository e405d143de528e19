//! Goal regions: acceptance criteria over states.

use std::sync::Arc;

use super::space::StateSpace;

/// A region of the state space the search tries to reach.
///
/// The engine only measures distances and asks whether a distance is
/// close enough; it never inspects the region itself.
pub trait GoalRegion<St> {
    /// Distance from `state` to the region. Zero or negative inside it.
    fn distance_goal(&self, state: &St) -> f64;

    /// Whether a state at `distance` counts as reaching the goal.
    fn is_satisfied(&self, distance: f64) -> bool;

    /// Distance and satisfaction in one call.
    fn is_satisfied_state(&self, state: &St) -> (bool, f64) {
        let distance = self.distance_goal(state);
        (self.is_satisfied(distance), distance)
    }
}

impl<St, G: GoalRegion<St> + ?Sized> GoalRegion<St> for &G {
    fn distance_goal(&self, state: &St) -> f64 {
        (**self).distance_goal(state)
    }

    fn is_satisfied(&self, distance: f64) -> bool {
        (**self).is_satisfied(distance)
    }
}

/// Ball of radius `threshold` around a target state.
pub struct GoalState<S: StateSpace> {
    space: Arc<S>,
    target: S::State,
    threshold: f64,
}

impl<S: StateSpace> GoalState<S> {
    pub fn new(space: Arc<S>, target: S::State, threshold: f64) -> Self {
        Self {
            space,
            target,
            threshold,
        }
    }

    pub fn target(&self) -> &S::State {
        &self.target
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }
}

impl<S: StateSpace> GoalRegion<S::State> for GoalState<S> {
    fn distance_goal(&self, state: &S::State) -> f64 {
        self.space.distance(state, &self.target)
    }

    fn is_satisfied(&self, distance: f64) -> bool {
        distance <= self.threshold
    }
}
