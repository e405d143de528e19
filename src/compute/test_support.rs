//! Deterministic stand-ins for engine tests.

use super::goal::GoalRegion;
use super::refine::{LocalRefiner, RefineSettings};
use super::space::{StateSampler, StateSpace};

/// The interval `[0, extent]`; states above `invalid_above` are invalid.
#[derive(Debug, Clone)]
pub struct LineSpace {
    pub extent: f64,
    pub invalid_above: Option<f64>,
}

impl LineSpace {
    pub fn new(extent: f64) -> Self {
        Self {
            extent,
            invalid_above: None,
        }
    }
}

impl StateSpace for LineSpace {
    type State = f64;

    fn alloc_state(&self) -> f64 {
        0.0
    }

    fn is_valid(&self, state: &f64) -> bool {
        (0.0..=self.extent).contains(state) && self.invalid_above.is_none_or(|limit| *state <= limit)
    }

    fn distance(&self, a: &f64, b: &f64) -> f64 {
        (a - b).abs()
    }

    fn maximum_extent(&self) -> f64 {
        self.extent
    }
}

/// Uniform samples walk `start, start + step, ...` modulo `extent`;
/// near samples land exactly `distance` below the base, floored at zero.
#[derive(Debug, Clone)]
pub struct StepSampler {
    pub next: f64,
    pub step: f64,
    pub extent: f64,
    pub uniform_calls: usize,
    pub near_calls: usize,
}

impl StepSampler {
    pub fn new(start: f64, step: f64, extent: f64) -> Self {
        Self {
            next: start,
            step,
            extent,
            uniform_calls: 0,
            near_calls: 0,
        }
    }
}

impl StateSampler<f64> for StepSampler {
    fn sample_uniform(&mut self, state: &mut f64) {
        self.uniform_calls += 1;
        *state = self.next;
        self.next = (self.next + self.step) % self.extent;
    }

    fn sample_uniform_near(&mut self, state: &mut f64, near: &f64, distance: f64) {
        self.near_calls += 1;
        *state = (near - distance).max(0.0);
    }
}

/// Distance is the coordinate itself; satisfaction is fixed.
#[derive(Debug, Clone, Copy)]
pub struct ConstGoal(pub bool);

impl GoalRegion<f64> for ConstGoal {
    fn distance_goal(&self, state: &f64) -> f64 {
        state.abs()
    }

    fn is_satisfied(&self, _distance: f64) -> bool {
        self.0
    }
}

/// Within `threshold` of `target`.
#[derive(Debug, Clone, Copy)]
pub struct PointGoal {
    pub target: f64,
    pub threshold: f64,
}

impl GoalRegion<f64> for PointGoal {
    fn distance_goal(&self, state: &f64) -> f64 {
        (state - self.target).abs()
    }

    fn is_satisfied(&self, distance: f64) -> bool {
        distance <= self.threshold
    }
}

/// Moves the state to `moves_to` and reports `report`, regardless of merit.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedRefiner {
    pub moves_to: f64,
    pub report: bool,
    pub calls: usize,
}

impl ScriptedRefiner {
    pub fn new(moves_to: f64, report: bool) -> Self {
        Self {
            moves_to,
            report,
            calls: 0,
        }
    }
}

impl LocalRefiner<LineSpace> for ScriptedRefiner {
    fn try_to_improve(
        &mut self,
        _space: &LineSpace,
        goal: &dyn GoalRegion<f64>,
        state: &mut f64,
        distance: &mut f64,
        _near_distance: f64,
        _settings: RefineSettings,
    ) -> bool {
        self.calls += 1;
        *state = self.moves_to;
        *distance = goal.distance_goal(state);
        self.report
    }
}
