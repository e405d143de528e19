//! Problem descriptions for the command-line solver.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compute::{BoundsError, RealVectorBounds, RealVectorSpace, RealVectorState, SphereObstacle};

use super::{ConfigError, SearchConfig};

/// A point-goal query in a box-bounded real vector space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemConfig {
    /// Lower and upper bound per dimension.
    pub bounds: Vec<(f64, f64)>,
    /// Goal state.
    pub goal: Vec<f64>,
    /// Acceptance radius around the goal.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// States inside any obstacle are invalid.
    #[serde(default)]
    pub obstacles: Vec<SphereObstacle>,
    /// Seed states, consumed in order.
    #[serde(default)]
    pub hints: Vec<Vec<f64>>,
    /// Engine configuration.
    #[serde(default)]
    pub search: SearchConfig,
    /// Independent engines run in parallel.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Sampler seed. Worker `i` uses `seed + i`.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            bounds: vec![(-1.0, 1.0); 3],
            goal: vec![0.5, 0.5, 0.5],
            threshold: default_threshold(),
            obstacles: vec![SphereObstacle {
                center: vec![0.0, 0.0, 0.0],
                radius: 0.25,
            }],
            hints: Vec::new(),
            search: SearchConfig::default(),
            workers: default_workers(),
            random_seed: None,
        }
    }
}

fn default_threshold() -> f64 {
    0.01
}
fn default_workers() -> usize {
    1
}

impl ProblemConfig {
    /// Read and validate a problem from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProblemError> {
        let text = fs::read_to_string(path)?;
        let problem: ProblemConfig = serde_json::from_str(&text)?;
        problem.validate()?;
        Ok(problem)
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.bounds.len()
    }

    /// Validate dimensions, bounds and the search configuration.
    pub fn validate(&self) -> Result<(), ProblemError> {
        self.bounds_box().validate()?;
        let dim = self.dimension();
        let check_dim = |what: &'static str, found: usize| {
            if found != dim {
                Err(ProblemError::DimensionMismatch {
                    what,
                    expected: dim,
                    found,
                })
            } else {
                Ok(())
            }
        };
        check_dim("goal", self.goal.len())?;
        for hint in &self.hints {
            check_dim("hint", hint.len())?;
        }
        for obstacle in &self.obstacles {
            check_dim("obstacle", obstacle.center.len())?;
        }
        if self.workers == 0 {
            return Err(ProblemError::NoWorkers);
        }
        self.search.validate()?;
        Ok(())
    }

    fn bounds_box(&self) -> RealVectorBounds {
        RealVectorBounds {
            low: self.bounds.iter().map(|b| b.0).collect(),
            high: self.bounds.iter().map(|b| b.1).collect(),
        }
    }

    /// State space with obstacles.
    pub fn space(&self) -> RealVectorSpace {
        RealVectorSpace::new(self.bounds_box()).with_obstacles(self.obstacles.clone())
    }

    pub fn goal_state(&self) -> RealVectorState {
        RealVectorState::new(self.goal.clone())
    }

    pub fn hint_states(&self) -> Vec<RealVectorState> {
        self.hints.iter().cloned().map(RealVectorState::new).collect()
    }
}

/// Problem loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ProblemError {
    #[error("Failed to read problem file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse problem: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid bounds: {0}")]
    InvalidBounds(#[from] BoundsError),
    #[error("{what} has {found} dimensions, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("At least one worker is required")]
    NoWorkers,
    #[error("Search configuration invalid: {0}")]
    Search(#[from] ConfigError),
}
