//! Inverse kinematics for a planar arm via genetic search.

use std::f64::consts::PI;
use std::sync::Arc;
use std::time::{Duration, Instant};

use genetic_search::{
    GoalRegion, StateSpace,
    compute::{RealVectorBounds, RealVectorSearch, RealVectorSpace, RealVectorState},
    schema::SearchConfig,
};

/// Serial chain of revolute joints in the plane.
#[derive(Debug, Clone)]
struct PlanarArm {
    links: Vec<f64>,
}

impl PlanarArm {
    /// Joint positions, base first, end effector last.
    fn joint_positions(&self, angles: &[f64]) -> Vec<(f64, f64)> {
        let mut positions = Vec::with_capacity(self.links.len() + 1);
        let (mut x, mut y, mut theta) = (0.0, 0.0, 0.0);
        positions.push((x, y));
        for (length, angle) in self.links.iter().zip(angles) {
            theta += angle;
            x += length * theta.cos();
            y += length * theta.sin();
            positions.push((x, y));
        }
        positions
    }

    fn end_effector(&self, angles: &[f64]) -> (f64, f64) {
        self.joint_positions(angles)
            .last()
            .copied()
            .unwrap_or((0.0, 0.0))
    }
}

/// End effector within `tolerance` of a target point.
struct ReachGoal {
    arm: PlanarArm,
    target: (f64, f64),
    tolerance: f64,
}

impl GoalRegion<RealVectorState> for ReachGoal {
    fn distance_goal(&self, state: &RealVectorState) -> f64 {
        let (x, y) = self.arm.end_effector(&state.values);
        ((x - self.target.0).powi(2) + (y - self.target.1).powi(2)).sqrt()
    }

    fn is_satisfied(&self, distance: f64) -> bool {
        distance <= self.tolerance
    }
}

fn main() {
    env_logger::init();

    let arm = PlanarArm {
        links: vec![1.0, 0.8, 0.6, 0.4],
    };
    let joints = arm.links.len();

    // The arm must stay above the floor.
    let floor_arm = arm.clone();
    let space = Arc::new(
        RealVectorSpace::new(RealVectorBounds::uniform(joints, -PI, PI))
            .with_validity(move |s| floor_arm.joint_positions(&s.values).iter().all(|p| p.1 >= 0.0)),
    );

    println!("=== Planar Arm IK ({} joints) ===\n", joints);

    for target in [(1.5, 1.0), (-1.0, 1.8), (2.5, 0.3)] {
        let goal = ReachGoal {
            arm: arm.clone(),
            target,
            tolerance: 1e-3,
        };
        let config = SearchConfig {
            pool_size: 80,
            pool_mutation: 30,
            pool_random: 20,
            try_improve: true,
            max_improve_steps: 10,
            ..Default::default()
        };
        let mut engine = match RealVectorSearch::real_vector(Arc::clone(&space), config, Some(42)) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("Invalid configuration: {}", e);
                return;
            }
        };

        let mut result = space.alloc_state();
        let start = Instant::now();
        let solved = match engine.solve(Duration::from_secs(2), &goal, &mut result, &[]) {
            Ok(solved) => solved,
            Err(e) => {
                eprintln!("Search failed: {}", e);
                return;
            }
        };
        let elapsed = start.elapsed();

        println!("Target ({:.2}, {:.2}):", target.0, target.1);
        if solved {
            let (x, y) = arm.end_effector(&result.values);
            println!("  Joints:       {:?}", result.values);
            println!("  End effector: ({:.4}, {:.4})", x, y);
            println!("  Error:        {:.2e}", goal.distance_goal(&result));
        } else {
            println!("  No solution");
        }
        println!("  Generations:  {}", engine.generations());
        println!("  Elapsed:      {:.3}s", elapsed.as_secs_f64());
        println!();
    }
}
