//! Genetic search for a single valid state inside a goal region.
//!
//! This crate answers queries of the form "find some valid configuration
//! inside this goal region" (e.g. inverse kinematics for a manipulator)
//! without planning a path. A population of candidate states is evolved
//! under a wall-clock budget: ranked by validity then goal distance, with
//! elitist retention, mutation around good candidates, fresh uniform
//! samples, and optional hill-climbing refinement of the answer.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration types (search settings, command-line problems)
//! - `compute`: State spaces, goal regions, the pool and the search engine
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use genetic_search::{
//!     compute::{GoalState, RealVectorBounds, RealVectorSearch, RealVectorSpace, RealVectorState, StateSpace},
//!     schema::SearchConfig,
//! };
//!
//! // Unit square with a forbidden left half
//! let space = Arc::new(
//!     RealVectorSpace::new(RealVectorBounds::uniform(2, 0.0, 1.0))
//!         .with_validity(|s| s.values[0] > 0.5),
//! );
//! let goal = GoalState::new(Arc::clone(&space), RealVectorState::new(vec![0.8, 0.2]), 0.01);
//!
//! let mut engine = RealVectorSearch::real_vector(Arc::clone(&space), SearchConfig::default(), Some(42))?;
//! engine.set_try_improve(true);
//!
//! let mut result = space.alloc_state();
//! if engine.solve(Duration::from_secs(1), &goal, &mut result, &[])? {
//!     println!("Found {:?}", result.values);
//! }
//! # Ok::<(), genetic_search::schema::ConfigError>(())
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{GeneticSearch, GoalRegion, LocalRefiner, StateSampler, StateSpace};
pub use schema::{ConfigError, SearchConfig};
