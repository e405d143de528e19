//! Schema module - Configuration types for searches and command-line problems.

mod config;
mod problem;

pub use config::*;
pub use problem::*;
