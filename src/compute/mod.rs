//! Compute module - State spaces, goal regions and the genetic search engine.

mod goal;
mod parallel;
mod pool;
mod refine;
mod search;
mod space;

#[cfg(test)]
mod test_support;

pub use goal::*;
pub use parallel::*;
pub use pool::*;
pub use refine::*;
pub use search::*;
pub use space::*;
