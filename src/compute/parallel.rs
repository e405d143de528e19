//! Parallel search: independent engines on rayon workers.

use std::time::Duration;

use rayon::prelude::*;

use crate::schema::ConfigError;

use super::goal::GoalRegion;
use super::refine::LocalRefiner;
use super::search::GeneticSearch;
use super::space::{StateSampler, StateSpace};

/// A solution found by one of the engines.
#[derive(Debug, Clone)]
pub struct ParallelSolution<St> {
    /// Index of the engine that produced the state.
    pub worker: usize,
    pub state: St,
    pub distance: f64,
}

/// Run every engine for `solve_time` on its own worker.
///
/// Each engine keeps its own pool and sampler, so the searches never share
/// mutable state. Returns the satisfying state closest to the goal, or
/// `None` if no engine succeeded. A configuration error in any engine is
/// returned instead.
pub fn solve_parallel<S, Sm, R, G>(
    engines: &mut [GeneticSearch<S, Sm, R>],
    solve_time: Duration,
    goal: &G,
    hint: &[S::State],
) -> Result<Option<ParallelSolution<S::State>>, ConfigError>
where
    S: StateSpace + Send + Sync,
    S::State: Send + Sync,
    Sm: StateSampler<S::State> + Send,
    R: LocalRefiner<S> + Send,
    G: GoalRegion<S::State> + Sync,
{
    let outcomes: Vec<Result<Option<ParallelSolution<S::State>>, ConfigError>> = engines
        .par_iter_mut()
        .enumerate()
        .map(|(worker, engine)| {
            let mut state = engine.space().alloc_state();
            let solved = engine.solve(solve_time, goal, &mut state, hint)?;
            Ok(solved.then(|| ParallelSolution {
                worker,
                distance: goal.distance_goal(&state),
                state,
            }))
        })
        .collect();

    let mut best: Option<ParallelSolution<S::State>> = None;
    for outcome in outcomes {
        if let Some(solution) = outcome? {
            if best
                .as_ref()
                .is_none_or(|b| solution.distance.total_cmp(&b.distance).is_lt())
            {
                best = Some(solution);
            }
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::goal::GoalState;
    use crate::compute::search::RealVectorSearch;
    use crate::compute::space::{RealVectorBounds, RealVectorSpace, RealVectorState};
    use crate::schema::SearchConfig;
    use std::sync::Arc;

    fn engines(space: &Arc<RealVectorSpace>, config: &SearchConfig, n: u64) -> Vec<RealVectorSearch> {
        (0..n)
            .map(|i| RealVectorSearch::real_vector(Arc::clone(space), config.clone(), Some(100 + i)).unwrap())
            .collect()
    }

    #[test]
    fn test_parallel_finds_solution() {
        let space = Arc::new(RealVectorSpace::new(RealVectorBounds::uniform(2, 0.0, 1.0)));
        let goal = GoalState::new(Arc::clone(&space), RealVectorState::new(vec![0.25, 0.75]), 0.05);
        let mut workers = engines(&space, &SearchConfig::default(), 4);

        let solution = solve_parallel(&mut workers, Duration::from_secs(5), &goal, &[])
            .unwrap()
            .expect("some worker should solve an easy query");

        assert!(solution.worker < 4);
        assert!(solution.distance <= 0.05);
        assert!(goal.distance_goal(&solution.state) <= 0.05);
    }

    #[test]
    fn test_parallel_reports_config_error() {
        let space = Arc::new(RealVectorSpace::new(RealVectorBounds::uniform(2, 0.0, 1.0)));
        let goal = GoalState::new(Arc::clone(&space), RealVectorState::new(vec![0.5, 0.5]), 0.05);
        let mut workers = engines(&space, &SearchConfig::default(), 2);
        workers[1].set_pool_size(0);

        let outcome = solve_parallel(&mut workers, Duration::from_millis(10), &goal, &[]);
        assert_eq!(outcome.err(), Some(ConfigError::EmptyPool));
    }

    #[test]
    fn test_parallel_unreachable_goal() {
        let space = Arc::new(RealVectorSpace::new(RealVectorBounds::uniform(2, 0.0, 1.0)));
        let goal = GoalState::new(Arc::clone(&space), RealVectorState::new(vec![5.0, 5.0]), 0.05);
        let mut workers = engines(&space, &SearchConfig::default(), 2);

        let outcome = solve_parallel(&mut workers, Duration::from_millis(20), &goal, &[]).unwrap();
        assert!(outcome.is_none());
    }
}
