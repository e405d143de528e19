//! Population pool and fitness ranking.

use std::cmp::Ordering;

/// A candidate state with its cached fitness.
///
/// Fitness is only set together with the state, so `distance` and `valid`
/// always describe the current `state`.
#[derive(Debug, Clone)]
pub struct Individual<St> {
    state: St,
    distance: f64,
    valid: bool,
}

impl<St> Individual<St> {
    /// Wrap an evaluated state.
    pub(crate) fn evaluated(state: St, distance: f64, valid: bool) -> Self {
        Self {
            state,
            distance,
            valid,
        }
    }

    pub fn state(&self) -> &St {
        &self.state
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub(crate) fn into_state(self) -> St {
        self.state
    }
}

/// Ranking order: valid before invalid, then smaller distance first.
///
/// Distances compare with [`f64::total_cmp`], so a NaN distance from a
/// misbehaving oracle ranks behind every number instead of breaking the sort.
pub fn rank_order<St>(a: &Individual<St>, b: &Individual<St>) -> Ordering {
    b.valid
        .cmp(&a.valid)
        .then_with(|| a.distance.total_cmp(&b.distance))
}

/// Ordered collection of individuals, best first after [`Pool::rank`].
#[derive(Debug, Clone)]
pub struct Pool<St> {
    individuals: Vec<Individual<St>>,
}

impl<St> Default for Pool<St> {
    fn default() -> Self {
        Self {
            individuals: Vec::new(),
        }
    }
}

impl<St> Pool<St> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            individuals: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn clear(&mut self) {
        self.individuals.clear();
    }

    pub(crate) fn push(&mut self, individual: Individual<St>) {
        self.individuals.push(individual);
    }

    /// Stable sort by [`rank_order`].
    pub fn rank(&mut self) {
        self.individuals.sort_by(rank_order);
    }

    /// Front individual. Only the best after [`Pool::rank`].
    pub fn best(&self) -> Option<&Individual<St>> {
        self.individuals.first()
    }

    pub fn get(&self, index: usize) -> Option<&Individual<St>> {
        self.individuals.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Individual<St>> {
        self.individuals.iter()
    }

    pub fn as_slice(&self) -> &[Individual<St>] {
        &self.individuals
    }

    /// Smallest distance among valid individuals.
    pub fn best_valid_distance(&self) -> Option<f64> {
        self.individuals
            .iter()
            .filter(|i| i.valid)
            .map(|i| i.distance)
            .min_by(f64::total_cmp)
    }

    /// Take the individuals out, leaving the pool empty.
    pub(crate) fn take(&mut self) -> Vec<Individual<St>> {
        std::mem::take(&mut self.individuals)
    }

    pub(crate) fn replace(&mut self, individuals: Vec<Individual<St>>) {
        self.individuals = individuals;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ind(distance: f64, valid: bool) -> Individual<u32> {
        Individual::evaluated(0, distance, valid)
    }

    #[test]
    fn test_validity_dominates_distance() {
        let a = ind(10.0, true);
        let b = ind(1.0, false);
        assert_eq!(rank_order(&a, &b), Ordering::Less);
        assert_eq!(rank_order(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_equal_validity_orders_by_distance() {
        assert_eq!(rank_order(&ind(1.0, true), &ind(2.0, true)), Ordering::Less);
        assert_eq!(rank_order(&ind(3.0, false), &ind(2.0, false)), Ordering::Greater);
        assert_eq!(rank_order(&ind(2.0, false), &ind(2.0, false)), Ordering::Equal);
    }

    #[test]
    fn test_rank_puts_best_first() {
        let mut pool = Pool::default();
        pool.push(Individual::evaluated(1, 0.5, false));
        pool.push(Individual::evaluated(2, 4.0, true));
        pool.push(Individual::evaluated(3, 2.0, true));
        pool.rank();

        let order: Vec<u32> = pool.iter().map(|i| *i.state()).collect();
        assert_eq!(order, vec![3, 2, 1]);
        assert_eq!(pool.best_valid_distance(), Some(2.0));
    }

    #[test]
    fn test_nan_distance_ranks_last() {
        let mut pool = Pool::default();
        pool.push(Individual::evaluated(1, f64::NAN, true));
        pool.push(Individual::evaluated(2, 7.0, true));
        pool.rank();
        assert_eq!(*pool.best().unwrap().state(), 2);
    }

    #[test]
    fn test_best_valid_distance_none_without_valid() {
        let mut pool = Pool::default();
        pool.push(ind(1.0, false));
        assert_eq!(pool.best_valid_distance(), None);
    }

    #[test]
    fn test_take_and_replace_keep_fitness_with_state() {
        let mut pool = Pool::default();
        pool.push(Individual::evaluated(1, 3.0, true));
        pool.push(Individual::evaluated(2, 1.0, false));

        let mut taken = pool.take();
        assert!(pool.is_empty());
        taken.reverse();
        pool.replace(taken);
        pool.rank();

        let entries: Vec<(u32, f64, bool)> = pool
            .iter()
            .map(|i| (*i.state(), i.distance(), i.is_valid()))
            .collect();
        assert_eq!(entries, vec![(1, 3.0, true), (2, 1.0, false)]);
    }

    proptest! {
        #[test]
        fn prop_ranked_pool_is_sorted(
            entries in prop::collection::vec((0.0f64..100.0, any::<bool>()), 1..50)
        ) {
            let mut pool = Pool::default();
            for (d, v) in &entries {
                pool.push(ind(*d, *v));
            }
            pool.rank();

            let slice = pool.as_slice();
            for pair in slice.windows(2) {
                prop_assert_ne!(rank_order(&pair[0], &pair[1]), Ordering::Greater);
            }
            // All valid individuals precede all invalid ones.
            let first_invalid = slice.iter().position(|i| !i.is_valid()).unwrap_or(slice.len());
            prop_assert!(slice[first_invalid..].iter().all(|i| !i.is_valid()));
        }

        #[test]
        fn prop_valid_beats_invalid(dv in 0.0f64..1e6, di in 0.0f64..1e6) {
            prop_assert_eq!(rank_order(&ind(dv, true), &ind(di, false)), Ordering::Less);
        }
    }
}
