//! State spaces, samplers and validity for the search engine.
//!
//! The engine only sees the [`StateSpace`] and [`StateSampler`] traits.
//! [`RealVectorSpace`] is a box-bounded Euclidean space that covers joint
//! spaces of serial manipulators and most test problems.

use std::fmt;
use std::sync::Arc;

use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Geometry and validity oracle over a configuration space.
pub trait StateSpace {
    /// A point in the space.
    type State: Clone + fmt::Debug;

    /// Allocate a state with unspecified contents.
    fn alloc_state(&self) -> Self::State;

    /// Whether the state satisfies the domain constraints (e.g. collision-free).
    fn is_valid(&self, state: &Self::State) -> bool;

    /// Distance between two states.
    fn distance(&self, a: &Self::State, b: &Self::State) -> f64;

    /// Largest distance between any two states of the space.
    fn maximum_extent(&self) -> f64;
}

/// Random state generation.
pub trait StateSampler<St> {
    /// Overwrite `state` with a uniformly random state.
    fn sample_uniform(&mut self, state: &mut St);

    /// Overwrite `state` with a random state within `distance` of `near`.
    fn sample_uniform_near(&mut self, state: &mut St, near: &St, distance: f64);
}

/// A point in a real vector space.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RealVectorState {
    pub values: Vec<f64>,
}

impl RealVectorState {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.values.len()
    }
}

impl From<Vec<f64>> for RealVectorState {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

/// Malformed box bounds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BoundsError {
    #[error("no dimensions")]
    NoDimensions,
    #[error("low has {low} dimensions but high has {high}")]
    LengthMismatch { low: usize, high: usize },
    #[error("dimension {dimension} low ({low}) > high ({high})")]
    Inverted { dimension: usize, low: f64, high: f64 },
}

/// Axis-aligned bounds of a real vector space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealVectorBounds {
    pub low: Vec<f64>,
    pub high: Vec<f64>,
}

impl RealVectorBounds {
    /// Same `[low, high]` interval on every axis.
    pub fn uniform(dimension: usize, low: f64, high: f64) -> Self {
        Self {
            low: vec![low; dimension],
            high: vec![high; dimension],
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.low.len()
    }

    /// Check that the box is non-empty, both vectors agree in length and
    /// every interval is ordered.
    pub fn validate(&self) -> Result<(), BoundsError> {
        if self.low.is_empty() && self.high.is_empty() {
            return Err(BoundsError::NoDimensions);
        }
        if self.low.len() != self.high.len() {
            return Err(BoundsError::LengthMismatch {
                low: self.low.len(),
                high: self.high.len(),
            });
        }
        for (dimension, (&low, &high)) in self.low.iter().zip(&self.high).enumerate() {
            if !(low <= high) {
                return Err(BoundsError::Inverted { dimension, low, high });
            }
        }
        Ok(())
    }

    /// Whether the state lies inside the box.
    pub fn contains(&self, state: &RealVectorState) -> bool {
        state.values.len() == self.dimension()
            && state
                .values
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(v, (lo, hi))| v >= lo && v <= hi)
    }
}

/// Spherical obstacle: states within `radius` of `center` are invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereObstacle {
    pub center: Vec<f64>,
    pub radius: f64,
}

impl SphereObstacle {
    pub fn contains(&self, state: &RealVectorState) -> bool {
        euclidean(&self.center, &state.values) <= self.radius
    }
}

/// Validity predicate shared between engines.
pub type ValidityFn = Arc<dyn Fn(&RealVectorState) -> bool + Send + Sync>;

/// Box-bounded Euclidean space.
///
/// Out-of-bounds states are invalid. Additional constraints come from
/// obstacles and an optional user predicate.
#[derive(Clone)]
pub struct RealVectorSpace {
    bounds: RealVectorBounds,
    obstacles: Vec<SphereObstacle>,
    validity: Option<ValidityFn>,
}

impl fmt::Debug for RealVectorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealVectorSpace")
            .field("bounds", &self.bounds)
            .field("obstacles", &self.obstacles)
            .field("validity", &self.validity.is_some())
            .finish()
    }
}

impl RealVectorSpace {
    pub fn new(bounds: RealVectorBounds) -> Self {
        Self {
            bounds,
            obstacles: Vec::new(),
            validity: None,
        }
    }

    pub fn with_obstacles(mut self, obstacles: Vec<SphereObstacle>) -> Self {
        self.obstacles = obstacles;
        self
    }

    /// Add a validity predicate, checked after bounds and obstacles.
    pub fn with_validity<F>(mut self, validity: F) -> Self
    where
        F: Fn(&RealVectorState) -> bool + Send + Sync + 'static,
    {
        self.validity = Some(Arc::new(validity));
        self
    }

    pub fn bounds(&self) -> &RealVectorBounds {
        &self.bounds
    }

    pub fn obstacles(&self) -> &[SphereObstacle] {
        &self.obstacles
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.bounds.dimension()
    }

    /// Sampler over this space's bounds. `None` seeds from entropy.
    pub fn sampler(&self, seed: Option<u64>) -> RealVectorSampler {
        RealVectorSampler::new(self.bounds.clone(), seed)
    }
}

impl StateSpace for RealVectorSpace {
    type State = RealVectorState;

    fn alloc_state(&self) -> RealVectorState {
        RealVectorState::new(vec![0.0; self.dimension()])
    }

    fn is_valid(&self, state: &RealVectorState) -> bool {
        self.bounds.contains(state)
            && !self.obstacles.iter().any(|o| o.contains(state))
            && self.validity.as_ref().is_none_or(|valid| valid(state))
    }

    fn distance(&self, a: &RealVectorState, b: &RealVectorState) -> f64 {
        euclidean(&a.values, &b.values)
    }

    fn maximum_extent(&self) -> f64 {
        euclidean(&self.bounds.low, &self.bounds.high)
    }
}

/// Seeded sampler over a real vector box.
///
/// Near-sampling draws each coordinate within `distance` of the base and
/// clamps to the bounds.
pub struct RealVectorSampler {
    bounds: RealVectorBounds,
    rng: StdRng,
}

impl RealVectorSampler {
    /// Create a sampler. `None` seeds from entropy.
    pub fn new(bounds: RealVectorBounds, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { bounds, rng }
    }

    /// Interval of axis `i`. A missing upper bound collapses to the lower one.
    fn interval(&self, i: usize) -> (f64, f64) {
        let low = self.bounds.low[i];
        (low, self.bounds.high.get(i).copied().unwrap_or(low))
    }

    /// Uniform in `[lo, hi]`, tolerating degenerate intervals.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi > lo {
            self.rng.gen_range(lo..=hi)
        } else {
            lo
        }
    }
}

impl StateSampler<RealVectorState> for RealVectorSampler {
    fn sample_uniform(&mut self, state: &mut RealVectorState) {
        let dim = self.bounds.dimension();
        state.values.resize(dim, 0.0);
        for i in 0..dim {
            let (lo, hi) = self.interval(i);
            state.values[i] = self.uniform(lo, hi);
        }
    }

    fn sample_uniform_near(
        &mut self,
        state: &mut RealVectorState,
        near: &RealVectorState,
        distance: f64,
    ) {
        let dim = self.bounds.dimension();
        state.values.resize(dim, 0.0);
        for i in 0..dim {
            let (low, high) = self.interval(i);
            let center = near.values.get(i).copied().unwrap_or(low);
            let lo = (center - distance).max(low);
            let hi = (center + distance).min(high);
            state.values[i] = self.uniform(lo, hi);
        }
    }
}

/// Euclidean distance over the common prefix of two coordinate slices.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> RealVectorSpace {
        RealVectorSpace::new(RealVectorBounds::uniform(2, 0.0, 1.0))
    }

    #[test]
    fn test_bounds_validate() {
        assert_eq!(RealVectorBounds::uniform(3, -1.0, 1.0).validate(), Ok(()));
        assert_eq!(
            RealVectorBounds::uniform(0, 0.0, 1.0).validate(),
            Err(BoundsError::NoDimensions)
        );

        let ragged = RealVectorBounds {
            low: vec![0.0, 0.0],
            high: vec![1.0],
        };
        assert_eq!(
            ragged.validate(),
            Err(BoundsError::LengthMismatch { low: 2, high: 1 })
        );

        let inverted = RealVectorBounds {
            low: vec![0.0, 2.0],
            high: vec![1.0, 1.0],
        };
        assert!(matches!(
            inverted.validate(),
            Err(BoundsError::Inverted { dimension: 1, .. })
        ));
    }

    #[test]
    fn test_ragged_bounds_sample_without_panic() {
        let bounds = RealVectorBounds {
            low: vec![0.0, 0.5, 0.25],
            high: vec![1.0],
        };
        let mut sampler = RealVectorSampler::new(bounds, Some(3));
        let mut state = RealVectorState::default();

        sampler.sample_uniform(&mut state);
        assert_eq!(state.values.len(), 3);
        assert!((0.0..=1.0).contains(&state.values[0]));
        assert_eq!(&state.values[1..], &[0.5, 0.25]);

        let near = state.clone();
        sampler.sample_uniform_near(&mut state, &near, 0.1);
        assert_eq!(&state.values[1..], &[0.5, 0.25]);
    }

    #[test]
    fn test_maximum_extent() {
        let space = unit_square();
        assert!((space.maximum_extent() - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_validity_bounds_and_obstacles() {
        let space = unit_square().with_obstacles(vec![SphereObstacle {
            center: vec![0.5, 0.5],
            radius: 0.1,
        }]);

        assert!(space.is_valid(&vec![0.1, 0.1].into()));
        assert!(!space.is_valid(&vec![0.5, 0.55].into()));
        assert!(!space.is_valid(&vec![1.5, 0.1].into()));
        assert!(!space.is_valid(&vec![0.1].into()));
    }

    #[test]
    fn test_custom_validity() {
        let space = unit_square().with_validity(|s| s.values[0] < 0.5);
        assert!(space.is_valid(&vec![0.2, 0.9].into()));
        assert!(!space.is_valid(&vec![0.7, 0.9].into()));
    }

    #[test]
    fn test_uniform_sampling_in_bounds() {
        let space = unit_square();
        let mut sampler = space.sampler(Some(7));
        let mut state = space.alloc_state();
        for _ in 0..100 {
            sampler.sample_uniform(&mut state);
            assert!(space.bounds().contains(&state));
        }
    }

    #[test]
    fn test_near_sampling_stays_near() {
        let space = unit_square();
        let mut sampler = space.sampler(Some(7));
        let base = RealVectorState::new(vec![0.5, 0.5]);
        let mut state = space.alloc_state();
        for _ in 0..100 {
            sampler.sample_uniform_near(&mut state, &base, 0.05);
            assert!(state.values.iter().all(|v| (v - 0.5).abs() <= 0.05 + 1e-12));
        }
    }

    #[test]
    fn test_seeded_samplers_agree() {
        let space = unit_square();
        let mut a = space.sampler(Some(42));
        let mut b = space.sampler(Some(42));
        let mut sa = space.alloc_state();
        let mut sb = space.alloc_state();
        a.sample_uniform(&mut sa);
        b.sample_uniform(&mut sb);
        assert_eq!(sa, sb);
    }
}
