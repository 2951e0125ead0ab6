//! Alternative learning-path strategies
//!
//! Besides following the geodesic, a path can be fitted directly by
//! minimising a learning cost over a fixed number of waypoints, or built
//! greedily with a step size that shrinks in complex regions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::geodesic::{distance, GeodesicRequest, GeodesicResult};
use super::EducationalManifold;
use crate::{Error, Result};

/// Waypoints in a directly optimised path.
pub const DIRECT_WAYPOINTS: usize = 50;

/// Step budget of the adaptive walk.
pub const ADAPTIVE_MAX_STEPS: usize = 100;

/// Distance at which the adaptive walk stops.
pub const ADAPTIVE_TOLERANCE: f64 = 1e-3;

const COMPLEXITY_COST: f64 = 0.1;
const SMOOTHNESS_COST: f64 = 0.01;

/// Difficulty weight of each knowledge dimension, `1 + ½ sin(kπ/n)`.
#[must_use]
pub fn complexity_weights(dimension: usize) -> Vec<f64> {
    #[allow(clippy::cast_precision_loss)]
    let n = dimension as f64;
    (0..dimension)
        .map(|k| {
            #[allow(clippy::cast_precision_loss)]
            let k = k as f64;
            1.0 + 0.5 * (k * std::f64::consts::PI / n).sin()
        })
        .collect()
}

/// Strategy used to build a learning path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMethod {
    /// Integrate the geodesic equation.
    Geodesic,
    /// Minimise the learning cost over straight-line-seeded waypoints.
    Direct,
    /// Greedy walk with complexity-damped steps.
    Adaptive,
}

impl PathMethod {
    /// Every method, in the order the constrained search tries them.
    pub const ALL: [Self; 3] = [Self::Geodesic, Self::Adaptive, Self::Direct];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Geodesic => "geodesic",
            Self::Direct => "direct",
            Self::Adaptive => "adaptive",
        }
    }
}

impl fmt::Display for PathMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "geodesic" => Ok(Self::Geodesic),
            "direct" => Ok(Self::Direct),
            "adaptive" => Ok(Self::Adaptive),
            other => Err(Error::UnsupportedFormat(format!(
                "unknown path method '{other}', expected geodesic, direct or adaptive"
            ))),
        }
    }
}

/// Outcome of the direct waypoint optimisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectPath {
    /// Optimised waypoints.
    pub trajectory: Vec<Vec<f64>>,
    /// Learning cost of the waypoints.
    pub cost: f64,
    /// Descent iterations performed.
    pub iterations: usize,
    /// Whether the descent met its stopping tolerance.
    pub success: bool,
}

/// Outcome of the adaptive walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptivePath {
    /// Visited positions, starting point included.
    pub trajectory: Vec<Vec<f64>>,
    /// Step length used for each move.
    pub learning_rates: Vec<f64>,
}

impl AdaptivePath {
    /// Number of visited positions.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.trajectory.len()
    }
}

/// A learning path produced by one of the [`PathMethod`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizedPath {
    /// Geodesic result.
    Geodesic(GeodesicResult),
    /// Direct optimisation result.
    Direct(DirectPath),
    /// Adaptive walk result.
    Adaptive(AdaptivePath),
}

impl OptimizedPath {
    /// Method that produced the path.
    #[must_use]
    pub const fn method(&self) -> PathMethod {
        match self {
            Self::Geodesic(_) => PathMethod::Geodesic,
            Self::Direct(_) => PathMethod::Direct,
            Self::Adaptive(_) => PathMethod::Adaptive,
        }
    }

    /// Sampled positions.
    #[must_use]
    pub fn trajectory(&self) -> &[Vec<f64>] {
        match self {
            Self::Geodesic(result) => &result.trajectory,
            Self::Direct(path) => &path.trajectory,
            Self::Adaptive(path) => &path.trajectory,
        }
    }

    /// Fraction of the initial distance to `target` that was covered.
    ///
    /// Geodesics report their own clamped score. The other methods use the
    /// raw `1 − d_final/d₀`, which is negative for a path that ends further
    /// away than it started.
    #[must_use]
    pub fn efficiency(&self, target: &[f64]) -> f64 {
        if let Self::Geodesic(result) = self {
            return result.efficiency;
        }
        let trajectory = self.trajectory();
        match (trajectory.first(), trajectory.last()) {
            (Some(first), Some(last)) => {
                let initial = distance(first, target);
                if initial == 0.0 {
                    1.0
                } else {
                    1.0 - distance(last, target) / initial
                }
            }
            _ => 0.0,
        }
    }
}

/// Builds learning paths on an [`EducationalManifold`].
#[derive(Debug, Clone)]
pub struct LearningGeodesicOptimizer<'a> {
    manifold: &'a EducationalManifold,
    max_iterations: usize,
    tolerance: f64,
}

impl<'a> LearningGeodesicOptimizer<'a> {
    /// Optimizer over `manifold`.
    #[must_use]
    pub const fn new(manifold: &'a EducationalManifold) -> Self {
        Self {
            manifold,
            max_iterations: 500,
            tolerance: 1e-9,
        }
    }

    /// Iteration budget of the direct method.
    #[must_use]
    pub const fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Relative cost improvement below which the direct method stops.
    #[must_use]
    pub const fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Difficulty weight of each dimension.
    #[must_use]
    pub fn complexity_weights(&self) -> &[f64] {
        self.manifold.complexity_weights()
    }

    /// `‖x_last − target‖ + 0.1 Σ w|x| + 0.01 Σ (Δ²x)²`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTrajectory`] for an empty trajectory and
    /// [`Error::DimensionMismatch`] if a point or the target has the wrong
    /// length.
    pub fn learning_cost(&self, trajectory: &[Vec<f64>], target: &[f64]) -> Result<f64> {
        let n = self.manifold.dimension();
        self.manifold.check_dimension(target)?;
        if trajectory.is_empty() {
            return Err(Error::InvalidTrajectory("trajectory is empty".to_string()));
        }
        let mut flat = Vec::with_capacity(trajectory.len() * n);
        for point in trajectory {
            self.manifold.check_dimension(point)?;
            flat.extend_from_slice(point);
        }
        Ok(self.flat_cost(&flat, target))
    }

    /// Builds a path from `start` to `target` with `method`.
    ///
    /// # Errors
    ///
    /// Propagates validation and integration errors of the chosen method.
    pub fn optimize_learning_path(
        &self,
        start: &[f64],
        target: &[f64],
        method: PathMethod,
    ) -> Result<OptimizedPath> {
        self.manifold.check_dimension(start)?;
        self.manifold.check_dimension(target)?;
        match method {
            PathMethod::Geodesic => self
                .manifold
                .compute_learning_geodesic_with(start, target, &GeodesicRequest::default())
                .map(OptimizedPath::Geodesic),
            PathMethod::Direct => Ok(OptimizedPath::Direct(self.optimize_direct_path(start, target))),
            PathMethod::Adaptive => Ok(OptimizedPath::Adaptive(self.optimize_adaptive_path(start, target))),
        }
    }

    /// Runs every method from `start` to `target`.
    ///
    /// # Errors
    ///
    /// Returns the first error any method reports.
    pub fn compare_methods(&self, start: &[f64], target: &[f64]) -> Result<Vec<OptimizedPath>> {
        [PathMethod::Geodesic, PathMethod::Direct, PathMethod::Adaptive]
            .into_iter()
            .map(|method| self.optimize_learning_path(start, target, method))
            .collect()
    }

    pub(crate) fn optimize_direct_path(&self, start: &[f64], target: &[f64]) -> DirectPath {
        let n = start.len();
        let mut x: Vec<f64> = (0..DIRECT_WAYPOINTS)
            .flat_map(|p| {
                #[allow(clippy::cast_precision_loss)]
                let s = p as f64 / (DIRECT_WAYPOINTS - 1) as f64;
                start.iter().zip(target).map(move |(a, b)| a + (b - a) * s)
            })
            .collect();
        let mut cost = self.flat_cost(&x, target);

        let mut iterations = 0;
        let mut success = false;
        while iterations < self.max_iterations {
            iterations += 1;
            let gradient = self.flat_gradient(&x, target);
            let slope: f64 = gradient.iter().map(|g| g * g).sum();
            if slope < 1e-20 {
                success = true;
                break;
            }

            // Armijo backtracking
            let mut step = 1.0;
            let accepted = loop {
                let candidate: Vec<f64> =
                    x.iter().zip(&gradient).map(|(xi, gi)| xi - step * gi).collect();
                let candidate_cost = self.flat_cost(&candidate, target);
                if candidate_cost <= cost - 1e-4 * step * slope {
                    break Some((candidate, candidate_cost));
                }
                step *= 0.5;
                if step < 1e-12 {
                    break None;
                }
            };

            let Some((candidate, candidate_cost)) = accepted else {
                break;
            };
            let improvement = cost - candidate_cost;
            x = candidate;
            cost = candidate_cost;
            if improvement <= self.tolerance * cost.abs().max(1.0) {
                success = true;
                break;
            }
        }

        debug!(iterations, cost, success, "direct path optimisation finished");
        DirectPath {
            trajectory: x.chunks(n).map(<[f64]>::to_vec).collect(),
            cost,
            iterations,
            success,
        }
    }

    pub(crate) fn optimize_adaptive_path(&self, start: &[f64], target: &[f64]) -> AdaptivePath {
        let weights = self.manifold.complexity_weights();
        let acceleration = self.manifold.learning_acceleration();
        let mut current = start.to_vec();
        let mut trajectory = vec![current.clone()];
        let mut learning_rates = Vec::new();

        for _ in 0..ADAPTIVE_MAX_STEPS {
            let direction: Vec<f64> = target.iter().zip(&current).map(|(t, c)| t - c).collect();
            let remaining = direction.iter().map(|d| d * d).sum::<f64>().sqrt();
            if remaining < ADAPTIVE_TOLERANCE {
                break;
            }
            let complexity: f64 = weights.iter().zip(&direction).map(|(w, d)| w * d.abs()).sum();
            let rate = acceleration / (1.0 + complexity);
            for (c, d) in current.iter_mut().zip(&direction) {
                *c += rate * d / remaining;
            }
            trajectory.push(current.clone());
            learning_rates.push(rate);
        }

        AdaptivePath {
            trajectory,
            learning_rates,
        }
    }

    fn flat_cost(&self, x: &[f64], target: &[f64]) -> f64 {
        let n = target.len();
        let weights = self.manifold.complexity_weights();
        let points = x.len() / n;

        let last = &x[(points - 1) * n..];
        let reach = distance(last, target);

        let complexity: f64 = x
            .chunks(n)
            .map(|p| p.iter().zip(weights).map(|(v, w)| w * v.abs()).sum::<f64>())
            .sum();

        let mut smoothness = 0.0;
        for t in 1..points.saturating_sub(1) {
            for d in 0..n {
                let a = x[(t + 1) * n + d] - 2.0 * x[t * n + d] + x[(t - 1) * n + d];
                smoothness += a * a;
            }
        }

        reach + COMPLEXITY_COST * complexity + SMOOTHNESS_COST * smoothness
    }

    fn flat_gradient(&self, x: &[f64], target: &[f64]) -> Vec<f64> {
        let n = target.len();
        let weights = self.manifold.complexity_weights();
        let points = x.len() / n;
        let mut grad = vec![0.0; x.len()];

        for (i, (g, v)) in grad.iter_mut().zip(x).enumerate() {
            *g = COMPLEXITY_COST * weights[i % n] * sign(*v);
        }

        let last = (points - 1) * n;
        let reach = distance(&x[last..], target);
        if reach > 0.0 {
            for d in 0..n {
                grad[last + d] += (x[last + d] - target[d]) / reach;
            }
        }

        for t in 1..points.saturating_sub(1) {
            for d in 0..n {
                let a = x[(t + 1) * n + d] - 2.0 * x[t * n + d] + x[(t - 1) * n + d];
                let scaled = 2.0 * SMOOTHNESS_COST * a;
                grad[(t + 1) * n + d] += scaled;
                grad[t * n + d] -= 2.0 * scaled;
                grad[(t - 1) * n + d] += scaled;
            }
        }

        grad
    }
}

/// Sign with `sign(0) = 0`, a valid subgradient of `|x|`.
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}
