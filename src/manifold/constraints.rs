//! Constrained learning-path search

use std::fmt;

use tracing::{debug, warn};

use super::geodesic::GeodesicRequest;
use super::optimizer::{LearningGeodesicOptimizer, OptimizedPath, PathMethod};
use super::EducationalManifold;
use crate::{Error, Result};

/// Limits a learning path has to respect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningConstraints {
    /// Largest complexity allowed at any point of the path.
    pub max_complexity: f64,
    /// Smallest acceptable efficiency.
    pub min_efficiency: f64,
    /// Horizon of the geodesic candidate.
    pub max_time: f64,
    /// Quality scaling the geodesic's initial velocity.
    pub educational_quality: f64,
}

impl Default for LearningConstraints {
    fn default() -> Self {
        Self {
            max_complexity: f64::INFINITY,
            min_efficiency: 0.0,
            max_time: 100.0,
            educational_quality: 1.0,
        }
    }
}

impl LearningConstraints {
    /// Cap the complexity.
    #[must_use]
    pub const fn max_complexity(mut self, value: f64) -> Self {
        self.max_complexity = value;
        self
    }

    /// Require a minimum efficiency.
    #[must_use]
    pub const fn min_efficiency(mut self, value: f64) -> Self {
        self.min_efficiency = value;
        self
    }

    /// Set the geodesic horizon.
    #[must_use]
    pub const fn max_time(mut self, value: f64) -> Self {
        self.max_time = value;
        self
    }

    /// Set the educational quality.
    #[must_use]
    pub const fn educational_quality(mut self, value: f64) -> Self {
        self.educational_quality = value;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.max_complexity.is_nan() || self.max_complexity <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "max_complexity must be positive, got {}",
                self.max_complexity
            )));
        }
        if !(0.0..=1.0).contains(&self.min_efficiency) {
            return Err(Error::InvalidInput(format!(
                "min_efficiency must be in [0, 1], got {}",
                self.min_efficiency
            )));
        }
        Ok(())
    }
}

/// A limit the chosen path breaks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstraintViolation {
    /// Some point of the path is too complex.
    ComplexityExceeded {
        /// Highest complexity along the path.
        peak: f64,
        /// Allowed maximum.
        limit: f64,
    },
    /// The path covers too little of the distance.
    EfficiencyBelow {
        /// Achieved efficiency.
        efficiency: f64,
        /// Required minimum.
        minimum: f64,
    },
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ComplexityExceeded { peak, limit } => {
                write!(f, "complexity {peak:.4} exceeds limit {limit:.4}")
            }
            Self::EfficiencyBelow {
                efficiency,
                minimum,
            } => write!(f, "efficiency {efficiency:.4} below minimum {minimum:.4}"),
        }
    }
}

/// Path chosen by [`EducationalManifold::find_optimal_learning_path`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConstrainedPath {
    /// Strategy that produced the path.
    pub method: PathMethod,
    /// Sampled positions.
    pub trajectory: Vec<Vec<f64>>,
    /// Learning efficiency in `[0.1, 1]`.
    pub efficiency: f64,
    /// Complexity of every position.
    pub complexity_profile: Vec<f64>,
    /// Whether every constraint holds.
    pub constraints_met: bool,
    /// Constraints the path breaks.
    pub violations: Vec<ConstraintViolation>,
}

impl ConstrainedPath {
    /// Largest entry of the complexity profile.
    #[must_use]
    pub fn peak_complexity(&self) -> f64 {
        self.complexity_profile.iter().copied().fold(0.0, f64::max)
    }
}

impl EducationalManifold {
    /// Finds a path from `start` to `target` that respects `constraints`.
    ///
    /// The geodesic is tried first, then the adaptive walk, then the
    /// directly optimised path. The first candidate without violations
    /// wins. If none is clean, the one with the fewest violations is
    /// returned, ties going to the higher efficiency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] or [`Error::InvalidInput`] for
    /// bad arguments, and propagates geodesic integration errors.
    pub fn find_optimal_learning_path(
        &self,
        start: &[f64],
        target: &[f64],
        constraints: &LearningConstraints,
    ) -> Result<ConstrainedPath> {
        self.check_dimension(start)?;
        self.check_dimension(target)?;
        constraints.validate()?;

        let optimizer = LearningGeodesicOptimizer::new(self);
        let mut best: Option<ConstrainedPath> = None;

        for method in PathMethod::ALL {
            let path = match method {
                PathMethod::Geodesic => OptimizedPath::Geodesic(self.compute_learning_geodesic_with(
                    start,
                    target,
                    &GeodesicRequest {
                        max_time: constraints.max_time,
                        educational_quality: constraints.educational_quality,
                    },
                )?),
                PathMethod::Adaptive => {
                    OptimizedPath::Adaptive(optimizer.optimize_adaptive_path(start, target))
                }
                PathMethod::Direct => {
                    OptimizedPath::Direct(optimizer.optimize_direct_path(start, target))
                }
            };
            let candidate = self.assess(path, target, constraints)?;

            if candidate.constraints_met {
                debug!(method = %candidate.method, efficiency = candidate.efficiency, "constrained path found");
                return Ok(candidate);
            }

            let better = best.as_ref().map_or(true, |current| {
                candidate.violations.len() < current.violations.len()
                    || (candidate.violations.len() == current.violations.len()
                        && candidate.efficiency > current.efficiency)
            });
            if better {
                best = Some(candidate);
            }
        }

        let best = best.ok_or_else(|| Error::Compute("no candidate learning path".to_string()))?;
        warn!(
            method = %best.method,
            violations = best.violations.len(),
            "no learning path satisfies every constraint"
        );
        Ok(best)
    }

    fn assess(
        &self,
        path: OptimizedPath,
        target: &[f64],
        constraints: &LearningConstraints,
    ) -> Result<ConstrainedPath> {
        let method = path.method();
        let (trajectory, efficiency, complexity_profile) = match path {
            OptimizedPath::Geodesic(result) => {
                (result.trajectory, result.efficiency, result.complexity_profile)
            }
            OptimizedPath::Direct(direct) => self.score(direct.trajectory, target)?,
            OptimizedPath::Adaptive(adaptive) => self.score(adaptive.trajectory, target)?,
        };

        let peak = complexity_profile.iter().copied().fold(0.0, f64::max);
        let mut violations = Vec::new();
        if peak > constraints.max_complexity {
            violations.push(ConstraintViolation::ComplexityExceeded {
                peak,
                limit: constraints.max_complexity,
            });
        }
        if efficiency < constraints.min_efficiency {
            violations.push(ConstraintViolation::EfficiencyBelow {
                efficiency,
                minimum: constraints.min_efficiency,
            });
        }

        Ok(ConstrainedPath {
            method,
            trajectory,
            efficiency,
            complexity_profile,
            constraints_met: violations.is_empty(),
            violations,
        })
    }

    fn score(
        &self,
        trajectory: Vec<Vec<f64>>,
        target: &[f64],
    ) -> Result<(Vec<Vec<f64>>, f64, Vec<f64>)> {
        let efficiency = self.calculate_learning_efficiency(&trajectory, target)?;
        let profile = trajectory.iter().map(|p| self.point_complexity(p)).collect();
        Ok((trajectory, efficiency, profile))
    }
}
