//! Educational manifold: learning paths as geodesics of a knowledge metric
//!
//! Knowledge states are points of an `n`-dimensional space whose first
//! coordinate is time-like. The [`KnowledgeMetric`] bends the spatial block
//! near the origin, and a learner released towards a target with speed
//! `learning_acceleration · quality` follows the geodesic of that metric.
//!
//! ```rust
//! use ontologica::manifold::{EducationalManifold, ManifoldConfig};
//!
//! let config = ManifoldConfig::builder().dimension(3).samples(200).build();
//! let manifold = EducationalManifold::from_config(config)?;
//! let result = manifold.compute_learning_geodesic(&[0.0, 0.1, 0.1], &[0.0, 0.6, 0.4], 30.0)?;
//!
//! assert_eq!(result.len(), 200);
//! assert!((0.0..=1.0).contains(&result.efficiency));
//! # Ok::<(), ontologica::Error>(())
//! ```

mod config;
mod constraints;
pub mod curves;
mod geodesic;
mod metric;
mod optimizer;

pub use config::{ManifoldConfig, ManifoldConfigBuilder};
pub use constraints::{ConstrainedPath, ConstraintViolation, LearningConstraints};
pub use geodesic::{GeodesicRequest, GeodesicResult, GeodesicSystem};
pub use metric::{validate_metric, ChristoffelSymbols, KnowledgeMetric, MetricField};
pub use optimizer::{
    complexity_weights, AdaptivePath, DirectPath, LearningGeodesicOptimizer, OptimizedPath,
    PathMethod,
};

use nalgebra::DMatrix;
use tracing::{info, warn};

use crate::integrate::{linspace, solve_ivp, SolveStatus};
use crate::{Error, Result};
use geodesic::distance;

/// Efficiency floor, the score of an uninformed learner.
const RANDOM_EFFICIENCY: f64 = 0.1;

/// Knowledge space with its metric and learning dynamics.
#[derive(Debug, Clone)]
pub struct EducationalManifold {
    config: ManifoldConfig,
    metric: KnowledgeMetric,
    metric_tensor: DMatrix<f64>,
    complexity_weights: Vec<f64>,
}

impl EducationalManifold {
    /// Manifold of `dimension` coordinates with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a zero dimension.
    pub fn new(dimension: usize) -> Result<Self> {
        Self::from_config(ManifoldConfig::builder().dimension(dimension).build())
    }

    /// Manifold built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for out-of-range settings and
    /// [`Error::InvalidMetric`] if the curvature is strong enough to break
    /// the metric signature.
    pub fn from_config(config: ManifoldConfig) -> Result<Self> {
        config.validate()?;
        let metric = KnowledgeMetric::new(
            config.dimension,
            config.curvature_amplitude,
            config.field_width,
        );
        let metric_tensor = metric.metric_at(&vec![0.0; config.dimension]);
        validate_metric(&metric_tensor)?;
        let complexity_weights = complexity_weights(config.dimension);

        Ok(Self {
            config,
            metric,
            metric_tensor,
            complexity_weights,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ManifoldConfig {
        &self.config
    }

    /// Number of coordinates.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Initial learning speed at unit quality.
    #[must_use]
    pub const fn learning_acceleration(&self) -> f64 {
        self.config.learning_acceleration
    }

    /// Predicted efficiency of well-designed paths.
    #[must_use]
    pub const fn optimal_efficiency(&self) -> f64 {
        self.config.optimal_efficiency
    }

    /// Metric at the origin.
    #[must_use]
    pub const fn metric_tensor(&self) -> &DMatrix<f64> {
        &self.metric_tensor
    }

    /// Underlying metric field.
    #[must_use]
    pub const fn metric_field(&self) -> &KnowledgeMetric {
        &self.metric
    }

    /// Difficulty weight of each dimension.
    #[must_use]
    pub fn complexity_weights(&self) -> &[f64] {
        &self.complexity_weights
    }

    /// Validated metric at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] or [`Error::InvalidMetric`].
    pub fn metric_at(&self, position: &[f64]) -> Result<DMatrix<f64>> {
        self.check_dimension(position)?;
        let g = self.metric.metric_at(position);
        validate_metric(&g)?;
        Ok(g)
    }

    /// Connection at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] or [`Error::InvalidMetric`].
    pub fn christoffel_symbols(&self, position: &[f64]) -> Result<ChristoffelSymbols> {
        ChristoffelSymbols::from_metric_field(
            &self.metric,
            position,
            self.config.finite_difference_step,
        )
    }

    /// Geodesic acceleration `−Γᵐᵢⱼ vⁱ vʲ` at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if either slice has the wrong
    /// length.
    pub fn geodesic_acceleration(&self, position: &[f64], velocity: &[f64]) -> Result<Vec<f64>> {
        self.christoffel_symbols(position)?.acceleration(velocity)
    }

    /// Initial learning velocity pointing from `current` to `target`.
    ///
    /// Has magnitude `learning_acceleration · quality`, and is zero when the
    /// two points coincide.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the lengths differ.
    pub fn optimal_learning_direction(
        &self,
        current: &[f64],
        target: &[f64],
        educational_quality: f64,
    ) -> Result<Vec<f64>> {
        if current.len() != target.len() {
            return Err(Error::DimensionMismatch {
                expected: current.len(),
                actual: target.len(),
            });
        }
        let gap = distance(current, target);
        if gap == 0.0 {
            return Ok(vec![0.0; current.len()]);
        }
        let speed = self.config.learning_acceleration * educational_quality;
        Ok(target
            .iter()
            .zip(current)
            .map(|(t, c)| (t - c) / gap * speed)
            .collect())
    }

    /// `max(0.1, (d₀ − d_final) / d₀)` for distances to `target`.
    ///
    /// A trajectory that starts at the target scores 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTrajectory`] for an empty trajectory and
    /// [`Error::DimensionMismatch`] if the endpoints and target differ in
    /// length.
    pub fn calculate_learning_efficiency(
        &self,
        trajectory: &[Vec<f64>],
        target: &[f64],
    ) -> Result<f64> {
        let (Some(first), Some(last)) = (trajectory.first(), trajectory.last()) else {
            return Err(Error::InvalidTrajectory("trajectory is empty".to_string()));
        };
        for point in [first, last] {
            if point.len() != target.len() {
                return Err(Error::DimensionMismatch {
                    expected: target.len(),
                    actual: point.len(),
                });
            }
        }

        let initial = distance(first, target);
        if initial == 0.0 {
            return Ok(1.0);
        }
        let progress = (initial - distance(last, target)) / initial;
        Ok(progress.max(RANDOM_EFFICIENCY))
    }

    /// Geodesic from `initial` towards `target` over `[0, max_time]` at unit
    /// quality.
    ///
    /// # Errors
    ///
    /// See [`compute_learning_geodesic_with`](Self::compute_learning_geodesic_with).
    pub fn compute_learning_geodesic(
        &self,
        initial: &[f64],
        target: &[f64],
        max_time: f64,
    ) -> Result<GeodesicResult> {
        self.compute_learning_geodesic_with(initial, target, &GeodesicRequest::with_max_time(max_time))
    }

    /// Geodesic from `initial` towards `target`.
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if either point has the wrong length
    /// - [`Error::InvalidInput`] for non-finite coordinates, a non-positive
    ///   horizon or a negative quality
    /// - [`Error::Integration`] if the solver gives up
    pub fn compute_learning_geodesic_with(
        &self,
        initial: &[f64],
        target: &[f64],
        request: &GeodesicRequest,
    ) -> Result<GeodesicResult> {
        self.check_dimension(initial)?;
        self.check_dimension(target)?;
        if initial.iter().chain(target).any(|v| !v.is_finite()) {
            return Err(Error::InvalidInput("knowledge states must be finite".to_string()));
        }
        if !(request.max_time.is_finite() && request.max_time > 0.0) {
            return Err(Error::InvalidInput(format!(
                "max_time must be positive, got {}",
                request.max_time
            )));
        }
        if !(request.educational_quality.is_finite() && request.educational_quality >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "educational quality must be non-negative, got {}",
                request.educational_quality
            )));
        }

        let n = self.dimension();
        let velocity = self.optimal_learning_direction(initial, target, request.educational_quality)?;
        let mut y0 = initial.to_vec();
        y0.extend_from_slice(&velocity);

        let system = GeodesicSystem::new(&self.metric, self.config.finite_difference_step);
        let t_eval = linspace(0.0, request.max_time, self.config.samples);
        let solution = solve_ivp(
            &system,
            (0.0, request.max_time),
            &y0,
            &t_eval,
            &self.config.solver,
        )?;

        if let SolveStatus::Diverged { t } = solution.status {
            warn!(t, "learning geodesic diverged, scoring the partial path");
        }

        let (trajectory, velocity): (Vec<Vec<f64>>, Vec<Vec<f64>>) = solution
            .y
            .into_iter()
            .map(|mut state| {
                let v = state.split_off(n);
                (state, v)
            })
            .unzip();

        let efficiency = self.calculate_learning_efficiency(&trajectory, target)?;
        let start_gap = distance(initial, target);
        let closest_approach = trajectory
            .iter()
            .map(|p| distance(p, target))
            .fold(start_gap, f64::min);
        let converged = matches!(solution.status, SolveStatus::Success)
            && (start_gap == 0.0
                || closest_approach <= self.config.convergence_tolerance * start_gap);
        let complexity_profile = trajectory.iter().map(|p| self.point_complexity(p)).collect();

        info!(
            samples = trajectory.len(),
            efficiency,
            converged,
            closest_approach,
            "learning geodesic computed"
        );

        Ok(GeodesicResult {
            time: solution.t,
            trajectory,
            velocity,
            efficiency,
            converged,
            closest_approach,
            complexity_profile,
            status: solution.status,
        })
    }

    /// Knowledge retained after `days`; see [`curves::knowledge_retention`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for out-of-range arguments.
    pub fn knowledge_retention_curve(
        &self,
        initial_retention: f64,
        days: f64,
        educational_quality: f64,
    ) -> Result<f64> {
        curves::knowledge_retention(initial_retention, days, educational_quality)
    }

    /// Skill after `days`; see [`curves::skill_acquisition`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for out-of-range arguments.
    pub fn skill_acquisition_curve(
        &self,
        days: f64,
        max_skill: f64,
        learning_rate: f64,
    ) -> Result<f64> {
        curves::skill_acquisition(days, max_skill, learning_rate)
    }

    /// Weighted mean absolute coordinate `Σ w_k |x_k| / n`.
    #[must_use]
    pub fn point_complexity(&self, point: &[f64]) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let n = self.dimension() as f64;
        point
            .iter()
            .zip(&self.complexity_weights)
            .map(|(x, w)| w * x.abs())
            .sum::<f64>()
            / n
    }

    pub(crate) fn check_dimension(&self, point: &[f64]) -> Result<()> {
        if point.len() == self.dimension() {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                expected: self.dimension(),
                actual: point.len(),
            })
        }
    }
}
