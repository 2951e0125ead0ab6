//! Geodesic equation as a first-order system

use serde::{Deserialize, Serialize};

use super::metric::{ChristoffelSymbols, MetricField};
use crate::integrate::{DynamicalSystem, SolveStatus};
use crate::{Error, Result};

/// `d²xᵐ/dt² = −Γᵐᵢⱼ ẋⁱ ẋʲ` rewritten over the state `[x, ẋ]`.
pub struct GeodesicSystem<'a, F: MetricField + ?Sized> {
    field: &'a F,
    step: f64,
}

impl<'a, F: MetricField + ?Sized> GeodesicSystem<'a, F> {
    /// Geodesic flow of `field`, with the connection taken from central
    /// differences of spacing `step`.
    pub const fn new(field: &'a F, step: f64) -> Self {
        Self { field, step }
    }
}

impl<F: MetricField + ?Sized> DynamicalSystem for GeodesicSystem<'_, F> {
    fn dimension(&self) -> usize {
        2 * self.field.dimension()
    }

    fn apply(&self, _t: f64, state: &[f64], out: &mut [f64]) -> Result<()> {
        let n = self.field.dimension();
        let (position, velocity) = state.split_at(n);
        if position.iter().any(|x| !x.is_finite()) {
            return Err(Error::Integration(format!(
                "geodesic left the finite domain at {position:?}"
            )));
        }
        let gamma = ChristoffelSymbols::from_metric_field(self.field, position, self.step)?;
        let (dx, dv) = out.split_at_mut(n);
        dx.copy_from_slice(velocity);
        gamma.accelerate_into(velocity, dv);
        Ok(())
    }
}

/// Parameters of one geodesic computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeodesicRequest {
    /// Integration horizon.
    pub max_time: f64,
    /// Scales the initial learning velocity.
    pub educational_quality: f64,
}

impl Default for GeodesicRequest {
    fn default() -> Self {
        Self {
            max_time: 100.0,
            educational_quality: 1.0,
        }
    }
}

impl GeodesicRequest {
    /// Request with the given horizon and unit quality.
    #[must_use]
    pub fn with_max_time(max_time: f64) -> Self {
        Self {
            max_time,
            ..Self::default()
        }
    }

    /// Set the educational quality.
    #[must_use]
    pub const fn educational_quality(mut self, quality: f64) -> Self {
        self.educational_quality = quality;
        self
    }
}

/// Sampled learning geodesic together with its scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeodesicResult {
    /// Sample times.
    pub time: Vec<f64>,
    /// Position at each sample.
    pub trajectory: Vec<Vec<f64>>,
    /// Velocity at each sample.
    pub velocity: Vec<Vec<f64>>,
    /// Learning efficiency of the sampled path, in `[0.1, 1]`.
    pub efficiency: f64,
    /// Whether the path came within tolerance of the target.
    pub converged: bool,
    /// Smallest distance to the target along the path.
    pub closest_approach: f64,
    /// Complexity of every sampled position.
    pub complexity_profile: Vec<f64>,
    /// How integration ended.
    pub status: SolveStatus,
}

impl GeodesicResult {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    /// Whether no sample was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }

    /// Last sampled position.
    #[must_use]
    pub fn final_position(&self) -> Option<&[f64]> {
        self.trajectory.last().map(Vec::as_slice)
    }

    /// Largest entry of the complexity profile.
    #[must_use]
    pub fn peak_complexity(&self) -> f64 {
        self.complexity_profile.iter().copied().fold(0.0, f64::max)
    }
}

/// Euclidean distance between two points of equal dimension.
pub(crate) fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrate::{linspace, solve_ivp, SolverOptions};
    use nalgebra::DMatrix;

    struct Flat;

    impl MetricField for Flat {
        fn dimension(&self) -> usize {
            2
        }

        fn metric_at(&self, _position: &[f64]) -> DMatrix<f64> {
            DMatrix::from_row_slice(2, 2, &[-1.0, 0.0, 0.0, 1.0])
        }
    }

    #[test]
    fn test_flat_geodesics_are_straight_lines() {
        let system = GeodesicSystem::new(&Flat, 1e-4);
        let t_eval = linspace(0.0, 2.0, 5);
        let solution = solve_ivp(
            &system,
            (0.0, 2.0),
            &[0.0, 1.0, 0.5, -0.25],
            &t_eval,
            &SolverOptions::default(),
        )
        .unwrap();
        let last = solution.last_state().unwrap();
        assert!((last[0] - 1.0).abs() < 1e-9);
        assert!((last[1] - 0.5).abs() < 1e-9);
        assert!((last[2] - 0.5).abs() < 1e-12);
        assert!((last[3] + 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_system_dimension_doubles() {
        assert_eq!(GeodesicSystem::new(&Flat, 1e-4).dimension(), 4);
    }

    #[test]
    fn test_request_defaults() {
        let request = GeodesicRequest::default();
        assert_eq!(request.max_time, 100.0);
        assert_eq!(request.educational_quality, 1.0);
        let custom = GeodesicRequest::with_max_time(5.0).educational_quality(0.5);
        assert_eq!(custom.max_time, 5.0);
        assert_eq!(custom.educational_quality, 0.5);
    }

    #[test]
    fn test_distance() {
        assert!((distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
    }
}
