//! Manifold configuration

use serde::Deserialize;

use crate::integrate::SolverOptions;
use crate::{Error, Result};

/// Tunable constants of an [`EducationalManifold`](super::EducationalManifold).
///
/// Every field has a default, so a JSON document only needs to name the
/// values it overrides:
///
/// ```rust
/// use ontologica::manifold::ManifoldConfig;
///
/// let config = ManifoldConfig::from_json_str(r#"{ "dimension": 4 }"#)?;
/// assert_eq!(config.dimension, 4);
/// assert!((config.learning_acceleration - 2.1e-2).abs() < 1e-12);
/// # Ok::<(), ontologica::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ManifoldConfig {
    /// Number of coordinates, the first being time-like.
    pub dimension: usize,
    /// Magnitude of the initial learning velocity.
    pub learning_acceleration: f64,
    /// Efficiency the model predicts for well-designed paths.
    pub optimal_efficiency: f64,
    /// Scale `A` of the complexity curvature.
    pub curvature_amplitude: f64,
    /// Width `w` of the curvature bump around the origin.
    pub field_width: f64,
    /// Spacing of the central differences used for the connection.
    pub finite_difference_step: f64,
    /// Closest approach, relative to the start distance, that counts as
    /// reaching the target.
    pub convergence_tolerance: f64,
    /// Evaluation points per geodesic.
    pub samples: usize,
    /// Integrator settings.
    pub solver: SolverOptions,
}

impl Default for ManifoldConfig {
    fn default() -> Self {
        Self {
            dimension: 10,
            learning_acceleration: 2.1e-2,
            optimal_efficiency: 0.78,
            curvature_amplitude: 0.1,
            field_width: 1.0,
            finite_difference_step: 1e-4,
            convergence_tolerance: 0.05,
            samples: 1000,
            solver: SolverOptions::default(),
        }
    }
}

impl ManifoldConfig {
    /// Start from the defaults.
    #[must_use]
    pub fn builder() -> ManifoldConfigBuilder {
        ManifoldConfigBuilder::default()
    }

    /// Parse a (partial) JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for malformed JSON and
    /// [`Error::InvalidInput`] if a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(Error::InvalidInput("dimension must be at least 1".to_string()));
        }
        positive("learning_acceleration", self.learning_acceleration)?;
        positive("field_width", self.field_width)?;
        positive("finite_difference_step", self.finite_difference_step)?;
        if !(self.curvature_amplitude.is_finite() && self.curvature_amplitude >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "curvature_amplitude must be non-negative, got {}",
                self.curvature_amplitude
            )));
        }
        if !(0.0..=1.0).contains(&self.optimal_efficiency) {
            return Err(Error::InvalidInput(format!(
                "optimal_efficiency must be in [0, 1], got {}",
                self.optimal_efficiency
            )));
        }
        if !(self.convergence_tolerance > 0.0 && self.convergence_tolerance <= 1.0) {
            return Err(Error::InvalidInput(format!(
                "convergence_tolerance must be in (0, 1], got {}",
                self.convergence_tolerance
            )));
        }
        if self.samples < 2 {
            return Err(Error::InvalidInput(format!(
                "samples must be at least 2, got {}",
                self.samples
            )));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("{name} must be positive, got {value}")))
    }
}

/// Builder for [`ManifoldConfig`].
#[derive(Debug, Clone, Default)]
pub struct ManifoldConfigBuilder {
    config: ManifoldConfig,
}

impl ManifoldConfigBuilder {
    /// Set the number of coordinates.
    #[must_use]
    pub const fn dimension(mut self, dimension: usize) -> Self {
        self.config.dimension = dimension;
        self
    }

    /// Set the learning acceleration.
    #[must_use]
    pub const fn learning_acceleration(mut self, value: f64) -> Self {
        self.config.learning_acceleration = value;
        self
    }

    /// Set the predicted optimal efficiency.
    #[must_use]
    pub const fn optimal_efficiency(mut self, value: f64) -> Self {
        self.config.optimal_efficiency = value;
        self
    }

    /// Set the curvature amplitude.
    #[must_use]
    pub const fn curvature_amplitude(mut self, value: f64) -> Self {
        self.config.curvature_amplitude = value;
        self
    }

    /// Set the curvature width.
    #[must_use]
    pub const fn field_width(mut self, value: f64) -> Self {
        self.config.field_width = value;
        self
    }

    /// Set the finite difference spacing.
    #[must_use]
    pub const fn finite_difference_step(mut self, value: f64) -> Self {
        self.config.finite_difference_step = value;
        self
    }

    /// Set the convergence tolerance.
    #[must_use]
    pub const fn convergence_tolerance(mut self, value: f64) -> Self {
        self.config.convergence_tolerance = value;
        self
    }

    /// Set the number of geodesic samples.
    #[must_use]
    pub const fn samples(mut self, samples: usize) -> Self {
        self.config.samples = samples;
        self
    }

    /// Set the integrator options.
    #[must_use]
    pub const fn solver(mut self, solver: SolverOptions) -> Self {
        self.config.solver = solver;
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> ManifoldConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ManifoldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ManifoldConfig::builder().dimension(3).samples(50).build();
        assert_eq!(config.dimension, 3);
        assert_eq!(config.samples, 50);
        assert!((config.optimal_efficiency - 0.78).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ManifoldConfig::from_json_str(r#"{"curvature_amplitude": 0.0, "solver": {"rtol": 1e-6}}"#)
                .unwrap();
        assert_eq!(config.curvature_amplitude, 0.0);
        assert!((config.solver.rtol - 1e-6).abs() < 1e-18);
        assert!((config.solver.atol - 1e-6).abs() < 1e-18);
        assert_eq!(config.dimension, 10);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ManifoldConfig::builder().dimension(0).build().validate().is_err());
        assert!(ManifoldConfig::builder().samples(1).build().validate().is_err());
        assert!(ManifoldConfig::builder().field_width(0.0).build().validate().is_err());
        assert!(ManifoldConfig::builder()
            .convergence_tolerance(1.5)
            .build()
            .validate()
            .is_err());
        assert!(matches!(
            ManifoldConfig::from_json_str("{ not json"),
            Err(Error::Serialization(_))
        ));
    }
}
