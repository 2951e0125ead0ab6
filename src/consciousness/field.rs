//! Scalar field on a periodic 1-D lattice
//!
//! The field obeys `φ̈ = ∇²φ − m²φ − λφ³ + J` and is advanced with velocity
//! Verlet, which keeps the lattice energy bounded for any stable `dt`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Lattice and coupling constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of lattice sites.
    pub lattice_size: usize,
    /// Lattice spacing.
    pub dx: f64,
    /// Time step.
    pub dt: f64,
    /// Mass term `m²`.
    pub mass_squared: f64,
    /// Quartic self-coupling `λ`.
    pub coupling: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            lattice_size: 32,
            dx: 1.0,
            dt: 0.01,
            mass_squared: 1.0,
            coupling: 0.1,
        }
    }
}

/// Observer context for [`ConsciousnessFieldOperator::apply_actualization_operator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActualizationContext {
    /// Φ-activation in `[0, 1]`.
    pub phi_activation: f64,
    /// Coherence level, non-negative.
    pub coherence_level: f64,
}

/// Summary of a field configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantumProperties {
    /// Total lattice energy.
    pub energy: f64,
    /// `√(Σ φ²)`.
    pub norm: f64,
    /// `|Σ φ| / Σ |φ|`, 0 for a vanishing field.
    pub coherence: f64,
    /// `max |φ|`.
    pub max_amplitude: f64,
}

/// Outcome of [`ConsciousnessFieldOperator::solve_field_equation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSolution {
    /// Field after the last step.
    pub final_field: Vec<f64>,
    /// Energy before the first step and after each step.
    pub energy_history: Vec<f64>,
    /// Summary of the final state.
    pub quantum_properties: QuantumProperties,
}

/// Actualization operator and field evolution on a periodic lattice.
#[derive(Debug, Clone, Default)]
pub struct ConsciousnessFieldOperator {
    config: FieldConfig,
}

impl ConsciousnessFieldOperator {
    /// Operator with the given constants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty lattice or non-positive
    /// spacing or time step.
    pub fn new(config: FieldConfig) -> Result<Self> {
        if config.lattice_size == 0 {
            return Err(Error::InvalidInput("lattice_size must be at least 1".to_string()));
        }
        for (name, value) in [("dx", config.dx), ("dt", config.dt)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidInput(format!("{name} must be positive, got {value}")));
            }
        }
        for (name, value) in [("mass_squared", config.mass_squared), ("coupling", config.coupling)] {
            if !value.is_finite() {
                return Err(Error::InvalidInput(format!("{name} must be finite, got {value}")));
            }
        }
        Ok(Self { config })
    }

    /// Default constants on `lattice_size` sites.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a zero size.
    pub fn with_lattice_size(lattice_size: usize) -> Result<Self> {
        Self::new(FieldConfig {
            lattice_size,
            ..FieldConfig::default()
        })
    }

    /// Constants in use.
    #[must_use]
    pub const fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Collapses a potential state towards its local average.
    ///
    /// With `α = clamp(Φ·coherence, 0, 1)` and `S` the three-point periodic
    /// average, the result is `(1 + Φ)·((1 − α)ψ + α·S(ψ))`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `state` does not fill the
    /// lattice and [`Error::InvalidInput`] for an out-of-range context.
    pub fn apply_actualization_operator(
        &self,
        state: &[f64],
        context: &ActualizationContext,
    ) -> Result<Vec<f64>> {
        self.check_len(state)?;
        if !(0.0..=1.0).contains(&context.phi_activation) {
            return Err(Error::InvalidInput(format!(
                "phi_activation must be in [0, 1], got {}",
                context.phi_activation
            )));
        }
        if !(context.coherence_level.is_finite() && context.coherence_level >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "coherence_level must be non-negative, got {}",
                context.coherence_level
            )));
        }

        let phi = context.phi_activation;
        let alpha = (phi * context.coherence_level).clamp(0.0, 1.0);
        let n = state.len();
        Ok((0..n)
            .map(|i| {
                let smoothed = (state[(i + n - 1) % n] + state[i] + state[(i + 1) % n]) / 3.0;
                (1.0 + phi) * ((1.0 - alpha) * state[i] + alpha * smoothed)
            })
            .collect())
    }

    /// Evolves `initial` at rest under source `source` for `time_steps`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if either slice does not fill the
    /// lattice, [`Error::InvalidInput`] if either holds a non-finite value and
    /// [`Error::Integration`] if the energy or the field becomes non-finite.
    pub fn solve_field_equation(
        &self,
        initial: &[f64],
        source: &[f64],
        time_steps: usize,
    ) -> Result<FieldSolution> {
        self.check_len(initial)?;
        self.check_len(source)?;
        check_finite("initial field", initial)?;
        check_finite("source", source)?;

        let dt = self.config.dt;
        let mut field = initial.to_vec();
        let mut momentum = vec![0.0; field.len()];
        let mut force = self.force(&field, source);
        let initial_energy = self.energy(&field, &momentum, source);
        if !initial_energy.is_finite() {
            return Err(Error::Integration(format!(
                "initial field energy is {initial_energy}"
            )));
        }
        let mut energy_history = Vec::with_capacity(time_steps + 1);
        energy_history.push(initial_energy);

        for step in 0..time_steps {
            for ((f, p), a) in field.iter_mut().zip(&momentum).zip(&force) {
                *f += dt * p + 0.5 * dt * dt * a;
            }
            let next_force = self.force(&field, source);
            for ((p, a), b) in momentum.iter_mut().zip(&force).zip(&next_force) {
                *p += 0.5 * dt * (a + b);
            }
            force = next_force;

            let energy = self.energy(&field, &momentum, source);
            if !energy.is_finite() || field.iter().any(|v| !v.is_finite()) {
                return Err(Error::Integration(format!(
                    "field became non-finite at step {step}"
                )));
            }
            energy_history.push(energy);
        }

        let quantum_properties = self.quantum_properties(&field, &momentum, source);
        debug!(time_steps, energy = quantum_properties.energy, "field evolution finished");

        Ok(FieldSolution {
            final_field: field,
            energy_history,
            quantum_properties,
        })
    }

    /// Summary of a field at rest under `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if either slice does not fill the
    /// lattice.
    pub fn properties_of(&self, field: &[f64], source: &[f64]) -> Result<QuantumProperties> {
        self.check_len(field)?;
        self.check_len(source)?;
        Ok(self.quantum_properties(field, &vec![0.0; field.len()], source))
    }

    fn quantum_properties(&self, field: &[f64], momentum: &[f64], source: &[f64]) -> QuantumProperties {
        let total: f64 = field.iter().sum();
        let absolute: f64 = field.iter().map(|v| v.abs()).sum();
        QuantumProperties {
            energy: self.energy(field, momentum, source),
            norm: field.iter().map(|v| v * v).sum::<f64>().sqrt(),
            coherence: if absolute > 0.0 { total.abs() / absolute } else { 0.0 },
            max_amplitude: field.iter().fold(0.0, |m, v| m.max(v.abs())),
        }
    }

    fn force(&self, field: &[f64], source: &[f64]) -> Vec<f64> {
        let n = field.len();
        let inv_dx2 = 1.0 / (self.config.dx * self.config.dx);
        (0..n)
            .map(|i| {
                let laplacian =
                    (field[(i + 1) % n] - 2.0 * field[i] + field[(i + n - 1) % n]) * inv_dx2;
                let phi = field[i];
                laplacian - self.config.mass_squared * phi - self.config.coupling * phi.powi(3)
                    + source[i]
            })
            .collect()
    }

    fn energy(&self, field: &[f64], momentum: &[f64], source: &[f64]) -> f64 {
        let n = field.len();
        let dx = self.config.dx;
        (0..n)
            .map(|i| {
                let phi = field[i];
                let gradient = (field[(i + 1) % n] - phi) / dx;
                0.5 * momentum[i] * momentum[i]
                    + 0.5 * gradient * gradient
                    + 0.5 * self.config.mass_squared * phi * phi
                    + 0.25 * self.config.coupling * phi.powi(4)
                    - source[i] * phi
            })
            .sum::<f64>()
            * dx
    }

    fn check_len(&self, values: &[f64]) -> Result<()> {
        if values.len() == self.config.lattice_size {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                expected: self.config.lattice_size,
                actual: values.len(),
            })
        }
    }
}

fn check_finite(name: &str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(Error::InvalidInput(format!(
            "{name} must be finite, got {} at site {i}",
            values[i]
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let x = i as f64 / n as f64;
                0.1 * (2.0 * std::f64::consts::PI * x).sin() + 0.05
            })
            .collect()
    }

    #[test]
    fn test_no_observer_leaves_state_unchanged() {
        let op = ConsciousnessFieldOperator::default();
        let state = wave(32);
        let context = ActualizationContext {
            phi_activation: 0.0,
            coherence_level: 1.0,
        };
        assert_eq!(op.apply_actualization_operator(&state, &context).unwrap(), state);
    }

    #[test]
    fn test_actualization_amplifies_and_smooths() {
        let op = ConsciousnessFieldOperator::default();
        let mut state = vec![0.0; 32];
        state[5] = 1.0;
        let context = ActualizationContext {
            phi_activation: 1.0,
            coherence_level: 1.0,
        };
        let out = op.apply_actualization_operator(&state, &context).unwrap();
        // Full smoothing spreads the spike over three sites, then doubles it
        assert!((out[4] - 2.0 / 3.0).abs() < 1e-12);
        assert!((out[5] - 2.0 / 3.0).abs() < 1e-12);
        assert!((out[6] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(out[10], 0.0);
    }

    #[test]
    fn test_actualization_is_periodic() {
        let op = ConsciousnessFieldOperator::with_lattice_size(4).unwrap();
        let context = ActualizationContext {
            phi_activation: 1.0,
            coherence_level: 1.0,
        };
        let out = op.apply_actualization_operator(&[3.0, 0.0, 0.0, 0.0], &context).unwrap();
        assert!((out[3] - 2.0).abs() < 1e-12);
        assert!((out[1] - 2.0).abs() < 1e-12);
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let op = ConsciousnessFieldOperator::default();
        let context = ActualizationContext {
            phi_activation: 0.5,
            coherence_level: 0.5,
        };
        assert!(matches!(
            op.apply_actualization_operator(&[0.0; 8], &context),
            Err(Error::DimensionMismatch { expected: 32, actual: 8 })
        ));
        assert!(op.solve_field_equation(&[0.0; 32], &[0.0; 31], 10).is_err());
    }

    #[test]
    fn test_energy_is_conserved_without_source() {
        let op = ConsciousnessFieldOperator::default();
        let solution = op.solve_field_equation(&wave(32), &[0.0; 32], 500).unwrap();
        assert_eq!(solution.energy_history.len(), 501);
        let e0 = solution.energy_history[0];
        let drift = solution
            .energy_history
            .iter()
            .map(|e| (e - e0).abs())
            .fold(0.0, f64::max);
        assert!(drift / e0 < 1e-3, "relative drift {}", drift / e0);
    }

    #[test]
    fn test_zero_field_stays_at_rest() {
        let op = ConsciousnessFieldOperator::default();
        let solution = op.solve_field_equation(&[0.0; 32], &[0.0; 32], 50).unwrap();
        assert!(solution.final_field.iter().all(|v| *v == 0.0));
        assert_eq!(solution.quantum_properties.coherence, 0.0);
        assert_eq!(solution.quantum_properties.energy, 0.0);
    }

    #[test]
    fn test_uniform_field_is_fully_coherent() {
        let op = ConsciousnessFieldOperator::with_lattice_size(8).unwrap();
        let props = op.properties_of(&[0.2; 8], &[0.0; 8]).unwrap();
        assert!((props.coherence - 1.0).abs() < 1e-12);
        assert!((props.max_amplitude - 0.2).abs() < 1e-12);
        assert!((props.norm - (8.0 * 0.04_f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_steps_returns_initial_state() {
        let op = ConsciousnessFieldOperator::default();
        let initial = wave(32);
        let solution = op.solve_field_equation(&initial, &[0.0; 32], 0).unwrap();
        assert_eq!(solution.final_field, initial);
        assert_eq!(solution.energy_history.len(), 1);
        assert_eq!(solution.energy_history[0], solution.quantum_properties.energy);
    }

    #[test]
    fn test_non_finite_inputs_rejected_before_stepping() {
        let op = ConsciousnessFieldOperator::with_lattice_size(4).unwrap();
        let err = op.solve_field_equation(&[f64::NAN; 4], &[0.0; 4], 0).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let source = [0.0, f64::INFINITY, 0.0, 0.0];
        let err = op.solve_field_equation(&[0.1; 4], &source, 10).unwrap_err();
        assert!(err.to_string().contains("source"));
        assert!(err.to_string().contains("site 1"));
    }

    #[test]
    fn test_overflowing_initial_energy_is_integration_error() {
        let op = ConsciousnessFieldOperator::with_lattice_size(4).unwrap();
        let err = op.solve_field_equation(&[1e200; 4], &[0.0; 4], 0).unwrap_err();
        assert!(matches!(err, Error::Integration(_)));
    }

    #[test]
    fn test_runaway_field_reports_integration_error() {
        let config = FieldConfig {
            lattice_size: 4,
            dt: 1.0,
            mass_squared: -1.0,
            coupling: -1.0,
            ..FieldConfig::default()
        };
        let op = ConsciousnessFieldOperator::new(config).unwrap();
        let err = op.solve_field_equation(&[1.0; 4], &[0.0; 4], 1_000).unwrap_err();
        assert!(matches!(err, Error::Integration(_)));
    }
}
