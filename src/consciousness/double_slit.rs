//! Double-slit interference with observer-dependent visibility

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use trueno::Vector;

use super::phi::PhiActivation;
use crate::integrate::linspace;
use crate::{stats, Error, Result};

/// Fringe spacing the model predicts, in metres.
pub const PREDICTED_FRINGE_SPACING: f64 = 8.3e-6;

/// Relative deviation from [`PREDICTED_FRINGE_SPACING`] still accepted.
pub const FRINGE_SPACING_TOLERANCE: f64 = 0.06;

/// Apparatus and model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoubleSlitConfig {
    /// Wavelength λ in metres.
    pub wavelength: f64,
    /// Slit separation d in metres.
    pub slit_separation: f64,
    /// Slit width a in metres.
    pub slit_width: f64,
    /// Slit-to-screen distance L in metres.
    pub screen_distance: f64,
    /// Half-width of the sampled screen, in fringes.
    pub screen_half_width_fringes: f64,
    /// Screen samples.
    pub samples: usize,
    /// Visibility with no observer influence.
    pub base_visibility: f64,
    /// Decoherence time of an unobserved pattern, in seconds.
    pub base_decoherence_time: f64,
}

impl Default for DoubleSlitConfig {
    fn default() -> Self {
        Self {
            wavelength: 550e-9,
            slit_separation: 6.6265e-3,
            slit_width: 1e-4,
            screen_distance: 0.1,
            screen_half_width_fringes: 5.0,
            samples: 2001,
            base_visibility: 0.5,
            base_decoherence_time: 3.2e-3,
        }
    }
}

impl DoubleSlitConfig {
    /// Geometric fringe spacing `λL/d`.
    #[must_use]
    pub fn fringe_spacing(&self) -> f64 {
        self.wavelength * self.screen_distance / self.slit_separation
    }

    /// Checks every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let lengths = [
            ("wavelength", self.wavelength),
            ("slit_separation", self.slit_separation),
            ("slit_width", self.slit_width),
            ("screen_distance", self.screen_distance),
            ("screen_half_width_fringes", self.screen_half_width_fringes),
            ("base_decoherence_time", self.base_decoherence_time),
        ];
        for (name, value) in lengths {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidInput(format!("{name} must be positive, got {value}")));
            }
        }
        if self.samples < 3 {
            return Err(Error::InvalidInput(format!(
                "samples must be at least 3, got {}",
                self.samples
            )));
        }
        if !(0.0..=1.0).contains(&self.base_visibility) {
            return Err(Error::InvalidInput(format!(
                "base_visibility must be in [0, 1], got {}",
                self.base_visibility
            )));
        }
        Ok(())
    }
}

/// Who is watching the slits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverState {
    /// Φ-activation of the observer in `[0, 1]`.
    pub phi_activation: f64,
    /// Coherence time relative to the reference.
    pub coherence_level: f64,
    /// Free-form label.
    pub description: String,
}

impl ObserverState {
    /// Observer with the given Φ and coherence.
    #[must_use]
    pub fn new(phi_activation: f64, coherence_level: f64, description: impl Into<String>) -> Self {
        Self {
            phi_activation,
            coherence_level,
            description: description.into(),
        }
    }

    /// Observer described by a Φ-activation result.
    #[must_use]
    pub fn from_activation(activation: &PhiActivation, description: impl Into<String>) -> Self {
        Self::new(activation.phi_total, activation.coherence_level, description)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.phi_activation) {
            return Err(Error::InvalidInput(format!(
                "phi_activation must be in [0, 1], got {}",
                self.phi_activation
            )));
        }
        if !(self.coherence_level.is_finite() && self.coherence_level >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "coherence_level must be non-negative, got {}",
                self.coherence_level
            )));
        }
        Ok(())
    }
}

/// Screen intensity samples.
#[derive(Debug, Clone, PartialEq)]
pub struct InterferencePattern {
    /// Screen positions in metres.
    pub positions: Vec<f64>,
    /// Normalised intensity at each position.
    pub intensity: Vec<f64>,
}

/// What one observer saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationOutcome {
    /// Observer label.
    pub description: String,
    /// Observer Φ.
    pub phi_activation: f64,
    /// Observer coherence level.
    pub coherence_level: f64,
    /// Visibility the model assigns to the observer.
    pub target_visibility: f64,
    /// Visibility measured on the central fringe.
    pub measured_visibility: f64,
    /// Mean distance between adjacent maxima, if at least two were found.
    pub fringe_spacing: Option<f64>,
    /// Which-path distinguishability `√(1 − V²)`.
    pub which_path_information: f64,
    /// Decoherence time in seconds.
    pub decoherence_time: f64,
}

/// How strongly Φ tracks the measured quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsciousnessCorrelation {
    /// Pearson correlation of Φ with measured visibility.
    pub visibility_correlation: f64,
    /// Pearson correlation of Φ with which-path information.
    pub which_path_correlation: f64,
}

/// Outcome of [`DoubleSlitSimulator::simulate_experiment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentOutcome {
    /// One outcome per observer, in input order.
    pub experiment_results: Vec<ObservationOutcome>,
    /// Φ correlations across observers.
    pub consciousness_correlation: ConsciousnessCorrelation,
}

/// Comparison of a measured spacing with the prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FringeVerification {
    /// Measured spacing.
    pub measured: f64,
    /// Predicted spacing.
    pub predicted: f64,
    /// `|measured − predicted| / predicted`.
    pub relative_deviation: f64,
    /// Whether the deviation is within tolerance.
    pub within_prediction: bool,
}

/// Simulates the double-slit pattern seen by different observers.
#[derive(Debug, Clone, Default)]
pub struct DoubleSlitSimulator {
    config: DoubleSlitConfig,
}

impl DoubleSlitSimulator {
    /// Simulator with the given apparatus.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an invalid configuration.
    pub fn new(config: DoubleSlitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Apparatus in use.
    #[must_use]
    pub const fn config(&self) -> &DoubleSlitConfig {
        &self.config
    }

    /// Visibility `V₀ + (1 − V₀)·Φ·min(c, 1)`, clamped to `[0, 1]`.
    #[must_use]
    pub fn visibility_for(&self, observer: &ObserverState) -> f64 {
        let v0 = self.config.base_visibility;
        let influence = observer.phi_activation * observer.coherence_level.min(1.0);
        (v0 + (1.0 - v0) * influence).clamp(0.0, 1.0)
    }

    /// Samples `sinc²(πax/λL) · (1 + V cos(2πdx/λL)) / 2` across the screen.
    #[must_use]
    pub fn interference_pattern(&self, visibility: f64) -> InterferencePattern {
        let c = &self.config;
        let half_width = c.screen_half_width_fringes * c.fringe_spacing();
        let positions = linspace(-half_width, half_width, c.samples);
        let lambda_l = c.wavelength * c.screen_distance;
        let two_pi = 2.0 * std::f64::consts::PI;

        let intensity = positions
            .iter()
            .map(|&x| {
                let beta = std::f64::consts::PI * c.slit_width * x / lambda_l;
                let envelope = if beta == 0.0 { 1.0 } else { (beta.sin() / beta).powi(2) };
                envelope * (1.0 + visibility * (two_pi * c.slit_separation * x / lambda_l).cos()) / 2.0
            })
            .collect();

        InterferencePattern {
            positions,
            intensity,
        }
    }

    /// Measures the pattern seen by `observer`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an out-of-range observer and
    /// [`Error::Compute`] if the SIMD reduction fails.
    pub fn simulate_observation(&self, observer: &ObserverState) -> Result<ObservationOutcome> {
        observer.validate()?;
        let target_visibility = self.visibility_for(observer);
        let pattern = self.interference_pattern(target_visibility);

        let measured_visibility = self.central_visibility(&pattern)?;
        let fringe_spacing = mean_peak_spacing(&pattern);
        let which_path_information = (1.0 - target_visibility * target_visibility).max(0.0).sqrt();
        let decoherence_time =
            self.config.base_decoherence_time * (0.5 + observer.coherence_level.min(1.0));

        Ok(ObservationOutcome {
            description: observer.description.clone(),
            phi_activation: observer.phi_activation,
            coherence_level: observer.coherence_level,
            target_visibility,
            measured_visibility,
            fringe_spacing,
            which_path_information,
            decoherence_time,
        })
    }

    /// Runs one observation per observer and correlates Φ with the results.
    ///
    /// # Errors
    ///
    /// Returns the first observation error.
    pub fn simulate_experiment(&self, observers: &[ObserverState]) -> Result<ExperimentOutcome> {
        #[cfg(feature = "rayon")]
        let results: Result<Vec<ObservationOutcome>> =
            observers.par_iter().map(|o| self.simulate_observation(o)).collect();
        #[cfg(not(feature = "rayon"))]
        let results: Result<Vec<ObservationOutcome>> =
            observers.iter().map(|o| self.simulate_observation(o)).collect();
        let experiment_results = results?;

        let phi: Vec<f64> = experiment_results.iter().map(|r| r.phi_activation).collect();
        let visibility: Vec<f64> = experiment_results.iter().map(|r| r.measured_visibility).collect();
        let which_path: Vec<f64> =
            experiment_results.iter().map(|r| r.which_path_information).collect();

        Ok(ExperimentOutcome {
            consciousness_correlation: ConsciousnessCorrelation {
                visibility_correlation: stats::pearson(&phi, &visibility).unwrap_or(0.0),
                which_path_correlation: stats::pearson(&phi, &which_path).unwrap_or(0.0),
            },
            experiment_results,
        })
    }

    /// Compares `measured` with [`PREDICTED_FRINGE_SPACING`].
    #[must_use]
    pub fn verify_fringe_spacing(&self, measured: f64) -> FringeVerification {
        verify_fringe_spacing(measured)
    }

    fn central_visibility(&self, pattern: &InterferencePattern) -> Result<f64> {
        let half = 0.5 * self.config.fringe_spacing() * (1.0 + 1e-9);
        #[allow(clippy::cast_possible_truncation)]
        let central: Vec<f32> = pattern
            .positions
            .iter()
            .zip(&pattern.intensity)
            .filter(|(x, _)| x.abs() <= half)
            .map(|(_, i)| *i as f32)
            .collect();
        if central.is_empty() {
            return Err(Error::Compute("central fringe has no samples".to_string()));
        }

        let v = Vector::from_slice(&central);
        let max = f64::from(v.max().map_err(|e| Error::Compute(format!("SIMD max failed: {e}")))?);
        let min = f64::from(v.min().map_err(|e| Error::Compute(format!("SIMD min failed: {e}")))?);
        if max + min <= 0.0 {
            return Ok(0.0);
        }
        Ok(((max - min) / (max + min)).clamp(0.0, 1.0))
    }
}

/// Compares `measured` with [`PREDICTED_FRINGE_SPACING`] at 6% tolerance.
#[must_use]
pub fn verify_fringe_spacing(measured: f64) -> FringeVerification {
    let relative_deviation = (measured - PREDICTED_FRINGE_SPACING).abs() / PREDICTED_FRINGE_SPACING;
    FringeVerification {
        measured,
        predicted: PREDICTED_FRINGE_SPACING,
        relative_deviation,
        within_prediction: relative_deviation <= FRINGE_SPACING_TOLERANCE,
    }
}

fn mean_peak_spacing(pattern: &InterferencePattern) -> Option<f64> {
    let i = &pattern.intensity;
    let peaks: Vec<f64> = (1..i.len().saturating_sub(1))
        .filter(|&k| i[k] > i[k - 1] && i[k] >= i[k + 1])
        .map(|k| pattern.positions[k])
        .collect();
    if peaks.len() < 2 {
        return None;
    }
    let total: f64 = peaks.windows(2).map(|w| w[1] - w[0]).sum();
    #[allow(clippy::cast_precision_loss)]
    let gaps = (peaks.len() - 1) as f64;
    Some(total / gaps)
}
