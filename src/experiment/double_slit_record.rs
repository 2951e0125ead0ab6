//! Double-Slit Record - one interference measurement with its observer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consciousness::{ConsciousnessState, ObservationOutcome, PhiActivation};
use crate::{Error, Result};

/// Observer state at measurement time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsciousnessSnapshot {
    /// Φ-activation total.
    pub phi_total: f64,
    /// Whether the observer was activated.
    pub activated: bool,
    /// Learning capacity, if measured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_capacity: Option<f64>,
    /// Choice capability, if measured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_capability: Option<f64>,
    /// Educational participation, if measured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub educational_participation: Option<f64>,
}

impl ConsciousnessSnapshot {
    /// Snapshot with only the Φ summary.
    #[must_use]
    pub const fn new(phi_total: f64, activated: bool) -> Self {
        Self {
            phi_total,
            activated,
            learning_capacity: None,
            choice_capability: None,
            educational_participation: None,
        }
    }

    /// Snapshot of a scored state.
    #[must_use]
    pub const fn from_state(state: &ConsciousnessState, activation: &PhiActivation) -> Self {
        Self {
            phi_total: activation.phi_total,
            activated: activation.activated,
            learning_capacity: Some(state.learning_capacity()),
            choice_capability: Some(state.choice_capability()),
            educational_participation: Some(state.educational_participation()),
        }
    }
}

/// Double-Slit Record stores one measured interference pattern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoubleSlitRecord {
    fringe_spacing: f64,
    decoherence_time: f64,
    consciousness: ConsciousnessSnapshot,
    visibility_ratio: Option<f64>,
    environmental_conditions: Option<serde_json::Value>,
    recorded_at: DateTime<Utc>,
}

impl DoubleSlitRecord {
    /// Create a record with the required measurements.
    #[must_use]
    pub fn new(fringe_spacing: f64, decoherence_time: f64, consciousness: ConsciousnessSnapshot) -> Self {
        Self::builder(fringe_spacing, decoherence_time, consciousness).build()
    }

    /// Create a builder for a record with optional fields.
    #[must_use]
    pub fn builder(
        fringe_spacing: f64,
        decoherence_time: f64,
        consciousness: ConsciousnessSnapshot,
    ) -> DoubleSlitRecordBuilder {
        DoubleSlitRecordBuilder::new(fringe_spacing, decoherence_time, consciousness)
    }

    /// Record a simulated observation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExperiment`] if the pattern had no measurable
    /// fringe spacing.
    pub fn from_observation(
        outcome: &ObservationOutcome,
        consciousness: ConsciousnessSnapshot,
    ) -> Result<Self> {
        let spacing = outcome.fringe_spacing.ok_or_else(|| {
            Error::InvalidExperiment(format!(
                "observation '{}' produced no measurable fringe spacing",
                outcome.description
            ))
        })?;
        Ok(Self::builder(spacing, outcome.decoherence_time, consciousness)
            .visibility_ratio(outcome.measured_visibility)
            .build())
    }

    /// Checks measured values are physical.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExperiment`] for a non-positive spacing or
    /// decoherence time, a visibility outside `[0, 1]`, or a Φ outside
    /// `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !(self.fringe_spacing.is_finite() && self.fringe_spacing > 0.0) {
            return Err(Error::InvalidExperiment(format!(
                "fringe_spacing must be positive, got {}",
                self.fringe_spacing
            )));
        }
        if !(self.decoherence_time.is_finite() && self.decoherence_time > 0.0) {
            return Err(Error::InvalidExperiment(format!(
                "decoherence_time must be positive, got {}",
                self.decoherence_time
            )));
        }
        if !(0.0..=1.0).contains(&self.consciousness.phi_total) {
            return Err(Error::InvalidExperiment(format!(
                "phi_total must be in [0, 1], got {}",
                self.consciousness.phi_total
            )));
        }
        if let Some(v) = self.visibility_ratio {
            if !(0.0..=1.0).contains(&v) {
                return Err(Error::InvalidExperiment(format!(
                    "visibility_ratio must be in [0, 1], got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Get the fringe spacing in metres.
    #[must_use]
    pub const fn fringe_spacing(&self) -> f64 {
        self.fringe_spacing
    }

    /// Get the decoherence time in seconds.
    #[must_use]
    pub const fn decoherence_time(&self) -> f64 {
        self.decoherence_time
    }

    /// Get the observer snapshot.
    #[must_use]
    pub const fn consciousness(&self) -> &ConsciousnessSnapshot {
        &self.consciousness
    }

    /// Get the visibility ratio, if measured.
    #[must_use]
    pub const fn visibility_ratio(&self) -> Option<f64> {
        self.visibility_ratio
    }

    /// Get the environmental conditions, if any.
    #[must_use]
    pub const fn environmental_conditions(&self) -> Option<&serde_json::Value> {
        self.environmental_conditions.as_ref()
    }

    /// Get the recording timestamp.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Builder for `DoubleSlitRecord`.
#[derive(Debug)]
pub struct DoubleSlitRecordBuilder {
    record: DoubleSlitRecord,
}

impl DoubleSlitRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(fringe_spacing: f64, decoherence_time: f64, consciousness: ConsciousnessSnapshot) -> Self {
        Self {
            record: DoubleSlitRecord {
                fringe_spacing,
                decoherence_time,
                consciousness,
                visibility_ratio: None,
                environmental_conditions: None,
                recorded_at: Utc::now(),
            },
        }
    }

    /// Set the visibility ratio.
    #[must_use]
    pub const fn visibility_ratio(mut self, ratio: f64) -> Self {
        self.record.visibility_ratio = Some(ratio);
        self
    }

    /// Set the environmental conditions.
    #[must_use]
    pub fn environmental_conditions(mut self, conditions: serde_json::Value) -> Self {
        self.record.environmental_conditions = Some(conditions);
        self
    }

    /// Set a custom timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.record.recorded_at = recorded_at;
        self
    }

    /// Build the `DoubleSlitRecord`.
    #[must_use]
    pub fn build(self) -> DoubleSlitRecord {
        self.record
    }
}
