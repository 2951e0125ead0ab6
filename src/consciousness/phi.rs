//! Φ-activation: a weighted score of learning, choice and participation

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Coherence time, in seconds, that counts as a coherence level of 1.
pub const REFERENCE_COHERENCE_TIME: f64 = 5e-3;

/// Snapshot of a learner's state.
///
/// Components are clamped to `[0, 1]` on construction, and deserialising
/// goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConsciousnessState")]
pub struct ConsciousnessState {
    learning_capacity: f64,
    choice_capability: f64,
    educational_participation: f64,
    coherence_time: f64,
    timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawConsciousnessState {
    learning_capacity: f64,
    choice_capability: f64,
    educational_participation: f64,
    coherence_time: f64,
    timestamp: DateTime<Utc>,
}

impl TryFrom<RawConsciousnessState> for ConsciousnessState {
    type Error = Error;

    fn try_from(raw: RawConsciousnessState) -> Result<Self> {
        Ok(Self::new(
            raw.learning_capacity,
            raw.choice_capability,
            raw.educational_participation,
            raw.coherence_time,
        )?
        .with_timestamp(raw.timestamp))
    }
}

impl ConsciousnessState {
    /// State observed now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for non-finite components or a
    /// negative coherence time.
    pub fn new(
        learning_capacity: f64,
        choice_capability: f64,
        educational_participation: f64,
        coherence_time: f64,
    ) -> Result<Self> {
        let components = [
            ("learning_capacity", learning_capacity),
            ("choice_capability", choice_capability),
            ("educational_participation", educational_participation),
        ];
        for (name, value) in components {
            if !value.is_finite() {
                return Err(Error::InvalidInput(format!("{name} must be finite, got {value}")));
            }
        }
        if !(coherence_time.is_finite() && coherence_time >= 0.0) {
            return Err(Error::InvalidInput(format!(
                "coherence_time must be non-negative, got {coherence_time}"
            )));
        }

        Ok(Self {
            learning_capacity: learning_capacity.clamp(0.0, 1.0),
            choice_capability: choice_capability.clamp(0.0, 1.0),
            educational_participation: educational_participation.clamp(0.0, 1.0),
            coherence_time,
            timestamp: Utc::now(),
        })
    }

    /// Replace the observation time.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Learning capacity in `[0, 1]`.
    #[must_use]
    pub const fn learning_capacity(&self) -> f64 {
        self.learning_capacity
    }

    /// Choice capability in `[0, 1]`.
    #[must_use]
    pub const fn choice_capability(&self) -> f64 {
        self.choice_capability
    }

    /// Educational participation in `[0, 1]`.
    #[must_use]
    pub const fn educational_participation(&self) -> f64 {
        self.educational_participation
    }

    /// Coherence time in seconds.
    #[must_use]
    pub const fn coherence_time(&self) -> f64 {
        self.coherence_time
    }

    /// Observation time.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// One of the three Φ components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhiComponent {
    /// Learning capacity.
    Learning,
    /// Choice capability.
    Choice,
    /// Educational participation.
    Participation,
}

impl fmt::Display for PhiComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Learning => "learning",
            Self::Choice => "choice",
            Self::Participation => "participation",
        })
    }
}

/// Weight or threshold per component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentValues {
    /// Learning capacity.
    pub learning: f64,
    /// Choice capability.
    pub choice: f64,
    /// Educational participation.
    pub participation: f64,
}

impl ComponentValues {
    const fn get(&self, component: PhiComponent) -> f64 {
        match component {
            PhiComponent::Learning => self.learning,
            PhiComponent::Choice => self.choice,
            PhiComponent::Participation => self.participation,
        }
    }
}

/// Result of [`PhiActivationCalculator::calculate_phi_activation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhiActivation {
    /// Weighted total in `[0, 1]`.
    pub phi_total: f64,
    /// Weighted learning part.
    pub learning: f64,
    /// Weighted choice part.
    pub choice: f64,
    /// Weighted participation part.
    pub participation: f64,
    /// Coherence time relative to the reference.
    pub coherence_level: f64,
    /// Whether every component meets its threshold.
    pub activated: bool,
    /// Components below threshold.
    pub deficits: Vec<PhiComponent>,
}

/// Computes Φ-activation from a [`ConsciousnessState`].
#[derive(Debug, Clone, PartialEq)]
pub struct PhiActivationCalculator {
    weights: ComponentValues,
    thresholds: ComponentValues,
    reference_coherence_time: f64,
}

impl Default for PhiActivationCalculator {
    fn default() -> Self {
        Self {
            weights: ComponentValues {
                learning: 0.4,
                choice: 0.3,
                participation: 0.3,
            },
            thresholds: ComponentValues {
                learning: 0.6,
                choice: 0.5,
                participation: 0.7,
            },
            reference_coherence_time: REFERENCE_COHERENCE_TIME,
        }
    }
}

impl PhiActivationCalculator {
    /// Calculator with custom weights and thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] unless the weights are non-negative
    /// and sum to 1, the thresholds lie in `[0, 1]`, and the reference
    /// coherence time is positive.
    pub fn new(
        weights: ComponentValues,
        thresholds: ComponentValues,
        reference_coherence_time: f64,
    ) -> Result<Self> {
        let ws = [weights.learning, weights.choice, weights.participation];
        if ws.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
            return Err(Error::InvalidInput(format!("weights must be non-negative, got {ws:?}")));
        }
        let sum: f64 = ws.iter().sum();
        if (sum - 1.0).abs() > 1e-9 {
            return Err(Error::InvalidInput(format!("weights must sum to 1, got {sum}")));
        }
        let ts = [thresholds.learning, thresholds.choice, thresholds.participation];
        if ts.iter().any(|t| !(0.0..=1.0).contains(t)) {
            return Err(Error::InvalidInput(format!("thresholds must be in [0, 1], got {ts:?}")));
        }
        if !(reference_coherence_time.is_finite() && reference_coherence_time > 0.0) {
            return Err(Error::InvalidInput(format!(
                "reference coherence time must be positive, got {reference_coherence_time}"
            )));
        }
        Ok(Self {
            weights,
            thresholds,
            reference_coherence_time,
        })
    }

    /// Component weights.
    #[must_use]
    pub const fn weights(&self) -> &ComponentValues {
        &self.weights
    }

    /// Activation thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> &ComponentValues {
        &self.thresholds
    }

    /// Scores `state`.
    #[must_use]
    pub fn calculate_phi_activation(&self, state: &ConsciousnessState) -> PhiActivation {
        let raw = ComponentValues {
            learning: state.learning_capacity(),
            choice: state.choice_capability(),
            participation: state.educational_participation(),
        };
        let learning = self.weights.learning * raw.learning;
        let choice = self.weights.choice * raw.choice;
        let participation = self.weights.participation * raw.participation;

        let deficits: Vec<PhiComponent> =
            [PhiComponent::Learning, PhiComponent::Choice, PhiComponent::Participation]
                .into_iter()
                .filter(|c| raw.get(*c) < self.thresholds.get(*c))
                .collect();

        PhiActivation {
            phi_total: (learning + choice + participation).clamp(0.0, 1.0),
            learning,
            choice,
            participation,
            coherence_level: state.coherence_time() / self.reference_coherence_time,
            activated: deficits.is_empty(),
            deficits,
        }
    }
}
