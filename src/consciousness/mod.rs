//! Observer models: Φ-activation, double-slit visibility and the lattice
//! actualization field
//!
//! These are scalar toy models. Φ is a weighted score, the double-slit
//! simulator maps an observer's Φ and coherence onto fringe visibility, and
//! the field operator evolves a φ⁴ lattice seeded by an "actualized" state.
//!
//! ```rust
//! use ontologica::consciousness::{
//!     ConsciousnessState, DoubleSlitSimulator, ObserverState, PhiActivationCalculator,
//! };
//!
//! let state = ConsciousnessState::new(0.8, 0.7, 0.9, 3.0e-3)?;
//! let phi = PhiActivationCalculator::default().calculate_phi_activation(&state);
//! assert!(phi.activated);
//!
//! let simulator = DoubleSlitSimulator::default();
//! let outcome = simulator.simulate_observation(&ObserverState::from_activation(&phi, "trained"))?;
//! assert!(outcome.measured_visibility > 0.5);
//! # Ok::<(), ontologica::Error>(())
//! ```

mod double_slit;
mod field;
mod phi;

pub use double_slit::{
    verify_fringe_spacing, ConsciousnessCorrelation, DoubleSlitConfig, DoubleSlitSimulator,
    ExperimentOutcome, FringeVerification, InterferencePattern, ObservationOutcome, ObserverState,
    FRINGE_SPACING_TOLERANCE, PREDICTED_FRINGE_SPACING,
};
pub use field::{
    ActualizationContext, ConsciousnessFieldOperator, FieldConfig, FieldSolution,
    QuantumProperties,
};
pub use phi::{
    ComponentValues, ConsciousnessState, PhiActivation, PhiActivationCalculator, PhiComponent,
    REFERENCE_COHERENCE_TIME,
};
