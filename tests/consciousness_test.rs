//! Consciousness model tests: Φ-activation, double-slit and lattice field

use ontologica::consciousness::{
    verify_fringe_spacing, ActualizationContext, ComponentValues, ConsciousnessFieldOperator,
    ConsciousnessState, DoubleSlitConfig, DoubleSlitSimulator, FieldConfig, ObserverState,
    PhiActivationCalculator, PhiComponent, PREDICTED_FRINGE_SPACING,
};
use ontologica::Error;

fn observer(phi: f64, coherence: f64) -> ObserverState {
    ObserverState::new(phi, coherence, format!("phi={phi}"))
}

// =============================================================================
// Φ-activation
// =============================================================================

#[test]
fn test_default_calculator_constants() {
    let calc = PhiActivationCalculator::default();
    assert_eq!(calc.weights().learning, 0.4);
    assert_eq!(calc.thresholds().participation, 0.7);
}

#[test]
fn test_custom_weights_must_sum_to_one() {
    let thresholds = ComponentValues {
        learning: 0.5,
        choice: 0.5,
        participation: 0.5,
    };
    let bad = ComponentValues {
        learning: 0.5,
        choice: 0.5,
        participation: 0.5,
    };
    assert!(matches!(
        PhiActivationCalculator::new(bad, thresholds, 5e-3),
        Err(Error::InvalidInput(_))
    ));

    let even = ComponentValues {
        learning: 0.5,
        choice: 0.25,
        participation: 0.25,
    };
    let calc = PhiActivationCalculator::new(even, thresholds, 5e-3).unwrap();
    let state = ConsciousnessState::new(1.0, 0.0, 0.0, 5e-3).unwrap();
    let phi = calc.calculate_phi_activation(&state);
    assert!((phi.phi_total - 0.5).abs() < 1e-12);
    assert_eq!(phi.deficits, vec![PhiComponent::Choice, PhiComponent::Participation]);
}

#[test]
fn test_state_json_is_validated() {
    let json = r#"{
        "learning_capacity": 1.4,
        "choice_capability": 0.5,
        "educational_participation": 0.5,
        "coherence_time": 0.002,
        "timestamp": "2024-01-01T00:00:00Z"
    }"#;
    let state: ConsciousnessState = serde_json::from_str(json).unwrap();
    assert_eq!(state.learning_capacity(), 1.0);

    let negative = json.replace("0.002", "-0.002");
    assert!(serde_json::from_str::<ConsciousnessState>(&negative).is_err());
}

// =============================================================================
// Double-slit
// =============================================================================

#[test]
fn test_visibility_rises_with_phi() {
    let sim = DoubleSlitSimulator::default();
    let low = sim.simulate_observation(&observer(0.2, 1.0)).unwrap();
    let high = sim.simulate_observation(&observer(0.9, 1.0)).unwrap();
    assert!(high.measured_visibility > low.measured_visibility);
    assert!(high.which_path_information < low.which_path_information);
}

#[test]
fn test_experiment_correlates_phi_with_visibility() {
    let sim = DoubleSlitSimulator::default();
    let observers: Vec<ObserverState> =
        [0.1, 0.3, 0.5, 0.7, 0.9].iter().map(|&p| observer(p, 1.0)).collect();
    let outcome = sim.simulate_experiment(&observers).unwrap();

    assert_eq!(outcome.experiment_results.len(), 5);
    for (result, obs) in outcome.experiment_results.iter().zip(&observers) {
        assert_eq!(result.description, obs.description);
    }
    assert!(outcome.consciousness_correlation.visibility_correlation > 0.99);
    assert!(outcome.consciousness_correlation.which_path_correlation < 0.0);
}

#[test]
fn test_experiment_rejects_bad_observer() {
    let sim = DoubleSlitSimulator::default();
    let observers = vec![observer(0.5, 1.0), observer(1.5, 1.0)];
    assert!(matches!(
        sim.simulate_experiment(&observers),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_fringe_spacing_verification() {
    assert!(verify_fringe_spacing(PREDICTED_FRINGE_SPACING).within_prediction);
    assert!(verify_fringe_spacing(8.7e-6).within_prediction);
    let far = verify_fringe_spacing(1e-5);
    assert!(!far.within_prediction);
    assert!((far.relative_deviation - 1.7e-6 / 8.3e-6).abs() < 1e-9);
}

#[test]
fn test_simulated_spacing_within_prediction() {
    let sim = DoubleSlitSimulator::default();
    let outcome = sim.simulate_observation(&observer(0.8, 0.6)).unwrap();
    let spacing = outcome.fringe_spacing.unwrap();
    assert!((spacing - sim.config().fringe_spacing()).abs() / spacing < 0.01);
    assert!(verify_fringe_spacing(spacing).within_prediction);
}

#[test]
fn test_invalid_apparatus_rejected() {
    let config = DoubleSlitConfig {
        wavelength: -1.0,
        ..DoubleSlitConfig::default()
    };
    assert!(DoubleSlitSimulator::new(config).is_err());
}

// =============================================================================
// Lattice field
// =============================================================================

#[test]
fn test_field_energy_is_conserved() {
    let op = ConsciousnessFieldOperator::default();
    #[allow(clippy::cast_precision_loss)]
    let initial: Vec<f64> = (0..32)
        .map(|i| 0.1 * (2.0 * std::f64::consts::PI * i as f64 / 32.0).cos())
        .collect();
    let source = vec![0.0; 32];
    let solution = op.solve_field_equation(&initial, &source, 500).unwrap();

    assert_eq!(solution.energy_history.len(), 501);
    let e0 = solution.energy_history[0];
    let drift = solution
        .energy_history
        .iter()
        .map(|e| (e - e0).abs() / e0)
        .fold(0.0, f64::max);
    assert!(drift < 1e-3, "energy drift {drift}");
}

#[test]
fn test_zero_field_without_source_stays_zero() {
    let op = ConsciousnessFieldOperator::with_lattice_size(8).unwrap();
    let solution = op.solve_field_equation(&[0.0; 8], &[0.0; 8], 50).unwrap();
    assert!(solution.final_field.iter().all(|v| *v == 0.0));
    assert_eq!(solution.quantum_properties.norm, 0.0);
    assert_eq!(solution.quantum_properties.coherence, 0.0);
}

#[test]
fn test_actualized_state_feeds_field() {
    let op = ConsciousnessFieldOperator::with_lattice_size(16).unwrap();
    let mut potential = vec![0.0; 16];
    potential[8] = 0.3;
    let context = ActualizationContext {
        phi_activation: 0.8,
        coherence_level: 0.6,
    };
    let actual = op.apply_actualization_operator(&potential, &context).unwrap();
    let before = op.properties_of(&potential, &[0.0; 16]).unwrap();
    let after = op.properties_of(&actual, &[0.0; 16]).unwrap();
    assert!(after.norm > 0.0);
    assert!(after.max_amplitude < before.max_amplitude * 1.8);
    assert_eq!(after.coherence, 1.0);
}

#[test]
fn test_field_rejects_wrong_lattice() {
    let op = ConsciousnessFieldOperator::with_lattice_size(8).unwrap();
    assert!(matches!(
        op.solve_field_equation(&[0.0; 4], &[0.0; 8], 1),
        Err(Error::DimensionMismatch { expected: 8, actual: 4 })
    ));
    assert!(ConsciousnessFieldOperator::new(FieldConfig {
        dt: 0.0,
        ..FieldConfig::default()
    })
    .is_err());
}

#[test]
fn test_field_with_nan_source_never_returns_nan_energy() {
    let op = ConsciousnessFieldOperator::with_lattice_size(8).unwrap();
    let mut source = [0.0; 8];
    source[3] = f64::NAN;
    for steps in [0, 25] {
        let err = op.solve_field_equation(&[0.1; 8], &source, steps).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
