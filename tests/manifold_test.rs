//! Educational manifold integration tests
//!
//! Geodesics, efficiency scoring, learning curves, path optimisation and
//! constrained search through the public API.

use ontologica::manifold::{
    curves, EducationalManifold, GeodesicRequest, LearningConstraints, LearningGeodesicOptimizer,
    ManifoldConfig, OptimizedPath, PathMethod,
};
use ontologica::Error;

fn flat(dimension: usize) -> EducationalManifold {
    EducationalManifold::from_config(
        ManifoldConfig::builder()
            .dimension(dimension)
            .curvature_amplitude(0.0)
            .samples(100)
            .build(),
    )
    .unwrap()
}

fn curved(dimension: usize) -> EducationalManifold {
    EducationalManifold::from_config(
        ManifoldConfig::builder().dimension(dimension).samples(150).build(),
    )
    .unwrap()
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_default_manifold() {
    let manifold = EducationalManifold::new(10).unwrap();
    assert_eq!(manifold.dimension(), 10);
    assert!((manifold.learning_acceleration() - 2.1e-2).abs() < 1e-15);
    assert!((manifold.optimal_efficiency() - 0.78).abs() < 1e-15);
    assert_eq!(manifold.metric_tensor().nrows(), 10);
    assert_eq!(manifold.complexity_weights().len(), 10);
}

#[test]
fn test_zero_dimension_rejected() {
    assert!(matches!(EducationalManifold::new(0), Err(Error::InvalidInput(_))));
}

#[test]
fn test_config_from_partial_json() {
    let config = ManifoldConfig::from_json_str(r#"{"dimension": 4, "samples": 50}"#).unwrap();
    assert_eq!(config.dimension, 4);
    assert_eq!(config.samples, 50);
    assert!((config.learning_acceleration - 2.1e-2).abs() < 1e-15);

    assert!(matches!(
        ManifoldConfig::from_json_str(r#"{"samples": 1}"#),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        ManifoldConfig::from_json_str("{not json"),
        Err(Error::Serialization(_))
    ));
}

#[test]
fn test_metric_is_symmetric_away_from_origin() {
    let manifold = curved(5);
    let g = manifold.metric_at(&[0.0, 0.3, -0.2, 0.5, 0.1]).unwrap();
    assert_eq!(g, g.transpose());
    assert!(g[(0, 0)] < 0.0);
}

// =============================================================================
// Geodesics
// =============================================================================

#[test]
fn test_flat_geodesic_is_a_straight_line() {
    let manifold = flat(3);
    let result = manifold
        .compute_learning_geodesic(&[0.0, 0.0, 0.0], &[0.0, 1.0, 0.0], 40.0)
        .unwrap();

    assert_eq!(result.len(), 100);
    let end = result.final_position().unwrap();
    assert!((end[1] - 0.84).abs() < 1e-9);
    assert!(end[0].abs() < 1e-12);
    assert!(end[2].abs() < 1e-12);
    assert!((result.efficiency - 0.84).abs() < 1e-9);
    assert!(!result.converged);
}

#[test]
fn test_flat_geodesic_reaching_target_converges() {
    let manifold = flat(3);
    let result = manifold
        .compute_learning_geodesic(&[0.0, 0.0, 0.0], &[0.0, 1.0, 0.0], 100.0)
        .unwrap();
    assert!(result.converged);
    assert!(result.closest_approach < 0.05);
    // Overshooting the target lowers the score to the floor.
    assert!((result.efficiency - 0.1).abs() < 1e-9);
}

#[test]
fn test_curved_geodesic_is_bounded() {
    let manifold = curved(4);
    let result = manifold
        .compute_learning_geodesic(&[0.0, 0.1, 0.2, 0.1], &[0.0, 0.7, 0.5, 0.6], 30.0)
        .unwrap();
    assert_eq!(result.time.len(), result.trajectory.len());
    assert_eq!(result.velocity.len(), result.trajectory.len());
    assert_eq!(result.complexity_profile.len(), result.trajectory.len());
    assert!((0.0..=1.0).contains(&result.efficiency));
    assert!(result.peak_complexity() >= 0.0);
}

#[test]
fn test_higher_quality_moves_faster() {
    let manifold = flat(2);
    let slow = manifold
        .compute_learning_geodesic_with(
            &[0.0, 0.0],
            &[0.0, 1.0],
            &GeodesicRequest::with_max_time(20.0).educational_quality(0.5),
        )
        .unwrap();
    let fast = manifold
        .compute_learning_geodesic_with(
            &[0.0, 0.0],
            &[0.0, 1.0],
            &GeodesicRequest::with_max_time(20.0).educational_quality(1.0),
        )
        .unwrap();
    assert!(fast.efficiency > slow.efficiency);
}

#[test]
fn test_geodesic_input_validation() {
    let manifold = flat(3);
    assert!(matches!(
        manifold.compute_learning_geodesic(&[0.0, 0.0], &[0.0, 1.0, 0.0], 10.0),
        Err(Error::DimensionMismatch { expected: 3, actual: 2 })
    ));
    assert!(matches!(
        manifold.compute_learning_geodesic(&[0.0; 3], &[0.0, 1.0, 0.0], 0.0),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        manifold.compute_learning_geodesic(&[f64::NAN, 0.0, 0.0], &[0.0, 1.0, 0.0], 10.0),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_start_at_target_scores_one() {
    let manifold = flat(2);
    let efficiency = manifold
        .calculate_learning_efficiency(&[vec![0.5, 0.5], vec![0.5, 0.5]], &[0.5, 0.5])
        .unwrap();
    assert_eq!(efficiency, 1.0);
    assert!(manifold.calculate_learning_efficiency(&[], &[0.5, 0.5]).is_err());
}

#[test]
fn test_direction_has_requested_speed() {
    let manifold = flat(3);
    let v = manifold
        .optimal_learning_direction(&[0.0, 0.0, 0.0], &[0.0, 3.0, 4.0], 2.0)
        .unwrap();
    let speed = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    assert!((speed - 2.0 * 2.1e-2).abs() < 1e-15);
    assert_eq!(
        manifold.optimal_learning_direction(&[1.0; 3], &[1.0; 3], 1.0).unwrap(),
        vec![0.0; 3]
    );
}

// =============================================================================
// Learning curves
// =============================================================================

#[test]
fn test_retention_decays_towards_plateau() {
    let manifold = flat(2);
    let day0 = manifold.knowledge_retention_curve(1.0, 0.0, 1.0).unwrap();
    let day30 = manifold.knowledge_retention_curve(1.0, 30.0, 1.0).unwrap();
    let day365 = manifold.knowledge_retention_curve(1.0, 365.0, 1.0).unwrap();
    assert!((day0 - 1.0).abs() < 1e-12);
    assert!(day30 < day0 && day365 < day30);
    assert!(day365 > curves::ASYMPTOTIC_RETENTION);
}

#[test]
fn test_skill_grows_towards_max() {
    let manifold = flat(2);
    let early = manifold.skill_acquisition_curve(7.0, 1.0, 1.0).unwrap();
    let late = manifold.skill_acquisition_curve(90.0, 1.0, 1.0).unwrap();
    assert!(early < late && late < 1.0);
    assert_eq!(manifold.skill_acquisition_curve(0.0, 1.0, 1.0).unwrap(), 0.0);
    assert!(manifold.skill_acquisition_curve(-1.0, 1.0, 1.0).is_err());
}

// =============================================================================
// Optimizer and constrained search
// =============================================================================

#[test]
fn test_compare_methods_returns_every_method() {
    let manifold = curved(3);
    let optimizer = LearningGeodesicOptimizer::new(&manifold).max_iterations(50);
    let start = [0.0, 0.1, 0.1];
    let target = [0.0, 0.6, 0.5];
    let paths = optimizer.compare_methods(&start, &target).unwrap();

    let methods: Vec<PathMethod> = paths.iter().map(OptimizedPath::method).collect();
    assert_eq!(methods, vec![PathMethod::Geodesic, PathMethod::Direct, PathMethod::Adaptive]);
    for path in &paths {
        assert!(!path.trajectory().is_empty());
        if path.method() != PathMethod::Direct {
            assert_eq!(path.trajectory()[0], start.to_vec());
        }
    }
}

#[test]
fn test_direct_path_shape() {
    let manifold = curved(3);
    let optimizer = LearningGeodesicOptimizer::new(&manifold).max_iterations(30);
    let target = [0.0, 0.8, 0.4];
    let OptimizedPath::Direct(path) = optimizer
        .optimize_learning_path(&[0.0, 0.0, 0.0], &target, PathMethod::Direct)
        .unwrap()
    else {
        panic!("expected a direct path");
    };
    assert_eq!(path.trajectory.len(), 50);
    assert!(path.trajectory.iter().all(|p| p.len() == 3));
    assert!(path.iterations <= 30);
    assert!(path.cost.is_finite());
}

#[test]
fn test_unconstrained_search_takes_the_geodesic() {
    let manifold = flat(3);
    let path = manifold
        .find_optimal_learning_path(
            &[0.0, 0.0, 0.0],
            &[0.0, 0.5, 0.5],
            &LearningConstraints::default().max_time(20.0),
        )
        .unwrap();
    assert_eq!(path.method, PathMethod::Geodesic);
    assert!(path.constraints_met);
    assert!(path.violations.is_empty());
}

#[test]
fn test_efficiency_floor_falls_back_to_adaptive_walk() {
    // A short horizon leaves the geodesic far from the target
    let manifold = flat(3);
    let target = [0.0, 0.5, 0.5];
    let path = manifold
        .find_optimal_learning_path(
            &[0.0, 0.0, 0.0],
            &target,
            &LearningConstraints::default().max_time(5.0).min_efficiency(0.9),
        )
        .unwrap();
    assert_eq!(path.method, PathMethod::Adaptive);
    assert!(path.constraints_met);
    assert!(path.efficiency >= 0.9);
    assert_eq!(path.complexity_profile.len(), path.trajectory.len());
}
