//! Experiment Tracking for learning trajectories and double-slit runs
//!
//! ## Schema Overview
//!
//! ```text
//! ExperimentStore ──< LearningTrajectory (N)  keyed by trajectory_id
//!                 └─< DoubleSlitRecord (N)    keyed by ds_<timestamp>_<seq>
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ontologica::experiment::{ExperimentStore, ExportFormat, LearnerMetadata, LearningTrajectory};
//!
//! let mut store = ExperimentStore::new();
//!
//! let trajectory = LearningTrajectory::builder("lt-001", vec![0.1, 0.2], vec![0.9, 0.8])
//!     .path_coordinates(vec![vec![0.1, 0.2], vec![0.5, 0.5], vec![0.9, 0.8]])
//!     .complexity_profile(vec![0.3, 0.6, 0.8])
//!     .efficiency_score(0.74)
//!     .educational_quality(0.9)
//!     .learner(LearnerMetadata::for_domain("mathematics"))
//!     .build();
//! let id = store.record_learning_trajectory(trajectory)?;
//!
//! let analysis = store.analyze_trajectory_efficiency(Some("mathematics"))?;
//! assert_eq!(analysis.total_trajectories, 1);
//!
//! let csv = store.export_trajectory(&id, ExportFormat::Csv)?.unwrap_or_default();
//! assert!(csv.starts_with("step,complexity"));
//! # Ok::<(), ontologica::Error>(())
//! ```

mod analysis;
mod double_slit_record;
mod export;
mod store;
mod trajectory_record;

pub use analysis::{
    ComplexityRelationship, ComplexityTrend, Distribution, EfficiencyAnalysis,
    FringeCorrelationAnalysis, TrajectoryStatistics, PREDICTED_OPTIMAL_EFFICIENCY,
    TREND_THRESHOLD,
};
pub use double_slit_record::{ConsciousnessSnapshot, DoubleSlitRecord, DoubleSlitRecordBuilder};
pub use export::ExportFormat;
pub use store::ExperimentStore;
pub use trajectory_record::{LearnerMetadata, LearningTrajectory, LearningTrajectoryBuilder};
