//! # Ontologica: numeric core of the consciousness-physics toy models
//!
//! Ontologica computes learning paths as geodesics of a hand-built knowledge
//! metric, scores observers with a Φ-activation model, simulates how that
//! score shapes a double-slit interference pattern, and keeps the resulting
//! records in an in-memory experiment store.
//!
//! The formulas are arbitrary scalar models. Nothing here claims physical or
//! psychological truth.
//!
//! ## Modules
//!
//! - [`integrate`]: adaptive Dormand–Prince integrator over a
//!   [`DynamicalSystem`](integrate::DynamicalSystem) callback
//! - [`manifold`]: metric field, Christoffel symbols, geodesics, learning
//!   curves and path optimization
//! - [`consciousness`]: Φ-activation, double-slit simulator, lattice field
//! - [`experiment`]: trajectory and double-slit records with analyses
//! - [`stats`]: descriptive statistics used by the analyses
//!
//! ## Example Usage
//!
//! ```rust
//! use ontologica::experiment::{ExperimentStore, LearnerMetadata, LearningTrajectory};
//! use ontologica::manifold::{EducationalManifold, ManifoldConfig};
//!
//! let manifold = EducationalManifold::from_config(
//!     ManifoldConfig::builder().dimension(4).samples(100).build(),
//! )?;
//! let target = [0.0, 0.8, 0.6, 0.4];
//! let geodesic = manifold.compute_learning_geodesic(&[0.0, 0.1, 0.1, 0.1], &target, 40.0)?;
//!
//! let mut store = ExperimentStore::new();
//! let record = LearningTrajectory::from_geodesic(
//!     "learner-1",
//!     target.to_vec(),
//!     &geodesic,
//!     0.9,
//!     LearnerMetadata::for_domain("physics"),
//! );
//! store.record_learning_trajectory(record)?;
//! assert_eq!(store.trajectory_count(), 1);
//! # Ok::<(), ontologica::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod consciousness;
pub mod error;
pub mod experiment;
pub mod integrate;
pub mod manifold;
pub mod stats;
pub mod telemetry;

pub use error::{Error, Result};
