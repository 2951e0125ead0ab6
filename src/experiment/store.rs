//! Experiment Store - in-memory storage for learning and interference records
//!
//! Records keep their insertion order, so analyses and exports are
//! reproducible for the same sequence of calls.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use tracing::info;

use super::analysis::{
    ComplexityRelationship, ComplexityTrend, Distribution, EfficiencyAnalysis,
    FringeCorrelationAnalysis, TrajectoryStatistics, PREDICTED_OPTIMAL_EFFICIENCY,
};
use super::export::{render, ExportFormat};
use super::{DoubleSlitRecord, LearningTrajectory};
use crate::consciousness::PREDICTED_FRINGE_SPACING;
use crate::{stats, Error, Result};

/// In-memory store for experiment records.
///
/// ## Design
///
/// Each record kind lives in a vector with an `FxHashMap` index from ID to
/// position. Recording a trajectory under an existing ID replaces it in
/// place.
#[derive(Debug, Default)]
pub struct ExperimentStore {
    trajectories: Vec<LearningTrajectory>,
    trajectory_index: FxHashMap<String, usize>,
    double_slit: Vec<(String, DoubleSlitRecord)>,
    double_slit_index: FxHashMap<String, usize>,
}

impl ExperimentStore {
    /// Create a new empty experiment store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty() && self.double_slit.is_empty()
    }

    /// Get the number of learning trajectories.
    #[must_use]
    pub fn trajectory_count(&self) -> usize {
        self.trajectories.len()
    }

    /// Get the number of double-slit records.
    #[must_use]
    pub fn double_slit_count(&self) -> usize {
        self.double_slit.len()
    }

    /// Validate and store a trajectory, returning its ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTrajectory`] if validation fails.
    pub fn record_learning_trajectory(&mut self, trajectory: LearningTrajectory) -> Result<String> {
        trajectory.validate()?;
        let id = trajectory.trajectory_id().to_string();
        info!(
            trajectory_id = %id,
            efficiency = trajectory.efficiency_score(),
            "recorded learning trajectory"
        );

        if let Some(&slot) = self.trajectory_index.get(&id) {
            self.trajectories[slot] = trajectory;
        } else {
            self.trajectory_index.insert(id.clone(), self.trajectories.len());
            self.trajectories.push(trajectory);
        }
        Ok(id)
    }

    /// Get a trajectory by ID.
    #[must_use]
    pub fn get_trajectory(&self, trajectory_id: &str) -> Option<&LearningTrajectory> {
        self.trajectory_index
            .get(trajectory_id)
            .map(|&slot| &self.trajectories[slot])
    }

    /// All trajectories in insertion order.
    pub fn trajectories(&self) -> impl Iterator<Item = &LearningTrajectory> {
        self.trajectories.iter()
    }

    /// Validate and store a double-slit record.
    ///
    /// The ID is `ds_<YYYYmmdd_HHMMSS>_<seq>` from the record's timestamp
    /// and its position in the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExperiment`] if validation fails.
    pub fn record_double_slit(&mut self, record: DoubleSlitRecord) -> Result<String> {
        record.validate()?;
        let seq = self.double_slit.len();
        let id = format!(
            "ds_{}_{seq:04}",
            record.recorded_at().format("%Y%m%d_%H%M%S")
        );
        info!(
            experiment_id = %id,
            fringe_spacing = record.fringe_spacing(),
            phi_total = record.consciousness().phi_total,
            "recorded double-slit experiment"
        );

        self.double_slit_index.insert(id.clone(), seq);
        self.double_slit.push((id.clone(), record));
        Ok(id)
    }

    /// Get a double-slit record by ID.
    #[must_use]
    pub fn get_double_slit(&self, experiment_id: &str) -> Option<&DoubleSlitRecord> {
        self.double_slit_index
            .get(experiment_id)
            .map(|&slot| &self.double_slit[slot].1)
    }

    /// Efficiency statistics over all trajectories, or those of one domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoData`] if no trajectory matches.
    pub fn analyze_trajectory_efficiency(&self, domain: Option<&str>) -> Result<EfficiencyAnalysis> {
        if self.trajectories.is_empty() {
            return Err(Error::NoData(
                "no trajectory data available for analysis".to_string(),
            ));
        }
        let selected: Vec<&LearningTrajectory> = self
            .trajectories
            .iter()
            .filter(|t| domain.map_or(true, |d| t.domain() == Some(d)))
            .collect();
        if selected.is_empty() {
            return Err(Error::NoData(format!(
                "no trajectories found for domain: {}",
                domain.unwrap_or_default()
            )));
        }

        let efficiency: Vec<f64> = selected.iter().map(|t| t.efficiency_score()).collect();
        let quality: Vec<f64> = selected.iter().map(|t| t.educational_quality()).collect();
        let final_complexity: Vec<f64> = selected.iter().map(|t| t.final_complexity()).collect();

        let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for t in &selected {
            if let Some(d) = t.domain() {
                grouped
                    .entry(d.to_string())
                    .or_default()
                    .push(t.efficiency_score());
            }
        }
        let efficiency_by_domain = grouped
            .into_iter()
            .filter_map(|(d, values)| stats::mean(&values).map(|m| (d, m)))
            .collect();

        let complexity_efficiency = if selected.len() < 2 {
            ComplexityRelationship {
                correlation: None,
                trend: ComplexityTrend::InsufficientData,
            }
        } else {
            let correlation = stats::pearson(&final_complexity, &efficiency);
            ComplexityRelationship {
                correlation,
                trend: ComplexityTrend::from_correlation(correlation),
            }
        };

        Ok(EfficiencyAnalysis {
            total_trajectories: selected.len(),
            average_efficiency: stats::mean(&efficiency).unwrap_or_default(),
            efficiency_std: stats::sample_std(&efficiency),
            optimal_efficiency_count: efficiency
                .iter()
                .filter(|e| **e >= PREDICTED_OPTIMAL_EFFICIENCY)
                .count(),
            efficiency_by_domain,
            quality_efficiency_correlation: stats::pearson(&quality, &efficiency),
            complexity_efficiency,
            predicted_optimal_efficiency: PREDICTED_OPTIMAL_EFFICIENCY,
        })
    }

    /// Overall statistics about the recorded trajectories.
    #[must_use]
    pub fn trajectory_statistics(&self) -> TrajectoryStatistics {
        let efficiency: Vec<f64> = self.trajectories.iter().map(LearningTrajectory::efficiency_score).collect();
        let quality: Vec<f64> = self.trajectories.iter().map(LearningTrajectory::educational_quality).collect();
        #[allow(clippy::cast_precision_loss)]
        let lengths: Vec<f64> = self
            .trajectories
            .iter()
            .map(|t| t.path_coordinates().len() as f64)
            .collect();
        let domains: BTreeSet<&str> = self.trajectories.iter().filter_map(LearningTrajectory::domain).collect();

        TrajectoryStatistics {
            total_trajectories: self.trajectories.len(),
            domains_studied: domains.len(),
            average_path_length: stats::mean(&lengths),
            efficiency_distribution: Distribution::of(&efficiency),
            quality_mean: stats::mean(&quality),
            quality_std: stats::sample_std(&quality),
        }
    }

    /// Relates observer Φ to the measured fringe spacing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoData`] if no double-slit record exists.
    pub fn analyze_consciousness_correlation(&self) -> Result<FringeCorrelationAnalysis> {
        if self.double_slit.is_empty() {
            return Err(Error::NoData("no double-slit data for analysis".to_string()));
        }
        let records = self.double_slit.iter().map(|(_, r)| r);
        let phi: Vec<f64> = records.clone().map(|r| r.consciousness().phi_total).collect();
        let spacing: Vec<f64> = records.clone().map(DoubleSlitRecord::fringe_spacing).collect();
        let (activated, non_activated): (Vec<&DoubleSlitRecord>, Vec<&DoubleSlitRecord>) =
            records.partition(|r| r.consciousness().activated);
        let activated: Vec<f64> = activated.iter().map(|r| r.fringe_spacing()).collect();
        let non_activated: Vec<f64> = non_activated.iter().map(|r| r.fringe_spacing()).collect();

        Ok(FringeCorrelationAnalysis {
            consciousness_fringe_correlation: stats::pearson(&phi, &spacing),
            fringe_spacing_activated: stats::mean(&activated),
            fringe_spacing_non_activated: stats::mean(&non_activated),
            predicted_fringe_spacing: PREDICTED_FRINGE_SPACING,
            sample_size: self.double_slit.len(),
            statistical_significance: stats::student_t_test(&activated, &non_activated)
                .unwrap_or(1.0),
        })
    }

    /// Render a stored trajectory; `None` for an unknown ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if JSON encoding fails and
    /// [`Error::Csv`] if the CSV writer rejects a row, such as one whose
    /// dimension differs from the first point.
    pub fn export_trajectory(
        &self,
        trajectory_id: &str,
        format: ExportFormat,
    ) -> Result<Option<String>> {
        self.get_trajectory(trajectory_id)
            .map(|t| render(t, format))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{ConsciousnessSnapshot, LearnerMetadata};
    use chrono::{TimeZone, Utc};

    fn trajectory(id: &str, efficiency: f64, domain: &str) -> LearningTrajectory {
        LearningTrajectory::builder(id, vec![0.0, 0.0], vec![1.0, 1.0])
            .path_coordinates(vec![vec![0.0, 0.0], vec![1.0, 1.0]])
            .complexity_profile(vec![0.1, 0.5])
            .efficiency_score(efficiency)
            .educational_quality(0.8)
            .learner(LearnerMetadata::for_domain(domain))
            .build()
    }

    #[test]
    fn test_store_default() {
        let store = ExperimentStore::new();
        assert!(store.is_empty());
        assert_eq!(store.trajectory_count(), 0);
        assert_eq!(store.double_slit_count(), 0);
    }

    #[test]
    fn test_record_and_get() {
        let mut store = ExperimentStore::new();
        let id = store.record_learning_trajectory(trajectory("t-1", 0.7, "math")).unwrap();
        assert_eq!(id, "t-1");
        assert!(!store.is_empty());
        assert_eq!(store.get_trajectory("t-1").unwrap().efficiency_score(), 0.7);
        assert!(store.get_trajectory("missing").is_none());
    }

    #[test]
    fn test_same_id_replaces_in_place() {
        let mut store = ExperimentStore::new();
        store.record_learning_trajectory(trajectory("a", 0.5, "math")).unwrap();
        store.record_learning_trajectory(trajectory("b", 0.6, "math")).unwrap();
        store.record_learning_trajectory(trajectory("a", 0.9, "math")).unwrap();
        assert_eq!(store.trajectory_count(), 2);
        let ids: Vec<&str> = store.trajectories().map(LearningTrajectory::trajectory_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(store.get_trajectory("a").unwrap().efficiency_score(), 0.9);
    }

    #[test]
    fn test_invalid_trajectory_not_stored() {
        let mut store = ExperimentStore::new();
        assert!(store.record_learning_trajectory(trajectory("bad", 1.5, "math")).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_double_slit_ids_are_sequential() {
        let mut store = ExperimentStore::new();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        let record = DoubleSlitRecord::builder(8.2e-6, 3.1e-3, ConsciousnessSnapshot::new(0.85, true))
            .recorded_at(at)
            .build();
        let first = store.record_double_slit(record.clone()).unwrap();
        let second = store.record_double_slit(record).unwrap();
        assert_eq!(first, "ds_20240301_123045_0000");
        assert_eq!(second, "ds_20240301_123045_0001");
        assert!(store.get_double_slit(&second).is_some());
    }

    #[test]
    fn test_empty_analyses_report_no_data() {
        let store = ExperimentStore::new();
        assert!(matches!(store.analyze_trajectory_efficiency(None), Err(Error::NoData(_))));
        assert!(matches!(store.analyze_consciousness_correlation(), Err(Error::NoData(_))));
        assert_eq!(store.trajectory_statistics().total_trajectories, 0);
        assert!(store.trajectory_statistics().efficiency_distribution.is_none());
    }

    #[test]
    fn test_export_unknown_id_is_none() {
        let store = ExperimentStore::new();
        assert!(store.export_trajectory("nope", ExportFormat::Json).unwrap().is_none());
    }
}
