//! Learning Trajectory - recorded path through the knowledge space

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manifold::GeodesicResult;
use crate::{Error, Result};

/// Who followed a trajectory.
///
/// Well-known keys are typed; anything else lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnerMetadata {
    /// Learner age in years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Self-reported experience level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    /// Subject domain, used to group analyses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Remaining free-form attributes.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LearnerMetadata {
    /// Metadata with only a domain.
    #[must_use]
    pub fn for_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
            ..Self::default()
        }
    }
}

/// Learning Trajectory records one learner's path and its scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LearningTrajectory {
    trajectory_id: String,
    start_knowledge: Vec<f64>,
    target_knowledge: Vec<f64>,
    path_coordinates: Vec<Vec<f64>>,
    optimal_geodesic: Vec<Vec<f64>>,
    learning_velocity: Vec<f64>,
    complexity_profile: Vec<f64>,
    efficiency_score: f64,
    educational_quality: f64,
    learner: LearnerMetadata,
    timestamp: DateTime<Utc>,
}

impl LearningTrajectory {
    /// Create a builder with the required fields.
    #[must_use]
    pub fn builder(
        trajectory_id: impl Into<String>,
        start_knowledge: Vec<f64>,
        target_knowledge: Vec<f64>,
    ) -> LearningTrajectoryBuilder {
        LearningTrajectoryBuilder::new(trajectory_id, start_knowledge, target_knowledge)
    }

    /// Record a computed geodesic as both the actual and the optimal path.
    ///
    /// The learning velocity is the speed at each sample.
    #[must_use]
    pub fn from_geodesic(
        trajectory_id: impl Into<String>,
        target_knowledge: Vec<f64>,
        geodesic: &GeodesicResult,
        educational_quality: f64,
        learner: LearnerMetadata,
    ) -> Self {
        let start = geodesic.trajectory.first().cloned().unwrap_or_default();
        let speeds = geodesic
            .velocity
            .iter()
            .map(|v| v.iter().map(|x| x * x).sum::<f64>().sqrt())
            .collect();

        Self::builder(trajectory_id, start, target_knowledge)
            .path_coordinates(geodesic.trajectory.clone())
            .optimal_geodesic(geodesic.trajectory.clone())
            .learning_velocity(speeds)
            .complexity_profile(geodesic.complexity_profile.clone())
            .efficiency_score(geodesic.efficiency)
            .educational_quality(educational_quality)
            .learner(learner)
            .build()
    }

    /// Checks the record is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTrajectory`] if the path is empty, start and
    /// target differ in dimension, or a score is outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.path_coordinates.is_empty() {
            return Err(Error::InvalidTrajectory(
                "path coordinates cannot be empty".to_string(),
            ));
        }
        if self.start_knowledge.len() != self.target_knowledge.len() {
            return Err(Error::InvalidTrajectory(format!(
                "start and target must have the same dimension ({} vs {})",
                self.start_knowledge.len(),
                self.target_knowledge.len()
            )));
        }
        if !(0.0..=1.0).contains(&self.efficiency_score) {
            return Err(Error::InvalidTrajectory(format!(
                "efficiency must be between 0 and 1, got {}",
                self.efficiency_score
            )));
        }
        if !(0.0..=1.0).contains(&self.educational_quality) {
            return Err(Error::InvalidTrajectory(format!(
                "educational quality must be between 0 and 1, got {}",
                self.educational_quality
            )));
        }
        Ok(())
    }

    /// Get the trajectory ID.
    #[must_use]
    pub fn trajectory_id(&self) -> &str {
        &self.trajectory_id
    }

    /// Get the starting knowledge state.
    #[must_use]
    pub fn start_knowledge(&self) -> &[f64] {
        &self.start_knowledge
    }

    /// Get the target knowledge state.
    #[must_use]
    pub fn target_knowledge(&self) -> &[f64] {
        &self.target_knowledge
    }

    /// Get the path actually followed.
    #[must_use]
    pub fn path_coordinates(&self) -> &[Vec<f64>] {
        &self.path_coordinates
    }

    /// Get the computed optimal path.
    #[must_use]
    pub fn optimal_geodesic(&self) -> &[Vec<f64>] {
        &self.optimal_geodesic
    }

    /// Get the learning speed along the path.
    #[must_use]
    pub fn learning_velocity(&self) -> &[f64] {
        &self.learning_velocity
    }

    /// Get the complexity along the path.
    #[must_use]
    pub fn complexity_profile(&self) -> &[f64] {
        &self.complexity_profile
    }

    /// Complexity at the end of the path, 0 when no profile was recorded.
    #[must_use]
    pub fn final_complexity(&self) -> f64 {
        self.complexity_profile.last().copied().unwrap_or(0.0)
    }

    /// Get the efficiency score.
    #[must_use]
    pub const fn efficiency_score(&self) -> f64 {
        self.efficiency_score
    }

    /// Get the educational quality.
    #[must_use]
    pub const fn educational_quality(&self) -> f64 {
        self.educational_quality
    }

    /// Get the learner metadata.
    #[must_use]
    pub const fn learner(&self) -> &LearnerMetadata {
        &self.learner
    }

    /// Get the learner's domain, if recorded.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.learner.domain.as_deref()
    }

    /// Get the recording timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Builder for `LearningTrajectory`.
#[derive(Debug)]
pub struct LearningTrajectoryBuilder {
    record: LearningTrajectory,
}

impl LearningTrajectoryBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        trajectory_id: impl Into<String>,
        start_knowledge: Vec<f64>,
        target_knowledge: Vec<f64>,
    ) -> Self {
        Self {
            record: LearningTrajectory {
                trajectory_id: trajectory_id.into(),
                start_knowledge,
                target_knowledge,
                path_coordinates: Vec::new(),
                optimal_geodesic: Vec::new(),
                learning_velocity: Vec::new(),
                complexity_profile: Vec::new(),
                efficiency_score: 0.0,
                educational_quality: 0.0,
                learner: LearnerMetadata::default(),
                timestamp: Utc::now(),
            },
        }
    }

    /// Set the path actually followed.
    #[must_use]
    pub fn path_coordinates(mut self, path: Vec<Vec<f64>>) -> Self {
        self.record.path_coordinates = path;
        self
    }

    /// Set the computed optimal path.
    #[must_use]
    pub fn optimal_geodesic(mut self, path: Vec<Vec<f64>>) -> Self {
        self.record.optimal_geodesic = path;
        self
    }

    /// Set the learning speed profile.
    #[must_use]
    pub fn learning_velocity(mut self, velocity: Vec<f64>) -> Self {
        self.record.learning_velocity = velocity;
        self
    }

    /// Set the complexity profile.
    #[must_use]
    pub fn complexity_profile(mut self, profile: Vec<f64>) -> Self {
        self.record.complexity_profile = profile;
        self
    }

    /// Set the efficiency score.
    #[must_use]
    pub const fn efficiency_score(mut self, score: f64) -> Self {
        self.record.efficiency_score = score;
        self
    }

    /// Set the educational quality.
    #[must_use]
    pub const fn educational_quality(mut self, quality: f64) -> Self {
        self.record.educational_quality = quality;
        self
    }

    /// Set the learner metadata.
    #[must_use]
    pub fn learner(mut self, learner: LearnerMetadata) -> Self {
        self.record.learner = learner;
        self
    }

    /// Set a custom timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.record.timestamp = timestamp;
        self
    }

    /// Build the `LearningTrajectory`.
    #[must_use]
    pub fn build(self) -> LearningTrajectory {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LearningTrajectory {
        LearningTrajectory::builder("lt-1", vec![0.1, 0.2, 0.1], vec![0.9, 0.8, 0.7])
            .path_coordinates(vec![vec![0.1, 0.2, 0.1], vec![0.5, 0.5, 0.4], vec![0.9, 0.8, 0.7]])
            .complexity_profile(vec![0.5, 0.8, 0.9])
            .efficiency_score(0.72)
            .educational_quality(0.85)
            .learner(LearnerMetadata::for_domain("mathematics"))
            .build()
    }

    #[test]
    fn test_builder_and_getters() {
        let t = sample();
        assert_eq!(t.trajectory_id(), "lt-1");
        assert_eq!(t.path_coordinates().len(), 3);
        assert_eq!(t.domain(), Some("mathematics"));
        assert!((t.final_complexity() - 0.9).abs() < 1e-12);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let empty = LearningTrajectory::builder("x", vec![0.0], vec![1.0])
            .efficiency_score(0.5)
            .build();
        assert!(matches!(empty.validate(), Err(Error::InvalidTrajectory(_))));

        let mismatched = LearningTrajectory::builder("x", vec![0.0], vec![1.0, 2.0])
            .path_coordinates(vec![vec![0.0]])
            .build();
        assert!(mismatched.validate().is_err());

        let too_efficient = LearningTrajectory::builder("x", vec![0.0], vec![1.0])
            .path_coordinates(vec![vec![0.0]])
            .efficiency_score(1.2)
            .build();
        assert!(too_efficient.validate().is_err());

        let bad_quality = LearningTrajectory::builder("x", vec![0.0], vec![1.0])
            .path_coordinates(vec![vec![0.0]])
            .educational_quality(-0.1)
            .build();
        assert!(bad_quality.validate().is_err());
    }

    #[test]
    fn test_learner_extra_fields_flatten() {
        let json = r#"{"age": 25, "domain": "physics", "learning_style": "visual"}"#;
        let learner: LearnerMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(learner.age, Some(25));
        assert_eq!(learner.domain.as_deref(), Some("physics"));
        assert_eq!(learner.extra["learning_style"], "visual");

        let back = serde_json::to_value(&learner).unwrap();
        assert_eq!(back["learning_style"], "visual");
        assert!(back.get("experience_level").is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["trajectory_id"], "lt-1");
        assert_eq!(value["learner"]["domain"], "mathematics");
        assert_eq!(value["path_coordinates"].as_array().unwrap().len(), 3);
        assert!(value["timestamp"].is_string());
    }
}
