//! Aggregate views over recorded experiments

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Efficiency the manifold model predicts for well-designed paths.
pub const PREDICTED_OPTIMAL_EFFICIENCY: f64 = 0.78;

/// Correlation beyond which the complexity trend counts as clear.
pub const TREND_THRESHOLD: f64 = 0.3;

/// Direction of the complexity-efficiency relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTrend {
    /// Correlation above the threshold.
    Positive,
    /// Correlation below the negative threshold.
    Negative,
    /// No clear relationship.
    Neutral,
    /// Fewer than two trajectories.
    InsufficientData,
}

impl ComplexityTrend {
    /// Classify a correlation; an undefined correlation is neutral.
    #[must_use]
    pub fn from_correlation(correlation: Option<f64>) -> Self {
        match correlation {
            Some(c) if c > TREND_THRESHOLD => Self::Positive,
            Some(c) if c < -TREND_THRESHOLD => Self::Negative,
            _ => Self::Neutral,
        }
    }

    /// Plain-language reading of the trend.
    #[must_use]
    pub const fn interpretation(self) -> &'static str {
        match self {
            Self::Positive => "Higher complexity associated with better learning efficiency",
            Self::Negative => "Higher complexity associated with lower learning efficiency",
            Self::Neutral => "No clear relationship between complexity and efficiency",
            Self::InsufficientData => "Not enough data for meaningful analysis",
        }
    }
}

impl fmt::Display for ComplexityTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::InsufficientData => "insufficient_data",
        })
    }
}

/// Final complexity against efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComplexityRelationship {
    /// Pearson correlation, `None` when undefined.
    pub correlation: Option<f64>,
    /// Classified trend.
    pub trend: ComplexityTrend,
}

/// Result of [`ExperimentStore::analyze_trajectory_efficiency`](super::ExperimentStore::analyze_trajectory_efficiency).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyAnalysis {
    /// Trajectories analysed.
    pub total_trajectories: usize,
    /// Mean efficiency.
    pub average_efficiency: f64,
    /// Sample standard deviation, `None` for a single trajectory.
    pub efficiency_std: Option<f64>,
    /// Trajectories at or above the predicted efficiency.
    pub optimal_efficiency_count: usize,
    /// Mean efficiency per recorded domain.
    pub efficiency_by_domain: BTreeMap<String, f64>,
    /// Educational quality against efficiency.
    pub quality_efficiency_correlation: Option<f64>,
    /// Final complexity against efficiency.
    pub complexity_efficiency: ComplexityRelationship,
    /// Efficiency the model predicts.
    pub predicted_optimal_efficiency: f64,
}

/// Min, max, mean and median of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Mean.
    pub mean: f64,
    /// Median.
    pub median: f64,
}

impl Distribution {
    pub(super) fn of(values: &[f64]) -> Option<Self> {
        Some(Self {
            min: values.iter().copied().reduce(f64::min)?,
            max: values.iter().copied().reduce(f64::max)?,
            mean: crate::stats::mean(values)?,
            median: crate::stats::median(values)?,
        })
    }
}

/// Result of [`ExperimentStore::trajectory_statistics`](super::ExperimentStore::trajectory_statistics).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryStatistics {
    /// Recorded trajectories.
    pub total_trajectories: usize,
    /// Distinct domains.
    pub domains_studied: usize,
    /// Mean number of path points.
    pub average_path_length: Option<f64>,
    /// Efficiency summary.
    pub efficiency_distribution: Option<Distribution>,
    /// Mean educational quality.
    pub quality_mean: Option<f64>,
    /// Sample standard deviation of educational quality.
    pub quality_std: Option<f64>,
}

/// Result of [`ExperimentStore::analyze_consciousness_correlation`](super::ExperimentStore::analyze_consciousness_correlation).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FringeCorrelationAnalysis {
    /// Φ against fringe spacing.
    pub consciousness_fringe_correlation: Option<f64>,
    /// Mean spacing with an activated observer.
    pub fringe_spacing_activated: Option<f64>,
    /// Mean spacing with a non-activated observer.
    pub fringe_spacing_non_activated: Option<f64>,
    /// Spacing the model predicts.
    pub predicted_fringe_spacing: f64,
    /// Records analysed.
    pub sample_size: usize,
    /// Two-sided p-value of activated against non-activated spacing, 1 when
    /// either group has fewer than two records.
    pub statistical_significance: f64,
}
