//! Trajectory export to JSON and CSV strings

use std::fmt;
use std::io;
use std::str::FromStr;

use super::LearningTrajectory;
use crate::{Error, Result};

/// Output format of [`ExperimentStore::export_trajectory`](super::ExperimentStore::export_trajectory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Pretty-printed JSON of the whole record.
    Json,
    /// One row per path point: `step,complexity,dimension_0,…`.
    Csv,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Csv => "csv",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

pub(super) fn render(trajectory: &LearningTrajectory, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(trajectory)?),
        ExportFormat::Csv => to_csv(trajectory),
    }
}

// A point without a complexity entry leaves that column empty
fn to_csv(trajectory: &LearningTrajectory) -> Result<String> {
    let path = trajectory.path_coordinates();
    let dimension = path.first().map_or(0, Vec::len);

    let mut writer = csv::Writer::from_writer(Vec::new());
    let header: Vec<String> = ["step".to_string(), "complexity".to_string()]
        .into_iter()
        .chain((0..dimension).map(|j| format!("dimension_{j}")))
        .collect();
    writer.write_record(&header)?;

    for (step, point) in path.iter().enumerate() {
        let complexity = trajectory
            .complexity_profile()
            .get(step)
            .map_or_else(String::new, f64::to_string);
        let row: Vec<String> = [step.to_string(), complexity]
            .into_iter()
            .chain(point.iter().map(f64::to_string))
            .collect();
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)).into())
}
