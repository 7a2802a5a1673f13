//! Per-file measurement summaries.
//!
//! A trace is reduced to three means (current magnitude, voltage and
//! temperature) over its *active* samples, i.e. those whose current passes the
//! phase threshold. When no sample is active the means fall back to the whole
//! trace.

mod directory;
mod source;

pub use directory::DirectorySource;
pub use source::TraceSource;

use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Current magnitude (A) below which a sample counts as idle.
pub const ACTIVE_THRESHOLD: f64 = 0.01;

/// Which side of a cycle a trace belongs to. Selects the activity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Charge,
    Discharge,
    Any,
}

impl Phase {
    pub fn is_active(self, current: f64) -> bool {
        match self {
            Phase::Discharge => current < -ACTIVE_THRESHOLD,
            Phase::Charge => current > ACTIVE_THRESHOLD,
            Phase::Any => current.abs() > ACTIVE_THRESHOLD,
        }
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "charge" => Ok(Phase::Charge),
            "discharge" => Ok(Phase::Discharge),
            "any" => Ok(Phase::Any),
            other => Err(format!("unknown phase '{other}' (expected charge, discharge or any)")),
        }
    }
}

/// One row of a measurement file. Empty cells deserialize to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Sample {
    #[serde(rename = "Current_measured")]
    pub current: Option<f64>,
    #[serde(rename = "Voltage_measured")]
    pub voltage: Option<f64>,
    #[serde(rename = "Temperature_measured")]
    pub temperature: Option<f64>,
}

/// Means over the selected samples of one trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceSummary {
    /// Mean of `|current|`; the sign convention is discarded.
    pub current: f64,
    pub voltage: f64,
    pub temperature: f64,
}

/// Reads every sample of a measurement file.
pub fn read_samples<R: Read>(reader: R, origin: &Path) -> Result<Vec<Sample>, DatasetError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut samples = Vec::new();

    for result in rdr.deserialize() {
        let sample: Sample = result.map_err(|e| DatasetError::csv(origin, e))?;
        samples.push(sample);
    }

    Ok(samples)
}

/// Summarizes `samples` for `phase`.
///
/// A sample whose current is missing is never active. Missing and NaN cells
/// are skipped by the means.
///
/// # Errors
///
/// [`DatasetError::EmptyTrace`] when there are no samples, and
/// [`DatasetError::EmptyColumn`] when a column has no values among the
/// selected samples.
pub fn summarize_samples(
    samples: &[Sample],
    phase: Phase,
    origin: &Path,
) -> Result<TraceSummary, DatasetError> {
    if samples.is_empty() {
        return Err(DatasetError::EmptyTrace {
            path: origin.to_path_buf(),
        });
    }

    let active: Vec<&Sample> = samples
        .iter()
        .filter(|s| s.current.is_some_and(|c| phase.is_active(c)))
        .collect();

    let selected: Vec<&Sample> = if active.is_empty() {
        samples.iter().collect()
    } else {
        active
    };

    let column_mean = |column: &'static str, values: Vec<Option<f64>>| {
        mean(values.into_iter().flatten()).ok_or_else(|| DatasetError::EmptyColumn {
            path: origin.to_path_buf(),
            column,
        })
    };

    Ok(TraceSummary {
        current: column_mean(
            "Current_measured",
            selected.iter().map(|s| s.current.map(f64::abs)).collect(),
        )?,
        voltage: column_mean(
            "Voltage_measured",
            selected.iter().map(|s| s.voltage).collect(),
        )?,
        temperature: column_mean(
            "Temperature_measured",
            selected.iter().map(|s| s.temperature).collect(),
        )?,
    })
}

/// Arithmetic mean ignoring NaN. Returns `None` when nothing is left.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
