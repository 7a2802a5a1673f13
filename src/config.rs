use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Inputs and outputs of one dataset build.
///
/// Can be stored as a JSON object on disk; every key is optional:
/// ```json
/// {
///   "metadata_path": "cleaned_dataset/metadata.csv",
///   "data_root": "cleaned_dataset/data",
///   "output_path": "NASA_Battery_dataset_all.csv",
///   "summary_path": "batteries.json",
///   "preview_rows": 5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub metadata_path: PathBuf,
    /// Directory the metadata `filename` column is resolved against.
    pub data_root: PathBuf,
    pub output_path: PathBuf,
    /// Optional per-battery JSON summary.
    pub summary_path: Option<PathBuf>,
    pub preview_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            metadata_path: PathBuf::from("metadata.csv"),
            data_root: PathBuf::from("data"),
            output_path: PathBuf::from("NASA_Battery_dataset_all.csv"),
            summary_path: None,
            preview_rows: 5,
        }
    }
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}
