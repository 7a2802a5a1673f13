//! Entry point wiring the four stages: load metadata, aggregate cycles,
//! derive labels, write the table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::config::PipelineConfig;
use crate::cycles::aggregate::build_cycle_rows;
use crate::cycles::types::LabeledRow;
use crate::labels::{BatteryIndex, derive_labels};
use crate::metadata::load_metadata;
use crate::output::{write_dataset, write_summary_json};
use crate::trace::DirectorySource;

/// What a finished build produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub batteries: usize,
    pub unpaired_cycles: usize,
    pub output_path: PathBuf,
    pub rows: Vec<LabeledRow>,
}

/// Runs a full build described by `config`.
///
/// Nothing is written until every row has been built, so a failing
/// measurement file leaves any previous output untouched.
#[tracing::instrument(skip_all, fields(
    metadata = %config.metadata_path.display(),
    data_root = %config.data_root.display(),
))]
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let records = load_metadata(&config.metadata_path)
        .with_context(|| format!("loading metadata {}", config.metadata_path.display()))?;

    let source = DirectorySource::new(&config.data_root);
    let cycle_rows = build_cycle_rows(&records, &source)?;

    let (rows, summaries) = derive_labels(cycle_rows);
    let batteries = summaries.len();
    let unpaired_cycles: usize = summaries.iter().map(|s| s.unpaired_cycles).sum();

    write_dataset(&config.output_path, &rows)?;

    if let Some(summary_path) = &config.summary_path {
        let index = BatteryIndex {
            generated_at: Utc::now(),
            batteries: summaries,
        };
        write_summary_json(summary_path, &index)?;
    }

    info!(
        batteries,
        rows = rows.len(),
        unpaired_cycles,
        output = %config.output_path.display(),
        "Build complete"
    );

    Ok(PipelineReport {
        batteries,
        unpaired_cycles,
        output_path: config.output_path.clone(),
        rows,
    })
}
