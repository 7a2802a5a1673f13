use std::fs::File;
use std::path::PathBuf;

use tracing::debug;

use super::source::TraceSource;
use super::{Phase, TraceSummary, read_samples, summarize_samples};
use crate::error::DatasetError;

/// A [`TraceSource`] that reads measurement CSVs from a data directory.
///
/// Each file is opened, fully read and closed within a single `summarize` call.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TraceSource for DirectorySource {
    #[tracing::instrument(level = "debug", skip(self), fields(root = %self.root.display()))]
    fn summarize(&self, filename: &str, phase: Phase) -> Result<TraceSummary, DatasetError> {
        let path = self.root.join(filename);
        let file = File::open(&path).map_err(|e| DatasetError::io(&path, e))?;
        let samples = read_samples(file, &path)?;
        let summary = summarize_samples(&samples, phase, &path)?;

        debug!(
            samples = samples.len(),
            current = summary.current,
            voltage = summary.voltage,
            temperature = summary.temperature,
            "Trace summarized"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_summarize_reads_from_root() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("00001.csv"),
            "Voltage_measured,Current_measured,Temperature_measured\n\
             4.0,-2.0,30.0\n\
             3.0,-2.0,34.0\n\
             4.2,0.0,24.0\n",
        )
        .unwrap();

        let source = DirectorySource::new(dir.path());
        let summary = source.summarize("00001.csv", Phase::Discharge).unwrap();

        assert_eq!(summary.current, 2.0);
        assert_eq!(summary.voltage, 3.5);
        assert_eq!(summary.temperature, 32.0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let source = DirectorySource::new(dir.path());

        let result = source.summarize("missing.csv", Phase::Charge);
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }
}
