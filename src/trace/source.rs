use super::{Phase, TraceSummary};
use crate::error::DatasetError;

/// Anything that can turn a metadata `filename` into a [`TraceSummary`].
pub trait TraceSource {
    fn summarize(&self, filename: &str, phase: Phase) -> Result<TraceSummary, DatasetError>;
}
