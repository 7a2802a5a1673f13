//! Row types produced by the aggregation and labelling stages.

use crate::trace::TraceSummary;

/// One discharge cycle of one battery, before labelling.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRow {
    pub battery_id: String,
    /// 1-based, contiguous per battery, in sequence-id order of discharges.
    pub cycle: u32,
    pub discharge_uid: i64,
    /// Sequence id of the paired charge event, if any.
    pub charge_uid: Option<i64>,
    pub charge: Option<TraceSummary>,
    pub discharge: TraceSummary,
    /// Discharge capacity from the metadata (Ah).
    pub capacity: Option<f64>,
}

/// A [`CycleRow`] with its per-battery health labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRow {
    pub row: CycleRow,
    /// Capacity as a percentage of the battery's peak capacity.
    pub soh: Option<f64>,
    /// Discharge cycles left until the battery's last recorded cycle.
    pub rul: u32,
}
