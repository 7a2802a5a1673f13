//! State-of-Health and Remaining-Useful-Life labels.
//!
//! Labels are computed per battery and never compared across batteries:
//! SOH is capacity over the battery's peak capacity (as a percentage) and RUL
//! is the number of cycles until the battery's last recorded cycle.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::cycles::types::{CycleRow, LabeledRow};

/// Per-battery facts gathered while labelling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatterySummary {
    pub battery_id: String,
    pub cycles: u32,
    /// Peak capacity used as the 100% SOH reference.
    pub reference_capacity: Option<f64>,
    pub min_soh: Option<f64>,
    /// Cycles without any charge event to pair with.
    pub unpaired_cycles: usize,
}

/// Index of every battery in a build, written as JSON.
#[derive(Debug, Serialize)]
pub struct BatteryIndex {
    pub generated_at: DateTime<Utc>,
    pub batteries: Vec<BatterySummary>,
}

/// Largest present capacity. `None` when every row is absent.
pub fn reference_capacity<'a>(rows: impl IntoIterator<Item = &'a CycleRow>) -> Option<f64> {
    rows.into_iter()
        .filter_map(|r| r.capacity)
        .fold(None, |max, c| match max {
            Some(m) if m >= c => Some(m),
            _ => Some(c),
        })
}

/// Attaches SOH and RUL to `rows`.
///
/// `rows` must already be grouped by battery (as [`crate::cycles::aggregate::build_cycle_rows`]
/// returns them); each contiguous run of one `battery_id` is labelled on its own.
/// Output order equals input order.
pub fn derive_labels(rows: Vec<CycleRow>) -> (Vec<LabeledRow>, Vec<BatterySummary>) {
    let mut labeled = Vec::with_capacity(rows.len());
    let mut summaries = Vec::new();

    for group in rows.chunk_by(|a, b| a.battery_id == b.battery_id) {
        let reference = reference_capacity(group);
        let max_cycle = group.iter().map(|r| r.cycle).max().unwrap_or(0);

        if reference.is_none() {
            warn!(
                battery_id = %group[0].battery_id,
                "No usable capacity; SOH is absent for every cycle"
            );
        }

        let start = labeled.len();
        for row in group {
            let soh = match (row.capacity, reference) {
                (Some(capacity), Some(reference)) => Some(capacity / reference * 100.0),
                _ => None,
            };
            labeled.push(LabeledRow {
                row: row.clone(),
                soh,
                rul: max_cycle - row.cycle,
            });
        }

        summaries.push(BatterySummary {
            battery_id: group[0].battery_id.clone(),
            cycles: max_cycle,
            reference_capacity: reference,
            min_soh: labeled[start..]
                .iter()
                .filter_map(|r| r.soh)
                .reduce(f64::min),
            unpaired_cycles: group.iter().filter(|r| r.charge.is_none()).count(),
        });
    }

    (labeled, summaries)
}
