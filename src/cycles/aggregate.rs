use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::cycles::pairing::select_charge;
use crate::cycles::types::CycleRow;
use crate::error::DatasetError;
use crate::metadata::{EventType, MetadataRecord};
use crate::trace::{Phase, TraceSource};

/// Battery ids in order of first appearance.
pub fn battery_order(records: &[MetadataRecord]) -> Vec<&str> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|r| r.battery_id.as_str())
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Builds one [`CycleRow`] per discharge event across all batteries.
///
/// The result is sorted by `(battery_id, cycle)`. The first trace that cannot
/// be summarized aborts the whole build.
#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn build_cycle_rows<S: TraceSource>(
    records: &[MetadataRecord],
    source: &S,
) -> Result<Vec<CycleRow>, DatasetError> {
    let mut rows = Vec::new();

    for battery_id in battery_order(records) {
        let battery_rows = battery_cycles(battery_id, records, source)?;
        debug!(battery_id, cycles = battery_rows.len(), "Battery aggregated");
        rows.extend(battery_rows);
    }

    rows.sort_by(|a, b| {
        a.battery_id
            .cmp(&b.battery_id)
            .then_with(|| a.cycle.cmp(&b.cycle))
    });

    info!(rows = rows.len(), "Cycle rows built");
    Ok(rows)
}

fn battery_cycles<S: TraceSource>(
    battery_id: &str,
    records: &[MetadataRecord],
    source: &S,
) -> Result<Vec<CycleRow>, DatasetError> {
    let of_type = |event_type: EventType| {
        let mut events: Vec<&MetadataRecord> = records
            .iter()
            .filter(|r| r.battery_id == battery_id && r.event_type == event_type)
            .collect();
        events.sort_by_key(|r| r.uid);
        events
    };

    let discharges = of_type(EventType::Discharge);
    let charges = of_type(EventType::Charge);

    let mut rows = Vec::with_capacity(discharges.len());

    for (cycle, discharge) in (1u32..).zip(discharges) {
        let paired = select_charge(discharge.uid, &charges);

        let discharge_summary = source.summarize(&discharge.filename, Phase::Discharge)?;
        let charge_summary = match paired {
            Some(charge) => Some(source.summarize(&charge.filename, Phase::Charge)?),
            None => {
                warn!(
                    battery_id,
                    uid = discharge.uid,
                    "Discharge has no charge event to pair with"
                );
                None
            }
        };

        rows.push(CycleRow {
            battery_id: battery_id.to_string(),
            cycle,
            discharge_uid: discharge.uid,
            charge_uid: paired.map(|c| c.uid),
            charge: charge_summary,
            discharge: discharge_summary,
            capacity: discharge.capacity,
        });
    }

    Ok(rows)
}
