//! Output formatting and persistence for the labelled dataset.
//!
//! Supports the CSV table, a JSON battery index and a stdout preview.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::Table;
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::cycles::types::LabeledRow;
use crate::labels::BatteryIndex;

/// Column order of the written table.
pub const COLUMNS: [&str; 11] = [
    "battery_id",
    "cycle",
    "chI",
    "chV",
    "chT",
    "disI",
    "disV",
    "disT",
    "BCt",
    "SOH",
    "RUL",
];

/// Flat CSV view of a [`LabeledRow`]. Absent values serialize as empty cells.
#[derive(Debug, Serialize)]
struct DatasetRecord<'a> {
    battery_id: &'a str,
    cycle: u32,
    #[serde(rename = "chI")]
    charge_current: Option<f64>,
    #[serde(rename = "chV")]
    charge_voltage: Option<f64>,
    #[serde(rename = "chT")]
    charge_temperature: Option<f64>,
    #[serde(rename = "disI")]
    discharge_current: f64,
    #[serde(rename = "disV")]
    discharge_voltage: f64,
    #[serde(rename = "disT")]
    discharge_temperature: f64,
    #[serde(rename = "BCt")]
    capacity: Option<f64>,
    #[serde(rename = "SOH")]
    soh: Option<f64>,
    #[serde(rename = "RUL")]
    rul: u32,
}

impl<'a> From<&'a LabeledRow> for DatasetRecord<'a> {
    fn from(labeled: &'a LabeledRow) -> Self {
        let row = &labeled.row;
        DatasetRecord {
            battery_id: &row.battery_id,
            cycle: row.cycle,
            charge_current: row.charge.map(|c| c.current),
            charge_voltage: row.charge.map(|c| c.voltage),
            charge_temperature: row.charge.map(|c| c.temperature),
            discharge_current: row.discharge.current,
            discharge_voltage: row.discharge.voltage,
            discharge_temperature: row.discharge.temperature,
            capacity: row.capacity,
            soh: labeled.soh,
            rul: labeled.rul,
        }
    }
}

/// Writes `rows` as a CSV table at `path`, replacing any existing file.
///
/// The header row is always written, even when `rows` is empty.
pub fn write_dataset(path: &Path, rows: &[LabeledRow]) -> Result<()> {
    debug!(path = %path.display(), rows = rows.len(), "Writing dataset");

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(DatasetRecord::from(row))?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "Dataset written");
    Ok(())
}

/// Writes the battery index as pretty-printed JSON at `path`.
pub fn write_summary_json(path: &Path, index: &BatteryIndex) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), index)?;

    info!(path = %path.display(), batteries = index.batteries.len(), "Battery index written");
    Ok(())
}

/// Renders the first `limit` rows as a text table.
pub fn preview_table(rows: &[LabeledRow], limit: usize) -> Table {
    let mut table = Table::new();
    table.set_header(COLUMNS.to_vec());

    for labeled in rows.iter().take(limit) {
        let row = &labeled.row;
        table.add_row(vec![
            row.battery_id.clone(),
            row.cycle.to_string(),
            cell(row.charge.map(|c| c.current)),
            cell(row.charge.map(|c| c.voltage)),
            cell(row.charge.map(|c| c.temperature)),
            cell(Some(row.discharge.current)),
            cell(Some(row.discharge.voltage)),
            cell(Some(row.discharge.temperature)),
            cell(row.capacity),
            cell(labeled.soh),
            labeled.rul.to_string(),
        ]);
    }

    table
}

/// Prints the success line and a preview of the first `limit` rows to stdout.
pub fn print_preview(path: &Path, rows: &[LabeledRow], limit: usize) {
    println!("\nDone! Created: {}", path.display());
    if limit > 0 {
        println!("{}", preview_table(rows, limit));
    }
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.6}"),
        None => "NaN".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycles::types::CycleRow;
    use crate::labels::BatterySummary;
    use crate::trace::TraceSummary;
    use chrono::Utc;
    use std::fs;
    use tempfile::tempdir;

    fn labeled(cycle: u32, charge: bool, capacity: Option<f64>, soh: Option<f64>, rul: u32) -> LabeledRow {
        let summary = TraceSummary {
            current: 2.0,
            voltage: 3.5,
            temperature: 30.25,
        };
        LabeledRow {
            row: CycleRow {
                battery_id: "B0005".to_string(),
                cycle,
                discharge_uid: i64::from(cycle),
                charge_uid: charge.then_some(0),
                charge: charge.then_some(TraceSummary {
                    current: 1.5,
                    voltage: 4.0,
                    temperature: 25.0,
                }),
                discharge: summary,
                capacity,
            },
            soh,
            rul,
        }
    }

    #[test]
    fn test_write_dataset_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let rows = vec![
            labeled(1, true, Some(2.0), Some(100.0), 1),
            labeled(2, false, None, None, 0),
        ];
        write_dataset(&path, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "battery_id,cycle,chI,chV,chT,disI,disV,disT,BCt,SOH,RUL");
        assert_eq!(lines[1], "B0005,1,1.5,4.0,25.0,2.0,3.5,30.25,2.0,100.0,1");
        assert_eq!(lines[2], "B0005,2,,,,2.0,3.5,30.25,,,0");
    }

    #[test]
    fn test_write_dataset_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale\nstale\nstale\nstale\nstale\n").unwrap();

        write_dataset(&path, &[labeled(1, true, Some(2.0), Some(100.0), 0)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!content.contains("stale"));
    }

    #[test]
    fn test_write_dataset_empty_rows_writes_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_dataset(&path, &[]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_write_summary_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batteries.json");
        let index = BatteryIndex {
            generated_at: Utc::now(),
            batteries: vec![BatterySummary {
                battery_id: "B0005".to_string(),
                cycles: 168,
                reference_capacity: Some(1.856),
                min_soh: Some(71.3),
                unpaired_cycles: 0,
            }],
        };

        write_summary_json(&path, &index).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["batteries"][0]["battery_id"], "B0005");
        assert_eq!(value["batteries"][0]["cycles"], 168);
    }

    #[test]
    fn test_preview_limits_rows() {
        let rows: Vec<_> = (1..=8).map(|c| labeled(c, true, Some(2.0), Some(100.0), 8 - c)).collect();

        let rendered = preview_table(&rows, 5).to_string();

        assert!(rendered.contains("battery_id"));
        assert_eq!(rendered.matches("B0005").count(), 5);
    }

    #[test]
    fn test_absent_cells_render_as_nan() {
        let rows = vec![labeled(1, false, None, None, 0)];
        let rendered = preview_table(&rows, 5).to_string();
        assert!(rendered.contains("NaN"));
    }
}
