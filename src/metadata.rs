//! Loader for the cycle catalog (`metadata.csv`).
//!
//! Every row names one recorded event of one battery. Rows are returned in
//! file order, unfiltered; the only coercion is on `Capacity`, where anything
//! that is not a finite number becomes `None`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::error::DatasetError;

/// Kind of event a metadata row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Charge,
    Discharge,
    Other,
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        match value {
            "charge" => EventType::Charge,
            "discharge" => EventType::Discharge,
            _ => EventType::Other,
        }
    }
}

/// A single row of the cycle catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetadataRecord {
    pub battery_id: String,
    /// Sequence id; unique within a battery and defines chronological order.
    pub uid: i64,
    #[serde(rename = "type", deserialize_with = "event_type")]
    pub event_type: EventType,
    pub filename: String,
    #[serde(rename = "Capacity", deserialize_with = "coerce_capacity")]
    pub capacity: Option<f64>,
}

fn event_type<'de, D>(deserializer: D) -> Result<EventType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(EventType::from(raw.as_str()))
}

fn coerce_capacity<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite()))
}

/// Reads the catalog at `path`.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_metadata(path: &Path) -> Result<Vec<MetadataRecord>, DatasetError> {
    let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
    let records = read_metadata(file, path)?;

    info!(records = records.len(), "Metadata loaded");
    Ok(records)
}

/// Reads catalog rows from any reader. `origin` is only used in error messages.
pub fn read_metadata<R: Read>(reader: R, origin: &Path) -> Result<Vec<MetadataRecord>, DatasetError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in rdr.deserialize() {
        let record: MetadataRecord = result.map_err(|e| DatasetError::csv(origin, e))?;
        records.push(record);
    }

    let missing_capacity = records
        .iter()
        .filter(|r| r.event_type == EventType::Discharge && r.capacity.is_none())
        .count();
    debug!(missing_capacity, "Discharge rows without a usable capacity");

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<MetadataRecord> {
        read_metadata(text.as_bytes(), Path::new("metadata.csv")).unwrap()
    }

    #[test]
    fn test_reads_rows_in_file_order() {
        let records = parse(
            "type,start_time,ambient_temperature,battery_id,test_id,uid,filename,Capacity,Re,Rct\n\
             discharge,x,24,B0047,0,1,00001.csv,1.6743,,\n\
             charge,x,24,B0047,1,2,00002.csv,,,\n\
             impedance,x,24,B0047,2,3,00003.csv,,0.05,0.2\n",
        );

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].event_type, EventType::Discharge);
        assert_eq!(records[0].capacity, Some(1.6743));
        assert_eq!(records[1].event_type, EventType::Charge);
        assert_eq!(records[1].capacity, None);
        assert_eq!(records[2].event_type, EventType::Other);
        assert_eq!(records[2].uid, 3);
        assert_eq!(records[2].filename, "00003.csv");
    }

    #[test]
    fn test_unparseable_capacity_becomes_none() {
        let records = parse(
            "battery_id,uid,type,filename,Capacity\n\
             B1,1,discharge,a.csv,[1.8]\n\
             B1,2,discharge,b.csv,nan\n\
             B1,3,discharge,c.csv, 1.5 \n\
             B1,4,discharge,d.csv,inf\n",
        );

        let caps: Vec<_> = records.iter().map(|r| r.capacity).collect();
        assert_eq!(caps, vec![None, None, Some(1.5), None]);
    }

    #[test]
    fn test_event_type_is_case_sensitive() {
        assert_eq!(EventType::from("charge"), EventType::Charge);
        assert_eq!(EventType::from("Discharge"), EventType::Other);
        assert_eq!(EventType::from(""), EventType::Other);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let result = read_metadata(
            "battery_id,uid,type,filename\nB1,1,discharge,a.csv\n".as_bytes(),
            Path::new("metadata.csv"),
        );
        assert!(matches!(result, Err(DatasetError::Csv { .. })));
    }

    #[test]
    fn test_load_metadata_missing_file() {
        let result = load_metadata(Path::new("/nonexistent/metadata.csv"));
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }
}
