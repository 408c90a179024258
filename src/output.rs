use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

use crate::domain::{League, VenueRecord};
use crate::error::Result;

/// One published CSV row, columns in the published order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DatasetRow {
    #[serde(rename = "League")]
    league: League,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Capacity")]
    capacity: Option<u32>,
    #[serde(rename = "City")]
    city: Option<String>,
    #[serde(rename = "State")]
    state: Option<String>,
    #[serde(rename = "Team")]
    team: String,
    #[serde(rename = "Opened")]
    opened: Option<u16>,
    #[serde(rename = "Latitude")]
    latitude: Option<f64>,
    #[serde(rename = "Longitude")]
    longitude: Option<f64>,
}

impl From<&VenueRecord> for DatasetRow {
    fn from(r: &VenueRecord) -> Self {
        Self {
            league: r.league,
            name: r.name.clone(),
            capacity: r.capacity,
            city: r.city.clone(),
            state: r.state.clone(),
            team: r.team.clone(),
            opened: r.opened,
            latitude: r.latitude,
            longitude: r.longitude,
        }
    }
}

impl From<DatasetRow> for VenueRecord {
    fn from(r: DatasetRow) -> Self {
        Self {
            league: r.league,
            name: r.name,
            capacity: r.capacity,
            city: r.city,
            state: r.state,
            team: r.team,
            opened: r.opened,
            latitude: r.latitude,
            longitude: r.longitude,
        }
    }
}

/// Write the dataset as CSV. Empty fields stand for nulls; text is quoted
/// only when it contains the delimiter, a quote or a line break.
pub fn write_csv<W: Write>(records: &[VenueRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(DatasetRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<VenueRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize::<DatasetRow>() {
        records.push(row?.into());
    }
    Ok(records)
}

pub fn write_csv_file(records: &[VenueRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    write_csv(records, File::create(path)?)?;
    info!("💾 Saved {} records to {}", records.len(), path.display());
    Ok(())
}

pub fn read_csv_file(path: impl AsRef<Path>) -> Result<Vec<VenueRecord>> {
    read_csv(File::open(path.as_ref())?)
}

/// Point features for every record with coordinates, for map renderers.
pub fn to_geojson(records: &[VenueRecord]) -> Value {
    let features: Vec<Value> = records
        .iter()
        .filter_map(|r| {
            let (lat, lon) = (r.latitude?, r.longitude?);
            Some(json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [lon, lat] },
                "properties": {
                    "league": r.league,
                    "name": r.name,
                    "capacity": r.capacity,
                    "city": r.city,
                    "state": r.state,
                    "team": r.team,
                    "opened": r.opened,
                }
            }))
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

pub fn write_geojson_file(records: &[VenueRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    fs::write(path, serde_json::to_string_pretty(&to_geojson(records))?)?;
    info!("💾 Saved map features to {}", path.display());
    Ok(())
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
