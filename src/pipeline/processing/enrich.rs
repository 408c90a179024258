use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::domain::VenueRecord;
use crate::error::{Result, VenueError};

/// Team name to (latitude, longitude), read once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct CoordinateReference {
    coordinates: HashMap<String, (f64, f64)>,
}

/// One row of the reference file; extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CoordinateRow {
    team_name: String,
    lat: f64,
    lon: f64,
}

impl CoordinateReference {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| VenueError::Reference {
            path: path.to_path_buf(),
            source,
        })?;
        let reference = Self::from_reader(file)?;
        info!("Loaded {} team coordinates from {}", reference.len(), path.display());
        Ok(reference)
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
        let mut coordinates = HashMap::new();
        for row in reader.deserialize::<CoordinateRow>() {
            let row = row?;
            if let Some(previous) = coordinates.insert(row.team_name.clone(), (row.lat, row.lon)) {
                warn!("Duplicate coordinates for '{}', replacing {:?}", row.team_name, previous);
            }
        }
        Ok(Self { coordinates })
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64, f64)>,
        S: Into<String>,
    {
        Self {
            coordinates: pairs
                .into_iter()
                .map(|(team, lat, lon)| (team.into(), (lat, lon)))
                .collect(),
        }
    }

    /// Exact, case-sensitive lookup
    pub fn get(&self, team: &str) -> Option<(f64, f64)> {
        self.coordinates.get(team).copied()
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Enriched {
    pub records: Vec<VenueRecord>,
    /// Teams with no reference entry, in dataset order without repeats
    pub unresolved_teams: Vec<String>,
}

/// Left join of the reference coordinates onto every record by team name.
/// Records without a match keep null coordinates.
#[instrument(skip(records, reference), fields(records = records.len(), reference = reference.len()))]
pub fn enrich(records: Vec<VenueRecord>, reference: &CoordinateReference) -> Enriched {
    let mut unresolved_teams: Vec<String> = Vec::new();
    let records: Vec<VenueRecord> = records
        .into_iter()
        .map(|record| match reference.get(&record.team) {
            Some((lat, lon)) => VenueRecord {
                latitude: Some(lat),
                longitude: Some(lon),
                ..record
            },
            None => {
                debug!("No coordinates for {} ({})", record.team, record.league);
                if !unresolved_teams.contains(&record.team) {
                    unresolved_teams.push(record.team.clone());
                }
                VenueRecord {
                    latitude: None,
                    longitude: None,
                    ..record
                }
            }
        })
        .collect();

    if !unresolved_teams.is_empty() {
        warn!("{} teams have no reference coordinates", unresolved_teams.len());
    }
    Enriched { records, unresolved_teams }
}
