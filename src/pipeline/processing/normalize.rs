use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::constants::*;
use crate::domain::{League, NormalizedVenue};
use crate::error::{Result, VenueError};
use crate::types::RawLeagueTable;

/// Which source column feeds each canonical field for one league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub name: String,
    pub capacity: String,
    pub location: String,
    pub team: String,
    pub opened: String,
}

impl ColumnMapping {
    /// Built-in mapping table for the four league pages
    pub fn default_for(league: League) -> Self {
        let (name, team) = match league {
            League::Mlb => (COLUMN_NAME, COLUMN_TEAM),
            League::Nba => (COLUMN_ARENA, COLUMN_TEAMS),
            League::Nfl => (COLUMN_NAME, COLUMN_TEAMS),
            League::Nhl => (COLUMN_ARENA, COLUMN_TEAMS),
        };
        Self {
            name: name.to_string(),
            capacity: COLUMN_CAPACITY.to_string(),
            location: COLUMN_LOCATION.to_string(),
            team: team.to_string(),
            opened: COLUMN_OPENED.to_string(),
        }
    }

    pub fn source_columns(&self) -> [&str; 5] {
        [&self.name, &self.capacity, &self.location, &self.team, &self.opened]
    }
}

/// Resolved column positions for one table
struct ColumnPositions {
    name: usize,
    capacity: usize,
    location: usize,
    team: usize,
    opened: usize,
}

impl ColumnPositions {
    fn resolve(table: &RawLeagueTable, mapping: &ColumnMapping, league: League) -> Result<Self> {
        let find = |column: &str| {
            table.column_index(column).ok_or_else(|| VenueError::SchemaMismatch {
                league,
                column: column.to_string(),
                available: table.header_names(),
            })
        };
        Ok(Self {
            name: find(&mapping.name)?,
            capacity: find(&mapping.capacity)?,
            location: find(&mapping.location)?,
            team: find(&mapping.team)?,
            opened: find(&mapping.opened)?,
        })
    }
}

fn cell(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

/// Select and rename the mapped columns and tag every row with `league`.
/// Cell text is carried over untouched.
#[instrument(skip(table, mapping), fields(league = %league, rows = table.len()))]
pub fn normalize_table(
    table: &RawLeagueTable,
    mapping: &ColumnMapping,
    league: League,
) -> Result<Vec<NormalizedVenue>> {
    let positions = ColumnPositions::resolve(table, mapping, league)?;
    let venues: Vec<NormalizedVenue> = table
        .rows
        .iter()
        .map(|row| NormalizedVenue {
            league,
            name: cell(row, positions.name),
            capacity: cell(row, positions.capacity),
            location: cell(row, positions.location),
            team: cell(row, positions.team),
            opened: cell(row, positions.opened),
        })
        .collect();
    debug!("Normalized {} {} rows", venues.len(), league);
    Ok(venues)
}
