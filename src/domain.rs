use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four leagues covered by the dataset, declared in canonical processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum League {
    #[serde(alias = "mlb")]
    Mlb,
    #[serde(alias = "nba")]
    Nba,
    #[serde(alias = "nfl")]
    Nfl,
    #[serde(alias = "nhl")]
    Nhl,
}

impl League {
    pub const ALL: [League; 4] = [League::Mlb, League::Nba, League::Nfl, League::Nhl];

    /// Upper-case abbreviation used in the published dataset
    pub fn as_str(&self) -> &'static str {
        match self {
            League::Mlb => "MLB",
            League::Nba => "NBA",
            League::Nfl => "NFL",
            League::Nhl => "NHL",
        }
    }

    /// Lower-case key used by the CLI and the config file
    pub fn key(&self) -> &'static str {
        match self {
            League::Mlb => "mlb",
            League::Nba => "nba",
            League::Nfl => "nfl",
            League::Nhl => "nhl",
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for League {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mlb" => Ok(League::Mlb),
            "nba" => Ok(League::Nba),
            "nfl" => Ok(League::Nfl),
            "nhl" => Ok(League::Nhl),
            other => Err(format!("unknown league '{other}' (expected one of mlb, nba, nfl, nhl)")),
        }
    }
}

/// A table row mapped into the canonical schema but not yet cleaned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedVenue {
    pub league: League,
    pub name: String,
    pub capacity: String,
    pub location: String,
    pub team: String,
    pub opened: String,
}

/// One venue-team-league association in the published dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRecord {
    pub league: League,
    pub name: String,
    pub capacity: Option<u32>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub team: String,
    pub opened: Option<u16>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl VenueRecord {
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Copy of this record attributed to another team.
    pub fn with_team(&self, team: &str) -> Self {
        Self {
            team: team.to_string(),
            ..self.clone()
        }
    }
}

/// Renders a cleaned record back into its textual form, so it can be fed
/// through the cleaner again.
impl From<&VenueRecord> for NormalizedVenue {
    fn from(record: &VenueRecord) -> Self {
        let location = match (&record.city, &record.state) {
            (Some(city), Some(state)) => format!("{city}, {state}"),
            (Some(city), None) => city.clone(),
            (None, Some(state)) => state.clone(),
            (None, None) => String::new(),
        };
        Self {
            league: record.league,
            name: record.name.clone(),
            capacity: record.capacity.map(|c| c.to_string()).unwrap_or_default(),
            location,
            team: record.team.clone(),
            opened: record.opened.map(|y| y.to_string()).unwrap_or_default(),
        }
    }
}
