use crate::constants::*;
use crate::domain::League;
use crate::error::{Result, VenueError};
use crate::pipeline::processing::normalize::ColumnMapping;
use crate::pipeline::processing::reconcile::SharedVenueRule;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime configuration. Every section of the TOML file is optional;
/// anything left out falls back to the built-in defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub http: HttpConfig,
    pub paths: PathsConfig,
    pub leagues: BTreeMap<League, LeagueSource>,
    pub shared_venues: Vec<SharedVenueRule>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub coordinates: PathBuf,
    pub output: PathBuf,
    pub geojson: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub logs_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            coordinates: PathBuf::from(DEFAULT_COORDINATES_PATH),
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            geojson: Some(PathBuf::from(DEFAULT_GEOJSON_PATH)),
            summary: Some(PathBuf::from(DEFAULT_SUMMARY_PATH)),
            cache_dir: Some(PathBuf::from(DEFAULT_CACHE_DIR)),
            logs_dir: PathBuf::from(DEFAULT_LOGS_DIR),
        }
    }
}

/// Where a league's table lives and how its columns map onto the canonical schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueSource {
    pub league: League,
    pub url: String,
    pub table_index: usize,
    pub columns: ColumnMapping,
}

impl LeagueSource {
    pub fn default_for(league: League) -> Self {
        let (url, table_index) = match league {
            League::Mlb => (MLB_URL, MLB_TABLE_INDEX),
            League::Nba => (NBA_URL, NBA_TABLE_INDEX),
            League::Nfl => (NFL_URL, NFL_TABLE_INDEX),
            League::Nhl => (NHL_URL, NHL_TABLE_INDEX),
        };
        Self {
            league,
            url: url.to_string(),
            table_index,
            columns: ColumnMapping::default_for(league),
        }
    }

    fn apply(&mut self, patch: LeagueSourcePatch) {
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(table_index) = patch.table_index {
            self.table_index = table_index;
        }
        if let Some(columns) = patch.columns {
            let c = &mut self.columns;
            c.name = columns.name.unwrap_or_else(|| c.name.clone());
            c.capacity = columns.capacity.unwrap_or_else(|| c.capacity.clone());
            c.location = columns.location.unwrap_or_else(|| c.location.clone());
            c.team = columns.team.unwrap_or_else(|| c.team.clone());
            c.opened = columns.opened.unwrap_or_else(|| c.opened.clone());
        }
    }
}

// On-disk shape: partial overrides layered over the defaults

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    http: Option<HttpConfig>,
    paths: Option<PathsConfig>,
    leagues: BTreeMap<League, LeagueSourcePatch>,
    shared_venues: Option<Vec<SharedVenueRule>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LeagueSourcePatch {
    url: Option<String>,
    table_index: Option<usize>,
    columns: Option<ColumnPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ColumnPatch {
    name: Option<String>,
    capacity: Option<String>,
    location: Option<String>,
    team: Option<String>,
    opened: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            paths: PathsConfig::default(),
            leagues: League::ALL
                .iter()
                .map(|&league| (league, LeagueSource::default_for(league)))
                .collect(),
            shared_venues: SharedVenueRule::defaults(),
        }
    }
}

impl Config {
    /// Load from a TOML file, layering it over the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            VenueError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let mut config = Self::default();
        if let Some(http) = file.http {
            config.http = http;
        }
        if let Some(paths) = file.paths {
            config.paths = paths;
        }
        for (league, patch) in file.leagues {
            if let Some(source) = config.leagues.get_mut(&league) {
                source.apply(patch);
            }
        }
        if let Some(rules) = file.shared_venues {
            config.shared_venues = rules;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for source in self.leagues.values() {
            if source.url.trim().is_empty() {
                return Err(VenueError::Config(format!("{} source URL is empty", source.league)));
            }
            for column in source.columns.source_columns() {
                if column.trim().is_empty() {
                    return Err(VenueError::Config(format!(
                        "{} column mapping contains an empty column name",
                        source.league
                    )));
                }
            }
        }
        for rule in &self.shared_venues {
            if rule.teams.len() < 2 {
                return Err(VenueError::Config(format!(
                    "shared venue '{}' must list at least two teams",
                    rule.venue
                )));
            }
        }
        if self.http.timeout_seconds == 0 {
            return Err(VenueError::Config("http.timeout_seconds must be positive".into()));
        }
        Ok(())
    }

    /// Sources in canonical league order, optionally limited to `only`.
    pub fn sources(&self, only: Option<&[League]>) -> Vec<&LeagueSource> {
        self.leagues
            .values()
            .filter(|s| only.map_or(true, |leagues| leagues.contains(&s.league)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_league() {
        let config = Config::default();
        let leagues: Vec<League> = config.sources(None).iter().map(|s| s.league).collect();
        assert_eq!(leagues, League::ALL.to_vec());
        assert_eq!(config.leagues[&League::Nfl].table_index, 1);
        assert_eq!(config.leagues[&League::Nba].table_index, 0);
        assert_eq!(config.shared_venues.len(), 1);
    }

    #[test]
    fn test_partial_file_overrides_only_named_fields() {
        let config = Config::from_toml_str(
            r#"
            [paths]
            coordinates = "ref/coords.csv"
            output = "out/final.csv"
            logs_dir = "var/logs"

            [leagues.nba]
            table_index = 2

            [leagues.nba.columns]
            name = "Venue"
            "#,
        )
        .unwrap();

        let nba = &config.leagues[&League::Nba];
        assert_eq!(nba.table_index, 2);
        assert_eq!(nba.columns.name, "Venue");
        assert_eq!(nba.columns.team, "Team(s)");
        assert_eq!(nba.url, NBA_URL);
        assert_eq!(config.paths.coordinates, PathBuf::from("ref/coords.csv"));
        assert_eq!(config.http.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.leagues[&League::Mlb], LeagueSource::default_for(League::Mlb));
    }

    #[test]
    fn test_shared_venue_rules_can_be_replaced() {
        let config = Config::from_toml_str(
            r#"
            [[shared_venues]]
            league = "nfl"
            venue = "SoFi Stadium"
            teams = ["Los Angeles Rams", "Los Angeles Chargers"]
            "#,
        )
        .unwrap();
        assert_eq!(config.shared_venues.len(), 1);
        assert_eq!(config.shared_venues[0].venue, "SoFi Stadium");
        assert_eq!(config.shared_venues[0].league, League::Nfl);
    }

    #[test]
    fn test_rejects_single_team_shared_venue() {
        let result = Config::from_toml_str(
            r#"
            [[shared_venues]]
            league = "NFL"
            venue = "Somewhere"
            teams = ["Only One"]
            "#,
        );
        assert!(matches!(result, Err(VenueError::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_league_key() {
        let result = Config::from_toml_str(
            r#"
            [leagues.mls]
            table_index = 0
            "#,
        );
        assert!(matches!(result, Err(VenueError::Toml(_))));
    }

    #[test]
    fn test_restricting_sources() {
        let config = Config::default();
        let only = [League::Nhl, League::Mlb];
        let leagues: Vec<League> = config.sources(Some(&only)).iter().map(|s| s.league).collect();
        assert_eq!(leagues, vec![League::Mlb, League::Nhl]);
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config = Config::from_toml_str(include_str!("../config.example.toml")).unwrap();
        let defaults = Config::default();
        assert_eq!(config.leagues, defaults.leagues);
        assert_eq!(config.shared_venues, defaults.shared_venues);
        assert_eq!(config.paths.cache_dir, defaults.paths.cache_dir);
    }
}
