/// Source pages and table positions for each league.
/// Table indices are 0-based over every `<table>` on the page.
pub const MLB_URL: &str = "https://en.wikipedia.org/wiki/List_of_current_Major_League_Baseball_stadiums";
pub const NBA_URL: &str = "https://en.wikipedia.org/wiki/List_of_National_Basketball_Association_arenas";
pub const NFL_URL: &str = "https://en.wikipedia.org/wiki/List_of_current_National_Football_League_stadiums";
pub const NHL_URL: &str = "https://en.wikipedia.org/wiki/List_of_National_Hockey_League_arenas";

pub const MLB_TABLE_INDEX: usize = 1;
pub const NBA_TABLE_INDEX: usize = 0;
pub const NFL_TABLE_INDEX: usize = 1;
pub const NHL_TABLE_INDEX: usize = 0;

// Source column names that differ between the league pages
pub const COLUMN_NAME: &str = "Name";
pub const COLUMN_ARENA: &str = "Arena";
pub const COLUMN_CAPACITY: &str = "Capacity";
pub const COLUMN_LOCATION: &str = "Location";
pub const COLUMN_TEAM: &str = "Team";
pub const COLUMN_TEAMS: &str = "Team(s)";
pub const COLUMN_OPENED: &str = "Opened";

// The one venue two NFL teams share
pub const METLIFE_STADIUM: &str = "MetLife Stadium";
pub const NEW_YORK_GIANTS: &str = "New York Giants";
pub const NEW_YORK_JETS: &str = "New York Jets";

/// Years outside this range are treated as unparsable
pub const MIN_OPENED_YEAR: u16 = 1850;
pub const MAX_OPENED_YEAR: u16 = 2100;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_COORDINATES_PATH: &str = "data/team_coordinates.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "output/venues.csv";
pub const DEFAULT_GEOJSON_PATH: &str = "output/venues.geojson";
pub const DEFAULT_SUMMARY_PATH: &str = "output/summary.json";
pub const DEFAULT_CACHE_DIR: &str = "cache";
pub const DEFAULT_LOGS_DIR: &str = "logs";

pub const DEFAULT_USER_AGENT: &str = "league_venues/0.1 (stadium dataset refresh)";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
