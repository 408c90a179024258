use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use tracing::{debug, instrument};

use crate::constants::{MAX_OPENED_YEAR, MIN_OPENED_YEAR};
use crate::domain::{League, NormalizedVenue, VenueRecord};

/// Footnote-reference markers such as `[1]`, `[a]` or `[note 3]`.
static ANNOTATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

/// A field that could not be parsed and was left null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub league: League,
    pub venue: String,
    pub team: String,
    pub field: CleanedField,
    pub raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanedField {
    Capacity,
    Location,
    Opened,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self.field {
            CleanedField::Capacity => "capacity",
            CleanedField::Location => "location",
            CleanedField::Opened => "opened",
        };
        write!(f, "{} {} ({}): unparsable {} '{}'", self.league, self.venue, self.team, field, self.raw)
    }
}

/// Output of the cleaning stage
#[derive(Debug, Clone, Default)]
pub struct CleanOutput {
    pub records: Vec<VenueRecord>,
    pub issues: Vec<FieldIssue>,
}

/// Remove every bracketed annotation span and trim the result.
pub fn strip_annotations(text: &str) -> String {
    ANNOTATION_RE.replace_all(text, "").trim().to_string()
}

/// Parse a seating capacity such as `82,500[2]`.
pub fn parse_capacity(raw: &str) -> Option<u32> {
    let digits: String = strip_annotations(raw).chars().filter(|&c| c != ',').collect();
    digits.trim().parse::<u32>().ok()
}

/// Parse the year a venue opened from the first four characters of the raw field.
pub fn parse_opened(raw: &str) -> Option<u16> {
    let head: String = raw.trim().chars().take(4).collect();
    if head.len() != 4 || !head.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    head.parse::<u16>()
        .ok()
        .filter(|year| (MIN_OPENED_YEAR..=MAX_OPENED_YEAR).contains(year))
}

/// Split `City, State` on the first `", "`.
pub fn split_location(raw: &str) -> Option<(String, String)> {
    let location = strip_annotations(raw);
    let (city, state) = location.split_once(", ")?;
    let (city, state) = (city.trim(), state.trim());
    if city.is_empty() || state.is_empty() {
        return None;
    }
    Some((city.to_string(), state.to_string()))
}

/// Clean a single row, reporting any field that had to be nulled.
pub fn clean_venue(venue: &NormalizedVenue) -> (VenueRecord, Vec<FieldIssue>) {
    let name = strip_annotations(&venue.name);
    let team = strip_annotations(&venue.team);
    let mut issues = Vec::new();
    let issue = |field: CleanedField, raw: &str| FieldIssue {
        league: venue.league,
        venue: name.clone(),
        team: team.clone(),
        field,
        raw: raw.to_string(),
    };

    let capacity = parse_capacity(&venue.capacity);
    if capacity.is_none() {
        issues.push(issue(CleanedField::Capacity, &venue.capacity));
    }

    let (city, state) = match split_location(&venue.location) {
        Some((city, state)) => (Some(city), Some(state)),
        None => {
            issues.push(issue(CleanedField::Location, &venue.location));
            (None, None)
        }
    };

    let opened = parse_opened(&venue.opened);
    if opened.is_none() {
        issues.push(issue(CleanedField::Opened, &venue.opened));
    }

    let record = VenueRecord {
        league: venue.league,
        name,
        capacity,
        city,
        state,
        team,
        opened,
        latitude: None,
        longitude: None,
    };
    (record, issues)
}

/// Clean every row. Records are never dropped; unparsable fields become null.
#[instrument(skip(venues), fields(records = venues.len()))]
pub fn clean_all(venues: &[NormalizedVenue]) -> CleanOutput {
    let mut output = CleanOutput::default();
    for venue in venues {
        let (record, issues) = clean_venue(venue);
        for issue in &issues {
            debug!("{}", issue);
        }
        output.records.push(record);
        output.issues.extend(issues);
    }
    debug!("Cleaned {} records ({} field issues)", output.records.len(), output.issues.len());
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metlife() -> NormalizedVenue {
        NormalizedVenue {
            league: League::Nfl,
            name: "MetLife Stadium[1]".into(),
            capacity: "82,500[2]".into(),
            location: "East Rutherford, New Jersey".into(),
            team: "New York Giants & New York Jets".into(),
            opened: "2010".into(),
        }
    }

    #[test]
    fn test_strip_annotations_removes_each_marker() {
        assert_eq!(strip_annotations("MetLife Stadium[1]"), "MetLife Stadium");
        assert_eq!(strip_annotations("Fenway Park[a][b]"), "Fenway Park");
        assert_eq!(strip_annotations(" Oracle Park [note 4] "), "Oracle Park");
        assert_eq!(strip_annotations("No markers"), "No markers");
    }

    #[test]
    fn test_parse_capacity() {
        assert_eq!(parse_capacity("82,500[2]"), Some(82_500));
        assert_eq!(parse_capacity(" 1,000,000 "), Some(1_000_000));
        assert_eq!(parse_capacity("18064"), Some(18_064));
        assert_eq!(parse_capacity("TBD"), None);
        assert_eq!(parse_capacity("-5"), None);
        assert_eq!(parse_capacity(""), None);
    }

    #[test]
    fn test_parse_opened_takes_first_four_characters() {
        assert_eq!(parse_opened("2010"), Some(2010));
        assert_eq!(parse_opened("1912[5]"), Some(1912));
        assert_eq!(parse_opened("1999 (renovated 2016)"), Some(1999));
        assert_eq!(parse_opened("c. 1990"), None);
        assert_eq!(parse_opened("201"), None);
        assert_eq!(parse_opened("1066"), None);
        assert_eq!(parse_opened("3000"), None);
    }

    #[test]
    fn test_split_location_uses_first_delimiter() {
        assert_eq!(
            split_location("East Rutherford, New Jersey"),
            Some(("East Rutherford".into(), "New Jersey".into()))
        );
        assert_eq!(
            split_location("Toronto, Ontario, Canada"),
            Some(("Toronto".into(), "Ontario, Canada".into()))
        );
        assert_eq!(
            split_location("Denver, Colorado[c]"),
            Some(("Denver".into(), "Colorado".into()))
        );
        assert_eq!(split_location("Washington"), None);
        assert_eq!(split_location("Paradise,Nevada"), None);
    }

    #[test]
    fn test_clean_metlife_row() {
        let (record, issues) = clean_venue(&metlife());
        assert!(issues.is_empty());
        assert_eq!(record.name, "MetLife Stadium");
        assert_eq!(record.capacity, Some(82_500));
        assert_eq!(record.city.as_deref(), Some("East Rutherford"));
        assert_eq!(record.state.as_deref(), Some("New Jersey"));
        assert_eq!(record.team, "New York Giants & New York Jets");
        assert_eq!(record.opened, Some(2010));
        assert_eq!(record.latitude, None);
    }

    #[test]
    fn test_unparsable_fields_are_nulled_and_reported() {
        let venue = NormalizedVenue {
            league: League::Mlb,
            name: "Sutter Health Park".into(),
            capacity: "n/a".into(),
            location: "West Sacramento".into(),
            team: "Athletics".into(),
            opened: "TBA".into(),
        };
        let (record, issues) = clean_venue(&venue);
        assert_eq!(record.capacity, None);
        assert_eq!(record.city, None);
        assert_eq!(record.state, None);
        assert_eq!(record.opened, None);
        let fields: Vec<CleanedField> = issues.iter().map(|i| i.field).collect();
        assert_eq!(
            fields,
            vec![CleanedField::Capacity, CleanedField::Location, CleanedField::Opened]
        );
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let rows = vec![
            metlife(),
            NormalizedVenue {
                league: League::Nhl,
                name: "Scotiabank Arena[b]".into(),
                capacity: "18,800".into(),
                location: "Toronto, Ontario".into(),
                team: "Toronto Maple Leafs[7]".into(),
                opened: "1999[3]".into(),
            },
            NormalizedVenue {
                league: League::Nba,
                name: "Unknown".into(),
                capacity: "—".into(),
                location: "Nowhere".into(),
                team: "Team".into(),
                opened: "".into(),
            },
        ];
        let once = clean_all(&rows);
        let rendered: Vec<NormalizedVenue> = once.records.iter().map(NormalizedVenue::from).collect();
        let twice = clean_all(&rendered);
        assert_eq!(once.records, twice.records);

        for text in ["MetLife Stadium[1]", "82,500[2]", "a[1] b [2] c"] {
            let first = strip_annotations(text);
            assert_eq!(strip_annotations(&first), first);
        }
    }

    #[test]
    fn test_clean_all_keeps_every_record() {
        let rows = vec![metlife(), metlife()];
        let output = clean_all(&rows);
        assert_eq!(output.records.len(), 2);
        assert!(output.issues.is_empty());
    }
}
