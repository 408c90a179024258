use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info, instrument, warn};

use crate::constants::{METLIFE_STADIUM, NEW_YORK_GIANTS, NEW_YORK_JETS};
use crate::domain::{League, VenueRecord};

/// A venue known to host several teams of one league under a single table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedVenueRule {
    pub league: League,
    pub venue: String,
    pub teams: Vec<String>,
}

impl SharedVenueRule {
    pub fn new(league: League, venue: &str, teams: &[&str]) -> Self {
        Self {
            league,
            venue: venue.to_string(),
            teams: teams.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// The known exceptions in the current league pages
    pub fn defaults() -> Vec<Self> {
        vec![Self::new(League::Nfl, METLIFE_STADIUM, &[NEW_YORK_GIANTS, NEW_YORK_JETS])]
    }

    fn covers_venue(&self, record: &VenueRecord) -> bool {
        record.league == self.league && record.name == self.venue
    }

    /// A combined row: right venue, but its team is not one of the split teams.
    fn matches(&self, record: &VenueRecord) -> bool {
        self.covers_venue(record) && !self.teams.iter().any(|t| *t == record.team)
    }
}

/// One combined record that was replaced by per-team records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitApplied {
    pub league: League,
    pub venue: String,
    pub combined_team: String,
    pub teams: Vec<String>,
}

/// A team playing at more than one venue. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiVenueTeam {
    pub league: League,
    pub team: String,
    pub venues: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconciliationReport {
    pub splits: Vec<SplitApplied>,
    pub multi_venue_teams: Vec<MultiVenueTeam>,
    /// Records whose team still reads like several teams
    pub suspected_shared: Vec<String>,
    /// Rules that matched no venue at all in this dataset
    pub unmatched_rules: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Reconciled {
    pub records: Vec<VenueRecord>,
    pub report: ReconciliationReport,
}

/// Applies the fixed set of known data-quality corrections.
#[derive(Debug, Clone)]
pub struct Reconciler {
    shared_venues: Vec<SharedVenueRule>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(SharedVenueRule::defaults())
    }
}

impl Reconciler {
    pub fn new(shared_venues: Vec<SharedVenueRule>) -> Self {
        Self { shared_venues }
    }

    pub fn rules(&self) -> &[SharedVenueRule] {
        &self.shared_venues
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn reconcile(&self, records: Vec<VenueRecord>) -> Reconciled {
        let mut report = ReconciliationReport::default();
        let records = self.split_shared_venues(records, &mut report);

        report.multi_venue_teams = multi_venue_teams(&records);
        for team in &report.multi_venue_teams {
            debug!("{} {} plays at {} venues: {:?}", team.league, team.team, team.venues.len(), team.venues);
        }

        report.suspected_shared = records
            .iter()
            .filter(|r| looks_like_several_teams(&r.team))
            .map(|r| format!("{} {}: {}", r.league, r.name, r.team))
            .collect();
        for suspect in &report.suspected_shared {
            warn!("Team field still names several teams: {}", suspect);
        }

        info!(
            "Reconciled {} records ({} shared-venue splits, {} multi-venue teams)",
            records.len(),
            report.splits.len(),
            report.multi_venue_teams.len()
        );
        Reconciled { records, report }
    }

    fn split_shared_venues(
        &self,
        records: Vec<VenueRecord>,
        report: &mut ReconciliationReport,
    ) -> Vec<VenueRecord> {
        for rule in &self.shared_venues {
            if !records.iter().any(|r| rule.covers_venue(r)) {
                warn!("Shared venue rule for {} {} matched no record", rule.league, rule.venue);
                report.unmatched_rules.push(format!("{} {}", rule.league, rule.venue));
            }
        }

        let existing: HashSet<(League, String, String)> = records
            .iter()
            .map(|r| (r.league, r.name.clone(), r.team.clone()))
            .collect();

        let mut out = Vec::with_capacity(records.len() + 1);
        for record in records {
            let Some(rule) = self.shared_venues.iter().find(|rule| rule.matches(&record)) else {
                out.push(record);
                continue;
            };
            let teams: Vec<String> = rule
                .teams
                .iter()
                .filter(|team| !existing.contains(&(record.league, record.name.clone(), (*team).clone())))
                .cloned()
                .collect();
            if teams.is_empty() {
                // Every listed team already has its own row; the combined row
                // stays and the audit below reports it.
                warn!("{} '{}' not split: every team already has a row", record.name, record.team);
                out.push(record);
                continue;
            }
            info!("Splitting {} '{}' into {:?}", record.name, record.team, teams);
            out.extend(teams.iter().map(|team| record.with_team(team)));
            report.splits.push(SplitApplied {
                league: record.league,
                venue: record.name,
                combined_team: record.team,
                teams,
            });
        }
        out
    }
}

fn looks_like_several_teams(team: &str) -> bool {
    team.contains('&') || team.contains('/')
}

fn multi_venue_teams(records: &[VenueRecord]) -> Vec<MultiVenueTeam> {
    let mut venues: BTreeMap<(League, &str), BTreeSet<&str>> = BTreeMap::new();
    for record in records {
        venues
            .entry((record.league, record.team.as_str()))
            .or_default()
            .insert(record.name.as_str());
    }
    venues
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .map(|((league, team), names)| MultiVenueTeam {
            league,
            team: team.to_string(),
            venues: names.into_iter().map(str::to_string).collect(),
        })
        .collect()
}
