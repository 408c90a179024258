use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::domain::{League, VenueRecord};
use crate::error::Result;
use crate::output::ensure_parent;

/// Descriptive statistics for one slice of the dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub records: usize,
    pub venues: usize,
    pub teams: usize,
    pub capacity_min: Option<u32>,
    pub capacity_max: Option<u32>,
    pub capacity_mean: Option<f64>,
    pub largest_venue: Option<String>,
    pub oldest_opened: Option<u16>,
    pub newest_opened: Option<u16>,
    pub missing_capacity: usize,
    pub missing_opened: usize,
    pub missing_coordinates: usize,
}

impl GroupSummary {
    pub fn of<'a>(records: impl IntoIterator<Item = &'a VenueRecord>) -> Self {
        let records: Vec<&VenueRecord> = records.into_iter().collect();
        let venues: BTreeSet<(League, &str)> = records.iter().map(|r| (r.league, r.name.as_str())).collect();
        let teams: BTreeSet<(League, &str)> = records.iter().map(|r| (r.league, r.team.as_str())).collect();

        // A shared venue counts once toward capacity statistics
        let mut capacities: BTreeMap<(League, &str), u32> = BTreeMap::new();
        for r in &records {
            if let Some(c) = r.capacity {
                capacities.insert((r.league, r.name.as_str()), c);
            }
        }
        let capacity_mean = if capacities.is_empty() {
            None
        } else {
            let total: u64 = capacities.values().map(|&c| u64::from(c)).sum();
            Some(total as f64 / capacities.len() as f64)
        };
        let largest_venue = capacities
            .iter()
            .max_by_key(|&(_, &c)| c)
            .map(|((_, name), _)| name.to_string());
        let opened: Vec<u16> = records.iter().filter_map(|r| r.opened).collect();

        Self {
            records: records.len(),
            venues: venues.len(),
            teams: teams.len(),
            capacity_min: capacities.values().copied().min(),
            capacity_max: capacities.values().copied().max(),
            capacity_mean,
            largest_venue,
            oldest_opened: opened.iter().copied().min(),
            newest_opened: opened.iter().copied().max(),
            missing_capacity: records.iter().filter(|r| r.capacity.is_none()).count(),
            missing_opened: records.iter().filter(|r| r.opened.is_none()).count(),
            missing_coordinates: records.iter().filter(|r| !r.has_coordinates()).count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub overall: GroupSummary,
    pub leagues: BTreeMap<League, GroupSummary>,
}

impl DatasetSummary {
    pub fn from_records(records: &[VenueRecord]) -> Self {
        let mut leagues = BTreeMap::new();
        for league in League::ALL {
            let subset: Vec<&VenueRecord> = records.iter().filter(|r| r.league == league).collect();
            if !subset.is_empty() {
                leagues.insert(league, GroupSummary::of(subset));
            }
        }
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            overall: GroupSummary::of(records),
            leagues,
        }
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_parent(path)?;
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("💾 Saved summary to {}", path.display());
        Ok(())
    }

    /// Plain-text table for the terminal
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<7} {:>7} {:>6} {:>5} {:>9} {:>9} {:>9} {:>6} {:>6} {:>7}\n",
            "League", "Records", "Venues", "Teams", "Cap min", "Cap max", "Cap mean", "Oldest", "Newest", "No geo"
        ));
        let rows = self
            .leagues
            .iter()
            .map(|(league, s)| (league.as_str(), s))
            .chain(std::iter::once(("All", &self.overall)));
        for (label, s) in rows {
            out.push_str(&format!(
                "{:<7} {:>7} {:>6} {:>5} {:>9} {:>9} {:>9} {:>6} {:>6} {:>7}\n",
                label,
                s.records,
                s.venues,
                s.teams,
                fmt_opt(s.capacity_min),
                fmt_opt(s.capacity_max),
                s.capacity_mean.map(|m| format!("{m:.0}")).unwrap_or_else(|| "-".into()),
                fmt_opt(s.oldest_opened),
                fmt_opt(s.newest_opened),
                s.missing_coordinates,
            ));
        }
        out
    }
}

fn fmt_opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}
