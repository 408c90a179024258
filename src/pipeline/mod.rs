// Venue data pipeline: extraction, then the pure cleaning stages

pub mod processing;

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::task::{self, JoinSet};
use tracing::{error, info, instrument, warn};

use crate::config::LeagueSource;
use crate::domain::{League, VenueRecord};
use crate::error::{Result, VenueError};
use crate::types::{RawLeagueTable, TableExtractor};
use processing::clean::{clean_all, FieldIssue};
use processing::enrich::{enrich, CoordinateReference};
use processing::normalize::{normalize_table, ColumnMapping};
use processing::reconcile::{ReconciliationReport, Reconciler};
use processing::unify::{unify, LeagueBatch};

/// A scraped table together with the mapping that reads it
#[derive(Debug, Clone)]
pub struct LeagueTable {
    pub league: League,
    pub columns: ColumnMapping,
    pub table: RawLeagueTable,
}

/// Aggregate data-quality findings. None of these stop a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QualityReport {
    pub field_issues: Vec<FieldIssue>,
    pub reconciliation: ReconciliationReport,
    pub unresolved_teams: Vec<String>,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub records: Vec<VenueRecord>,
    pub quality: QualityReport,
}

impl PipelineResult {
    /// Records the geo join could not place, for manual follow-up
    pub fn missing_coordinates(&self) -> Vec<&VenueRecord> {
        self.records.iter().filter(|r| !r.has_coordinates()).collect()
    }

    pub fn count_by_league(&self) -> BTreeMap<League, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.league).or_insert(0) += 1;
        }
        counts
    }
}

fn take_source(pending: &mut HashMap<task::Id, LeagueSource>, id: task::Id) -> Result<LeagueSource> {
    pending
        .remove(&id)
        .ok_or_else(|| VenueError::Config(format!("fetch task {} has no registered source", id)))
}

pub struct Pipeline {
    reconciler: Reconciler,
    reference: CoordinateReference,
}

impl Pipeline {
    pub fn new(reconciler: Reconciler, reference: CoordinateReference) -> Self {
        Self { reconciler, reference }
    }

    /// Fetch every source table. Fetches run concurrently; the first
    /// extraction failure aborts the run.
    #[instrument(skip(extractor, sources), fields(extractor = extractor.extractor_name(), sources = sources.len()))]
    pub async fn extract(
        extractor: Arc<dyn TableExtractor>,
        sources: &[&LeagueSource],
    ) -> Result<Vec<LeagueTable>> {
        let mut tasks = JoinSet::new();
        let mut pending: HashMap<task::Id, LeagueSource> = HashMap::new();
        for source in sources {
            let extractor = extractor.clone();
            let (url, table_index, league) = (source.url.clone(), source.table_index, source.league);
            let handle = tasks.spawn(async move {
                info!("📡 Fetching {} table {} from {}", league, table_index, url);
                extractor.fetch_table(&url, table_index).await
            });
            pending.insert(handle.id(), (*source).clone());
        }

        let mut tables = Vec::with_capacity(sources.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, table) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tasks.abort_all();
                    let reason = if e.is_panic() { "task panicked" } else { "task was cancelled" };
                    let source = take_source(&mut pending, e.id())?;
                    error!("Fetch task for {} failed: {}", source.league, reason);
                    return Err(VenueError::Task {
                        league: source.league,
                        url: source.url,
                        reason: reason.to_string(),
                    });
                }
            };
            let source = take_source(&mut pending, id)?;
            match table {
                Ok(table) => {
                    info!("✅ Fetched {} {} rows", table.len(), source.league);
                    tables.push(LeagueTable {
                        league: source.league,
                        columns: source.columns,
                        table,
                    });
                }
                Err(e) => {
                    error!("Extraction failed for {}: {}", source.league, e);
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }
        tables.sort_by_key(|t| t.league);
        Ok(tables)
    }

    /// Normalize, unify, clean, reconcile and enrich. Structural problems
    /// return an error; field and join problems end up in the quality report.
    #[instrument(skip(self, tables), fields(tables = tables.len()))]
    pub fn run(&self, tables: &[LeagueTable]) -> Result<PipelineResult> {
        let mut batches = Vec::with_capacity(tables.len());
        for t in tables {
            let venues = normalize_table(&t.table, &t.columns, t.league)?;
            batches.push(LeagueBatch::new(t.league, venues));
        }
        let unified = unify(batches)?;
        info!("🔧 Unified {} rows from {} leagues", unified.len(), tables.len());

        let cleaned = clean_all(&unified);
        if !cleaned.issues.is_empty() {
            warn!("{} fields could not be parsed and were left empty", cleaned.issues.len());
        }

        let reconciled = self.reconciler.reconcile(cleaned.records);
        let enriched = enrich(reconciled.records, &self.reference);

        let result = PipelineResult {
            records: enriched.records,
            quality: QualityReport {
                field_issues: cleaned.issues,
                reconciliation: reconciled.report,
                unresolved_teams: enriched.unresolved_teams,
            },
        };
        info!(
            "✅ Pipeline produced {} records ({} without coordinates)",
            result.records.len(),
            result.missing_coordinates().len()
        );
        Ok(result)
    }
}
