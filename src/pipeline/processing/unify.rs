use tracing::{debug, instrument};

use crate::domain::{League, NormalizedVenue};
use crate::error::{Result, VenueError};

/// Normalized rows from one league's table
#[derive(Debug, Clone)]
pub struct LeagueBatch {
    pub league: League,
    pub venues: Vec<NormalizedVenue>,
}

impl LeagueBatch {
    pub fn new(league: League, venues: Vec<NormalizedVenue>) -> Self {
        Self { league, venues }
    }
}

/// Concatenate league batches in MLB, NBA, NFL, NHL order, keeping row order
/// within each league. A record tagged with another league or a league
/// supplied twice is a programming error.
#[instrument(skip(batches), fields(batches = batches.len()))]
pub fn unify(mut batches: Vec<LeagueBatch>) -> Result<Vec<NormalizedVenue>> {
    batches.sort_by_key(|b| b.league);
    for pair in batches.windows(2) {
        if pair[0].league == pair[1].league {
            return Err(VenueError::DuplicateLeague(pair[0].league));
        }
    }
    for batch in &batches {
        if let Some(stray) = batch.venues.iter().find(|v| v.league != batch.league) {
            return Err(VenueError::LeagueMismatch {
                expected: batch.league,
                found: stray.league,
            });
        }
    }

    let unified: Vec<NormalizedVenue> = batches.into_iter().flat_map(|b| b.venues).collect();
    debug!("Unified {} records", unified.len());
    Ok(unified)
}
