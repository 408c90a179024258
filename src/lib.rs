//! Stadium and arena dataset for MLB, NBA, NFL and NHL: scrape the league
//! pages, map them onto one schema, clean and reconcile the rows, then join
//! team coordinates.

pub mod apis;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod summary;
pub mod types;

pub use domain::{League, NormalizedVenue, VenueRecord};
pub use error::{Result, VenueError};
pub use pipeline::{LeagueTable, Pipeline, PipelineResult};
