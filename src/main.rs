use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use league_venues::apis::WikipediaTables;
use league_venues::config::Config;
use league_venues::constants::DEFAULT_CONFIG_PATH;
use league_venues::pipeline::processing::enrich::CoordinateReference;
use league_venues::pipeline::processing::reconcile::Reconciler;
use league_venues::summary::DatasetSummary;
use league_venues::types::TableExtractor;
use league_venues::{logging, output, League, Pipeline, PipelineResult};

#[derive(Parser)]
#[command(name = "league_venues")]
#[command(about = "Stadium and arena dataset builder for MLB, NBA, NFL and NHL")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file (defaults are used if it is missing)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the league pages and build the dataset
    Run {
        /// Specific leagues to run (comma-separated). Available: mlb, nba, nfl, nhl
        #[arg(long)]
        leagues: Option<String>,
        /// Only read pages from the cache
        #[arg(long)]
        offline: bool,
        /// Do not read or write the page cache
        #[arg(long, conflicts_with = "offline")]
        no_cache: bool,
    },
    /// List the tables on a league page, to pick a table index
    Tables {
        #[arg(long)]
        league: League,
        #[arg(long)]
        offline: bool,
    },
    /// Print summaries for a dataset CSV written by `run`
    Summarize {
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn parse_leagues(list: &str) -> anyhow::Result<Vec<League>> {
    list.split(',')
        .map(|s| s.parse::<League>().map_err(anyhow::Error::msg))
        .collect()
}

fn build_extractor(config: &Config, offline: bool, use_cache: bool) -> anyhow::Result<WikipediaTables> {
    let mut extractor = WikipediaTables::new(&config.http)?.offline_only(offline);
    if use_cache {
        if let Some(dir) = &config.paths.cache_dir {
            extractor = extractor.with_cache(dir);
        }
    }
    if offline && (!use_cache || config.paths.cache_dir.is_none()) {
        anyhow::bail!("--offline needs paths.cache_dir to be configured");
    }
    Ok(extractor)
}

fn print_report(result: &PipelineResult) {
    println!("\n📊 Pipeline results:");
    for (league, count) in result.count_by_league() {
        println!("   {league}: {count} records");
    }
    let quality = &result.quality;
    println!("   Field issues: {}", quality.field_issues.len());
    for split in &quality.reconciliation.splits {
        println!("   Split {} '{}' into {:?}", split.venue, split.combined_team, split.teams);
    }
    for team in &quality.reconciliation.multi_venue_teams {
        println!("   {} {} plays at {}", team.league, team.team, team.venues.join(" and "));
    }
    for rule in &quality.reconciliation.unmatched_rules {
        println!("   ⚠️  Shared venue rule did not match: {rule}");
    }
    for suspect in &quality.reconciliation.suspected_shared {
        println!("   ⚠️  Team field names several teams: {suspect}");
    }

    let missing = result.missing_coordinates();
    if !missing.is_empty() {
        println!("\n⚠️  {} records have no coordinates:", missing.len());
        for record in missing {
            println!("   - {} {} ({})", record.league, record.team, record.name);
        }
    }
}

async fn run(config: &Config, leagues: Option<String>, offline: bool, no_cache: bool) -> anyhow::Result<()> {
    let only = leagues.as_deref().map(parse_leagues).transpose()?;
    let sources = config.sources(only.as_deref());
    let extractor: Arc<dyn TableExtractor> = Arc::new(build_extractor(config, offline, !no_cache)?);

    let tables = Pipeline::extract(extractor, &sources).await?;
    let reference = CoordinateReference::load(&config.paths.coordinates)?;
    let pipeline = Pipeline::new(Reconciler::new(config.shared_venues.clone()), reference);
    let result = pipeline.run(&tables)?;

    output::write_csv_file(&result.records, &config.paths.output)?;
    if let Some(path) = &config.paths.geojson {
        output::write_geojson_file(&result.records, path)?;
    }
    let summary = DatasetSummary::from_records(&result.records);
    if let Some(path) = &config.paths.summary {
        summary.write_json(path)?;
    }

    print_report(&result);
    println!("\n{}", summary.render());
    println!("💾 Dataset written to {}", config.paths.output.display());
    Ok(())
}

async fn list_tables(config: &Config, league: League, offline: bool) -> anyhow::Result<()> {
    let source = config
        .leagues
        .get(&league)
        .with_context(|| format!("no source configured for {league}"))?;
    let extractor = build_extractor(config, offline, true)?;
    let outline = extractor.outline(&source.url).await?;
    println!("📄 {} ({} tables), configured index {}", source.url, outline.len(), source.table_index);
    for table in outline {
        let marker = if table.index == source.table_index { "→" } else { " " };
        println!("{} [{}] {} rows: {}", marker, table.index, table.row_count, table.headers.join(" | "));
    }
    Ok(())
}

fn summarize(config: &Config, input: Option<PathBuf>) -> anyhow::Result<()> {
    let path = input.unwrap_or_else(|| config.paths.output.clone());
    let records = output::read_csv_file(&path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    println!("{}", DatasetSummary::from_records(&records).render());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;

    // Initialize logging
    let _guard = logging::init_logging(&config.paths.logs_dir);

    let outcome = match cli.command {
        Commands::Run { leagues, offline, no_cache } => {
            info!("🔄 Building venue dataset");
            run(&config, leagues, offline, no_cache).await
        }
        Commands::Tables { league, offline } => list_tables(&config, league, offline).await,
        Commands::Summarize { input } => summarize(&config, input),
    };

    if let Err(e) = &outcome {
        error!("Run failed: {:#}", e);
    } else {
        info!("✅ Done");
    }
    outcome
}
