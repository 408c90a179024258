use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

use league_venues::apis::html_table;
use league_venues::config::Config;
use league_venues::pipeline::processing::enrich::CoordinateReference;
use league_venues::pipeline::processing::reconcile::Reconciler;
use league_venues::types::{RawLeagueTable, TableExtractor, TableOutline};
use league_venues::{output, League, Pipeline, VenueError};

/// Serves fixed HTML pages by URL
struct FixturePages {
    pages: HashMap<String, String>,
}

#[async_trait::async_trait]
impl TableExtractor for FixturePages {
    fn extractor_name(&self) -> &'static str {
        "fixtures"
    }

    async fn fetch_table(&self, url: &str, table_index: usize) -> league_venues::Result<RawLeagueTable> {
        let html = self
            .pages
            .get(url)
            .ok_or_else(|| VenueError::extraction(url, table_index, "page not found"))?;
        html_table::table_at(html, table_index)
            .ok_or_else(|| VenueError::extraction(url, table_index, "no table at this index"))
    }

    async fn outline(&self, url: &str) -> league_venues::Result<Vec<TableOutline>> {
        Ok(self.pages.get(url).map(|h| html_table::outline(h)).unwrap_or_default())
    }
}

const NAVBOX: &str = r#"<table class="metadata"><tr><td>This list is incomplete.</td></tr></table>"#;

fn mlb_page() -> String {
    format!(
        r#"<html><body>{NAVBOX}
        <table class="wikitable sortable">
          <tr><th>Image</th><th>Name</th><th>Capacity</th><th>Location</th><th>Surface</th><th>Team</th><th>Opened</th></tr>
          <tr><td></td><th>Fenway Park<sup>[4]</sup></th><td>37,755</td><td>Boston, Massachusetts</td><td>Grass</td><td>Boston Red Sox</td><td>1912</td></tr>
          <tr><td></td><th>Wrigley Field</th><td>41,649</td><td>Chicago, Illinois</td><td>Grass</td><td>Chicago Cubs</td><td>1914</td></tr>
        </table></body></html>"#
    )
}

fn nba_page() -> String {
    r#"<html><body>
        <table class="wikitable sortable">
          <tr><th>Image</th><th>Arena</th><th>Location</th><th>Team(s)</th><th>Capacity</th><th>Opened</th></tr>
          <tr><td></td><td>Crypto.com Arena</td><td>Los Angeles, California</td><td>Los Angeles Lakers</td><td>18,997</td><td>1999</td></tr>
          <tr><td></td><td>Madison Square Garden</td><td>New York City, New York</td><td>New York Knicks</td><td>19,812[a]</td><td>1968</td></tr>
        </table></body></html>"#
        .to_string()
}

fn nfl_page() -> String {
    format!(
        r#"<html><body>{NAVBOX}
        <table class="wikitable sortable">
          <tr><th>Image</th><th>Name</th><th>Capacity</th><th>Location</th><th>Roof type</th><th>Team(s)</th><th>Opened</th></tr>
          <tr><td></td><th>Lambeau Field</th><td>81,441</td><td>Green Bay, Wisconsin</td><td>Open</td><td>Green Bay Packers</td><td>1957</td></tr>
          <tr><td></td><th>MetLife Stadium<sup>[1]</sup></th><td>82,500<sup>[2]</sup></td><td>East Rutherford, New Jersey</td><td>Open</td><td>New York Giants &amp; New York Jets</td><td><span style="display:none">2010-04-10</span>2010</td></tr>
          <tr><td></td><th>Soldier Field</th><td>61,500</td><td>Chicago, Illinois</td><td>Open</td><td>Chicago Bears</td><td>1924</td></tr>
        </table></body></html>"#
    )
}

fn nhl_page() -> String {
    r#"<html><body>
        <table class="wikitable sortable">
          <tr><th>Image</th><th>Arena</th><th>Location</th><th>Team(s)</th><th>Capacity</th><th>Opened</th></tr>
          <tr><td></td><td>Delta Center</td><td>Salt Lake City, Utah</td><td rowspan="2">Utah Hockey Club</td><td>16,020</td><td>1991</td></tr>
          <tr><td></td><td>Mullett Arena</td><td>Tempe, Arizona</td><td>4,600</td><td>2022</td></tr>
          <tr><td></td><td>Bell Centre</td><td>Montreal</td><td>Montreal Canadiens</td><td>21,105</td><td>1996</td></tr>
        </table></body></html>"#
        .to_string()
}

fn fixtures(config: &Config) -> Arc<dyn TableExtractor> {
    let pages = [
        (League::Mlb, mlb_page()),
        (League::Nba, nba_page()),
        (League::Nfl, nfl_page()),
        (League::Nhl, nhl_page()),
    ]
    .into_iter()
    .map(|(league, html)| (config.leagues[&league].url.clone(), html))
    .collect();
    Arc::new(FixturePages { pages })
}

fn reference() -> CoordinateReference {
    let csv = "\
team_name,lat,lon
Boston Red Sox,42.35,-71.10
Chicago Cubs,41.95,-87.66
Los Angeles Lakers,34.04,-118.27
New York Knicks,40.75,-73.99
Green Bay Packers,44.50,-88.06
New York Giants,40.81,-74.07
Chicago Bears,41.86,-87.62
Utah Hockey Club,40.77,-111.90
Montreal Canadiens,45.50,-73.57
";
    CoordinateReference::from_reader(csv.as_bytes()).unwrap()
}

#[tokio::test]
async fn test_full_pipeline_from_html_pages() -> Result<()> {
    let config = Config::default();
    let sources = config.sources(None);
    let tables = Pipeline::extract(fixtures(&config), &sources).await?;
    assert_eq!(tables.len(), 4);

    let pipeline = Pipeline::new(Reconciler::new(config.shared_venues.clone()), reference());
    let result = pipeline.run(&tables)?;

    let counts = result.count_by_league();
    assert_eq!(counts[&League::Mlb], 2);
    assert_eq!(counts[&League::Nba], 2);
    assert_eq!(counts[&League::Nfl], 4);
    assert_eq!(counts[&League::Nhl], 3);

    // League order is canonical
    let leagues: Vec<League> = result.records.iter().map(|r| r.league).collect();
    let mut sorted = leagues.clone();
    sorted.sort();
    assert_eq!(leagues, sorted);

    let metlife: Vec<_> = result.records.iter().filter(|r| r.name == "MetLife Stadium").collect();
    assert_eq!(metlife.len(), 2);
    assert_eq!(metlife[0].team, "New York Giants");
    assert_eq!(metlife[1].team, "New York Jets");
    assert_eq!(metlife[0].capacity, Some(82_500));
    assert_eq!(metlife[0].opened, Some(2010));
    assert_eq!(metlife[0].latitude, Some(40.81));
    assert_eq!(metlife[1].latitude, None);

    // Multi-venue team stays as two records
    let utah: Vec<_> = result.records.iter().filter(|r| r.team == "Utah Hockey Club").collect();
    assert_eq!(utah.len(), 2);
    assert_eq!(result.quality.reconciliation.multi_venue_teams.len(), 1);

    // "Montreal" has no state
    let bell = result.records.iter().find(|r| r.name == "Bell Centre").unwrap();
    assert_eq!(bell.city, None);
    assert_eq!(result.quality.field_issues.len(), 1);

    assert_eq!(result.quality.unresolved_teams, vec!["New York Jets".to_string()]);
    for record in &result.records {
        assert!(!record.team.contains('&'));
        if let Some(year) = record.opened {
            assert!((1850..=2100).contains(&year));
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_dataset_written_and_read_back() -> Result<()> {
    let config = Config::default();
    let tables = Pipeline::extract(fixtures(&config), &config.sources(Some(&[League::Nfl]))).await?;
    let result = Pipeline::new(Reconciler::default(), reference()).run(&tables)?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("venues.csv");
    output::write_csv_file(&result.records, &path)?;
    let text = std::fs::read_to_string(&path)?;
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("League,Name,Capacity,City,State,Team,Opened,Latitude,Longitude")
    );
    assert!(text.contains("NFL,MetLife Stadium,82500,East Rutherford,New Jersey,New York Jets,2010,,\n"));

    let back = output::read_csv_file(&path)?;
    assert_eq!(back, result.records);
    Ok(())
}

#[tokio::test]
async fn test_missing_table_aborts_extraction() {
    let mut config = Config::default();
    config.leagues.get_mut(&League::Nba).unwrap().table_index = 3;
    let result = Pipeline::extract(fixtures(&config), &config.sources(None)).await;
    assert!(matches!(result, Err(VenueError::Extraction { table_index: 3, .. })));
}

#[tokio::test]
async fn test_renamed_column_is_a_schema_mismatch() -> Result<()> {
    let mut config = Config::default();
    config.leagues.get_mut(&League::Mlb).unwrap().columns.name = "Stadium".into();
    let tables = Pipeline::extract(fixtures(&config), &config.sources(None)).await?;
    let result = Pipeline::new(Reconciler::default(), reference()).run(&tables);
    match result {
        Err(VenueError::SchemaMismatch { league, column, .. }) => {
            assert_eq!(league, League::Mlb);
            assert_eq!(column, "Stadium");
        }
        other => panic!("expected schema mismatch, got {:?}", other.map(|r| r.records.len())),
    }
    Ok(())
}
