use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::html_table;
use crate::config::HttpConfig;
use crate::error::{Result, VenueError};
use crate::types::{RawLeagueTable, TableExtractor, TableOutline};

/// Reads tables from Wikipedia list pages, optionally through an on-disk
/// page cache.
pub struct WikipediaTables {
    client: reqwest::Client,
    cache_dir: Option<PathBuf>,
    offline_only: bool,
}

impl WikipediaTables {
    pub fn new(http: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(http.user_agent.clone())
            .timeout(Duration::from_secs(http.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            cache_dir: None,
            offline_only: false,
        })
    }

    pub fn with_cache<P: AsRef<Path>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = Some(cache_dir.as_ref().to_path_buf());
        self
    }

    /// Never touch the network; every page must already be cached
    pub fn offline_only(mut self, offline: bool) -> Self {
        self.offline_only = offline;
        self
    }

    fn cache_path(&self, url: &str) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.html", cache_key(url))))
    }

    async fn load_from_cache(&self, url: &str) -> Option<String> {
        let path = self.cache_path(url)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(html) => {
                debug!("Loaded {} from cache {}", url, path.display());
                Some(html)
            }
            Err(_) => None,
        }
    }

    async fn save_to_cache(&self, url: &str, html: &str) -> Result<()> {
        if let Some(path) = self.cache_path(url) {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, html).await?;
            debug!("Cached {} at {}", url, path.display());
        }
        Ok(())
    }

    async fn page(&self, url: &str, table_index: usize) -> Result<String> {
        if let Some(html) = self.load_from_cache(url).await {
            return Ok(html);
        }
        if self.offline_only {
            return Err(VenueError::extraction(url, table_index, "offline mode and page is not cached"));
        }

        info!("Fetching {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| VenueError::extraction(url, table_index, e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(VenueError::extraction(url, table_index, format!("HTTP {}", status.as_u16())));
        }
        let html = response
            .text()
            .await
            .map_err(|e| VenueError::extraction(url, table_index, e.to_string()))?;

        if let Err(e) = self.save_to_cache(url, &html).await {
            warn!("Could not cache {}: {}", url, e);
        }
        Ok(html)
    }
}

/// Hex SHA-256 of the URL, used as the cache file stem
pub fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

#[async_trait::async_trait]
impl TableExtractor for WikipediaTables {
    fn extractor_name(&self) -> &'static str {
        "wikipedia"
    }

    #[instrument(skip(self))]
    async fn fetch_table(&self, url: &str, table_index: usize) -> Result<RawLeagueTable> {
        let html = self.page(url, table_index).await?;
        let table = html_table::table_at(&html, table_index).ok_or_else(|| {
            VenueError::extraction(url, table_index, "no table at this index")
        })?;
        if table.headers.is_empty() {
            return Err(VenueError::extraction(url, table_index, "table has no header row"));
        }
        debug!("Table {} has {} rows under {:?}", table_index, table.len(), table.headers);
        Ok(table)
    }

    async fn outline(&self, url: &str) -> Result<Vec<TableOutline>> {
        let html = self.page(url, 0).await?;
        Ok(html_table::outline(&html))
    }
}
