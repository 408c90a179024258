use crate::error::Result;
use crate::pipeline::processing::clean::strip_annotations;
use serde::{Deserialize, Serialize};

/// Header and body cells of one HTML table, exactly as scraped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLeagueTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawLeagueTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Position of a column by header name. Footnote markers and surrounding
    /// whitespace on the scraped header are ignored.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        let wanted = column.trim();
        self.headers
            .iter()
            .position(|h| strip_annotations(h) == wanted)
    }

    /// Header names with footnote markers removed, for error messages
    pub fn header_names(&self) -> Vec<String> {
        self.headers.iter().map(|h| strip_annotations(h)).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Summary of one table found on a page, used to pick a table index.
#[derive(Debug, Clone, Serialize)]
pub struct TableOutline {
    pub index: usize,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Capability that turns a page URL and a 0-based table index into raw rows
#[async_trait::async_trait]
pub trait TableExtractor: Send + Sync {
    /// Identifier for logs
    fn extractor_name(&self) -> &'static str;

    /// Fetch the page and return the table at `table_index`, counting every
    /// `<table>` element in document order from zero.
    async fn fetch_table(&self, url: &str, table_index: usize) -> Result<RawLeagueTable>;

    /// List every table on the page
    async fn outline(&self, url: &str) -> Result<Vec<TableOutline>>;
}
