// Table extractors for the league source pages

pub mod html_table;
pub mod wikipedia;

pub use wikipedia::WikipediaTables;
