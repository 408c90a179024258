//! Turns HTML `<table>` elements into header + row text grids.
//!
//! Row and column spans are expanded so every row carries one cell per
//! column, the way a spreadsheet import would see the table. Hidden sort
//! keys (`display:none`) are dropped; footnote superscripts are kept and
//! left for the cleaner.

use once_cell::sync::Lazy;
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};

use crate::types::{RawLeagueTable, TableOutline};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());

// Guard against absurd span attributes
const MAX_SPAN: usize = 500;

/// Every table in the document, in document order.
pub fn parse_tables(html: &str) -> Vec<RawLeagueTable> {
    let document = Html::parse_document(html);
    document.select(&TABLE).map(parse_table).collect()
}

/// The table at a 0-based position, counting every `<table>` element.
pub fn table_at(html: &str, index: usize) -> Option<RawLeagueTable> {
    let document = Html::parse_document(html);
    document.select(&TABLE).nth(index).map(parse_table)
}

pub fn outline(html: &str) -> Vec<TableOutline> {
    parse_tables(html)
        .into_iter()
        .enumerate()
        .map(|(index, table)| TableOutline {
            index,
            row_count: table.rows.len(),
            headers: table.headers,
        })
        .collect()
}

struct ParsedRow {
    cells: Vec<String>,
    all_header_cells: bool,
}

fn parse_table(table: ElementRef) -> RawLeagueTable {
    let rows = expand_spans(own_rows(table));

    let mut rows = rows.into_iter().peekable();
    let headers = match rows.peek() {
        Some(first) if first.all_header_cells => rows.next().map(|r| r.cells).unwrap_or_default(),
        _ => Vec::new(),
    };
    // Further header-only rows directly under the header are sub-headings
    while rows.peek().map_or(false, |r| r.all_header_cells) {
        rows.next();
    }
    let body = rows
        .map(|r| r.cells)
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .collect();

    RawLeagueTable::new(headers, body)
}

/// Rows whose nearest enclosing table is `table`, skipping nested tables.
fn own_rows(table: ElementRef) -> Vec<ElementRef> {
    table
        .select(&ROW)
        .filter(|tr| belongs_to(*tr, table))
        .collect()
}

fn belongs_to(tr: ElementRef, table: ElementRef) -> bool {
    tr.ancestors()
        .find(|n| n.value().as_element().map_or(false, |e| e.name() == "table"))
        .map_or(false, |n| n.id() == table.id())
}

struct Carry {
    remaining: usize,
    text: String,
}

fn expand_spans(rows: Vec<ElementRef>) -> Vec<ParsedRow> {
    let mut carried: Vec<Option<Carry>> = Vec::new();
    let mut parsed = Vec::with_capacity(rows.len());

    for tr in rows {
        let mut cells: Vec<String> = Vec::new();
        let mut all_header_cells = true;
        let mut saw_cell = false;
        let mut own_cells = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|c| matches!(c.value().name(), "th" | "td"));

        loop {
            if take_carry(&mut carried, &mut cells) {
                continue;
            }
            let Some(cell) = own_cells.next() else {
                // A short row still consumes the spans that reach past its
                // last cell; the gaps before them stay empty.
                while carried.iter().skip(cells.len()).any(Option::is_some) {
                    if !take_carry(&mut carried, &mut cells) {
                        cells.push(String::new());
                    }
                }
                break;
            };
            saw_cell = true;
            if cell.value().name() != "th" {
                all_header_cells = false;
            }
            let text = cell_text(cell);
            let colspan = span(cell.value(), "colspan");
            let rowspan = span(cell.value(), "rowspan");
            for _ in 0..colspan {
                let col = cells.len();
                if rowspan > 1 {
                    if carried.len() <= col {
                        carried.resize_with(col + 1, || None);
                    }
                    carried[col] = Some(Carry {
                        remaining: rowspan - 1,
                        text: text.clone(),
                    });
                }
                cells.push(text.clone());
            }
        }

        if saw_cell {
            parsed.push(ParsedRow { cells, all_header_cells });
        }
    }
    parsed
}

/// Fill the next column from a rowspan above, if one reaches it.
fn take_carry(carried: &mut [Option<Carry>], cells: &mut Vec<String>) -> bool {
    let col = cells.len();
    let Some(Some(carry)) = carried.get_mut(col) else {
        return false;
    };
    cells.push(carry.text.clone());
    carry.remaining -= 1;
    if carry.remaining == 0 {
        carried[col] = None;
    }
    true
}

fn span(element: &Element, attr: &str) -> usize {
    element
        .attr(attr)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1)
        .min(MAX_SPAN)
}

/// Visible text of a cell with whitespace collapsed to single spaces.
pub fn cell_text(cell: ElementRef) -> String {
    let mut buf = String::new();
    collect_text(cell, &mut buf);
    buf.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef, buf: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => buf.push_str(text),
            Node::Element(e) => {
                if matches!(e.name(), "style" | "script") || is_hidden(e) {
                    continue;
                }
                if e.name() == "br" {
                    buf.push(' ');
                    continue;
                }
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, buf);
                }
            }
            _ => {}
        }
    }
}

fn is_hidden(element: &Element) -> bool {
    element
        .attr("style")
        .map_or(false, |s| s.replace(' ', "").to_ascii_lowercase().contains("display:none"))
}
