//! Storage module for persisting crawl output
//!
//! This module defines the two record types the crawler produces and the
//! sinks they are written through:
//! - `CsvSink`: one CSV file per record type
//! - `MemorySink`: an in-process buffer, for tests and embedding
//! - `read_records`: reads a CSV dataset back into typed records

mod csv_sink;
mod memory;
mod traits;

pub use csv_sink::{read_records, CsvSink};
pub use memory::MemorySink;
pub use traits::{Record, RecordSink, SinkError, SinkResult};

use csv::StringRecord;

/// Default path of the quotes dataset
pub const DEFAULT_QUOTES_PATH: &str = "quotes.csv";

/// Path of the authors dataset
pub const AUTHORS_PATH: &str = "authors.csv";

/// One quote from the listing
///
/// `author` is the display name only; the author record is linked through
/// the reference on the listing page, not through this string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub text: String,
    pub author: String,
    /// Tags in document order, duplicates kept
    pub tags: Vec<String>,
}

/// One author detail record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub full_name: String,
    /// Birth date immediately followed by birth location, no separator
    pub born: String,
    pub description: String,
}

impl Record for Quote {
    const SCHEMA: &'static [&'static str] = &["text", "author", "tags"];

    fn to_row(&self) -> SinkResult<Vec<String>> {
        Ok(vec![
            self.text.clone(),
            self.author.clone(),
            serde_json::to_string(&self.tags)?,
        ])
    }

    fn from_row(row: &StringRecord) -> Result<Self, String> {
        let [text, author, tags] = cells::<3>(row)?;
        let tags: Vec<String> =
            serde_json::from_str(tags).map_err(|e| format!("invalid tags cell: {}", e))?;

        Ok(Self {
            text: text.to_string(),
            author: author.to_string(),
            tags,
        })
    }
}

impl Record for Author {
    const SCHEMA: &'static [&'static str] = &["full_name", "born", "description"];

    fn to_row(&self) -> SinkResult<Vec<String>> {
        Ok(vec![
            self.full_name.clone(),
            self.born.clone(),
            self.description.clone(),
        ])
    }

    fn from_row(row: &StringRecord) -> Result<Self, String> {
        let [full_name, born, description] = cells::<3>(row)?;

        Ok(Self {
            full_name: full_name.to_string(),
            born: born.to_string(),
            description: description.to_string(),
        })
    }
}

/// Borrows exactly `N` cells from a row
fn cells<const N: usize>(row: &StringRecord) -> Result<[&str; N], String> {
    if row.len() != N {
        return Err(format!("expected {} columns, found {}", N, row.len()));
    }

    let mut out = [""; N];
    for (slot, cell) in out.iter_mut().zip(row.iter()) {
        *slot = cell;
    }
    Ok(out)
}
