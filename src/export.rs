//! CSV export of search results.
//!
//! Column order and header labels are fixed. The `Type` column carries the
//! human label ("Contract Notice" / "Contract Award"), not the raw tag.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, TedError};
use crate::models::SearchResult;

pub const HEADERS: [&str; 9] = [
    "ID",
    "Title",
    "Date",
    "CPV Code",
    "CPV Description",
    "Country Code",
    "Country Name",
    "Type",
    "URI",
];

/// Which part of a search is being exported; used in the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    Page,
    All,
}

impl ExportScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportScope::Page => "page",
            ExportScope::All => "all",
        }
    }
}

/// `ted_search_{scope}_{YYYY-MM-DD}.csv`
pub fn default_filename(scope: ExportScope, date: NaiveDate) -> String {
    format!("ted_search_{}_{}.csv", scope.as_str(), date.format("%Y-%m-%d"))
}

/// One exported line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "CPV Code")]
    pub cpv_code: String,
    #[serde(rename = "CPV Description")]
    pub cpv_description: String,
    #[serde(rename = "Country Code")]
    pub country: String,
    #[serde(rename = "Country Name")]
    pub country_name: String,
    #[serde(rename = "Type")]
    pub type_label: String,
    #[serde(rename = "URI")]
    pub uri: String,
}

impl From<&SearchResult> for ExportRow {
    fn from(r: &SearchResult) -> Self {
        Self {
            id: r.id.clone(),
            title: r.title.clone(),
            date: r.date.clone(),
            cpv_code: r.cpv_code.clone(),
            cpv_description: r.cpv_description.clone(),
            country: r.country.clone(),
            country_name: r.country_name.clone(),
            type_label: r.notice_type.label().to_string(),
            uri: r.uri.clone(),
        }
    }
}

/// Write the header row followed by one row per result.
///
/// The header is written even when `results` is empty.
pub fn write_csv<W: Write>(results: &[SearchResult], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADERS)?;
    for result in results {
        wtr.serialize(ExportRow::from(result))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(results: &[SearchResult]) -> Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    write_csv(results, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| TedError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Write results to `path`, replacing any existing file. Returns the number
/// of data rows written.
pub fn export_to_path(results: &[SearchResult], path: &Path) -> Result<usize> {
    let file = File::create(path)?;
    write_csv(results, file)?;
    info!(rows = results.len(), path = %path.display(), "Exported search results");
    Ok(results.len())
}

/// Parse a previously exported file back into rows.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ExportRow>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.iter().ne(HEADERS.iter().copied()) {
        return Err(TedError::Validation(format!(
            "unexpected CSV header: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}
