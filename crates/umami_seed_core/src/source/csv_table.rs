//! Header-keyed CSV rows.
//!
//! # Invariants
//! - The first record is the header; every later record must have exactly
//!   as many fields.
//! - A data file that cannot be opened is reported as absent, not as an
//!   error.

use csv::{Reader, ReaderBuilder, StringRecord};
use log::warn;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// One data row keyed by header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based line number of the record in its file.
    pub line: u64,
    values: BTreeMap<String, String>,
}

impl CsvRow {
    pub fn from_pairs<'a>(line: u64, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            line,
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// Returns the column value when present and non-empty.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Returns the column value even when empty; `None` only if the column
    /// is absent from the header.
    pub fn raw(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }
}

/// Row-level read failure.
#[derive(Debug)]
pub struct RowReadError {
    pub line: u64,
    pub message: String,
}

/// Open CSV data file with its header already consumed.
pub struct CsvTable {
    reader: Reader<File>,
    headers: StringRecord,
}

impl CsvTable {
    /// Opens `path`; returns `None` when it is missing or unreadable.
    pub fn open(path: &Path) -> Option<Self> {
        let mut reader = match ReaderBuilder::new().flexible(false).from_path(path) {
            Ok(reader) => reader,
            Err(err) => {
                warn!(
                    "event=csv_open module=source status=skip path={} error={}",
                    path.display(),
                    err
                );
                return None;
            }
        };
        let headers = match reader.headers() {
            Ok(headers) => headers.clone(),
            Err(err) => {
                warn!(
                    "event=csv_open module=source status=skip path={} error={}",
                    path.display(),
                    err
                );
                return None;
            }
        };
        Some(Self { reader, headers })
    }

    /// Iterates data rows in file order.
    pub fn rows(&mut self) -> impl Iterator<Item = Result<CsvRow, RowReadError>> + '_ {
        let headers = &self.headers;
        self.reader.records().map(move |result| {
            let record = result.map_err(|err| RowReadError {
                line: err.position().map_or(0, |position| position.line()),
                message: err.to_string(),
            })?;
            let line = record.position().map_or(0, |position| position.line());
            Ok(CsvRow::from_pairs(line, headers.iter().zip(record.iter())))
        })
    }
}
