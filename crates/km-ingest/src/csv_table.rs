//! CSV file reading into Polars DataFrames.

use std::path::Path;

use polars::prelude::*;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Reads a CSV file with a single header row.
///
/// Every column is read as text; numeric cells are parsed per value when
/// records are built, so a stray non-numeric entry only affects its own row.
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    if metadata.len() == 0 {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "CSV table read"
    );
    Ok(df)
}

/// Name of the column matching `name`, ignoring case and surrounding
/// whitespace (and a leading byte-order mark on the first header).
pub fn resolve_column(df: &DataFrame, name: &str) -> Option<String> {
    let target = name.trim();
    df.get_column_names()
        .into_iter()
        .find(|column| {
            column
                .trim_start_matches('\u{feff}')
                .trim()
                .eq_ignore_ascii_case(target)
        })
        .map(ToString::to_string)
}

/// The column matching `name`, see [`resolve_column`].
pub fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    optional_column(df, name)?.ok_or_else(|| IngestError::ColumnNotFound {
        column: name.to_string(),
    })
}

pub fn optional_column<'a>(df: &'a DataFrame, name: &str) -> Result<Option<&'a Column>> {
    match resolve_column(df, name) {
        Some(resolved) => Ok(Some(df.column(&resolved)?)),
        None => Ok(None),
    }
}
