//! CSV loading.
//!
//! Reads a headered CSV file into a [`Table`]. Column types are inferred per
//! column: if every non-empty cell parses as a number the column is numeric
//! (empty cells become `NaN`), otherwise it is text (empty cells become
//! `None`).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::data::{Column, DataError, Table};

/// Reads a CSV file with a header row into a [`Table`].
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed, if it contains
/// no data rows, or if the header has duplicate column names.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Table, DataError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_csv_from(file)?;
    if table.n_rows() == 0 {
        return Err(DataError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    Ok(table)
}

/// Reads headered CSV data from any reader into a [`Table`].
pub fn read_csv_from(reader: impl Read) -> Result<Table, DataError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(String::from)
        .collect();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in csv_reader.records() {
        let record = record?;
        for (j, column) in cells.iter_mut().enumerate() {
            let cell = record.get(j).unwrap_or("");
            column.push(if cell.is_empty() {
                None
            } else {
                Some(cell.to_string())
            });
        }
    }

    let mut table = Table::new();
    for (name, column) in headers.into_iter().zip(cells) {
        table.push_column(infer_column(name, column))?;
    }
    Ok(table)
}

/// Builds a numeric column when every present cell parses, a text column
/// otherwise.
fn infer_column(name: String, cells: Vec<Option<String>>) -> Column {
    let all_numeric = cells
        .iter()
        .flatten()
        .all(|cell| cell.parse::<f32>().is_ok());
    if all_numeric && cells.iter().any(Option::is_some) {
        let values = cells
            .into_iter()
            .map(|cell| match cell {
                Some(cell) => cell.parse::<f32>().unwrap_or(f32::NAN),
                None => f32::NAN,
            })
            .collect();
        Column::numeric(name, values)
    } else {
        Column::text(name, cells)
    }
}
