//! Tabular data, CSV loading, and categorical encoding.
//!
//! # Overview
//!
//! The data layer mirrors the shape of the reference dataset: a [`Table`] of
//! named columns, read from CSV by [`read_csv`], with text columns encoded to
//! integer codes by a fitted [`Codebook`]. Everything downstream (the
//! preprocessing pipeline and the classifiers) consumes numeric columns only.

mod codebook;
mod reader;
mod table;

pub use codebook::{Codebook, encode_categorical};
pub use reader::{read_csv, read_csv_from};
pub use table::{Column, ColumnValues, Table};

use std::path::PathBuf;

use thiserror::Error;

/// Errors from table construction, CSV parsing, and encoding.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV file {path} contains no data rows")]
    EmptyCsv { path: PathBuf },

    #[error("duplicate column '{name}'")]
    DuplicateColumn { name: String },

    #[error("column '{column}' has {got} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },

    #[error("no codes fitted for column '{name}'")]
    ColumnNotCovered { name: String },
}
