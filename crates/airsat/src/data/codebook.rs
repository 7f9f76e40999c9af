//! Categorical encoding.
//!
//! A [`Codebook`] maps the text values of each categorical column to integer
//! codes. Categories are sorted lexicographically and numbered `0..k`, so the
//! code assignment depends only on the set of observed categories, never on
//! row order. Missing cells and values unseen at fit time both map to the
//! reserved code `k`, one past the last category.
//!
//! The codebook is fitted once on reference data and then applied to every
//! incoming record, which keeps codes stable across requests.

use std::collections::{BTreeMap, BTreeSet};

use crate::data::{ColumnValues, DataError, Table};

// =============================================================================
// Codebook
// =============================================================================

/// Per-column category-to-code mappings.
///
/// # Example
///
/// ```
/// use airsat::data::{Codebook, Column, Table};
///
/// let mut reference = Table::new();
/// reference.push_column(Column::text(
///     "Class",
///     vec![Some("Eco".into()), Some("Business".into()), Some("Eco Plus".into())],
/// ))?;
///
/// let codebook = Codebook::fit(&reference);
/// // Sorted order: Business=0, Eco=1, Eco Plus=2; missing/unseen=3.
/// assert_eq!(codebook.code("Class", Some("Eco")), Some(1.0));
/// assert_eq!(codebook.code("Class", None), Some(3.0));
/// # Ok::<(), airsat::data::DataError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Codebook {
    columns: BTreeMap<String, Vec<String>>,
}

impl Codebook {
    /// Fits a codebook on every text column of `table`.
    ///
    /// Distinct non-missing values are collected and sorted; numeric columns
    /// are ignored. A text column with no observed values gets an empty
    /// category list, so all of its cells encode to the missing code `0`.
    pub fn fit(table: &Table) -> Self {
        let mut columns = BTreeMap::new();
        for column in table.columns() {
            let Some(cells) = column.values().as_text() else {
                continue;
            };
            let categories: BTreeSet<&str> =
                cells.iter().flatten().map(String::as_str).collect();
            columns.insert(
                column.name().to_string(),
                categories.into_iter().map(String::from).collect(),
            );
        }
        Self { columns }
    }

    /// Sorted categories for `column`, if the codebook covers it.
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    /// The reserved code for missing and unseen values of `column`.
    pub fn missing_code(&self, column: &str) -> Option<usize> {
        self.columns.get(column).map(Vec::len)
    }

    /// Encodes a single cell of `column`.
    ///
    /// Returns `None` if the codebook does not cover the column. Missing
    /// cells and unseen values map to [`Self::missing_code`].
    pub fn code(&self, column: &str, value: Option<&str>) -> Option<f32> {
        let categories = self.columns.get(column)?;
        let code = match value {
            Some(value) => categories
                .binary_search_by(|c| c.as_str().cmp(value))
                .unwrap_or(categories.len()),
            None => categories.len(),
        };
        Some(code as f32)
    }

    /// Encodes every text column of `table` in place.
    ///
    /// Text columns are replaced by numeric code columns; numeric columns are
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `table` has a text column the codebook was not
    /// fitted on.
    pub fn apply(&self, table: &mut Table) -> Result<(), DataError> {
        let text_columns: Vec<String> = table
            .columns()
            .iter()
            .filter(|c| c.is_text())
            .map(|c| c.name().to_string())
            .collect();

        for name in text_columns {
            let cells = table
                .column(&name)
                .and_then(|c| c.values().as_text())
                .unwrap_or(&[]);
            let codes: Vec<f32> = cells
                .iter()
                .map(|cell| {
                    self.code(&name, cell.as_deref())
                        .ok_or_else(|| DataError::ColumnNotCovered { name: name.clone() })
                })
                .collect::<Result<_, _>>()?;
            table.replace_values(&name, ColumnValues::Numeric(codes))?;
        }
        Ok(())
    }
}

/// Fits a codebook on `table` and encodes its text columns in place.
///
/// One-shot convenience over [`Codebook::fit`] + [`Codebook::apply`]. The
/// fitted codebook is returned so the same codes can be reused for later
/// batches.
pub fn encode_categorical(table: &mut Table) -> Result<Codebook, DataError> {
    let codebook = Codebook::fit(table);
    codebook.apply(table)?;
    Ok(codebook)
}
