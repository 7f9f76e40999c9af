//! Column-major tabular data.
//!
//! A [`Table`] is a small set of named columns of equal length. Columns are
//! either numeric (`f32`, with `NaN` marking missing cells) or text
//! (`Option<String>`, with `None` marking missing cells). Text columns are
//! turned into numeric code columns by [`encode_categorical`] before they
//! reach the preprocessing pipeline.
//!
//! [`encode_categorical`]: crate::data::encode_categorical

use crate::data::DataError;

// =============================================================================
// Column
// =============================================================================

/// Cell storage for a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Numeric cells. Missing values are `NaN`.
    Numeric(Vec<f32>),
    /// Text cells. Missing values are `None`.
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    /// Number of cells in the column.
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    /// Whether the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the numeric cells, or `None` for a text column.
    pub fn as_numeric(&self) -> Option<&[f32]> {
        match self {
            ColumnValues::Numeric(v) => Some(v),
            ColumnValues::Text(_) => None,
        }
    }

    /// Returns the text cells, or `None` for a numeric column.
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match self {
            ColumnValues::Numeric(_) => None,
            ColumnValues::Text(v) => Some(v),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    /// Creates a numeric column.
    pub fn numeric(name: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values),
        }
    }

    /// Creates a text column.
    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Text(values),
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell storage.
    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    /// Whether the column stores text cells.
    pub fn is_text(&self) -> bool {
        matches!(self.values, ColumnValues::Text(_))
    }
}

// =============================================================================
// Table
// =============================================================================

/// Column-major table with unique column names and equal column lengths.
///
/// # Example
///
/// ```
/// use airsat::data::{Column, Table};
///
/// let mut table = Table::new();
/// table.push_column(Column::numeric("Age", vec![23.0, 41.0]))?;
/// table.push_column(Column::text(
///     "Class",
///     vec![Some("Eco".into()), Some("Business".into())],
/// ))?;
///
/// assert_eq!(table.n_rows(), 2);
/// assert_eq!(table.n_cols(), 2);
/// # Ok::<(), airsat::data::DataError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    ///
    /// # Errors
    ///
    /// Returns an error if a column with the same name already exists, or if
    /// the column length differs from the existing columns.
    pub fn push_column(&mut self, column: Column) -> Result<(), DataError> {
        if self.columns.iter().any(|c| c.name == column.name) {
            return Err(DataError::DuplicateColumn {
                name: column.name.clone(),
            });
        }
        if let Some(first) = self.columns.first() {
            let expected = first.values.len();
            let got = column.values.len();
            if got != expected {
                return Err(DataError::LengthMismatch {
                    column: column.name.clone(),
                    expected,
                    got,
                });
            }
        }
        self.columns.push(column);
        Ok(())
    }

    /// Number of rows (0 for an empty table).
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// All columns in insertion order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Replaces the cells of an existing column.
    ///
    /// Used by categorical encoding to swap a text column for its numeric
    /// code column in place, keeping column order stable.
    ///
    /// # Errors
    ///
    /// Returns an error if the column does not exist or the replacement has a
    /// different length.
    pub fn replace_values(
        &mut self,
        name: &str,
        values: ColumnValues,
    ) -> Result<(), DataError> {
        let n_rows = self.n_rows();
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| DataError::ColumnNotFound {
                name: name.to_string(),
            })?;
        if values.len() != n_rows {
            return Err(DataError::LengthMismatch {
                column: name.to_string(),
                expected: n_rows,
                got: values.len(),
            });
        }
        column.values = values;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let mut table = Table::new();
        table
            .push_column(Column::numeric("Age", vec![23.0, 41.0, 35.0]))
            .unwrap();
        table
            .push_column(Column::text(
                "Class",
                vec![Some("Eco".into()), None, Some("Business".into())],
            ))
            .unwrap();
        table
    }

    #[test]
    fn push_column_tracks_shape() {
        let table = sample_table();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_cols(), 2);
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["Age", "Class"]
        );
    }

    #[test]
    fn push_column_rejects_duplicate_name() {
        let mut table = sample_table();
        let err = table
            .push_column(Column::numeric("Age", vec![1.0, 2.0, 3.0]))
            .unwrap_err();
        assert!(matches!(err, DataError::DuplicateColumn { name } if name == "Age"));
    }

    #[test]
    fn push_column_rejects_length_mismatch() {
        let mut table = sample_table();
        let err = table
            .push_column(Column::numeric("Flight Distance", vec![500.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            DataError::LengthMismatch { expected: 3, got: 1, .. }
        ));
    }

    #[test]
    fn column_lookup_by_name() {
        let table = sample_table();
        let class = table.column("Class").unwrap();
        assert!(class.is_text());
        assert!(table.column("Seat comfort").is_none());
    }

    #[test]
    fn replace_values_keeps_column_order() {
        let mut table = sample_table();
        table
            .replace_values("Class", ColumnValues::Numeric(vec![1.0, 2.0, 0.0]))
            .unwrap();
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["Age", "Class"]
        );
        let class = table.column("Class").unwrap();
        assert_eq!(class.values().as_numeric().unwrap(), &[1.0, 2.0, 0.0]);
    }

    #[test]
    fn replace_values_rejects_unknown_column() {
        let mut table = sample_table();
        let err = table
            .replace_values("Gate location", ColumnValues::Numeric(vec![0.0; 3]))
            .unwrap_err();
        assert!(matches!(err, DataError::ColumnNotFound { .. }));
    }
}
