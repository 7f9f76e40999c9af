//! Input field definitions and the editable flight record.
//!
//! The ten input fields mirror the reference dataset's columns: five 1-5
//! service ratings, two numeric fields, and three categorical choices. Each
//! field has a short key for the `set` command and a default forming the
//! baseline record.

use thiserror::Error;

use crate::data::{Column, Table};

// =============================================================================
// Field specs
// =============================================================================

/// Validation and default for one input field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Numeric value clamped to an inclusive range.
    Numeric { min: f32, max: f32, default: f32 },
    /// One of a fixed set of options; `default` indexes into `options`.
    Choice {
        options: &'static [&'static str],
        default: usize,
    },
}

/// One input field: dataset column name, short command key, and kind.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Column name as it appears in the reference dataset.
    pub name: &'static str,
    /// Short token used by the `set` command.
    pub key: &'static str,
    pub kind: FieldKind,
}

const RATINGS: FieldKind = FieldKind::Numeric {
    min: 1.0,
    max: 5.0,
    default: 3.0,
};

const YES_NO: FieldKind = FieldKind::Choice {
    options: &["Yes", "No"],
    default: 0,
};

/// All input fields, in dataset order.
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "Online boarding",
        key: "boarding",
        kind: RATINGS,
    },
    FieldSpec {
        name: "Inflight wifi service",
        key: "wifi",
        kind: RATINGS,
    },
    FieldSpec {
        name: "Inflight entertainment",
        key: "entertainment",
        kind: RATINGS,
    },
    FieldSpec {
        name: "Checkin service",
        key: "checkin",
        kind: RATINGS,
    },
    FieldSpec {
        name: "Seat comfort",
        key: "seat",
        kind: RATINGS,
    },
    FieldSpec {
        name: "Age",
        key: "age",
        kind: FieldKind::Numeric {
            min: 0.0,
            max: 100.0,
            default: 18.0,
        },
    },
    FieldSpec {
        name: "Flight Distance",
        key: "distance",
        kind: FieldKind::Numeric {
            min: 0.0,
            max: 10000.0,
            default: 100.0,
        },
    },
    FieldSpec {
        name: "Business Travel",
        key: "business",
        kind: YES_NO,
    },
    FieldSpec {
        name: "Loyal Customer",
        key: "loyal",
        kind: YES_NO,
    },
    FieldSpec {
        name: "Class",
        key: "class",
        kind: FieldKind::Choice {
            options: &["Business", "Eco", "Eco Plus"],
            default: 1,
        },
    },
];

/// Looks up a field by its command key (case-insensitive).
pub fn field_by_key(key: &str) -> Option<(usize, &'static FieldSpec)> {
    FIELDS
        .iter()
        .enumerate()
        .find(|(_, f)| f.key.eq_ignore_ascii_case(key))
}

// =============================================================================
// Errors
// =============================================================================

/// Input validation errors for the `set` command.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("unknown field '{key}'; type 'help' to list fields")]
    UnknownField { key: String },

    #[error("{field} expects a number, got '{got}'")]
    NotANumber { field: &'static str, got: String },

    #[error("{field} must be between {min} and {max}, got {got}")]
    OutOfRange {
        field: &'static str,
        min: f32,
        max: f32,
        got: f32,
    },

    #[error("{field} must be one of {options}, got '{got}'")]
    UnknownChoice {
        field: &'static str,
        options: String,
        got: String,
    },
}

// =============================================================================
// FlightRecord
// =============================================================================

/// Current value of one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Number(f32),
    /// Index into the field's options.
    Choice(usize),
}

/// The editable input record, one value per entry of [`FIELDS`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    values: Vec<FieldValue>,
}

impl Default for FlightRecord {
    fn default() -> Self {
        let values = FIELDS
            .iter()
            .map(|f| match f.kind {
                FieldKind::Numeric { default, .. } => FieldValue::Number(default),
                FieldKind::Choice { default, .. } => FieldValue::Choice(default),
            })
            .collect();
        Self { values }
    }
}

impl FlightRecord {
    /// Sets a field from its command key and a raw value string.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys, unparseable numbers, values
    /// outside the field's range, and unknown choice options.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<(), InputError> {
        let (idx, spec) = field_by_key(key).ok_or_else(|| InputError::UnknownField {
            key: key.to_string(),
        })?;

        self.values[idx] = match spec.kind {
            FieldKind::Numeric { min, max, .. } => {
                let value: f32 = raw.trim().parse().map_err(|_| InputError::NotANumber {
                    field: spec.name,
                    got: raw.to_string(),
                })?;
                if !value.is_finite() || value < min || value > max {
                    return Err(InputError::OutOfRange {
                        field: spec.name,
                        min,
                        max,
                        got: value,
                    });
                }
                FieldValue::Number(value)
            }
            FieldKind::Choice { options, .. } => {
                let wanted = normalize(raw);
                let position = options.iter().position(|o| normalize(o) == wanted);
                match position {
                    Some(i) => FieldValue::Choice(i),
                    None => {
                        return Err(InputError::UnknownChoice {
                            field: spec.name,
                            options: options.join(", "),
                            got: raw.to_string(),
                        });
                    }
                }
            }
        };
        Ok(())
    }

    /// Current value of field `idx` for display.
    pub fn display_value(&self, idx: usize) -> String {
        match (self.values[idx], FIELDS[idx].kind) {
            (FieldValue::Number(v), _) => {
                if v.fract() == 0.0 {
                    format!("{}", v as i64)
                } else {
                    format!("{v}")
                }
            }
            (FieldValue::Choice(i), FieldKind::Choice { options, .. }) => options[i].to_string(),
            // A choice value can only be stored for a choice field.
            (FieldValue::Choice(_), FieldKind::Numeric { .. }) => unreachable!(),
        }
    }

    /// Converts the record into a one-row table with the dataset's column
    /// names, ready for encoding and transformation.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        for (spec, value) in FIELDS.iter().zip(&self.values) {
            let column = match (value, spec.kind) {
                (FieldValue::Number(v), _) => Column::numeric(spec.name, vec![*v]),
                (FieldValue::Choice(i), FieldKind::Choice { options, .. }) => {
                    Column::text(spec.name, vec![Some(options[*i].to_string())])
                }
                (FieldValue::Choice(_), FieldKind::Numeric { .. }) => unreachable!(),
            };
            // Field names are unique and lengths all 1.
            table.push_column(column).expect("field specs are consistent");
        }
        table
    }
}

/// Lowercases and strips separators so "Eco Plus", "eco-plus" and
/// "eco_plus" all match.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}
