//! Raw matrix input: dense rows or sparse entry lists
//!
//! Both import formats end up as a dense, row-major `RawMatrix`. Dimensions
//! are inferred from the data when the caller omits them; cells the input
//! does not mention are zero, and input beyond the given dimensions is
//! dropped. Sizes are capped at `MAX_AXIS_DIMS` per axis and `MAX_CELLS`
//! overall: typed imports clamp to the cap, JSON imports reject input past it.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::Axis;
use crate::error::{MatrixError, Result};

/// Largest dimension accepted along either axis
pub const MAX_AXIS_DIMS: usize = 1 << 20;

/// Largest number of cells a matrix may hold
pub const MAX_CELLS: usize = 1 << 24;

/// One entry of the sparse import format
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixEntry {
    pub row_index: usize,
    pub column_index: usize,
    pub value: f64,
}

impl MatrixEntry {
    pub fn new(row_index: usize, column_index: usize, value: f64) -> Self {
        Self { row_index, column_index, value }
    }
}

/// Dense raw values, row-major
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawMatrix {
    row_dims: usize,
    column_dims: usize,
    values: Vec<f64>,
}

impl RawMatrix {
    /// All-zero matrix, clamped to the size caps.
    pub fn zeros(row_dims: usize, column_dims: usize) -> Self {
        let (row_dims, column_dims) = clamp_dims(row_dims, column_dims);
        Self {
            row_dims,
            column_dims,
            values: vec![0.0; row_dims * column_dims],
        }
    }

    /// Build from a (possibly ragged) 2D array.
    pub fn from_rows<R: AsRef<[f64]>>(
        rows: &[R],
        row_dims: Option<usize>,
        column_dims: Option<usize>,
    ) -> Self {
        let (row_dims, column_dims) = dense_dims(rows, row_dims, column_dims);
        let mut matrix = Self::zeros(row_dims, column_dims);
        for (s, row) in rows.iter().take(matrix.row_dims).enumerate() {
            for (t, &value) in row.as_ref().iter().take(matrix.column_dims).enumerate() {
                matrix.set(s, t, value);
            }
        }
        matrix
    }

    /// Build from a sparse list of entries.
    pub fn from_entries(
        entries: &[MatrixEntry],
        row_dims: Option<usize>,
        column_dims: Option<usize>,
    ) -> Self {
        let (row_dims, column_dims) = entry_dims(entries, row_dims, column_dims);
        let mut matrix = Self::zeros(row_dims, column_dims);
        for entry in entries {
            if entry.row_index < matrix.row_dims && entry.column_index < matrix.column_dims {
                matrix.set(entry.row_index, entry.column_index, entry.value);
            } else {
                debug!(
                    "Dropping entry ({}, {}) outside {}x{} matrix",
                    entry.row_index, entry.column_index, matrix.row_dims, matrix.column_dims
                );
            }
        }
        matrix
    }

    /// Build from JSON holding either format.
    ///
    /// An array of arrays is read as dense rows, an array of objects as
    /// entries. Anything else is rejected, as is an entry index or a matrix
    /// size past the caps.
    pub fn from_json(
        value: &Value,
        row_dims: Option<usize>,
        column_dims: Option<usize>,
    ) -> Result<Self> {
        let items = value.as_array().ok_or_else(|| {
            MatrixError::UnsupportedInput(format!("expected an array, got {}", json_kind(value)))
        })?;

        match items.first() {
            None => {
                check_size(row_dims.unwrap_or(0), column_dims.unwrap_or(0))?;
                Ok(Self::from_rows::<Vec<f64>>(&[], row_dims, column_dims))
            }
            Some(Value::Array(_)) => {
                let rows = items
                    .iter()
                    .enumerate()
                    .map(|(s, item)| dense_row(s, item))
                    .collect::<Result<Vec<_>>>()?;
                let (row_dims, column_dims) = dense_dims(&rows, row_dims, column_dims);
                check_size(row_dims, column_dims)?;
                Ok(Self::from_rows(&rows, Some(row_dims), Some(column_dims)))
            }
            Some(Value::Object(_)) => {
                let mut entries = Vec::with_capacity(items.len());
                for (position, item) in items.iter().enumerate() {
                    if let Some(entry) = sparse_entry(position, item)? {
                        entries.push(entry);
                    }
                }
                let (row_dims, column_dims) = entry_dims(&entries, row_dims, column_dims);
                check_size(row_dims, column_dims)?;
                Ok(Self::from_entries(&entries, Some(row_dims), Some(column_dims)))
            }
            Some(other) => Err(MatrixError::UnsupportedInput(format!(
                "expected arrays or entry objects, got an array of {}",
                json_kind(other)
            ))),
        }
    }

    pub fn row_dims(&self) -> usize {
        self.row_dims
    }

    pub fn column_dims(&self) -> usize {
        self.column_dims
    }

    pub fn dims(&self, axis: Axis) -> usize {
        match axis {
            Axis::Row => self.row_dims,
            Axis::Column => self.column_dims,
        }
    }

    /// Row-major values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    fn set(&mut self, row: usize, column: usize, value: f64) {
        self.values[row * self.column_dims + column] = value;
    }
}

/// Cell count of a `row_dims` x `column_dims` matrix, or `None` past the caps.
fn cell_count(row_dims: usize, column_dims: usize) -> Option<usize> {
    if row_dims > MAX_AXIS_DIMS || column_dims > MAX_AXIS_DIMS {
        return None;
    }
    row_dims.checked_mul(column_dims).filter(|&cells| cells <= MAX_CELLS)
}

fn clamp_dims(row_dims: usize, column_dims: usize) -> (usize, usize) {
    if cell_count(row_dims, column_dims).is_some() {
        return (row_dims, column_dims);
    }
    let clamped_columns = column_dims.min(MAX_AXIS_DIMS);
    let clamped_rows = row_dims.min(MAX_AXIS_DIMS).min(MAX_CELLS / clamped_columns.max(1));
    warn!(
        "Clamping {}x{} matrix to {}x{}",
        row_dims, column_dims, clamped_rows, clamped_columns
    );
    (clamped_rows, clamped_columns)
}

fn check_size(row_dims: usize, column_dims: usize) -> Result<()> {
    match cell_count(row_dims, column_dims) {
        Some(_) => Ok(()),
        None => Err(MatrixError::UnsupportedInput(format!(
            "{}x{} matrix exceeds the limit of {} per axis and {} cells",
            row_dims, column_dims, MAX_AXIS_DIMS, MAX_CELLS
        ))),
    }
}

fn dense_dims<R: AsRef<[f64]>>(
    rows: &[R],
    row_dims: Option<usize>,
    column_dims: Option<usize>,
) -> (usize, usize) {
    let row_dims = row_dims.unwrap_or(rows.len());
    let column_dims = column_dims.unwrap_or_else(|| {
        rows.iter().map(|row| row.as_ref().len()).max().unwrap_or(0)
    });
    (row_dims, column_dims)
}

/// Inferred dimensions ignore indexes past `MAX_AXIS_DIMS`; those entries
/// are dropped when the matrix is filled.
fn entry_dims(
    entries: &[MatrixEntry],
    row_dims: Option<usize>,
    column_dims: Option<usize>,
) -> (usize, usize) {
    let inferred = |index: fn(&MatrixEntry) -> usize| {
        entries
            .iter()
            .map(index)
            .filter(|&i| i < MAX_AXIS_DIMS)
            .map(|i| i + 1)
            .max()
            .unwrap_or(0)
    };
    let row_dims = row_dims.unwrap_or_else(|| inferred(|e: &MatrixEntry| e.row_index));
    let column_dims = column_dims.unwrap_or_else(|| inferred(|e: &MatrixEntry| e.column_index));
    (row_dims, column_dims)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn dense_row(s: usize, item: &Value) -> Result<Vec<f64>> {
    let cells = item.as_array().ok_or_else(|| {
        MatrixError::UnsupportedInput(format!("row {} is {}, not an array", s, json_kind(item)))
    })?;
    Ok(cells
        .iter()
        .enumerate()
        .map(|(t, cell)| {
            cell.as_f64().unwrap_or_else(|| {
                debug!("Non-numeric value at ({}, {}) read as 0", s, t);
                0.0
            })
        })
        .collect())
}

/// Parse one entry object. Negative or fractional indexes drop the entry;
/// missing fields and indexes past `MAX_AXIS_DIMS` are an error.
fn sparse_entry(position: usize, item: &Value) -> Result<Option<MatrixEntry>> {
    let object = item.as_object().ok_or_else(|| MatrixError::MalformedEntry {
        position,
        reason: format!("expected an object, got {}", json_kind(item)),
    })?;

    let number = |field: &str| -> Result<f64> {
        object
            .get(field)
            .and_then(Value::as_f64)
            .ok_or_else(|| MatrixError::MalformedEntry {
                position,
                reason: format!("missing numeric {}", field),
            })
    };
    let row_index = number("rowIndex")?;
    let column_index = number("columnIndex")?;
    let value = number("value")?;

    let is_index = |x: f64| x >= 0.0 && x.fract() == 0.0;
    if !is_index(row_index) || !is_index(column_index) {
        debug!("Dropping entry {} with invalid index ({}, {})", position, row_index, column_index);
        return Ok(None);
    }
    let limit = MAX_AXIS_DIMS as f64;
    if row_index >= limit || column_index >= limit {
        return Err(MatrixError::MalformedEntry {
            position,
            reason: format!(
                "index ({}, {}) exceeds the limit of {}",
                row_index, column_index, MAX_AXIS_DIMS
            ),
        });
    }
    Ok(Some(MatrixEntry::new(row_index as usize, column_index as usize, value)))
}
