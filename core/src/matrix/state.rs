//! Committed matrix state
//!
//! `MatrixState` is the immutable snapshot consumers read between updates.
//! It holds the user-set parameters for both axes (visibility, ordering,
//! selections, highlights, labels) alongside everything derived from them
//! and from the raw data. The store replaces the whole snapshot on every
//! flush; nothing in here is patched after commit.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::Serialize;
use serde_json::Value;

use super::cell::{AxisElement, Cell};
use super::types::{Axis, Normalization, SelectId};

/// Scalar summaries of the matrix
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixStatistics {
    /// Largest cell share of the matrix total
    pub max_joint_probability: f64,
    /// Largest row share of the matrix total
    pub max_row_marginal_probability: f64,
    /// Largest column share of the matrix total
    pub max_column_marginal_probability: f64,
    /// Sum of all row-conditional values (rows with a non-zero total)
    pub row_rescale_multiplier: f64,
    /// Sum of all column-conditional values (columns with a non-zero total)
    pub column_rescale_multiplier: f64,
    /// Largest displayed cell value under the active normalization
    pub max_value: f64,
    pub max_row_value: f64,
    pub max_column_value: f64,
}

/// Parameters and derived state for one axis
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisState {
    pub(crate) visibilities: Vec<bool>,
    pub(crate) ordering: Vec<usize>,
    pub(crate) selections: Vec<SelectId>,
    pub(crate) highlights: Vec<bool>,
    pub(crate) labels: Vec<String>,

    pub(crate) elements: Vec<AxisElement>,
    pub(crate) visible_indexes: Vec<usize>,
    pub(crate) selected_indexes: Vec<usize>,
    pub(crate) select_ids: Vec<SelectId>,
    pub(crate) positions: Vec<f64>,
}

impl AxisState {
    pub(crate) fn with_elements(elements: Vec<AxisElement>) -> Self {
        Self {
            elements,
            ..Self::default()
        }
    }

    pub fn dims(&self) -> usize {
        self.elements.len()
    }

    pub fn visibilities(&self) -> &[bool] {
        &self.visibilities
    }

    /// Display sequence: `ordering[k]` is the index shown at slot `k`
    pub fn ordering(&self) -> &[usize] {
        &self.ordering
    }

    /// Explicit selections only, without highlights
    pub fn selections(&self) -> &[SelectId] {
        &self.selections
    }

    pub fn highlights(&self) -> &[bool] {
        &self.highlights
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn elements(&self) -> &[AxisElement] {
        &self.elements
    }

    /// Visible indexes in display order
    pub fn visible_indexes(&self) -> &[usize] {
        &self.visible_indexes
    }

    pub fn visible_dims(&self) -> usize {
        self.visible_indexes.len()
    }

    /// Selected or highlighted indexes in display order
    pub fn selected_indexes(&self) -> &[usize] {
        &self.selected_indexes
    }

    pub fn selected_dims(&self) -> usize {
        self.select_ids.iter().filter(|&&id| id >= 0).count()
    }

    /// Selections merged with highlights; highlights read as 0
    pub fn select_ids(&self) -> &[SelectId] {
        &self.select_ids
    }

    /// Display positions, interpolated for hidden elements
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        let value = match name {
            "Dims" => serde_json::to_value(self.dims()),
            "Visibilities" => serde_json::to_value(&self.visibilities),
            "Ordering" => serde_json::to_value(&self.ordering),
            "Selections" => serde_json::to_value(&self.selections),
            "Highlights" => serde_json::to_value(&self.highlights),
            "Labels" => serde_json::to_value(&self.labels),
            "Elements" => serde_json::to_value(&self.elements),
            "VisibleIndexes" => serde_json::to_value(&self.visible_indexes),
            "SelectedIndexes" => serde_json::to_value(&self.selected_indexes),
            "SelectIDs" => serde_json::to_value(&self.select_ids),
            "Positions" => serde_json::to_value(&self.positions),
            _ => return None,
        };
        value.ok()
    }
}

/// Read-only snapshot of a term-topic matrix and all derived attributes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatrixState {
    pub(crate) normalization: Normalization,
    pub(crate) row_dims: usize,
    pub(crate) column_dims: usize,

    /// Row-major cells
    pub(crate) cells: Vec<Cell>,
    /// Cell positions in `cells`, by descending raw value
    pub(crate) entries: Vec<usize>,
    /// Subset of `entries` above the value threshold
    pub(crate) sparse: Vec<usize>,

    pub(crate) rows: AxisState,
    pub(crate) columns: AxisState,
    pub(crate) statistics: MatrixStatistics,
}

impl MatrixState {
    pub fn normalization(&self) -> Normalization {
        self.normalization
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

    pub fn rows(&self) -> &AxisState {
        &self.rows
    }

    pub fn columns(&self) -> &AxisState {
        &self.columns
    }

    pub fn axis(&self, axis: Axis) -> &AxisState {
        match axis {
            Axis::Row => &self.rows,
            Axis::Column => &self.columns,
        }
    }

    pub fn row_elements(&self) -> &[AxisElement] {
        &self.rows.elements
    }

    pub fn column_elements(&self) -> &[AxisElement] {
        &self.columns.elements
    }

    pub fn statistics(&self) -> &MatrixStatistics {
        &self.statistics
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        if row < self.row_dims && column < self.column_dims {
            self.cells.get(row * self.column_dims + column)
        } else {
            None
        }
    }

    /// Cells grouped by row, in index order
    pub fn full_matrix(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        let width = self.column_dims;
        (0..self.row_dims).map(move |s| &self.cells[s * width..(s + 1) * width])
    }

    /// All cells by descending raw value
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &Cell> + '_ {
        self.entries.iter().map(move |&n| &self.cells[n])
    }

    /// Cells large enough to matter in at least one probability view
    pub fn sparse_matrix(&self) -> impl ExactSizeIterator<Item = &Cell> + '_ {
        self.sparse.iter().map(move |&n| &self.cells[n])
    }

    /// Look up an attribute by its camelCase name, e.g. `rowVisibleIndexes`,
    /// `sparseMatrix` or `maxValue`.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        let stats = &self.statistics;
        let value = match name {
            "normalization" => serde_json::to_value(self.normalization),
            "fullMatrix" => serde_json::to_value(self.full_matrix().collect::<Vec<_>>()),
            "entries" => serde_json::to_value(self.entries().collect::<Vec<_>>()),
            "sparseMatrix" => serde_json::to_value(self.sparse_matrix().collect::<Vec<_>>()),
            "visibleRowDims" => serde_json::to_value(self.rows.visible_dims()),
            "visibleColumnDims" => serde_json::to_value(self.columns.visible_dims()),
            "selectedRowDims" => serde_json::to_value(self.rows.selected_dims()),
            "selectedColumnDims" => serde_json::to_value(self.columns.selected_dims()),
            "maxJointProbability" => serde_json::to_value(stats.max_joint_probability),
            "maxRowMarginalProbability" => serde_json::to_value(stats.max_row_marginal_probability),
            "maxColumnMarginalProbability" => {
                serde_json::to_value(stats.max_column_marginal_probability)
            }
            "rowRescaleMultiplier" => serde_json::to_value(stats.row_rescale_multiplier),
            "columnRescaleMultiplier" => serde_json::to_value(stats.column_rescale_multiplier),
            "maxValue" => serde_json::to_value(stats.max_value),
            "maxRowValue" => serde_json::to_value(stats.max_row_value),
            "maxColumnValue" => serde_json::to_value(stats.max_column_value),
            _ => {
                if let Some(suffix) = name.strip_prefix("row") {
                    return self.rows.attribute(suffix);
                }
                if let Some(suffix) = name.strip_prefix("column") {
                    return self.columns.attribute(suffix);
                }
                return None;
            }
        };
        value.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::build::derive_state;
    use crate::matrix::raw::RawMatrix;

    fn sample() -> MatrixState {
        let raw = RawMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]], None, None);
        derive_state(&raw, 0.001)
    }

    #[test]
    fn test_full_matrix_rows() {
        let state = sample();
        let rows: Vec<&[Cell]> = state.full_matrix().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0].abs_value, 3.0);
        assert_eq!(rows[1][0].row_index, 1);
        assert_eq!(rows[1][0].column_index, 0);
    }

    #[test]
    fn test_full_matrix_without_columns() {
        let raw = RawMatrix::zeros(3, 0);
        let state = derive_state(&raw, 0.001);
        assert_eq!(state.full_matrix().count(), 3);
        assert!(state.full_matrix().all(|row| row.is_empty()));
    }

    #[test]
    fn test_attribute_lookup() {
        let state = sample();
        assert_eq!(state.attribute("rowDims"), Some(Value::from(2)));
        assert_eq!(state.attribute("columnDims"), Some(Value::from(2)));
        assert_eq!(state.attribute("entries").unwrap().as_array().unwrap().len(), 4);
        assert_eq!(state.attribute("normalization"), Some(Value::from("none")));
        assert!(state.attribute("maxJointProbability").is_some());
        assert!(state.attribute("rowElements").unwrap().is_array());
        assert_eq!(state.attribute("rowBogus"), None);
        assert_eq!(state.attribute("bogus"), None);
    }

    #[test]
    fn test_cell_lookup_bounds() {
        let state = sample();
        assert_eq!(state.cell(1, 1).map(|c| c.abs_value), Some(4.0));
        assert!(state.cell(2, 0).is_none());
        assert!(state.cell(0, 2).is_none());
    }
}
