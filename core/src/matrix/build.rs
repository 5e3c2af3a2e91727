//! Derivation of cells, axis aggregates and probability views from raw data
//!
//! Runs once per import. Everything computed here depends only on the raw
//! values: cell rankings, row/column totals and rankings, the three
//! relative-value views, and the sparse subset of cells worth drawing.
//!
//! Zero totals are treated as contributing nothing: a cell in an all-zero
//! row gets a row-conditional value of 0 rather than an undefined quotient,
//! so the rescale multipliers count only rows (or columns) with mass.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, trace};

use super::cell::{AxisElement, Cell};
use super::raw::RawMatrix;
use super::state::{AxisState, MatrixState, MatrixStatistics};
use super::types::Axis;

#[inline]
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator != 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Indexes of `values` sorted by descending value. Ties keep input order.
fn rank_descending(values: impl Iterator<Item = f64>) -> Vec<usize> {
    let values: Vec<f64> = values.collect();
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order
}

/// Build a fresh state for `raw`, with all data-dependent attributes
/// derived and every parameter left empty.
pub(crate) fn derive_state(raw: &RawMatrix, min_value_threshold: f64) -> MatrixState {
    let row_dims = raw.row_dims();
    let column_dims = raw.column_dims();

    let mut cells: Vec<Cell> = raw
        .values()
        .iter()
        .enumerate()
        .map(|(n, &value)| Cell::new(n / column_dims.max(1), n % column_dims.max(1), value))
        .collect();

    // Cell ranking
    let entries = rank_descending(cells.iter().map(|cell| cell.abs_value));
    for (rank, &n) in entries.iter().enumerate() {
        cells[n].ranking = rank;
    }

    let (row_elements, max_row_marginal_probability) =
        axis_elements(Axis::Row, &cells, row_dims, column_dims);
    let (column_elements, max_column_marginal_probability) =
        axis_elements(Axis::Column, &cells, column_dims, row_dims);

    // Joint probabilities
    let total: f64 = cells.iter().map(|cell| cell.abs_value).sum();
    let max_abs = cells.iter().map(|cell| cell.abs_value).fold(0.0, f64::max);
    for cell in cells.iter_mut() {
        cell.rel_value = ratio(cell.abs_value, total);
    }

    // Conditional probabilities
    let mut row_rescale_multiplier = 0.0;
    let mut column_rescale_multiplier = 0.0;
    for cell in cells.iter_mut() {
        cell.row_rel_value = ratio(cell.abs_value, row_elements[cell.row_index].abs_value);
        cell.column_rel_value =
            ratio(cell.abs_value, column_elements[cell.column_index].abs_value);
        row_rescale_multiplier += cell.row_rel_value;
        column_rescale_multiplier += cell.column_rel_value;
    }

    let statistics = MatrixStatistics {
        max_joint_probability: ratio(max_abs, total),
        max_row_marginal_probability,
        max_column_marginal_probability,
        row_rescale_multiplier,
        column_rescale_multiplier,
        ..MatrixStatistics::default()
    };

    let sparse = sparse_entries(&cells, &entries, &statistics, min_value_threshold);
    debug!(
        "Derived {}x{} matrix: {} entries, {} in sparse matrix",
        row_dims,
        column_dims,
        entries.len(),
        sparse.len()
    );

    MatrixState {
        row_dims,
        column_dims,
        cells,
        entries,
        sparse,
        rows: AxisState::with_elements(row_elements),
        columns: AxisState::with_elements(column_elements),
        statistics,
        ..MatrixState::default()
    }
}

/// Aggregate cells along `axis`. Returns the elements and the largest
/// element share of the matrix total.
fn axis_elements(
    axis: Axis,
    cells: &[Cell],
    dims: usize,
    opposite_dims: usize,
) -> (Vec<AxisElement>, f64) {
    let mut totals = vec![0.0; dims];
    for cell in cells {
        let index = match axis {
            Axis::Row => cell.row_index,
            Axis::Column => cell.column_index,
        };
        totals[index] += cell.abs_value;
    }

    let grand_total: f64 = totals.iter().sum();
    let max_total = totals.iter().copied().fold(0.0, f64::max);

    let mut elements: Vec<AxisElement> = totals
        .iter()
        .enumerate()
        .map(|(index, &total)| {
            let mut element = AxisElement::new(axis, index, total, opposite_dims);
            element.rel_value = ratio(total, grand_total);
            element
        })
        .collect();

    for (rank, index) in rank_descending(totals.into_iter()).into_iter().enumerate() {
        elements[index].ranking = rank;
    }
    trace!("Built {} {} elements", dims, axis);

    (elements, ratio(max_total, grand_total))
}

/// Keep cells whose joint, row-conditional or column-conditional value
/// reaches the threshold. The conditional views are compared against the
/// threshold scaled by their rescale multiplier, so all three views are
/// held to the same share of their total mass.
fn sparse_entries(
    cells: &[Cell],
    entries: &[usize],
    statistics: &MatrixStatistics,
    min_value_threshold: f64,
) -> Vec<usize> {
    let threshold = min_value_threshold;
    let row_threshold = min_value_threshold * statistics.row_rescale_multiplier;
    let column_threshold = min_value_threshold * statistics.column_rescale_multiplier;

    entries
        .iter()
        .copied()
        .filter(|&n| {
            let cell = &cells[n];
            let passes = |value: f64, threshold: f64| value > 0.0 && value >= threshold;
            passes(cell.rel_value, threshold)
                || passes(cell.row_rel_value, row_threshold)
                || passes(cell.column_rel_value, column_threshold)
        })
        .collect()
}
