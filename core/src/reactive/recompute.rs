//! Dependency-ordered recomputation of derived state
//!
//! One call to `recompute` turns the committed state plus the pending
//! buffer into the next committed state. Each pass runs only when one of
//! its inputs moved, in this order:
//!
//! | pass                     | runs when                                   | kind          |
//! |--------------------------|---------------------------------------------|---------------|
//! | derive data              | matrix imported                             | data          |
//! | values                   | data, normalization                         | normalization |
//! | transitions              | data, visibility                            | visibility    |
//! | visible indexes/positions| data, ordering, visibility                  | ordering      |
//! | select IDs               | data, selections, highlights, visibility    | selection     |
//! | selected indexes         | data, ordering, select IDs                  |               |
//! | cross-reference values   | data, normalization, select IDs             |               |
//! | cross-reference spans    | data, normalization, select IDs, ordering   |               |
//! | labels                   | data, labels                                | label         |
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, trace};
use rayon::prelude::*;

use super::events::{FlushReport, UpdateKind};
use super::pending::{PendingAxis, PendingUpdates};
use crate::axis::{interpolate_positions, selection, visible_indexes};
use crate::matrix::build::derive_state;
use crate::matrix::{Axis, AxisElement, AxisState, Cell, MatrixState, Normalization, SelectId};

/// Which committed inputs the pending buffer actually changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Changes {
    data: bool,
    normalization: bool,
    visibility: bool,
    ordering: bool,
    selection_inputs: bool,
    labels: bool,
}

impl Changes {
    fn detect(committed: &MatrixState, pending: &PendingUpdates) -> Self {
        let rows = Self::detect_axis(&pending.rows, &committed.rows);
        let columns = Self::detect_axis(&pending.columns, &committed.columns);

        Self {
            data: pending.matrix.is_pending(),
            normalization: pending.normalization.is_changed(&committed.normalization),
            visibility: rows.visibility || columns.visibility,
            ordering: rows.ordering || columns.ordering,
            selection_inputs: rows.selection_inputs || columns.selection_inputs,
            labels: rows.labels || columns.labels,
        }
    }

    fn detect_axis(pending: &PendingAxis, committed: &AxisState) -> Self {
        Self {
            visibility: pending.visibilities.is_changed(&committed.visibilities),
            ordering: pending.ordering.is_changed(&committed.ordering),
            selection_inputs: pending.selections.is_changed(&committed.selections)
                || pending.highlights.is_changed(&committed.highlights),
            labels: pending.labels.is_changed(&committed.labels),
            ..Self::default()
        }
    }
}

/// Apply a per-cell update, on the rayon pool when `parallel` is set
fn for_each_cell<F>(cells: &mut [Cell], parallel: bool, update: F)
where
    F: Fn(&mut Cell) + Sync + Send,
{
    if parallel {
        cells.par_iter_mut().for_each(update);
    } else {
        cells.iter_mut().for_each(update);
    }
}

/// Build the next committed state from `committed` and the buffered writes.
pub(crate) fn recompute(
    committed: &MatrixState,
    mut pending: PendingUpdates,
    min_value_threshold: f64,
    parallel: bool,
) -> (MatrixState, FlushReport) {
    let changes = Changes::detect(committed, &pending);
    trace!("Detected changes: {:?}", changes);

    let mut next = match pending.matrix.take() {
        Some(raw) => derive_state(&raw, min_value_threshold),
        None => committed.clone(),
    };
    pending.normalization.commit_into(&mut next.normalization);
    commit_axis(&mut pending.rows, &mut next.rows);
    commit_axis(&mut pending.columns, &mut next.columns);

    let data = changes.data;
    let mut report = FlushReport::default();

    if data {
        report.record(UpdateKind::Data);
    }
    if data || changes.normalization {
        report.record(UpdateKind::Normalization);
        update_values(&mut next, parallel);
    }
    if data || changes.visibility {
        report.record(UpdateKind::Visibility);
        update_transitions(&mut next, parallel);
    }
    if data || changes.ordering || changes.visibility {
        report.record(UpdateKind::Ordering);
        update_positions(&mut next, parallel);
    }

    let mut select_ids_changed = false;
    if data || changes.selection_inputs || changes.visibility {
        report.record(UpdateKind::Selection);
        update_select_ids(&mut next, parallel);
        select_ids_changed = next.rows.select_ids != committed.rows.select_ids
            || next.columns.select_ids != committed.columns.select_ids;
    }
    if data || changes.ordering || select_ids_changed {
        update_selected_indexes(&mut next);
    }
    if data || changes.normalization || select_ids_changed {
        update_cross_reference_values(&mut next);
    }
    if data || changes.normalization || select_ids_changed || changes.ordering {
        update_cross_reference_spans(&mut next);
    }

    if data || changes.labels {
        report.record(UpdateKind::Label);
        update_labels(&mut next);
    }

    debug!("Recomputed matrix state: {:?}", report.event_names());
    (next, report)
}

fn commit_axis(pending: &mut PendingAxis, axis: &mut AxisState) {
    pending.visibilities.commit_into(&mut axis.visibilities);
    pending.ordering.commit_into(&mut axis.ordering);
    pending.selections.commit_into(&mut axis.selections);
    pending.highlights.commit_into(&mut axis.highlights);
    pending.labels.commit_into(&mut axis.labels);
}

/// Cell and element `value` plus the display maxima for the active
/// normalization.
fn update_values(state: &mut MatrixState, parallel: bool) {
    let mode = state.normalization;
    let stats = &mut state.statistics;

    for_each_cell(&mut state.cells, parallel, |cell| {
        cell.value = match mode {
            Normalization::None => cell.rel_value,
            Normalization::Row => cell.row_rel_value,
            Normalization::Column => cell.column_rel_value,
        };
    });
    stats.max_value = match mode {
        Normalization::None => stats.max_joint_probability,
        Normalization::Row => stats.max_joint_probability * stats.row_rescale_multiplier,
        Normalization::Column => stats.max_joint_probability * stats.column_rescale_multiplier,
    };

    stats.max_row_value = element_values(
        &mut state.rows.elements,
        mode.normalizes(Axis::Row),
        stats.max_row_marginal_probability,
    );
    stats.max_column_value = element_values(
        &mut state.columns.elements,
        mode.normalizes(Axis::Column),
        stats.max_column_marginal_probability,
    );
}

/// Normalized axes show full bars; returns the axis display maximum
fn element_values(elements: &mut [AxisElement], normalized: bool, max_marginal: f64) -> f64 {
    for element in elements.iter_mut() {
        element.value = if normalized { 1.0 } else { element.rel_value };
    }
    if normalized {
        1.0
    } else {
        max_marginal
    }
}

/// Visible/stay/enter/exit flags against the previous visibility
fn update_transitions(state: &mut MatrixState, parallel: bool) {
    for axis in [&mut state.rows, &mut state.columns] {
        let AxisState { elements, visibilities, .. } = axis;
        for element in elements.iter_mut() {
            element.visibility.advance(visibilities[element.index]);
        }
    }

    let rows = &state.rows.visibilities;
    let columns = &state.columns.visibilities;
    for_each_cell(&mut state.cells, parallel, |cell| {
        cell.visibility
            .advance(rows[cell.row_index] && columns[cell.column_index]);
    });
}

/// Visible index lists and interpolated positions, propagated to elements
/// and cells
fn update_positions(state: &mut MatrixState, parallel: bool) {
    for axis in [&mut state.rows, &mut state.columns] {
        axis.visible_indexes = visible_indexes(&axis.ordering, &axis.visibilities);
        axis.positions = interpolate_positions(&axis.ordering, &axis.visibilities);
        let AxisState { elements, positions, .. } = axis;
        for element in elements.iter_mut() {
            element.position = positions[element.index];
        }
    }

    let rows = &state.rows.positions;
    let columns = &state.columns.positions;
    for_each_cell(&mut state.cells, parallel, |cell| {
        cell.row_position = rows[cell.row_index];
        cell.column_position = columns[cell.column_index];
    });
}

/// Merge highlights into selections and push the resulting IDs to cells,
/// elements and the opposite axis's cross-reference entries
fn update_select_ids(state: &mut MatrixState, parallel: bool) {
    for axis in [&mut state.rows, &mut state.columns] {
        axis.select_ids = selection::merge_highlights(&axis.selections, &axis.highlights);
        let AxisState { elements, select_ids, .. } = axis;
        for element in elements.iter_mut() {
            element.select_id = select_ids[element.index];
            element.is_selected = element.select_id >= 0;
        }
    }

    let rows = &state.rows.select_ids;
    let columns = &state.columns.select_ids;
    for_each_cell(&mut state.cells, parallel, |cell| {
        let row_id = rows[cell.row_index];
        let column_id = columns[cell.column_index];
        cell.is_selected = row_id >= 0 || column_id >= 0;
        cell.select_id = selection::cell_select_id(row_id, column_id);
    });

    let MatrixState { rows, columns, .. } = state;
    mark_cross_selections(&mut rows.elements, &columns.select_ids);
    mark_cross_selections(&mut columns.elements, &rows.select_ids);
}

fn mark_cross_selections(elements: &mut [AxisElement], opposite_select_ids: &[SelectId]) {
    for element in elements.iter_mut() {
        element.is_cross_selected = false;
        for entry in element.select_elements.iter_mut() {
            entry.select_id = opposite_select_ids[entry.index];
            entry.is_selected = entry.select_id >= 0;
            element.is_cross_selected |= entry.is_selected;
        }
    }
}

fn update_selected_indexes(state: &mut MatrixState) {
    for axis in [&mut state.rows, &mut state.columns] {
        let select_ids = &axis.select_ids;
        axis.selected_indexes = axis
            .ordering
            .iter()
            .copied()
            .filter(|&index| select_ids[index] >= 0)
            .collect();
    }
}

/// Weight that each selected element contributes to the elements of the
/// opposite axis.
///
/// Selected rows feed column elements with joint probabilities, except
/// under column normalization where they feed column-conditional values;
/// selected columns feed row elements likewise with row-conditional values
/// under row normalization. The bars then agree with the active view.
fn update_cross_reference_values(state: &mut MatrixState) {
    let MatrixState { normalization, column_dims, cells, rows, columns, .. } = state;
    let width = *column_dims;

    for element in rows.elements.iter_mut().chain(columns.elements.iter_mut()) {
        for entry in element.select_elements.iter_mut() {
            entry.value = 0.0;
        }
    }

    for (s, _) in rows.select_ids.iter().enumerate().filter(|&(_, &id)| id >= 0) {
        for (t, column) in columns.elements.iter_mut().enumerate() {
            let cell = &cells[s * width + t];
            column.select_elements[s].value += match normalization {
                Normalization::Column => cell.column_rel_value,
                _ => cell.rel_value,
            };
        }
    }
    for (t, _) in columns.select_ids.iter().enumerate().filter(|&(_, &id)| id >= 0) {
        for (s, row) in rows.elements.iter_mut().enumerate() {
            let cell = &cells[s * width + t];
            row.select_elements[t].value += match normalization {
                Normalization::Row => cell.row_rel_value,
                _ => cell.rel_value,
            };
        }
    }
}

/// Stack the cross-reference values of each element in the opposite
/// axis's display order.
fn update_cross_reference_spans(state: &mut MatrixState) {
    let MatrixState { rows, columns, .. } = state;
    stack_spans(&mut rows.elements, &columns.ordering);
    stack_spans(&mut columns.elements, &rows.ordering);
}

fn stack_spans(elements: &mut [AxisElement], opposite_ordering: &[usize]) {
    for element in elements.iter_mut() {
        let mut tally = 0.0;
        for &index in opposite_ordering {
            let entry = &mut element.select_elements[index];
            entry.start_value = tally;
            tally += entry.value;
            entry.end_value = tally;
        }
    }
}

fn update_labels(state: &mut MatrixState) {
    for axis in [&mut state.rows, &mut state.columns] {
        let AxisState { elements, labels, .. } = axis;
        for element in elements.iter_mut() {
            element.label = labels.get(element.index).cloned().unwrap_or_default();
        }
    }
}
