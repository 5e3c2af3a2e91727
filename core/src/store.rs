//! Reactive term-topic matrix store
//!
//! `MatrixStore` owns the committed `MatrixState` and every mutator that
//! changes it. Mutators are synchronous and only buffer intent: each one
//! sanitizes its input against the latest (pending or committed) parameters,
//! writes the result into the pending buffer and restarts the debounce
//! window. Recomputation happens once per window, in `poll`, `flush` or
//! `settle`, and produces a fresh immutable snapshot shared with every
//! subscriber. Wrap the store in `SharedMatrixStore` to have the window
//! flushed automatically.
//!
//! ```ignore
//! let mut store = MatrixStore::new();
//! store
//!     .import_matrix(&[vec![5.0, 7.0, 13.0, 1.0], vec![0.0, 11.0, 2.0]], Some(3), Some(5))
//!     .show_columns(&[3, 1, 2])
//!     .select_row(1, None);
//! store.settle().await;
//! assert_eq!(store.state().columns().visible_indexes(), &[1, 2, 3]);
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::sync::Arc;

use log::{debug, trace, warn};
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::axis::{sanitize, selection};
use crate::config::MatrixStoreConfig;
use crate::error::Result;
use crate::matrix::{Axis, MatrixEntry, MatrixState, Normalization, RawMatrix, SelectId, HIGHLIGHT, UNSELECTED};
use crate::reactive::recompute::recompute;
use crate::reactive::{Debouncer, EventBus, FlushReport, PendingUpdates, UpdateEvent};

/// Term-topic matrix with deferred, batched recomputation
#[derive(Debug)]
pub struct MatrixStore {
    /// Store behavior
    config: MatrixStoreConfig,

    /// Last committed snapshot
    state: Arc<MatrixState>,

    /// Writes since the last flush
    pending: PendingUpdates,

    /// Flush deadline tracking
    debouncer: Debouncer,

    /// Update notification fan-out
    events: EventBus,
}

impl Default for MatrixStore {
    fn default() -> Self {
        Self::from_valid_config(MatrixStoreConfig::default())
    }
}

impl MatrixStore {
    /// Empty 0x0 store with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MatrixStoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: MatrixStoreConfig) -> Self {
        Self {
            debouncer: Debouncer::new(config.debounce()),
            events: EventBus::new(config.event_capacity),
            state: Arc::new(MatrixState::default()),
            pending: PendingUpdates::default(),
            config,
        }
    }

    pub fn config(&self) -> &MatrixStoreConfig {
        &self.config
    }

    /// Committed state. Buffered mutations are not visible here until the
    /// next flush.
    pub fn state(&self) -> &MatrixState {
        &self.state
    }

    /// Shared handle to the committed state
    pub fn snapshot(&self) -> Arc<MatrixState> {
        Arc::clone(&self.state)
    }

    /// Receive one `UpdateEvent` per kind of update on every flush, followed
    /// by the aggregate `updated` event
    pub fn subscribe(&self) -> broadcast::Receiver<UpdateEvent> {
        self.events.subscribe()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// When the scheduled flush becomes due, if one is scheduled
    pub fn flush_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    // ---------------------------------------------------------------------
    // Flushing

    /// Flush if the debounce window has elapsed
    pub fn poll(&mut self) -> Option<FlushReport> {
        if self.debouncer.is_due() {
            Some(self.flush())
        } else {
            None
        }
    }

    /// Apply all buffered writes now, regardless of the debounce window.
    ///
    /// Commits a new snapshot and notifies subscribers only when at least
    /// one attribute actually changed.
    pub fn flush(&mut self) -> FlushReport {
        self.debouncer.clear();
        if self.pending.is_empty() {
            return FlushReport::default();
        }

        let pending = std::mem::take(&mut self.pending);
        let (next, report) = recompute(
            &self.state,
            pending,
            self.config.min_value_threshold,
            self.config.parallel_recompute,
        );
        if report.is_empty() {
            trace!("Flush found no effective changes");
            return report;
        }

        self.state = Arc::new(next);
        self.events.publish(&report, &self.state);
        report
    }

    /// Wait out the debounce window, then flush
    pub async fn settle(&mut self) -> FlushReport {
        if let Some(deadline) = self.debouncer.deadline() {
            tokio::time::sleep_until(deadline).await;
        }
        self.flush()
    }

    fn schedule(&mut self) -> &mut Self {
        self.debouncer.schedule();
        self
    }

    // ---------------------------------------------------------------------
    // Reads through the pending buffer

    fn dims(&self, axis: Axis) -> usize {
        match self.pending.matrix.value() {
            Some(raw) => raw.dims(axis),
            None => self.state.dims(axis),
        }
    }

    fn ordering(&self, axis: Axis) -> &[usize] {
        self.pending.axis(axis).ordering.read(&self.state.axis(axis).ordering)
    }

    fn selections(&self, axis: Axis) -> &[SelectId] {
        self.pending.axis(axis).selections.read(&self.state.axis(axis).selections)
    }

    fn highlights(&self, axis: Axis) -> &[bool] {
        self.pending.axis(axis).highlights.read(&self.state.axis(axis).highlights)
    }

    fn label_prefix(&self, axis: Axis) -> &str {
        match axis {
            Axis::Row => &self.config.row_label_prefix,
            Axis::Column => &self.config.column_label_prefix,
        }
    }

    // ---------------------------------------------------------------------
    // Import

    /// Load a dense matrix. Dimensions default to the number of rows and
    /// the longest row; missing cells read as 0 and extra cells are dropped.
    pub fn import_matrix<R: AsRef<[f64]>>(
        &mut self,
        rows: &[R],
        row_dims: Option<usize>,
        column_dims: Option<usize>,
    ) -> &mut Self {
        self.init_matrix(RawMatrix::from_rows(rows, row_dims, column_dims))
    }

    /// Load `{rowIndex, columnIndex, value}` entries. Dimensions default to
    /// the largest index plus one.
    pub fn import_entries(
        &mut self,
        entries: &[MatrixEntry],
        row_dims: Option<usize>,
        column_dims: Option<usize>,
    ) -> &mut Self {
        self.init_matrix(RawMatrix::from_entries(entries, row_dims, column_dims))
    }

    /// Load either input format from JSON: an array of numeric rows or an
    /// array of entry objects.
    pub fn import_json(
        &mut self,
        json: &Value,
        row_dims: Option<usize>,
        column_dims: Option<usize>,
    ) -> Result<&mut Self> {
        let raw = RawMatrix::from_json(json, row_dims, column_dims)?;
        Ok(self.init_matrix(raw))
    }

    /// Replace the matrix and reset every parameter to its default for the
    /// new dimensions
    fn init_matrix(&mut self, raw: RawMatrix) -> &mut Self {
        debug!("Importing {}x{} matrix", raw.row_dims(), raw.column_dims());
        for axis in [Axis::Row, Axis::Column] {
            let n = raw.dims(axis);
            let labels = sanitize::complete_labels(Vec::<String>::new(), n, self.label_prefix(axis));
            let slots = self.pending.axis_mut(axis);
            slots.visibilities.set(sanitize::show_all(n));
            slots.ordering.set(sanitize::identity_ordering(n));
            slots.selections.set(selection::select_none(n));
            slots.highlights.set(selection::highlight_none(n));
            slots.labels.set(labels);
        }
        self.pending.normalization.set(Normalization::None);
        self.pending.matrix.set(raw);
        self.schedule()
    }

    // ---------------------------------------------------------------------
    // Normalization

    pub fn normalize(&mut self, normalization: Normalization) -> &mut Self {
        self.pending.normalization.set(normalization);
        self.schedule()
    }

    /// Normalize by name (`"none"`, `"row"`, `"column"`). Unknown names
    /// leave the store untouched.
    pub fn normalize_named(&mut self, name: &str) -> &mut Self {
        match Normalization::parse(name) {
            Some(normalization) => self.normalize(normalization),
            None => {
                warn!("Ignoring unknown normalization '{}'", name);
                self
            }
        }
    }

    // ---------------------------------------------------------------------
    // Visibility

    /// Show only the listed rows; an empty list shows every row.
    pub fn show_rows(&mut self, indexes: &[usize]) -> &mut Self {
        self.show(Axis::Row, indexes)
    }

    /// Show only the listed columns; an empty list shows every column.
    pub fn show_columns(&mut self, indexes: &[usize]) -> &mut Self {
        self.show(Axis::Column, indexes)
    }

    fn show(&mut self, axis: Axis, indexes: &[usize]) -> &mut Self {
        let visibilities = sanitize::visibilities_from_indexes(indexes, self.dims(axis));
        self.pending.axis_mut(axis).visibilities.set(visibilities);
        self.schedule()
    }

    // ---------------------------------------------------------------------
    // Ordering

    /// Display rows in the given order. Duplicates and out-of-range
    /// indexes are dropped; omitted rows follow in ascending order.
    pub fn order_rows(&mut self, indexes: &[usize]) -> &mut Self {
        self.order(Axis::Row, indexes)
    }

    pub fn order_columns(&mut self, indexes: &[usize]) -> &mut Self {
        self.order(Axis::Column, indexes)
    }

    fn order(&mut self, axis: Axis, indexes: &[usize]) -> &mut Self {
        let ordering = sanitize::complete_ordering(indexes, self.dims(axis));
        self.pending.axis_mut(axis).ordering.set(ordering);
        self.schedule()
    }

    /// Move a row to just after `anchor`, or to the end without one
    pub fn move_row_after(&mut self, index: usize, anchor: Option<usize>) -> &mut Self {
        self.move_element(Axis::Row, index, anchor, sanitize::move_after)
    }

    /// Move a row to just before `anchor`, or to the start without one
    pub fn move_row_before(&mut self, index: usize, anchor: Option<usize>) -> &mut Self {
        self.move_element(Axis::Row, index, anchor, sanitize::move_before)
    }

    pub fn move_column_after(&mut self, index: usize, anchor: Option<usize>) -> &mut Self {
        self.move_element(Axis::Column, index, anchor, sanitize::move_after)
    }

    pub fn move_column_before(&mut self, index: usize, anchor: Option<usize>) -> &mut Self {
        self.move_element(Axis::Column, index, anchor, sanitize::move_before)
    }

    fn move_element(
        &mut self,
        axis: Axis,
        index: usize,
        anchor: Option<usize>,
        reorder: fn(&[usize], usize, Option<usize>) -> Vec<usize>,
    ) -> &mut Self {
        let ordering = reorder(self.ordering(axis), index, anchor);
        self.pending.axis_mut(axis).ordering.set(ordering);
        self.schedule()
    }

    // ---------------------------------------------------------------------
    // Selection

    /// Select a row under `select_id`, or under the lowest unused positive
    /// ID when none (or the reserved highlight ID) is given
    pub fn select_row(&mut self, index: usize, select_id: Option<SelectId>) -> &mut Self {
        self.select(Axis::Row, index, select_id)
    }

    pub fn select_column(&mut self, index: usize, select_id: Option<SelectId>) -> &mut Self {
        self.select(Axis::Column, index, select_id)
    }

    fn select(&mut self, axis: Axis, index: usize, select_id: Option<SelectId>) -> &mut Self {
        let selections = self.selections(axis);
        let select_id = match select_id {
            Some(id) if id != HIGHLIGHT => Some(id),
            _ => selection::next_available_select_id(selections),
        };
        let Some(select_id) = select_id else {
            debug!("No select ID left for {} {}", axis, index);
            return self;
        };
        let selections = selection::insert_selection(selections, index, select_id);
        self.pending.axis_mut(axis).selections.set(selections);
        self.schedule()
    }

    pub fn deselect_row(&mut self, index: usize) -> &mut Self {
        self.deselect(Axis::Row, index)
    }

    pub fn deselect_column(&mut self, index: usize) -> &mut Self {
        self.deselect(Axis::Column, index)
    }

    fn deselect(&mut self, axis: Axis, index: usize) -> &mut Self {
        let selections = selection::remove_selection(self.selections(axis), index);
        self.pending.axis_mut(axis).selections.set(selections);
        self.schedule()
    }

    pub fn deselect_all_rows(&mut self) -> &mut Self {
        self.deselect_all(Axis::Row)
    }

    pub fn deselect_all_columns(&mut self) -> &mut Self {
        self.deselect_all(Axis::Column)
    }

    fn deselect_all(&mut self, axis: Axis) -> &mut Self {
        let selections = selection::select_none(self.dims(axis));
        self.pending.axis_mut(axis).selections.set(selections);
        self.schedule()
    }

    /// Deselect a selected row, otherwise select it
    pub fn toggle_row(&mut self, index: usize, select_id: Option<SelectId>) -> &mut Self {
        self.toggle(Axis::Row, index, select_id)
    }

    pub fn toggle_column(&mut self, index: usize, select_id: Option<SelectId>) -> &mut Self {
        self.toggle(Axis::Column, index, select_id)
    }

    fn toggle(&mut self, axis: Axis, index: usize, select_id: Option<SelectId>) -> &mut Self {
        let selected = matches!(self.selections(axis).get(index), Some(&id) if id != UNSELECTED);
        if selected {
            self.deselect(axis, index)
        } else {
            self.select(axis, index, select_id)
        }
    }

    // ---------------------------------------------------------------------
    // Highlight

    pub fn highlight_row(&mut self, index: usize) -> &mut Self {
        self.highlight(Axis::Row, index)
    }

    pub fn highlight_column(&mut self, index: usize) -> &mut Self {
        self.highlight(Axis::Column, index)
    }

    fn highlight(&mut self, axis: Axis, index: usize) -> &mut Self {
        let highlights = selection::insert_highlight(self.highlights(axis), index);
        self.pending.axis_mut(axis).highlights.set(highlights);
        self.schedule()
    }

    pub fn unhighlight_all_rows(&mut self) -> &mut Self {
        self.unhighlight_all(Axis::Row)
    }

    pub fn unhighlight_all_columns(&mut self) -> &mut Self {
        self.unhighlight_all(Axis::Column)
    }

    fn unhighlight_all(&mut self, axis: Axis) -> &mut Self {
        let highlights = selection::highlight_none(self.dims(axis));
        self.pending.axis_mut(axis).highlights.set(highlights);
        self.schedule()
    }

    // ---------------------------------------------------------------------
    // Labels

    /// Label rows in index order; rows beyond the given labels get
    /// generated ones ("Term #3", ...)
    pub fn label_rows<I, S>(&mut self, labels: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.label(Axis::Row, labels)
    }

    pub fn label_columns<I, S>(&mut self, labels: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.label(Axis::Column, labels)
    }

    fn label<I, S>(&mut self, axis: Axis, labels: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = sanitize::complete_labels(labels, self.dims(axis), self.label_prefix(axis));
        self.pending.axis_mut(axis).labels.set(labels);
        self.schedule()
    }

    // ---------------------------------------------------------------------
    // Export

    /// Displayed cell values of the committed state, placed by ordering:
    /// the value at index `n` lands in slot `ordering[n]` on both axes.
    pub fn export_matrix(&self) -> Vec<Vec<f64>> {
        let state = &self.state;
        let row_ordering = state.rows().ordering();
        let column_ordering = state.columns().ordering();

        let mut matrix = vec![Vec::new(); state.row_dims()];
        for (s, row) in state.full_matrix().enumerate() {
            let mut values = vec![0.0; row.len()];
            for (t, cell) in row.iter().enumerate() {
                values[column_ordering[t]] = cell.value;
            }
            matrix[row_ordering[s]] = values;
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::UpdateKind;
    use approx::assert_relative_eq;
    use serde_json::json;
    use std::time::Duration;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn data() -> Vec<Vec<f64>> {
        vec![vec![5.0, 7.0, 13.0, 1.0], vec![0.0, 11.0, 2.0]]
    }

    fn imported() -> MatrixStore {
        init_logging();
        let mut store = MatrixStore::new();
        store.import_matrix(&data(), Some(3), Some(5)).flush();
        store
    }

    fn sorted(kinds: &[UpdateKind]) -> Vec<&'static str> {
        let mut names: Vec<_> = kinds.iter().map(|kind| kind.event_name()).collect();
        names.sort_unstable();
        names
    }

    #[test]
    fn test_empty_store() {
        init_logging();
        let mut store = MatrixStore::new();
        assert_eq!(store.state().row_dims(), 0);
        assert_eq!(store.state().column_dims(), 0);
        assert_eq!(store.state().entries().len(), 0);
        assert_eq!(store.state().full_matrix().count(), 0);
        assert_eq!(store.state().sparse_matrix().len(), 0);
        assert_eq!(store.state().rows().visible_dims(), 0);
        assert!(store.flush().is_empty());
        assert!(store.export_matrix().is_empty());
    }

    #[test]
    fn test_import_dense_matrix() {
        init_logging();
        let mut store = MatrixStore::new();
        let report = store.import_matrix(&data(), Some(3), Some(5)).flush();

        assert_eq!(
            sorted(report.kinds()),
            vec![
                "updated:data",
                "updated:label",
                "updated:normalization",
                "updated:ordering",
                "updated:selection",
                "updated:visibility",
            ]
        );
        let state = store.state();
        assert_eq!(state.row_dims(), 3);
        assert_eq!(state.column_dims(), 5);
        assert_eq!(state.entries().len(), 15);
        assert_eq!(state.full_matrix().count(), 3);
        assert!(state.full_matrix().all(|row| row.len() == 5));
        assert_eq!(state.sparse_matrix().len(), 6);
        assert_eq!(state.rows().visible_dims(), 3);
        assert_eq!(state.columns().visible_dims(), 5);
        assert_eq!(state.columns().labels()[4], "Topic #5");
        assert!(!store.has_pending());
    }

    #[test]
    fn test_import_entries_infers_dims() {
        init_logging();
        let entries = [
            MatrixEntry::new(0, 0, 5.0),
            MatrixEntry::new(2, 1, 3.0),
            MatrixEntry::new(1, 3, 2.0),
        ];
        let mut store = MatrixStore::new();
        store.import_entries(&entries, None, None).flush();
        assert_eq!(store.state().row_dims(), 3);
        assert_eq!(store.state().column_dims(), 4);
        assert_eq!(store.state().cell(2, 1).map(|cell| cell.abs_value), Some(3.0));
    }

    #[test]
    fn test_import_json_formats() {
        init_logging();
        let mut store = MatrixStore::new();
        store.import_json(&json!([[1.0, 2.0], [3.0]]), None, None).unwrap();
        store.flush();
        assert_eq!(store.state().column_dims(), 2);

        store
            .import_json(&json!([{ "rowIndex": 1, "columnIndex": 0, "value": 4.0 }]), None, Some(3))
            .unwrap();
        store.flush();
        assert_eq!(store.state().row_dims(), 2);
        assert_eq!(store.state().column_dims(), 3);

        assert!(store.import_json(&json!({ "rows": [] }), None, None).is_err());
        assert!(!store.has_pending());
    }

    #[test]
    fn test_import_json_rejects_out_of_range_indexes() {
        let mut store = imported();
        let huge_row = json!([{ "rowIndex": 1e30, "columnIndex": 0, "value": 1.0 }]);
        let huge_dims = json!([{ "rowIndex": 1e18, "columnIndex": 3, "value": 1.0 }]);
        assert!(store.import_json(&huge_row, None, None).is_err());
        assert!(store.import_json(&huge_dims, None, None).is_err());
        assert!(store.import_json(&json!([[1.0]]), Some(usize::MAX), Some(usize::MAX)).is_err());

        assert!(!store.has_pending());
        assert!(store.flush().is_empty());
        assert_eq!((store.state().row_dims(), store.state().column_dims()), (3, 5));
    }

    #[test]
    fn test_visibility() {
        let mut store = imported();
        let report = store.show_rows(&[0, 1]).show_columns(&[3, 1, 2]).flush();

        assert_eq!(
            report.kinds(),
            &[UpdateKind::Visibility, UpdateKind::Ordering, UpdateKind::Selection]
        );
        let state = store.state();
        assert_eq!(state.rows().visible_dims(), 2);
        assert_eq!(state.columns().visible_dims(), 3);
        assert_eq!(state.rows().visible_indexes(), &[0, 1]);
        assert_eq!(state.columns().visible_indexes(), &[1, 2, 3]);

        let rows: Vec<bool> = state.row_elements().iter().map(|e| e.is_visible()).collect();
        assert_eq!(rows, vec![true, true, false]);
        let columns: Vec<bool> = state.column_elements().iter().map(|e| e.is_visible()).collect();
        assert_eq!(columns, vec![false, true, true, true, false]);
    }

    #[test]
    fn test_show_empty_list_shows_all() {
        let mut store = imported();
        store.show_columns(&[0]).flush();
        store.show_columns(&[]).flush();
        assert_eq!(store.state().columns().visible_dims(), 5);
    }

    #[test]
    fn test_ordering() {
        let mut store = imported();
        let report = store.order_rows(&[1, 0]).order_columns(&[3, 1, 4, 2]).flush();

        assert_eq!(report.kinds(), &[UpdateKind::Ordering]);
        let state = store.state();
        assert_eq!(state.rows().ordering(), &[1, 0, 2]);
        assert_eq!(state.columns().ordering(), &[3, 1, 4, 2, 0]);
        assert_eq!(state.rows().visible_indexes(), &[1, 0, 2]);
        assert_eq!(state.columns().visible_indexes(), &[3, 1, 4, 2, 0]);

        let rows: Vec<f64> = state.row_elements().iter().map(|e| e.position).collect();
        assert_eq!(rows, vec![1.0, 0.0, 2.0]);
        let columns: Vec<f64> = state.column_elements().iter().map(|e| e.position).collect();
        assert_eq!(columns, vec![4.0, 1.0, 3.0, 0.0, 2.0]);
    }

    #[test]
    fn test_ordering_sanitized_to_permutation() {
        let mut store = imported();
        store.order_columns(&[9, 2, 2, 4]).flush();
        let mut ordering = store.state().columns().ordering().to_vec();
        assert_eq!(ordering, vec![2, 4, 0, 1, 3]);
        ordering.sort_unstable();
        assert_eq!(ordering, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_move_row_and_column() {
        let mut store = imported();
        store
            .move_row_after(0, Some(2))
            .move_column_before(4, Some(1))
            .move_column_after(0, None)
            .flush();
        assert_eq!(store.state().rows().ordering(), &[1, 2, 0]);
        assert_eq!(store.state().columns().ordering(), &[4, 1, 2, 3, 0]);

        store.move_row_before(0, None).flush();
        assert_eq!(store.state().rows().ordering(), &[0, 1, 2]);
    }

    #[test]
    fn test_selections() {
        let mut store = imported();
        let report = store
            .select_row(1, None)
            .select_column(2, None)
            .select_column(3, None)
            .select_column(0, None)
            .deselect_column(3)
            .flush();

        assert_eq!(report.kinds(), &[UpdateKind::Selection]);
        let state = store.state();
        assert_eq!(state.rows().selections().len(), 3);
        assert_eq!(state.columns().selections().len(), 5);
        assert_eq!(state.rows().selected_indexes(), &[1]);
        assert_eq!(state.columns().selected_indexes(), &[0, 2]);
        assert_eq!(state.rows().select_ids(), &[-1, 1, -1]);
        assert_eq!(state.columns().select_ids(), &[3, -1, 1, -1, -1]);

        let selected: Vec<bool> = state.column_elements().iter().map(|e| e.is_selected).collect();
        assert_eq!(selected, vec![true, false, true, false, false]);
        let ids: Vec<SelectId> = state.row_elements().iter().map(|e| e.select_id).collect();
        assert_eq!(ids, vec![-1, 1, -1]);

        // Row 1 and column 2 cross at a cell selected from both sides.
        let cell = state.cell(1, 2).unwrap();
        assert!(cell.is_selected);
        assert_eq!(cell.select_id, 1);
        assert_eq!(state.cell(2, 0).unwrap().select_id, 3);
        assert!(!state.cell(2, 1).unwrap().is_selected);
    }

    #[test]
    fn test_selections_highlights_and_ordering() {
        let mut store = imported();
        let report = store
            .select_row(1, None)
            .select_column(2, None)
            .select_column(3, None)
            .select_column(0, None)
            .deselect_column(3)
            .highlight_row(4)
            .highlight_column(1)
            .unhighlight_all_rows()
            .order_columns(&[4, 3, 2, 1, 0])
            .flush();

        assert_eq!(report.kinds(), &[UpdateKind::Ordering, UpdateKind::Selection]);
        let state = store.state();
        assert_eq!(state.rows().selected_indexes(), &[1]);
        assert_eq!(state.columns().selected_indexes(), &[2, 1, 0]);
        assert_eq!(state.rows().select_ids(), &[-1, 1, -1]);
        assert_eq!(state.columns().select_ids(), &[3, 0, 1, -1, -1]);

        let selected: Vec<bool> = state.column_elements().iter().map(|e| e.is_selected).collect();
        assert_eq!(selected, vec![true, true, true, false, false]);
        assert_eq!(state.cell(1, 1).unwrap().select_id, HIGHLIGHT);
    }

    #[test]
    fn test_select_then_deselect_restores() {
        let mut store = imported();
        store.select_row(2, None).flush();
        assert_eq!(store.state().rows().selected_indexes(), &[2]);

        store.deselect_row(2).flush();
        assert_eq!(store.state().rows().select_ids()[2], UNSELECTED);
        assert!(store.state().rows().selected_indexes().is_empty());
    }

    #[test]
    fn test_explicit_and_exhausted_select_ids() {
        let mut store = imported();
        store.select_row(0, Some(7)).select_row(1, Some(0)).flush();
        assert_eq!(store.state().rows().selections(), &[7, 1, -1]);

        // IDs are handed out only up to the row count.
        store.select_row(2, None).select_row(0, None).flush();
        assert_eq!(store.state().rows().selections(), &[3, 1, 2]);
        let before = store.state().rows().selections().to_vec();
        let report = store.select_row(1, None).flush();
        assert!(report.is_empty());
        assert_eq!(store.state().rows().selections(), before.as_slice());
    }

    #[test]
    fn test_toggle() {
        let mut store = imported();
        store.toggle_column(3, None).toggle_column(1, Some(2)).flush();
        assert_eq!(store.state().columns().selections(), &[-1, 2, -1, 1, -1]);

        store.toggle_column(3, None).flush();
        assert_eq!(store.state().columns().selected_indexes(), &[1]);
    }

    #[test]
    fn test_highlight_is_separate_from_selection() {
        let mut store = imported();
        store.select_row(0, None).highlight_row(0).flush();
        assert_eq!(store.state().rows().select_ids()[0], HIGHLIGHT);
        assert_eq!(store.state().rows().selections()[0], 1);

        store.unhighlight_all_rows().flush();
        assert_eq!(store.state().rows().select_ids()[0], 1);
    }

    #[test]
    fn test_labels() {
        let mut store = imported();
        let report = store
            .label_rows(["alice", "bob"])
            .label_columns(vec!["first".to_string(), "second".into(), "third".into()])
            .flush();

        assert_eq!(report.kinds(), &[UpdateKind::Label]);
        let state = store.state();
        assert_eq!(state.rows().labels(), &["alice", "bob", "Term #3"]);
        assert_eq!(
            state.columns().labels(),
            &["first", "second", "third", "Topic #4", "Topic #5"]
        );
        assert_eq!(state.column_elements()[3].label, "Topic #4");
    }

    #[test]
    fn test_custom_label_prefixes() {
        init_logging();
        let config = MatrixStoreConfig {
            row_label_prefix: "Word".to_string(),
            parallel_recompute: false,
            ..MatrixStoreConfig::default()
        };
        let mut store = MatrixStore::with_config(config).unwrap();
        store.import_matrix(&data(), None, None).flush();
        assert_eq!(store.state().rows().labels(), &["Word #1", "Word #2"]);
        assert_eq!(store.state().columns().labels()[0], "Topic #1");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MatrixStoreConfig {
            event_capacity: 0,
            ..MatrixStoreConfig::default()
        };
        assert!(MatrixStore::with_config(config).is_err());
    }

    #[test]
    fn test_normalization() {
        let mut store = imported();
        store.normalize_named("diagonal").flush();
        assert_eq!(store.state().normalization(), Normalization::None);

        let report = store.normalize_named("row").flush();
        assert_eq!(report.kinds(), &[UpdateKind::Normalization]);
        for (s, row) in store.state().full_matrix().enumerate().take(2) {
            let total: f64 = row.iter().map(|cell| cell.value).sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-12);
            assert_eq!(store.state().row_elements()[s].value, 1.0);
        }
    }

    #[test]
    fn test_no_op_mutations_fire_nothing() {
        let mut store = imported();
        let mut receiver = store.subscribe();
        let report = store
            .normalize(Normalization::None)
            .show_rows(&[])
            .order_columns(&[0, 1, 2, 3, 4])
            .deselect_all_rows()
            .unhighlight_all_columns()
            .label_rows(["Term #1"])
            .flush();

        assert!(report.is_empty());
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_mutations_compose_within_window() {
        let mut store = imported();
        store.order_rows(&[2, 1, 0]).move_row_after(2, Some(0)).flush();
        assert_eq!(store.state().rows().ordering(), &[1, 0, 2]);

        // A re-import in the same window resets earlier writes.
        store.select_row(0, None).import_matrix(&[vec![1.0]], None, None);
        store.select_column(0, None).flush();
        assert_eq!(store.state().rows().select_ids(), &[-1]);
        assert_eq!(store.state().columns().select_ids(), &[1]);
    }

    #[test]
    fn test_export_follows_ordering_and_normalization() {
        let mut store = MatrixStore::new();
        store
            .import_matrix(&[vec![1.0, 2.0], vec![3.0, 4.0]], None, None)
            .order_rows(&[1, 0])
            .normalize(Normalization::Row)
            .flush();

        let exported = store.export_matrix();
        assert_eq!(exported.len(), 2);
        assert_relative_eq!(exported[0][0], 3.0 / 7.0);
        assert_relative_eq!(exported[0][1], 4.0 / 7.0);
        assert_relative_eq!(exported[1][0], 1.0 / 3.0);
        assert_relative_eq!(exported[1][1], 2.0 / 3.0);
    }

    #[test]
    fn test_attributes_by_name() {
        let store = imported();
        let state = store.state();
        assert_eq!(state.attribute("rowDims"), Some(json!(3)));
        assert_eq!(state.attribute("columnVisibleIndexes"), Some(json!([0, 1, 2, 3, 4])));
        assert_eq!(state.attribute("rowLabels"), Some(json!(["Term #1", "Term #2", "Term #3"])));
        assert_eq!(state.attribute("normalization"), Some(json!("none")));
        assert!(state.attribute("unknownAttribute").is_none());
    }

    #[test]
    fn test_subscribers_receive_kinds_then_aggregate() {
        init_logging();
        let mut store = MatrixStore::new();
        let mut receiver = store.subscribe();
        store.import_matrix(&data(), Some(3), Some(5)).flush();

        let mut names = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            assert!(Arc::ptr_eq(&event.snapshot, &store.snapshot()));
            names.push(event.name());
        }
        assert_eq!(names.len(), 7);
        assert_eq!(names.last(), Some(&"updated"));
        assert_eq!(names.iter().filter(|name| **name == "updated:data").count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_coalesces_burst() {
        init_logging();
        let mut store = MatrixStore::new();
        store.import_matrix(&data(), Some(3), Some(5));
        assert!(store.poll().is_none());
        assert_eq!(store.state().row_dims(), 0);

        tokio::time::advance(Duration::from_millis(6)).await;
        store.select_row(0, None);
        tokio::time::advance(Duration::from_millis(6)).await;
        assert!(store.poll().is_none());

        tokio::time::advance(Duration::from_millis(4)).await;
        let report = store.poll().expect("window elapsed");
        assert!(report.contains(UpdateKind::Data));
        assert_eq!(store.state().rows().selected_indexes(), &[0]);
        assert!(store.flush_deadline().is_none());
        assert!(store.poll().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_waits_for_window() {
        init_logging();
        let mut store = MatrixStore::new();
        let start = Instant::now();
        store.import_matrix(&data(), None, None).show_columns(&[1]);

        let report = store.settle().await;
        assert!(start.elapsed() >= store.config().debounce());
        assert!(report.contains(UpdateKind::Visibility));
        assert_eq!(store.state().columns().visible_indexes(), &[1]);

        assert!(store.settle().await.is_empty());
    }
}
