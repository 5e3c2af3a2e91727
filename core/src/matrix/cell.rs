//! Matrix cells, axis elements and cross-reference elements
//!
//! These are the read-only records consumed by the visualization. Field
//! names serialize in camelCase so that `MatrixState::attribute` produces
//! the same shapes the rendering layer already understands.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::Serialize;

use super::types::{Axis, SelectId, UNSELECTED};

/// Visibility transition flags, compared against the previous update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub is_visible: bool,
    /// Visible before and after
    pub is_stay: bool,
    /// Hidden before, visible now
    pub is_enter: bool,
    /// Visible before, hidden now
    pub is_exit: bool,
}

impl Transition {
    /// Move to a new visibility, deriving stay/enter/exit from the old one.
    pub fn advance(&mut self, is_visible: bool) {
        let was_visible = self.is_visible;
        *self = Self {
            is_visible,
            is_stay: is_visible && was_visible,
            is_enter: is_visible && !was_visible,
            is_exit: !is_visible && was_visible,
        };
    }
}

/// A single term-topic entry and its derived attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub row_index: usize,
    pub column_index: usize,

    /// Raw imported value
    pub abs_value: f64,

    /// Joint probability; sums to 1 over the whole matrix
    pub rel_value: f64,

    /// Value divided by its row total
    pub row_rel_value: f64,

    /// Value divided by its column total
    pub column_rel_value: f64,

    /// Displayed value under the active normalization
    pub value: f64,

    /// Rank by descending raw value (0 is the largest)
    pub ranking: usize,

    #[serde(flatten)]
    pub visibility: Transition,

    pub row_position: f64,
    pub column_position: f64,

    pub is_selected: bool,
    #[serde(rename = "selectID")]
    pub select_id: SelectId,
}

impl Cell {
    pub(crate) fn new(row_index: usize, column_index: usize, abs_value: f64) -> Self {
        Self {
            row_index,
            column_index,
            abs_value,
            rel_value: 0.0,
            row_rel_value: 0.0,
            column_rel_value: 0.0,
            value: 0.0,
            ranking: 0,
            visibility: Transition::default(),
            row_position: 0.0,
            column_position: 0.0,
            is_selected: false,
            select_id: UNSELECTED,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visibility.is_visible
    }
}

/// Accumulated weight that selected elements on the opposite axis
/// contribute to one axis element, used for stacked selection bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectElement {
    /// Index on the opposite axis
    pub index: usize,
    pub value: f64,
    /// Stack span, ordered by the opposite axis's current ordering
    pub start_value: f64,
    pub end_value: f64,
    pub is_selected: bool,
    #[serde(rename = "selectID")]
    pub select_id: SelectId,
}

impl SelectElement {
    fn new(index: usize) -> Self {
        Self {
            index,
            value: 0.0,
            start_value: 0.0,
            end_value: 0.0,
            is_selected: false,
            select_id: UNSELECTED,
        }
    }
}

/// Aggregate summary of one row (term) or column (topic)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisElement {
    #[serde(rename = "dataType")]
    pub axis: Axis,
    pub index: usize,

    /// Sum of the raw values along this element
    pub abs_value: f64,
    /// Share of the matrix total
    pub rel_value: f64,
    /// Rank by descending raw total
    pub ranking: usize,
    /// Displayed value under the active normalization
    pub value: f64,

    pub label: String,
    pub position: f64,

    #[serde(flatten)]
    pub visibility: Transition,

    pub is_selected: bool,
    /// Any element on the opposite axis is selected
    pub is_cross_selected: bool,
    #[serde(rename = "selectID")]
    pub select_id: SelectId,

    /// One entry per index on the opposite axis
    pub select_elements: Vec<SelectElement>,
}

impl AxisElement {
    pub(crate) fn new(axis: Axis, index: usize, abs_value: f64, opposite_dims: usize) -> Self {
        Self {
            axis,
            index,
            abs_value,
            rel_value: 0.0,
            ranking: 0,
            value: 0.0,
            label: String::new(),
            position: 0.0,
            visibility: Transition::default(),
            is_selected: false,
            is_cross_selected: false,
            select_id: UNSELECTED,
            select_elements: (0..opposite_dims).map(SelectElement::new).collect(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visibility.is_visible
    }
}
