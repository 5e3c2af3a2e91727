//! Pending-update buffer
//!
//! Mutators never write committed state. They write a `Pending` slot per
//! attribute, and reads made while building the next write go through the
//! slot first (`read`), so several mutations inside one debounce window
//! compose. At flush time `is_changed` tells the recompute pass whether an
//! attribute really moved: a slot rewritten with content equal to the
//! committed value counts as unchanged.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use crate::matrix::{Axis, Normalization, RawMatrix, SelectId};

/// A buffered write to one attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Pending<T>(Option<T>);

impl<T> Default for Pending<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T: PartialEq> Pending<T> {
    pub fn set(&mut self, value: T) {
        self.0 = Some(value);
    }

    pub fn is_pending(&self) -> bool {
        self.0.is_some()
    }

    pub fn value(&self) -> Option<&T> {
        self.0.as_ref()
    }

    /// The buffered value if any, otherwise `committed`
    pub fn read<'a>(&'a self, committed: &'a T) -> &'a T {
        self.0.as_ref().unwrap_or(committed)
    }

    /// Whether a buffered value exists and differs structurally from
    /// `committed`
    pub fn is_changed(&self, committed: &T) -> bool {
        matches!(&self.0, Some(value) if value != committed)
    }

    pub fn take(&mut self) -> Option<T> {
        self.0.take()
    }

    /// Move the buffered value, if any, into `target`
    pub fn commit_into(&mut self, target: &mut T) {
        if let Some(value) = self.0.take() {
            *target = value;
        }
    }
}

/// Buffered parameters for one axis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingAxis {
    pub visibilities: Pending<Vec<bool>>,
    pub ordering: Pending<Vec<usize>>,
    pub selections: Pending<Vec<SelectId>>,
    pub highlights: Pending<Vec<bool>>,
    pub labels: Pending<Vec<String>>,
}

impl PendingAxis {
    pub fn is_empty(&self) -> bool {
        !(self.visibilities.is_pending()
            || self.ordering.is_pending()
            || self.selections.is_pending()
            || self.highlights.is_pending()
            || self.labels.is_pending())
    }
}

/// All buffered writes since the last flush
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingUpdates {
    pub matrix: Pending<RawMatrix>,
    pub normalization: Pending<Normalization>,
    pub rows: PendingAxis,
    pub columns: PendingAxis,
}

impl PendingUpdates {
    pub fn is_empty(&self) -> bool {
        !self.matrix.is_pending()
            && !self.normalization.is_pending()
            && self.rows.is_empty()
            && self.columns.is_empty()
    }

    pub fn axis(&self, axis: Axis) -> &PendingAxis {
        match axis {
            Axis::Row => &self.rows,
            Axis::Column => &self.columns,
        }
    }

    pub fn axis_mut(&mut self, axis: Axis) -> &mut PendingAxis {
        match axis {
            Axis::Row => &mut self.rows,
            Axis::Column => &mut self.columns,
        }
    }
}
