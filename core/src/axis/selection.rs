//! Selection and highlight vectors
//!
//! Selections hold a positive select ID per selected element and `-1`
//! elsewhere. Highlights are a separate boolean vector; when the two are
//! merged for display a highlight always wins and reads as ID `0`.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;

use crate::matrix::{SelectId, HIGHLIGHT, UNSELECTED};

/// Nothing selected
pub fn select_none(n: usize) -> Vec<SelectId> {
    vec![UNSELECTED; n]
}

/// Nothing highlighted
pub fn highlight_none(n: usize) -> Vec<bool> {
    vec![false; n]
}

/// Smallest positive select ID not already used in `selections`.
///
/// Only IDs up to `selections.len()` are considered; when every one of
/// them is taken there is no element left to select and `None` results.
pub fn next_available_select_id(selections: &[SelectId]) -> Option<SelectId> {
    let n = selections.len();
    let mut used = vec![false; n + 1];
    for &id in selections {
        if id > 0 && (id as usize) <= n {
            used[id as usize] = true;
        }
    }
    (1..=n).find(|&id| !used[id]).map(|id| id as SelectId)
}

/// Copy of `selections` with `index` assigned `select_id`. Out-of-range
/// indexes and non-positive IDs leave the copy unchanged.
pub fn insert_selection(selections: &[SelectId], index: usize, select_id: SelectId) -> Vec<SelectId> {
    let mut selections = selections.to_vec();
    if select_id <= 0 {
        debug!("Ignoring non-positive select ID {} for index {}", select_id, index);
    } else if let Some(slot) = selections.get_mut(index) {
        *slot = select_id;
    } else {
        debug!("Ignoring selection of index {} (dimension {})", index, selections.len());
    }
    selections
}

/// Copy of `selections` with `index` cleared
pub fn remove_selection(selections: &[SelectId], index: usize) -> Vec<SelectId> {
    let mut selections = selections.to_vec();
    if let Some(slot) = selections.get_mut(index) {
        *slot = UNSELECTED;
    }
    selections
}

/// Copy of `highlights` with `index` set
pub fn insert_highlight(highlights: &[bool], index: usize) -> Vec<bool> {
    let mut highlights = highlights.to_vec();
    match highlights.get_mut(index) {
        Some(slot) => *slot = true,
        None => debug!("Ignoring highlight of index {} (dimension {})", index, highlights.len()),
    }
    highlights
}

/// Fold highlights into selections; highlighted elements read as ID 0.
pub fn merge_highlights(selections: &[SelectId], highlights: &[bool]) -> Vec<SelectId> {
    selections
        .iter()
        .enumerate()
        .map(|(index, &id)| {
            if highlights.get(index).copied().unwrap_or(false) {
                HIGHLIGHT
            } else {
                id
            }
        })
        .collect()
}

/// Select ID of a cell from the IDs of its row and column: 0 if either is
/// highlighted, otherwise the larger of the two (so -1 only when neither
/// is selected).
pub fn cell_select_id(row_select_id: SelectId, column_select_id: SelectId) -> SelectId {
    if row_select_id == HIGHLIGHT || column_select_id == HIGHLIGHT {
        HIGHLIGHT
    } else {
        row_select_id.max(column_select_id)
    }
}
