//! Sanitizers for user-supplied visibility, ordering and label input
//!
//! Every function here accepts arbitrary caller input and produces a value
//! that satisfies the axis invariants for a dimension `n`. Out-of-range and
//! duplicate indexes are dropped, never reported.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;

/// All `n` elements visible
pub fn show_all(n: usize) -> Vec<bool> {
    vec![true; n]
}

/// Only the listed indexes visible. An empty list shows everything.
pub fn visibilities_from_indexes(indexes: &[usize], n: usize) -> Vec<bool> {
    if indexes.is_empty() {
        return show_all(n);
    }
    let mut visibilities = vec![false; n];
    for &index in indexes {
        match visibilities.get_mut(index) {
            Some(visible) => *visible = true,
            None => debug!("Ignoring visibility index {} (dimension {})", index, n),
        }
    }
    visibilities
}

/// Identity ordering `0..n`
pub fn identity_ordering(n: usize) -> Vec<usize> {
    (0..n).collect()
}

/// Turn a partial, possibly unordered index list into a full permutation
/// of `0..n`: keep the first occurrence of each valid index, then append
/// the omitted indexes in ascending order.
pub fn complete_ordering(indexes: &[usize], n: usize) -> Vec<usize> {
    let mut seen = vec![false; n];
    let mut ordering = Vec::with_capacity(n);
    for &index in indexes {
        if index < n && !seen[index] {
            seen[index] = true;
            ordering.push(index);
        }
    }
    if ordering.len() < indexes.len() {
        debug!(
            "Dropped {} duplicate or out-of-range ordering indexes (dimension {})",
            indexes.len() - ordering.len(),
            n
        );
    }
    ordering.extend((0..n).filter(|&index| !seen[index]));
    ordering
}

/// Remove `index` from `ordering` and reinsert it right after `anchor`,
/// or at the end when there is no anchor. Invalid input leaves the
/// ordering unchanged.
pub fn move_after(ordering: &[usize], index: usize, anchor: Option<usize>) -> Vec<usize> {
    reinsert(ordering, index, anchor, |rest, anchor_position| match anchor_position {
        Some(position) => position + 1,
        None => rest.len(),
    })
}

/// Remove `index` from `ordering` and reinsert it right before `anchor`,
/// or at the start when there is no anchor.
pub fn move_before(ordering: &[usize], index: usize, anchor: Option<usize>) -> Vec<usize> {
    reinsert(ordering, index, anchor, |_, anchor_position| anchor_position.unwrap_or(0))
}

fn reinsert(
    ordering: &[usize],
    index: usize,
    anchor: Option<usize>,
    insertion_point: impl Fn(&[usize], Option<usize>) -> usize,
) -> Vec<usize> {
    let n = ordering.len();
    if index >= n {
        debug!("Ignoring move of index {} (dimension {})", index, n);
        return ordering.to_vec();
    }
    if let Some(anchor) = anchor {
        if anchor >= n || anchor == index {
            debug!("Ignoring move of {} relative to anchor {}", index, anchor);
            return ordering.to_vec();
        }
    }

    let mut rest: Vec<usize> = ordering.iter().copied().filter(|&d| d != index).collect();
    let anchor_position = anchor.and_then(|anchor| rest.iter().position(|&d| d == anchor));
    let at = insertion_point(&rest, anchor_position).min(rest.len());
    rest.insert(at, index);
    rest
}

/// Truncate or pad `labels` to `n`, generating "{prefix} #{k}" (1-based)
/// for the missing tail.
pub fn complete_labels<I, S>(labels: I, n: usize, prefix: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut labels: Vec<String> = labels.into_iter().take(n).map(Into::into).collect();
    let given = labels.len();
    labels.extend((given..n).map(|index| format!("{} #{}", prefix, index + 1)));
    labels
}
