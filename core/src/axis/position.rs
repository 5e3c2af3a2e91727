//! Display positions along an axis
//!
//! Visible elements take integer positions `0..K` in display order. Hidden
//! elements are not parked at an arbitrary coordinate; they are placed on
//! the line between their nearest visible neighbours in the ordering, so an
//! element that appears or disappears animates from a sensible location.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

/// Indexes from `ordering` whose visibility flag is set, in display order
pub fn visible_indexes(ordering: &[usize], visibilities: &[bool]) -> Vec<usize> {
    ordering
        .iter()
        .copied()
        .filter(|&index| visibilities.get(index).copied().unwrap_or(false))
        .collect()
}

/// Position of every element, indexed by element index.
///
/// `ordering` must be a permutation of `0..visibilities.len()`. The first
/// and last slots of the ordering default to `0` and `K - 1` when hidden;
/// every other hidden element is linearly interpolated by its slot between
/// the surrounding anchors. With no visible elements all positions are 0.
pub fn interpolate_positions(ordering: &[usize], visibilities: &[bool]) -> Vec<f64> {
    let n = ordering.len();
    let mut positions = vec![0.0; n];
    if n == 0 {
        return positions;
    }

    // Slots in the ordering with a known position
    let mut anchors: Vec<usize> = Vec::with_capacity(n);
    let mut visible_count = 0usize;
    for (slot, &index) in ordering.iter().enumerate() {
        if visibilities[index] {
            positions[index] = visible_count as f64;
            visible_count += 1;
            anchors.push(slot);
        }
    }
    let last_position = visible_count.saturating_sub(1) as f64;

    if anchors.first() != Some(&0) {
        positions[ordering[0]] = 0.0;
        anchors.insert(0, 0);
    }
    if anchors.last() != Some(&(n - 1)) {
        positions[ordering[n - 1]] = last_position;
        anchors.push(n - 1);
    }

    for pair in anchors.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let a_position = positions[ordering[a]];
        let b_position = positions[ordering[b]];
        let span = (b - a) as f64;
        for slot in a + 1..b {
            let b_fraction = (slot - a) as f64 / span;
            positions[ordering[slot]] = a_position * (1.0 - b_fraction) + b_position * b_fraction;
        }
    }
    positions
}
