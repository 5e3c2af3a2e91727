//! Per-axis sanitizers and derivations
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod position;
pub mod sanitize;
pub mod selection;

pub use self::position::{interpolate_positions, visible_indexes};
pub use self::sanitize::complete_ordering;
