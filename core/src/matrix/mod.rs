//! Term-topic matrix data model
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub(crate) mod build;
pub mod cell;
pub mod raw;
pub mod state;
pub mod types;

pub use self::cell::{AxisElement, Cell, SelectElement, Transition};
pub use self::raw::{MatrixEntry, RawMatrix, MAX_AXIS_DIMS, MAX_CELLS};
pub use self::state::{AxisState, MatrixState, MatrixStatistics};
pub use self::types::{Axis, Normalization, SelectId, HIGHLIGHT, UNSELECTED};
