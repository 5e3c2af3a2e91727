//! Termite core - reactive term-topic matrix model
//!
//! A term-topic matrix holds one row per term and one column per topic.
//! `MatrixStore` loads raw weights, derives joint and conditional
//! probabilities, and maintains the view parameters an interactive matrix
//! display needs: normalization, visibility, ordering, selection,
//! highlighting and labels. Mutations are buffered and applied in a single
//! debounced recomputation that publishes typed update events;
//! `SharedMatrixStore` runs those recomputations on a background task.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod axis;
pub mod config;
pub mod error;
pub mod matrix;
pub mod reactive;
pub mod shared;
pub mod store;

pub use self::config::MatrixStoreConfig;
pub use self::error::{MatrixError, Result};
pub use self::matrix::{
    Axis, AxisElement, Cell, MatrixEntry, MatrixState, MatrixStatistics, Normalization, RawMatrix,
    SelectId,
};
pub use self::reactive::{FlushReport, UpdateEvent, UpdateKind};
pub use self::shared::SharedMatrixStore;
pub use self::store::MatrixStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
