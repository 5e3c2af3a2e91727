//! Deferred, batched recomputation of matrix state
//!
//! Mutations are buffered in `pending`, coalesced by the `debounce` window
//! and applied in one dependency-ordered `recompute` pass. Subscribers learn
//! what changed through the `events` bus.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod debounce;
pub mod events;
pub mod pending;
pub(crate) mod recompute;

pub use self::debounce::Debouncer;
pub use self::events::{EventBus, FlushReport, UpdateEvent, UpdateKind};
pub use self::pending::{Pending, PendingAxis, PendingUpdates};
