//! Update notifications
//!
//! A flush publishes one `UpdateEvent` per kind of update it performed,
//! followed by a single aggregate `UpdateKind::Any` event. Every event in a
//! flush carries the same committed snapshot.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;
use std::sync::Arc;

use log::trace;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::matrix::MatrixState;

/// What a flush updated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    Data,
    Normalization,
    Visibility,
    Ordering,
    Selection,
    Label,
    /// Aggregate notification after any of the above
    Any,
}

impl UpdateKind {
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Data => "updated:data",
            Self::Normalization => "updated:normalization",
            Self::Visibility => "updated:visibility",
            Self::Ordering => "updated:ordering",
            Self::Selection => "updated:selection",
            Self::Label => "updated:label",
            Self::Any => "updated",
        }
    }
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// A notification delivered to subscribers
#[derive(Debug, Clone)]
pub struct UpdateEvent {
    pub kind: UpdateKind,
    /// Committed state, valid until the next flush
    pub snapshot: Arc<MatrixState>,
}

impl UpdateEvent {
    pub fn name(&self) -> &'static str {
        self.kind.event_name()
    }
}

/// Kinds of update performed by one flush, in the order they ran
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    kinds: Vec<UpdateKind>,
}

impl FlushReport {
    pub(crate) fn record(&mut self, kind: UpdateKind) {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
    }

    /// Specific kinds only; `Any` is implied when this is non-empty
    pub fn kinds(&self) -> &[UpdateKind] {
        &self.kinds
    }

    pub fn contains(&self, kind: UpdateKind) -> bool {
        match kind {
            UpdateKind::Any => !self.kinds.is_empty(),
            _ => self.kinds.contains(&kind),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Event names in emission order, including the trailing `updated`
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events().map(UpdateKind::event_name).collect()
    }

    fn events(&self) -> impl Iterator<Item = UpdateKind> + '_ {
        let aggregate = (!self.kinds.is_empty()).then_some(UpdateKind::Any);
        self.kinds.iter().copied().chain(aggregate)
    }
}

/// Broadcast channel fan-out for update events
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<UpdateEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UpdateEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, report: &FlushReport, snapshot: &Arc<MatrixState>) {
        for kind in report.events() {
            let event = UpdateEvent {
                kind,
                snapshot: Arc::clone(snapshot),
            };
            if self.sender.send(event).is_err() {
                trace!("No subscribers for {}", kind);
            }
        }
    }
}
