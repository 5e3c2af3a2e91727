//! Debounce window tracking
//!
//! Each `schedule` call pushes the deadline to `now + window`, so a burst
//! of mutations yields one flush after the burst goes quiet. There is never
//! more than one deadline outstanding.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, deadline: None }
    }

    /// Start or extend the window
    pub fn schedule(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// A flush is scheduled and its window has elapsed
    pub fn is_due(&self) -> bool {
        matches!(self.deadline, Some(deadline) if Instant::now() >= deadline)
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }
}
