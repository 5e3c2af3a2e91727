//! Store configuration
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, Result};

/// Configuration for matrix store behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixStoreConfig {
    /// Mutations within this window (milliseconds) are combined into one update
    pub debounce_ms: u64,

    /// Cells below this value in all three probability views are left out
    /// of the sparse matrix
    pub min_value_threshold: f64,

    /// Capacity of the update notification channel
    pub event_capacity: usize,

    /// Prefix for generated row labels ("Term #1", "Term #2", ...)
    pub row_label_prefix: String,

    /// Prefix for generated column labels ("Topic #1", ...)
    pub column_label_prefix: String,

    /// Run per-cell recomputation passes on the rayon pool
    pub parallel_recompute: bool,
}

impl Default for MatrixStoreConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 10,
            min_value_threshold: 0.001,
            event_capacity: 64,
            row_label_prefix: "Term".to_string(),
            column_label_prefix: "Topic".to_string(),
            parallel_recompute: true,
        }
    }
}

impl MatrixStoreConfig {
    /// Parse and validate a configuration from JSON. Missing fields take
    /// their default values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_value_threshold.is_finite() || self.min_value_threshold < 0.0 {
            return Err(MatrixError::InvalidConfig(format!(
                "min_value_threshold must be a non-negative number, got {}",
                self.min_value_threshold
            )));
        }
        if self.event_capacity == 0 {
            return Err(MatrixError::InvalidConfig(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
