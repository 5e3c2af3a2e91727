//! Axis, normalization mode and selection identifier definitions
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;

use serde::{Deserialize, Serialize};

/// Selection identifier attached to a row or column.
///
/// `-1` marks an unselected element, `0` is reserved for the mouse-driven
/// highlight, and positive values are persistent user selections.
pub type SelectId = i32;

/// Select ID of an element that is neither selected nor highlighted
pub const UNSELECTED: SelectId = -1;

/// Select ID reserved for highlights
pub const HIGHLIGHT: SelectId = 0;

/// The two axes of a term-topic matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Terms
    Row,

    /// Topics
    Column,
}

impl Axis {
    pub fn name(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How cell values are presented to consumers
///
/// - `None`: joint probability P(term, topic)
/// - `Row`: conditional probability P(topic | term)
/// - `Column`: conditional probability P(term | topic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    #[default]
    None,
    Row,
    Column,
}

impl Normalization {
    /// Parse a normalization name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "row" => Some(Self::Row),
            "column" => Some(Self::Column),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Row => "row",
            Self::Column => "column",
        }
    }

    /// Whether elements along `axis` are forced to a total of 1.0
    pub fn normalizes(self, axis: Axis) -> bool {
        matches!(
            (self, axis),
            (Self::Row, Axis::Row) | (Self::Column, Axis::Column)
        )
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
