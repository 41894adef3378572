//! Error types
//!
//! Construction is the only fallible phase of the simulation. Once a
//! [`crate::sim::GameCore`] exists every tick-time operation is total.

use thiserror::Error;

use crate::flow::ScreenId;

/// Invalid arguments rejected when building settings or simulation objects
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid setting `{field}`: {reason}")]
    InvalidSetting {
        field: &'static str,
        reason: &'static str,
    },

    #[error("terrain pattern has no rows")]
    EmptyPattern,

    #[error("terrain pattern row {row} is {found} pixels wide, expected {expected}")]
    RaggedPattern {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("terrain pattern has no solid pixels")]
    HollowPattern,

    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}

impl SetupError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidSetting { field, reason }
    }
}

/// Lookup failures in the screen state machine
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FlowError {
    #[error("screen {0:?} was never registered")]
    UnknownScreen(ScreenId),
}
