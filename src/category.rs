//! Overlay category enumeration and priority ordering
//!
//! A path under sync management is in exactly one of five states at any
//! moment; each state corresponds to one registered overlay handler. The
//! host queries every handler for every path and uses the numeric priority
//! to order handlers deterministically, so the mapping from category to
//! priority is fixed and documented here.
//!
//! # Priority Order
//!
//! Lower number = higher precedence:
//!
//! ```text
//! Ok(0) < OkShared(1) < Warning(2) < Sync(3) < Error(4) < Unknown(5)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::OverlayError;

/// Sync-status classification of a path
///
/// Categories are ordered by display precedence. `Unknown` is never bound
/// to a handler; it exists so an out-of-range answer from the channel still
/// maps to a total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayCategory {
    /// Fully synchronized
    Ok = 0,
    /// Synchronized and shared with other users
    OkShared = 1,
    /// Synchronized with warnings (ignored or skipped children)
    Warning = 2,
    /// Transfer in progress
    Sync = 3,
    /// Sync failed or conflict
    Error = 4,
    /// No classification available
    Unknown = 5,
}

impl OverlayCategory {
    /// Numeric priority used by the host to order handlers. 0 is highest.
    pub fn priority(&self) -> i32 {
        *self as i32
    }

    /// Icon index inside the hosting module's icon table.
    ///
    /// Equal to the priority by construction; kept separate because the two
    /// values serve different host interfaces.
    pub fn icon_index(&self) -> i32 {
        *self as i32
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::OkShared => "ok_shared",
            Self::Warning => "warning",
            Self::Sync => "sync",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a category name as produced by [`as_str`](Self::as_str)
    pub fn parse(name: &str) -> Result<Self, OverlayError> {
        match name {
            "ok" => Ok(Self::Ok),
            "ok_shared" => Ok(Self::OkShared),
            "warning" => Ok(Self::Warning),
            "sync" => Ok(Self::Sync),
            "error" => Ok(Self::Error),
            "unknown" => Ok(Self::Unknown),
            _ => Err(OverlayError::UnknownCategory {
                name: name.to_string(),
            }),
        }
    }

    /// The five concrete categories a handler can be bound to, in priority
    /// order. `Unknown` is excluded: no handler is ever registered for it.
    pub fn all_bindable() -> [OverlayCategory; 5] {
        [
            OverlayCategory::Ok,
            OverlayCategory::OkShared,
            OverlayCategory::Warning,
            OverlayCategory::Sync,
            OverlayCategory::Error,
        ]
    }
}

impl std::fmt::Display for OverlayCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
