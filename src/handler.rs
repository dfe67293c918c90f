//! Per-category overlay handler
//!
//! One handler exists per overlay category; the host asks each of them
//! about every path it draws and renders the overlay of the handler that
//! answers affirmatively. Handlers are shared between the host and the
//! factory as `Arc<OverlayHandler>`: acquiring a reference is a clone,
//! releasing is a drop, and the instance is destroyed exactly once when the
//! last owner lets go.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::category::OverlayCategory;
use crate::channel::StatusChannelClient;
use crate::error::{OverlayError, Result};
use crate::resolver::{resolve, Membership, StatusSource};

/// Stable identifier the host uses to locate the overlay icon image:
/// the hosting module plus an index into its icon table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconDescriptor {
    pub module_path: PathBuf,
    pub icon_index: i32,
}

/// Host-visible overlay handler, permanently bound to one category.
pub struct OverlayHandler {
    category: OverlayCategory,
    source: Option<Arc<dyn StatusSource + Send + Sync>>,
}

impl OverlayHandler {
    /// Create a handler that queries the process-wide channel client.
    ///
    /// The client itself is not touched here; it comes into existence on
    /// the first membership query.
    pub(crate) fn new(category: OverlayCategory) -> Self {
        Self {
            category,
            source: None,
        }
    }

    /// Create a handler over an explicit status source.
    ///
    /// Used by the CLI (custom endpoint) and by tests.
    pub fn with_source(
        category: OverlayCategory,
        source: Arc<dyn StatusSource + Send + Sync>,
    ) -> Self {
        Self {
            category,
            source: Some(source),
        }
    }

    /// The category this handler is bound to
    pub fn category(&self) -> OverlayCategory {
        self.category
    }

    /// Numeric display precedence, 0 = highest. Pure and infallible.
    pub fn priority(&self) -> i32 {
        self.category.priority()
    }

    /// Whether this handler's overlay applies to `path`.
    ///
    /// Never fails: malformed paths and every channel problem resolve to
    /// [`Membership::NotApplicable`], which the host renders as "no
    /// overlay".
    pub fn is_member_of(&self, path: &Path) -> Membership {
        let Some(path) = path.to_str() else {
            return Membership::NotApplicable;
        };

        match &self.source {
            Some(source) => resolve(path, self.category, source.as_ref()),
            None => resolve(path, self.category, StatusChannelClient::global()),
        }
    }

    /// Locate the overlay icon for this handler's category.
    ///
    /// Unlike the query path this is allowed to fail loudly: not being able
    /// to name our own module means the component is installed incorrectly,
    /// and the host needs to hear about that.
    pub fn overlay_info(&self, max_path_len: usize) -> Result<IconDescriptor> {
        let module_path = std::env::current_exe().map_err(|e| OverlayError::ModulePath {
            reason: e.to_string(),
        })?;

        if module_path.as_os_str().len() > max_path_len {
            return Err(OverlayError::ModulePath {
                reason: format!(
                    "module path exceeds {} characters: {}",
                    max_path_len,
                    module_path.display()
                ),
            });
        }

        Ok(IconDescriptor {
            module_path,
            icon_index: self.category.icon_index(),
        })
    }
}

impl std::fmt::Debug for OverlayHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayHandler")
            .field("category", &self.category)
            .finish()
    }
}
