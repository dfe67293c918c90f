//! Handler factory and class-id dispatch
//!
//! The host asks for handlers by an opaque class id, one per registered
//! overlay category. Dispatch is an exact match against a static table and
//! touches nothing else: probing for an unrelated id must cost nothing and
//! must not wake the channel client.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use uuid::Uuid;

use crate::category::OverlayCategory;
use crate::error::{OverlayError, Result};
use crate::handler::OverlayHandler;

pub const CLASS_ID_OK: Uuid = Uuid::from_u128(0x1f87_0c3e_52d1_4a6b_9e0f_2b64_81c5_a7d0);
pub const CLASS_ID_OK_SHARED: Uuid = Uuid::from_u128(0x1f87_0c3e_52d1_4a6b_9e0f_2b64_81c5_a7d1);
pub const CLASS_ID_WARNING: Uuid = Uuid::from_u128(0x1f87_0c3e_52d1_4a6b_9e0f_2b64_81c5_a7d2);
pub const CLASS_ID_SYNC: Uuid = Uuid::from_u128(0x1f87_0c3e_52d1_4a6b_9e0f_2b64_81c5_a7d3);
pub const CLASS_ID_ERROR: Uuid = Uuid::from_u128(0x1f87_0c3e_52d1_4a6b_9e0f_2b64_81c5_a7d4);

/// The published class registrations in priority order
pub const REGISTERED_CLASSES: [(Uuid, OverlayCategory); 5] = [
    (CLASS_ID_OK, OverlayCategory::Ok),
    (CLASS_ID_OK_SHARED, OverlayCategory::OkShared),
    (CLASS_ID_WARNING, OverlayCategory::Warning),
    (CLASS_ID_SYNC, OverlayCategory::Sync),
    (CLASS_ID_ERROR, OverlayCategory::Error),
];

static DISPATCH: Lazy<HashMap<Uuid, OverlayCategory>> =
    Lazy::new(|| REGISTERED_CLASSES.into_iter().collect());

/// Create the handler registered under `class_id`.
///
/// Unknown ids yield [`OverlayError::ClassNotAvailable`] without
/// constructing anything; the channel client stays untouched either way.
pub fn create_handler(class_id: Uuid) -> Result<Arc<OverlayHandler>> {
    match DISPATCH.get(&class_id) {
        Some(&category) => Ok(Arc::new(OverlayHandler::new(category))),
        None => Err(OverlayError::ClassNotAvailable { class_id }),
    }
}

/// The class id registered for `category`, if any (`Unknown` has none)
pub fn class_id_for(category: OverlayCategory) -> Option<Uuid> {
    REGISTERED_CLASSES
        .iter()
        .find(|(_, c)| *c == category)
        .map(|(id, _)| *id)
}
