//! sync-overlays: sync-status overlay decision core
//!
//! Decides, for a given filesystem path, which sync-status icon overlay a
//! desktop shell should render. The decision combines the set of watched
//! directories, the live per-path state reported by the background sync
//! daemon over a local socket, and a fixed priority ordering among five
//! mutually exclusive overlay categories.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use sync_overlays::{create_handler, Membership, CLASS_ID_OK};
//!
//! let handler = create_handler(CLASS_ID_OK)?;
//! match handler.is_member_of(Path::new("/home/u/Nextcloud/doc.txt")) {
//!     Membership::Applies => println!("render the OK overlay"),
//!     _ => {}
//! }
//! ```
//!
//! Everything host-facing is fail-safe: a missing or slow daemon means "no
//! overlay", never a blocked or crashed file manager.

pub mod category;
pub mod channel;
pub mod error;
pub mod factory;
pub mod handler;
pub mod resolver;
pub mod stub_server;
pub mod watch_set;

pub mod cli;

// Re-export commonly used types
pub use category::OverlayCategory;
pub use channel::{ChannelConfig, StatusChannelClient};
pub use error::{OverlayError, Result};
pub use factory::{
    class_id_for, create_handler, CLASS_ID_ERROR, CLASS_ID_OK, CLASS_ID_OK_SHARED, CLASS_ID_SYNC,
    CLASS_ID_WARNING, REGISTERED_CLASSES,
};
pub use handler::{IconDescriptor, OverlayHandler};
pub use resolver::{resolve, Membership, StatusSource};
pub use watch_set::{is_descendant_of, WatchSet};
