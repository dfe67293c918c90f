//! IPC channel to the background sync daemon
//!
//! The daemon is the source of truth for the watch set and per-path sync
//! states; this module owns the client side of that conversation. All
//! messages are JSON tagged with `type` over a WebSocket on a loopback
//! endpoint:
//!
//! ```json
//! // Client -> Daemon
//! {"type": "query", "id": 1, "method": "list_watched_directories"}
//! {"type": "query", "id": 2, "method": "get_path_state", "params": {"path": "/sync/doc.txt"}}
//!
//! // Daemon -> Client
//! {"type": "response", "id": 1, "result": {"directories": ["/sync"]}}
//! {"type": "response", "id": 2, "result": {"state": "ok"}}
//! {"type": "event", "name": "watch_set_changed", "payload": {"directories": [...]}}
//! ```

pub mod client;
pub mod config;
pub mod protocol;

pub use client::StatusChannelClient;
pub use config::ChannelConfig;
pub use protocol::{ClientMessage, ServerMessage};
