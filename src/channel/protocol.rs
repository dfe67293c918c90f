//! Status channel protocol message types
//!
//! Defines the JSON message format exchanged with the background sync
//! daemon. Both queries are simple request/response, idempotent, and
//! side-effect-free on the daemon side; the daemon may additionally push
//! `watch_set_changed` events at any time.

use serde::{Deserialize, Serialize};

use crate::category::OverlayCategory;

/// Query method: fetch the current watched-directory list
pub const METHOD_LIST_WATCHED_DIRECTORIES: &str = "list_watched_directories";

/// Query method: fetch the sync state of a single path
pub const METHOD_GET_PATH_STATE: &str = "get_path_state";

/// Event pushed by the daemon whenever the watch set changes
pub const EVENT_WATCH_SET_CHANGED: &str = "watch_set_changed";

/// Client-to-daemon message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Query the daemon
    Query {
        id: u64,
        method: String,
        #[serde(default)]
        params: serde_json::Value,
    },
    /// Ping to check connection
    Ping,
}

/// Daemon-to-client message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Query response
    Response {
        id: u64,
        result: serde_json::Value,
    },
    /// Error response
    Error {
        id: Option<u64>,
        code: String,
        message: String,
    },
    /// Unsolicited event notification
    Event {
        name: String,
        payload: serde_json::Value,
    },
    /// Pong response
    Pong,
}

/// Parameters for [`METHOD_GET_PATH_STATE`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathStateParams {
    pub path: String,
}

/// Result of [`METHOD_GET_PATH_STATE`]
///
/// `state` is `None` when the daemon does not track the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathStateResult {
    pub state: Option<OverlayCategory>,
}

/// Result of [`METHOD_LIST_WATCHED_DIRECTORIES`] and payload of
/// [`EVENT_WATCH_SET_CHANGED`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchedDirectoriesResult {
    pub directories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_message_roundtrip() {
        let msg = ClientMessage::Query {
            id: 7,
            method: METHOD_GET_PATH_STATE.to_string(),
            params: serde_json::to_value(PathStateParams {
                path: "/sync/doc.txt".to_string(),
            })
            .unwrap(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"query\""));
        assert!(json.contains("get_path_state"));

        let parsed: ClientMessage = serde_json::from_str(&json).unwrap();
        match parsed {
            ClientMessage::Query { id, method, params } => {
                assert_eq!(id, 7);
                assert_eq!(method, METHOD_GET_PATH_STATE);
                let params: PathStateParams = serde_json::from_value(params).unwrap();
                assert_eq!(params.path, "/sync/doc.txt");
            }
            _ => panic!("Expected Query message"),
        }
    }

    #[test]
    fn test_response_message_parse() {
        let json = r#"{"type":"response","id":3,"result":{"state":"sync"}}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        match msg {
            ServerMessage::Response { id, result } => {
                assert_eq!(id, 3);
                let result: PathStateResult = serde_json::from_value(result).unwrap();
                assert_eq!(result.state, Some(OverlayCategory::Sync));
            }
            _ => panic!("Expected Response message"),
        }
    }

    #[test]
    fn test_null_state_parses_to_none() {
        let json = r#"{"type":"response","id":1,"result":{"state":null}}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        match msg {
            ServerMessage::Response { result, .. } => {
                let result: PathStateResult = serde_json::from_value(result).unwrap();
                assert_eq!(result.state, None);
            }
            _ => panic!("Expected Response message"),
        }
    }

    #[test]
    fn test_watch_set_event_parse() {
        let json = r#"{"type":"event","name":"watch_set_changed","payload":{"directories":["/sync"]}}"#;
        let msg: ServerMessage = serde_json::from_str(json).unwrap();
        match msg {
            ServerMessage::Event { name, payload } => {
                assert_eq!(name, EVENT_WATCH_SET_CHANGED);
                let payload: WatchedDirectoriesResult = serde_json::from_value(payload).unwrap();
                assert_eq!(payload.directories, vec!["/sync".to_string()]);
            }
            _ => panic!("Expected Event message"),
        }
    }
}
