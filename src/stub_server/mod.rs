//! Development stub for the background sync daemon
//!
//! Serves the status channel protocol from an in-memory watch set and
//! per-path state table. The real daemon lives in the sync client; this
//! stub exists so the overlay core can be exercised without it — manually
//! via the `sync-overlays-stubd` binary, and in-process by the integration
//! tests.
//!
//! Both queries are answered from shared state behind locks; watch-set
//! updates are additionally pushed to every connected client as a
//! `watch_set_changed` event.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::{accept_async, tungstenite::Message};

use crate::category::OverlayCategory;
use crate::channel::protocol::{
    ClientMessage, PathStateParams, PathStateResult, ServerMessage, WatchedDirectoriesResult,
    EVENT_WATCH_SET_CHANGED, METHOD_GET_PATH_STATE, METHOD_LIST_WATCHED_DIRECTORIES,
};

/// Shared state served to every connection
pub struct StubState {
    directories: RwLock<Vec<String>>,
    states: RwLock<HashMap<String, OverlayCategory>>,
    event_tx: broadcast::Sender<ServerMessage>,
    path_state_queries: AtomicUsize,
}

impl StubState {
    pub fn new(directories: Vec<String>) -> Self {
        let (event_tx, _) = broadcast::channel(16);
        Self {
            directories: RwLock::new(directories),
            states: RwLock::new(HashMap::new()),
            event_tx,
            path_state_queries: AtomicUsize::new(0),
        }
    }

    /// Number of `get_path_state` queries served so far
    pub fn path_state_queries(&self) -> usize {
        self.path_state_queries.load(Ordering::SeqCst)
    }

    /// Replace the watch set and push a `watch_set_changed` event to all
    /// connected clients
    pub fn set_directories(&self, directories: Vec<String>) {
        *self.directories.write() = directories.clone();
        let payload = serde_json::to_value(WatchedDirectoriesResult { directories })
            .unwrap_or(serde_json::Value::Null);
        let event = ServerMessage::Event {
            name: EVENT_WATCH_SET_CHANGED.to_string(),
            payload,
        };
        let _ = self.event_tx.send(event);
    }

    /// Set the sync state served for `path`
    pub fn set_state(&self, path: &str, category: OverlayCategory) {
        self.states.write().insert(path.to_string(), category);
    }

    /// Forget the sync state of `path` (served as untracked afterwards)
    pub fn clear_state(&self, path: &str) {
        self.states.write().remove(path);
    }

    fn directories(&self) -> Vec<String> {
        self.directories.read().clone()
    }

    fn state_of(&self, path: &str) -> Option<OverlayCategory> {
        self.states.read().get(path).copied()
    }
}

/// Accept connections on `listener` and serve each one until it closes
pub async fn serve(listener: TcpListener, state: Arc<StubState>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                tracing::debug!("Accepted stub connection from {}", addr);
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    handle_connection(stream, state).await;
                });
            }
            Err(e) => {
                tracing::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a single client connection
pub async fn handle_connection(stream: TcpStream, state: Arc<StubState>) {
    let mut ws = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::error!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    let client_id = format!(
        "ovl_{}",
        uuid::Uuid::new_v4().to_string().split('-').next().unwrap()
    );
    tracing::debug!("Client {} connected", client_id);

    let mut event_rx = state.event_tx.subscribe();

    loop {
        tokio::select! {
            msg = ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(response) = answer(&text, &state) {
                            let json = match serde_json::to_string(&response) {
                                Ok(json) => json,
                                Err(e) => {
                                    tracing::error!("Cannot encode response: {}", e);
                                    continue;
                                }
                            };
                            if ws.send(Message::Text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!("Stub connection error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                if let Ok(event) = event {
                    let json = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(_) => continue,
                    };
                    if ws.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Compute the reply for one client message, if any
fn answer(text: &str, state: &StubState) -> Option<ServerMessage> {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            return Some(ServerMessage::Error {
                id: None,
                code: "bad_request".to_string(),
                message: e.to_string(),
            });
        }
    };

    match msg {
        ClientMessage::Ping => Some(ServerMessage::Pong),
        ClientMessage::Query { id, method, params } => match method.as_str() {
            METHOD_LIST_WATCHED_DIRECTORIES => Some(ServerMessage::Response {
                id,
                result: serde_json::to_value(WatchedDirectoriesResult {
                    directories: state.directories(),
                })
                .unwrap_or(serde_json::Value::Null),
            }),
            METHOD_GET_PATH_STATE => {
                state.path_state_queries.fetch_add(1, Ordering::SeqCst);
                match serde_json::from_value::<PathStateParams>(params) {
                    Ok(params) => Some(ServerMessage::Response {
                        id,
                        result: serde_json::to_value(PathStateResult {
                            state: state.state_of(&params.path),
                        })
                        .unwrap_or(serde_json::Value::Null),
                    }),
                    Err(e) => Some(ServerMessage::Error {
                        id: Some(id),
                        code: "bad_params".to_string(),
                        message: e.to_string(),
                    }),
                }
            }
            other => Some(ServerMessage::Error {
                id: Some(id),
                code: "unknown_method".to_string(),
                message: format!("unknown method: {}", other),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_list_watched_directories() {
        let state = StubState::new(vec!["/sync".to_string()]);
        let msg = r#"{"type":"query","id":1,"method":"list_watched_directories"}"#;
        match answer(msg, &state) {
            Some(ServerMessage::Response { id, result }) => {
                assert_eq!(id, 1);
                let listed: WatchedDirectoriesResult = serde_json::from_value(result).unwrap();
                assert_eq!(listed.directories, vec!["/sync".to_string()]);
            }
            other => panic!("Expected Response, got {:?}", other),
        }
    }

    #[test]
    fn test_answer_get_path_state() {
        let state = StubState::new(vec!["/sync".to_string()]);
        state.set_state("/sync/a.txt", OverlayCategory::Sync);

        let msg = r#"{"type":"query","id":2,"method":"get_path_state","params":{"path":"/sync/a.txt"}}"#;
        match answer(msg, &state) {
            Some(ServerMessage::Response { result, .. }) => {
                let result: PathStateResult = serde_json::from_value(result).unwrap();
                assert_eq!(result.state, Some(OverlayCategory::Sync));
            }
            other => panic!("Expected Response, got {:?}", other),
        }
    }

    #[test]
    fn test_answer_untracked_path_is_null() {
        let state = StubState::new(vec![]);
        let msg = r#"{"type":"query","id":3,"method":"get_path_state","params":{"path":"/nowhere"}}"#;
        match answer(msg, &state) {
            Some(ServerMessage::Response { result, .. }) => {
                let result: PathStateResult = serde_json::from_value(result).unwrap();
                assert_eq!(result.state, None);
            }
            other => panic!("Expected Response, got {:?}", other),
        }
    }

    #[test]
    fn test_answer_unknown_method_is_error() {
        let state = StubState::new(vec![]);
        let msg = r#"{"type":"query","id":4,"method":"drop_tables"}"#;
        match answer(msg, &state) {
            Some(ServerMessage::Error { id, code, .. }) => {
                assert_eq!(id, Some(4));
                assert_eq!(code, "unknown_method");
            }
            other => panic!("Expected Error, got {:?}", other),
        }
    }
}
