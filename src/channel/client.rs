//! Status channel client
//!
//! Owns the connection to the background sync daemon and answers two
//! queries: "which directories are watched" and "what sync state applies to
//! path P". The client is fail-safe by contract: every transport problem
//! degrades to an empty watch set or `None` state, never to a panic or an
//! unbounded wait, because a stall here would stall the file manager
//! hosting the overlay handlers.
//!
//! # Structure
//!
//! A dedicated worker thread runs a current-thread tokio runtime and owns
//! the WebSocket connection. Host threads hand it commands over a channel
//! and wait with a bounded timeout; the worker serializes IPC round trips,
//! applies `watch_set_changed` push events, and retries the connection in
//! the background while disconnected.
//!
//! The watch-set snapshot is kept locally and replaced wholesale, so
//! membership checks never pay an IPC round trip.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::category::OverlayCategory;
use crate::channel::config::ChannelConfig;
use crate::channel::protocol::{
    ClientMessage, PathStateParams, PathStateResult, ServerMessage, WatchedDirectoriesResult,
    EVENT_WATCH_SET_CHANGED, METHOD_GET_PATH_STATE, METHOD_LIST_WATCHED_DIRECTORIES,
};
use crate::resolver::StatusSource;
use crate::watch_set::WatchSet;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Reconnect attempt cadence while the daemon is unreachable
const RETRY_INTERVAL: Duration = Duration::from_secs(5);

static GLOBAL: OnceLock<StatusChannelClient> = OnceLock::new();

/// Commands handed from host threads to the worker
enum Command {
    StateOf {
        path: String,
        reply: SyncSender<Option<OverlayCategory>>,
    },
    RefreshWatchSet {
        reply: SyncSender<()>,
    },
}

/// Client for the background sync daemon's status channel.
///
/// Cheap to query from many threads concurrently; the singleton returned by
/// [`global`](Self::global) is the instance handlers share.
pub struct StatusChannelClient {
    cmd_tx: tokio::sync::mpsc::UnboundedSender<Command>,
    watch_set: Arc<RwLock<Arc<WatchSet>>>,
    seeded: AtomicBool,
    config: ChannelConfig,
}

impl StatusChannelClient {
    /// Create a client for the given endpoint.
    ///
    /// Spawns the worker, which connects in the background. Construction
    /// must only happen on a real query (see [`global`](Self::global)),
    /// never at library load.
    pub fn new(config: ChannelConfig) -> Self {
        let (cmd_tx, cmd_rx) = tokio::sync::mpsc::unbounded_channel();
        let watch_set = Arc::new(RwLock::new(Arc::new(WatchSet::empty())));

        let worker_snapshot = Arc::clone(&watch_set);
        let worker_config = config.clone();
        std::thread::Builder::new()
            .name("sync-overlays-channel".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        tracing::error!("Failed to build channel runtime: {}", e);
                        return;
                    }
                };
                runtime.block_on(worker_loop(cmd_rx, worker_snapshot, worker_config));
            })
            .expect("failed to spawn channel worker thread");

        Self {
            cmd_tx,
            watch_set,
            seeded: AtomicBool::new(false),
            config,
        }
    }

    /// The process-wide client, created on first use.
    ///
    /// Constructed lazily because the overlay host loads this library at
    /// times when spawning threads or opening connections deadlocks against
    /// the host's own loader; nothing touches the transport until a real
    /// query arrives.
    pub fn global() -> &'static StatusChannelClient {
        GLOBAL.get_or_init(|| StatusChannelClient::new(ChannelConfig::from_env()))
    }

    /// Whether [`global`](Self::global) has been constructed.
    ///
    /// Factory dispatch must never initialize the client; this is the hook
    /// tests use to verify it.
    pub fn is_initialized() -> bool {
        GLOBAL.get().is_some()
    }

    /// Current watched-directory snapshot.
    ///
    /// Local read in the common case. The first call blocks, bounded by the
    /// connect+request timeouts, while the worker seeds the snapshot; on an
    /// unreachable daemon the result is the empty set and later background
    /// retries repair it.
    pub fn watched_directories(&self) -> Arc<WatchSet> {
        if !self.seeded.load(Ordering::Acquire) {
            let (tx, rx) = std::sync::mpsc::sync_channel(1);
            if self.cmd_tx.send(Command::RefreshWatchSet { reply: tx }).is_ok() {
                let bound = self.config.connect_timeout + self.config.request_timeout;
                let _ = rx.recv_timeout(bound);
            }
            self.seeded.store(true, Ordering::Release);
        }
        Arc::clone(&self.watch_set.read())
    }

    /// Live sync state of `path`, or `None` when the path is untracked or
    /// the channel is unavailable. Never cached: sync status changes
    /// continuously.
    pub fn state_of(&self, path: &str) -> Option<OverlayCategory> {
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        self.cmd_tx
            .send(Command::StateOf {
                path: path.to_string(),
                reply: tx,
            })
            .ok()?;

        // The worker bounds the round trip itself; the extra connect
        // allowance covers a reconnect happening first.
        let bound = self.config.connect_timeout + self.config.request_timeout;
        match rx.recv_timeout(bound) {
            Ok(state) => state,
            Err(_) => {
                tracing::debug!("state_of timed out for {}", path);
                None
            }
        }
    }
}

impl StatusSource for StatusChannelClient {
    fn watched_directories(&self) -> Arc<WatchSet> {
        StatusChannelClient::watched_directories(self)
    }

    fn state_of(&self, path: &str) -> Option<OverlayCategory> {
        StatusChannelClient::state_of(self, path)
    }
}

/// Connection state owned by the worker
struct Connection {
    ws: WsStream,
    next_id: u64,
}

/// One wakeup of the worker: either a host command or socket traffic
enum WorkerEvent {
    Command(Option<Command>),
    Socket(Option<Result<Message, tokio_tungstenite::tungstenite::Error>>),
}

async fn worker_loop(
    mut cmd_rx: tokio::sync::mpsc::UnboundedReceiver<Command>,
    snapshot: Arc<RwLock<Arc<WatchSet>>>,
    config: ChannelConfig,
) {
    let mut conn: Option<Connection> = None;
    let mut retry = tokio::time::interval(RETRY_INTERVAL);
    retry.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        if conn.is_some() {
            let event = {
                let Some(active) = conn.as_mut() else { continue };
                tokio::select! {
                    cmd = cmd_rx.recv() => WorkerEvent::Command(cmd),
                    msg = active.ws.next() => WorkerEvent::Socket(msg),
                }
            };

            match event {
                WorkerEvent::Command(None) => break,
                WorkerEvent::Command(Some(cmd)) => {
                    handle_command(cmd, &mut conn, &snapshot, &config).await;
                }
                WorkerEvent::Socket(msg) => match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_push(&text, &snapshot);
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!("Status channel closed by daemon");
                        disconnect(&mut conn, &snapshot);
                    }
                    Some(Err(e)) => {
                        tracing::debug!("Status channel error: {}", e);
                        disconnect(&mut conn, &snapshot);
                    }
                    _ => {}
                },
            }
        } else {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(cmd) => handle_command(cmd, &mut conn, &snapshot, &config).await,
                        None => break,
                    }
                }
                _ = retry.tick() => {
                    if let Some(fresh) = connect_and_seed(&snapshot, &config).await {
                        conn = Some(fresh);
                    }
                }
            }
        }
    }
}

async fn handle_command(
    cmd: Command,
    conn: &mut Option<Connection>,
    snapshot: &Arc<RwLock<Arc<WatchSet>>>,
    config: &ChannelConfig,
) {
    if conn.is_none() {
        *conn = connect_and_seed(snapshot, config).await;
    }

    match cmd {
        Command::StateOf { path, reply } => {
            let mut broken = false;
            let state = match conn.as_mut() {
                Some(active) => {
                    let params = serde_json::to_value(PathStateParams { path })
                        .unwrap_or(serde_json::Value::Null);
                    match round_trip(
                        active,
                        METHOD_GET_PATH_STATE,
                        params,
                        snapshot,
                        config.request_timeout,
                    )
                    .await
                    {
                        Ok(result) => serde_json::from_value::<PathStateResult>(result)
                            .map(|r| r.state)
                            .unwrap_or(None),
                        Err(e) => {
                            tracing::debug!("get_path_state failed: {}", e);
                            broken = true;
                            None
                        }
                    }
                }
                None => None,
            };
            if broken {
                disconnect(conn, snapshot);
            }
            let _ = reply.send(state);
        }
        Command::RefreshWatchSet { reply } => {
            let mut broken = false;
            if let Some(active) = conn.as_mut() {
                if let Err(e) = refresh_watch_set(active, snapshot, config).await {
                    tracing::debug!("watch set refresh failed: {}", e);
                    broken = true;
                }
            }
            if broken {
                disconnect(conn, snapshot);
            }
            let _ = reply.send(());
        }
    }
}

/// Establish the connection and seed the snapshot with the daemon's current
/// watch set. Returns `None` (leaving the empty snapshot in place) when the
/// daemon is unreachable.
async fn connect_and_seed(
    snapshot: &Arc<RwLock<Arc<WatchSet>>>,
    config: &ChannelConfig,
) -> Option<Connection> {
    let url = config.url();
    let connected =
        tokio::time::timeout(config.connect_timeout, connect_async(url.as_str())).await;

    let ws = match connected {
        Ok(Ok((ws, _response))) => ws,
        Ok(Err(e)) => {
            tracing::debug!("Cannot reach status daemon at {}: {}", url, e);
            return None;
        }
        Err(_) => {
            tracing::debug!("Connection to {} timed out", url);
            return None;
        }
    };

    tracing::debug!("Connected to status daemon at {}", url);
    let mut conn = Connection { ws, next_id: 1 };

    if let Err(e) = refresh_watch_set(&mut conn, snapshot, config).await {
        tracing::debug!("Initial watch set fetch failed: {}", e);
        return None;
    }

    Some(conn)
}

async fn refresh_watch_set(
    conn: &mut Connection,
    snapshot: &Arc<RwLock<Arc<WatchSet>>>,
    config: &ChannelConfig,
) -> anyhow::Result<()> {
    let result = round_trip(
        conn,
        METHOD_LIST_WATCHED_DIRECTORIES,
        serde_json::Value::Null,
        snapshot,
        config.request_timeout,
    )
    .await?;

    let listed: WatchedDirectoriesResult = serde_json::from_value(result)?;
    replace_snapshot(snapshot, WatchSet::new(listed.directories));
    Ok(())
}

/// Send one query and await its response, bounded by `timeout`.
///
/// Push events arriving in between are applied, not discarded; responses to
/// abandoned earlier queries are skipped by id.
async fn round_trip(
    conn: &mut Connection,
    method: &str,
    params: serde_json::Value,
    snapshot: &Arc<RwLock<Arc<WatchSet>>>,
    timeout: Duration,
) -> anyhow::Result<serde_json::Value> {
    let id = conn.next_id;
    conn.next_id += 1;
    let query = ClientMessage::Query {
        id,
        method: method.to_string(),
        params,
    };
    let text = serde_json::to_string(&query)?;
    conn.ws.send(Message::Text(text)).await?;

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                anyhow::bail!("request {} timed out after {:?}", method, timeout);
            }
            msg = conn.ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerMessage>(&text) {
                            Ok(ServerMessage::Response { id: rid, result }) if rid == id => {
                                return Ok(result);
                            }
                            Ok(ServerMessage::Error { id: rid, code, message }) if rid == Some(id) => {
                                anyhow::bail!("daemon error {}: {}", code, message);
                            }
                            Ok(ServerMessage::Event { .. }) => {
                                handle_push(&text, snapshot);
                            }
                            Ok(_) => {}
                            Err(e) => {
                                tracing::debug!("Unparseable daemon message: {}", e);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        anyhow::bail!("daemon closed the connection");
                    }
                    Some(Err(e)) => {
                        return Err(e.into());
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Apply a pushed daemon message to the snapshot if it is a watch-set event
fn handle_push(text: &str, snapshot: &Arc<RwLock<Arc<WatchSet>>>) {
    let Ok(ServerMessage::Event { name, payload }) = serde_json::from_str::<ServerMessage>(text)
    else {
        return;
    };

    if name != EVENT_WATCH_SET_CHANGED {
        return;
    }

    match serde_json::from_value::<WatchedDirectoriesResult>(payload) {
        Ok(changed) => {
            tracing::debug!("Watch set changed: {} directories", changed.directories.len());
            replace_snapshot(snapshot, WatchSet::new(changed.directories));
        }
        Err(e) => tracing::debug!("Malformed watch_set_changed payload: {}", e),
    }
}

/// Drop the connection and fail safe to "nothing is watched"
fn disconnect(conn: &mut Option<Connection>, snapshot: &Arc<RwLock<Arc<WatchSet>>>) {
    *conn = None;
    replace_snapshot(snapshot, WatchSet::empty());
}

/// Wholesale snapshot replacement; readers see either the old set or the
/// new one, never a partial update.
fn replace_snapshot(snapshot: &Arc<RwLock<Arc<WatchSet>>>, next: WatchSet) {
    *snapshot.write() = Arc::new(next);
}
