//! Stub daemon binary
//!
//! Serves the status channel protocol from state given on the command
//! line, standing in for the background sync process during development.
//!
//! # Usage
//!
//! ```bash
//! sync-overlays-stubd --dir /home/u/Nextcloud \
//!     --state /home/u/Nextcloud/doc.txt=ok \
//!     --state /home/u/Nextcloud/big.bin=sync
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use sync_overlays::category::OverlayCategory;
use sync_overlays::channel::config::{DEFAULT_HOST, DEFAULT_PORT};
use sync_overlays::stub_server::{serve, StubState};

/// Stub status daemon for sync-overlays development
#[derive(Parser, Debug)]
#[command(name = "sync-overlays-stubd")]
#[command(about = "Serves a fixed watch set and path states over the status channel protocol")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "SYNC_OVERLAYS_PORT")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = DEFAULT_HOST, env = "SYNC_OVERLAYS_HOST")]
    host: String,

    /// Watched directory (repeatable)
    #[arg(short, long = "dir")]
    dirs: Vec<String>,

    /// Path state as `path=category` (repeatable; categories: ok,
    /// ok_shared, warning, sync, error)
    #[arg(short, long = "state")]
    states: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sync_overlays=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let state = Arc::new(StubState::new(args.dirs));
    for entry in &args.states {
        let (path, category) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("--state expects path=category, got {:?}", entry))?;
        let category = OverlayCategory::parse(category)?;
        state.set_state(path, category);
    }

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Stub status daemon listening on ws://{}", addr);

    serve(listener, state).await;
    Ok(())
}
