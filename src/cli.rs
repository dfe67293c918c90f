//! CLI argument definitions using clap with subcommand architecture

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::channel::config::{ChannelConfig, DEFAULT_HOST, DEFAULT_PORT};

/// Query the sync-status overlay core from the command line
#[derive(Parser, Debug)]
#[command(name = "sync-overlays")]
#[command(about = "Inspect watched directories and per-path overlay decisions")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Daemon host
    #[arg(long, global = true, default_value = DEFAULT_HOST, env = "SYNC_OVERLAYS_HOST")]
    pub host: String,

    /// Daemon port
    #[arg(long, global = true, default_value_t = DEFAULT_PORT, env = "SYNC_OVERLAYS_PORT")]
    pub port: u16,

    /// Request timeout in milliseconds
    #[arg(long, global = true, env = "SYNC_OVERLAYS_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands for sync-overlays
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the effective overlay category for a path
    #[command(visible_alias = "s")]
    Status {
        /// Path to resolve
        path: PathBuf,
    },

    /// List the directories currently under sync management
    #[command(visible_alias = "w")]
    Watched,

    /// List overlay categories, priorities, and registered class ids
    Categories,
}

impl Cli {
    /// Channel configuration derived from the global flags
    pub fn channel_config(&self) -> ChannelConfig {
        let mut config = ChannelConfig::from_env();
        config.host = self.host.clone();
        config.port = self.port;
        if let Some(ms) = self.timeout_ms {
            config.request_timeout = Duration::from_millis(ms);
        }
        config
    }
}
