//! CLI module for ServerEye
//!
//! Command-line interface definitions and handlers for the live dashboard client.
//!
//! # Commands
//!
//! - `watch` - Live dashboard: snapshot + stream, redrawn on every change
//! - `snapshot` - One-shot REST snapshot (table or JSON)
//! - `alerts` - List or acknowledge active alerts
//! - `auth` - Store or clear the bearer token
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Watch the whole fleet
//! servereye watch --api-url http://monitor.local:8000
//!
//! # Only critical web servers, busiest first
//! servereye watch --group web --status critical --sort cpu --desc
//!
//! # Acknowledge alert 42
//! servereye alerts ack 42
//! ```

pub mod alerts;
pub mod auth;
pub mod completions;
pub mod config;
pub mod output;
pub mod setup;
pub mod snapshot;
pub mod watch;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::store::ServerStatus;
use crate::view::{ServerFilter, SortDirection, SortKey};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// ServerEye - live server monitoring dashboard
#[derive(Parser, Debug)]
#[command(
    name = "servereye",
    version,
    about = "Live dashboard client for the ServerEye monitoring backend"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the live dashboard
    Watch(WatchArgs),
    /// Print a one-shot dashboard snapshot
    Snapshot(SnapshotArgs),
    /// Inspect and acknowledge alerts
    #[command(subcommand)]
    Alerts(AlertsCommands),
    /// Manage the stored bearer token
    #[command(subcommand)]
    Auth(AuthCommands),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that talks to the backend.
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "servereye.toml")]
    pub config: PathBuf,

    /// Override backend base URL
    #[arg(long, env = "SERVEREYE_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token (overrides the stored session token)
    #[arg(long, env = "SERVEREYE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SERVEREYE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Server list filter and ordering flags.
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Only servers in this group
    #[arg(short, long)]
    pub group: Option<String>,

    /// Only servers with this status (online, warning, critical, offline, maintenance, unknown)
    #[arg(short, long)]
    pub status: Option<ServerStatus>,

    /// Case-insensitive match on name or IP
    #[arg(short = 'q', long)]
    pub search: Option<String>,

    /// Sort column (name, status, cpu, mem, disk)
    #[arg(long, default_value = "name")]
    pub sort: SortKey,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

impl ViewArgs {
    pub fn filter(&self) -> ServerFilter {
        ServerFilter {
            group: self.group.clone(),
            status: self.status,
            search: self.search.clone(),
        }
    }

    pub fn direction(&self) -> SortDirection {
        if self.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Follow a single server's feed instead of the whole fleet
    #[arg(long)]
    pub server: Option<u64>,

    /// Snapshot only; do not open the live stream
    #[arg(long)]
    pub no_stream: bool,

    /// Re-load the REST snapshot every N seconds (0 disables)
    #[arg(long)]
    pub refresh: Option<u64>,

    /// Minimum milliseconds between redraws
    #[arg(long, default_value = "250")]
    pub redraw_ms: u64,
}

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum AlertsCommands {
    /// List active alerts, newest first
    List(AlertsListArgs),
    /// Acknowledge an alert
    Ack(AlertsAckArgs),
}

#[derive(Args, Debug)]
pub struct AlertsListArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Hide acknowledged alerts
    #[arg(long)]
    pub unacknowledged: bool,
}

#[derive(Args, Debug)]
pub struct AlertsAckArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// Alert ID to acknowledge
    pub alert_id: u64,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store a bearer token in the session file
    Login(AuthLoginArgs),
    /// Remove the stored bearer token
    Logout(AuthLogoutArgs),
}

#[derive(Args, Debug)]
pub struct AuthLoginArgs {
    /// Token issued by the backend
    pub token: String,

    /// Path to configuration file
    #[arg(short, long, default_value = "servereye.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct AuthLogoutArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "servereye.toml")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "servereye.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,

    /// Backend base URL to write into `[api]`
    #[arg(long)]
    pub api_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
