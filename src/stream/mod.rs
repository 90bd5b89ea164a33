//! Live event stream.
//!
//! Keeps one WebSocket open per consumer, decodes inbound frames into
//! [`StreamEvent`]s, and reconnects after a fixed delay whenever the socket
//! drops. Delivery is best effort: nothing is buffered or replayed across a
//! disconnect.

mod config;
mod connection;
pub mod dispatch;
mod error;
mod events;
mod state;

pub use config::*;
pub use connection::*;
pub use error::*;
pub use events::*;
pub use state::*;

use std::fmt;

/// Which event feed to subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamScope {
    /// Fleet-wide feed
    Dashboard,
    /// Feed for a single server's detail view
    Server(u64),
}

impl StreamScope {
    pub fn path(&self) -> String {
        match self {
            StreamScope::Dashboard => "/ws/dashboard".to_string(),
            StreamScope::Server(id) => format!("/ws/server/{}", id),
        }
    }
}

impl fmt::Display for StreamScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Build the WebSocket URL for `scope`, mirroring the base URL's scheme:
/// `https` becomes `wss`, `http` becomes `ws`.
pub fn stream_url(base_url: &str, scope: StreamScope) -> Result<String, StreamError> {
    let base = base_url.trim().trim_end_matches('/');

    let (scheme, rest) = base
        .split_once("://")
        .ok_or_else(|| StreamError::InvalidUrl(base_url.to_string()))?;

    let ws_scheme = match scheme.to_lowercase().as_str() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        _ => return Err(StreamError::InvalidUrl(base_url.to_string())),
    };

    if rest.is_empty() {
        return Err(StreamError::InvalidUrl(base_url.to_string()));
    }

    Ok(format!("{}://{}{}", ws_scheme, rest, scope.path()))
}
