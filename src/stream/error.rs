//! Error types for the live event stream.

use thiserror::Error;

/// Errors raised while setting up a stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamError {
    /// Base URL can't be turned into a ws:// or wss:// URL
    #[error("invalid stream URL '{0}': expected http(s):// or ws(s):// scheme")]
    InvalidUrl(String),
}

/// Reasons an inbound frame was not turned into an event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Backend keepalive reply
    #[error("keepalive frame")]
    Keepalive,

    /// Not JSON, or JSON of the wrong shape
    #[error("malformed frame: {0}")]
    Malformed(String),
}
