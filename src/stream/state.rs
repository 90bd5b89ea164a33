//! Connection lifecycle state machine.
//!
//! The reconnect loop is driven entirely by [`ConnectionState::transition`]:
//! the runtime feeds it inputs (socket opened, closed, errored, timer
//! elapsed, disabled) and performs whatever action it returns.

use serde::Serialize;
use std::fmt;

/// Where a live connection is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Not started yet
    #[default]
    Disconnected,
    /// Handshake in flight
    Connecting,
    /// Socket open, frames flowing
    Connected,
    /// Socket lost; one reconnect is scheduled
    AwaitingReconnect,
    /// Torn down. Terminal: no further transitions.
    Disabled,
}

/// Things that happen to a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionInput {
    Start,
    Opened,
    Closed,
    Errored,
    ReconnectElapsed,
    Disable,
}

/// Side effect the runtime must perform after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionAction {
    /// Open a new socket
    Connect,
    /// Start the fixed-delay reconnect timer
    ScheduleReconnect,
    /// Close any open socket and cancel any pending timer
    CloseSocket,
}

impl ConnectionState {
    /// Compute the next state and the action to run.
    pub fn transition(self, input: ConnectionInput) -> (ConnectionState, Option<ConnectionAction>) {
        use ConnectionAction as A;
        use ConnectionInput as I;
        use ConnectionState as S;

        match (self, input) {
            (S::Disabled, _) => (S::Disabled, None),
            (_, I::Disable) => (S::Disabled, Some(A::CloseSocket)),

            (S::Disconnected, I::Start) => (S::Connecting, Some(A::Connect)),
            (S::Connecting, I::Opened) => (S::Connected, None),
            (S::Connecting | S::Connected, I::Closed | I::Errored) => {
                (S::AwaitingReconnect, Some(A::ScheduleReconnect))
            }
            (S::AwaitingReconnect, I::ReconnectElapsed) => (S::Connecting, Some(A::Connect)),

            // A second close/error while a reconnect is already pending, a
            // stray timer, or a duplicate start: nothing to do.
            (state, _) => (state, None),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::AwaitingReconnect => "awaiting_reconnect",
            ConnectionState::Disabled => "disabled",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
