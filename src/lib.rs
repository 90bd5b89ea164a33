//! ServerEye live client
//!
//! Keeps a local picture of a server fleet in sync with the ServerEye
//! monitoring backend: a bulk REST snapshot seeds the store, a reconnecting
//! WebSocket stream patches it in real time, and consumers read immutable
//! snapshots of the result.

pub mod api;
pub mod cli;
pub mod config;
pub mod logging;
pub mod session;
pub mod store;
pub mod stream;
pub mod sync;
pub mod view;
