//! Single-writer task that owns the [`DashboardStore`].
//!
//! Writers send [`Mutation`]s through a [`StoreHandle`]; the task applies them
//! in arrival order and publishes a fresh [`DashboardSnapshot`] on a watch
//! channel plus a [`StoreChange`] on a broadcast channel after each change.

use super::{DashboardSnapshot, DashboardStore, Mutation, StoreChange, StoreConfig};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Errors from talking to the store task.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store task has stopped
    #[error("dashboard store is closed")]
    Closed,
}

struct Command {
    mutation: Mutation,
    ack: Option<oneshot::Sender<Option<StoreChange>>>,
}

/// Cloneable handle for reading and writing the live store.
#[derive(Clone)]
pub struct StoreHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Arc<DashboardSnapshot>>,
    changes: broadcast::Sender<StoreChange>,
}

impl StoreHandle {
    /// Queue a mutation without waiting for it to be applied.
    pub fn submit(&self, mutation: Mutation) -> Result<(), StoreError> {
        self.commands
            .send(Command {
                mutation,
                ack: None,
            })
            .map_err(|_| StoreError::Closed)
    }

    /// Apply a mutation and wait until it is visible to readers.
    pub async fn apply(&self, mutation: Mutation) -> Result<Option<StoreChange>, StoreError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command {
                mutation,
                ack: Some(tx),
            })
            .map_err(|_| StoreError::Closed)?;
        rx.await.map_err(|_| StoreError::Closed)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Receiver that resolves `changed()` whenever a new snapshot is published.
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardSnapshot>> {
        self.snapshots.clone()
    }

    /// Stream of change notifications. Slow receivers may observe `Lagged`.
    pub fn changes(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

/// Spawner for the store task.
pub struct LiveStore;

impl LiveStore {
    /// Start the store task. It runs until `cancel_token` fires or every
    /// handle has been dropped.
    pub fn spawn(
        config: &StoreConfig,
        cancel_token: CancellationToken,
    ) -> (StoreHandle, JoinHandle<()>) {
        Self::spawn_with(DashboardStore::new(config), config, cancel_token)
    }

    /// Start the store task from an existing store.
    pub fn spawn_with(
        mut store: DashboardStore,
        config: &StoreConfig,
        cancel_token: CancellationToken,
    ) -> (StoreHandle, JoinHandle<()>) {
        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<Command>();
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(store.snapshot()));
        let (change_tx, _) = broadcast::channel(config.change_buffer.max(1));

        let handle = StoreHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            changes: change_tx.clone(),
        };

        let join = tokio::spawn(async move {
            tracing::debug!("Dashboard store started");

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::debug!("Dashboard store shutting down");
                        break;
                    }
                    command = command_rx.recv() => {
                        let Some(Command { mutation, ack }) = command else {
                            tracing::debug!("All store handles dropped, stopping");
                            break;
                        };

                        let change = store.apply(mutation);
                        if let Some(change) = &change {
                            snapshot_tx.send_replace(Arc::new(store.snapshot()));
                            // Ignore error if nobody is listening
                            let _ = change_tx.send(change.clone());
                            metrics::counter!("servereye_store_changes_total").increment(1);
                            tracing::trace!(?change, version = store.version(), "Store updated");
                        }
                        if let Some(ack) = ack {
                            let _ = ack.send(change);
                        }
                    }
                }
            }
        });

        (handle, join)
    }
}
