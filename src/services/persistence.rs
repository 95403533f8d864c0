//! Background task flushing the game state to durable storage.
//!
//! Request handlers never touch storage: they call [`SaveTrigger::request`]
//! and this task coalesces every pending request into a single save, rotating
//! the previous snapshot to a backup before writing the new one.

use std::{path::PathBuf, sync::Arc};

use thiserror::Error;
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    watch,
};
use tracing::{debug, error, info, warn};

use crate::{
    dao::{byte_store::ByteStorage, storage::StorageError},
    state::{SharedState, game::GameState, store::StateStore},
};

/// Default number of save requests that can wait in the queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Producer side of the save queue, cloned into every handler that mutates state.
#[derive(Debug, Clone)]
pub struct SaveTrigger {
    tx: mpsc::Sender<()>,
}

impl SaveTrigger {
    /// Ask for a save soon. Never waits: when the queue is full a save is
    /// already pending and this request is folded into it.
    pub fn request(&self) {
        match self.tx.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => debug!("save queue full; request coalesced"),
            Err(TrySendError::Closed(())) => {
                warn!("persistence loop is not running; save request dropped")
            }
        }
    }
}

/// Create the bounded save queue. Capacity is clamped to at least one.
pub fn save_channel(capacity: usize) -> (SaveTrigger, mpsc::Receiver<()>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (SaveTrigger { tx }, rx)
}

/// Locations of the latest snapshot and of its backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    /// Snapshot written by the most recent save.
    pub latest: PathBuf,
    /// Snapshot written by the save before it.
    pub backup: PathBuf,
}

/// Failures that abandon a save cycle.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The state could not be serialized.
    #[error("failed to encode game state")]
    Encode(#[source] serde_json::Error),
    /// The new snapshot could not be written.
    #[error("failed to write snapshot")]
    Write(#[source] StorageError),
}

/// Serialize the game state into the snapshot format.
pub fn encode_snapshot(state: &GameState) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(state)
}

/// Parse a snapshot back into a game state.
pub fn decode_snapshot(contents: &[u8]) -> Result<GameState, serde_json::Error> {
    serde_json::from_slice(contents)
}

/// Writes snapshots of the game state with backup rotation.
#[derive(Clone)]
pub struct SnapshotWriter {
    storage: Arc<dyn ByteStorage>,
    paths: SnapshotPaths,
}

impl SnapshotWriter {
    /// Writer targeting `paths` on `storage`.
    pub fn new(storage: Arc<dyn ByteStorage>, paths: SnapshotPaths) -> Self {
        Self { storage, paths }
    }

    /// Paths this writer rotates between.
    pub fn paths(&self) -> &SnapshotPaths {
        &self.paths
    }

    /// Run one save cycle: encode under the store lock, then rotate the
    /// previous snapshot to the backup path and write the new one.
    ///
    /// A failed rotation is logged and does not stop the write: the latest
    /// data matters more than the backup.
    pub async fn save(&self, store: &StateStore<GameState>) -> Result<(), SaveError> {
        let encoded = store.read(encode_snapshot).await;
        let contents = encoded.map_err(SaveError::Encode)?;
        self.rotate_backup().await;
        self.storage
            .write(&self.paths.latest, contents)
            .await
            .map_err(SaveError::Write)
    }

    async fn rotate_backup(&self) {
        let SnapshotPaths { latest, backup } = &self.paths;

        match self.storage.exists(latest).await {
            Ok(true) => {}
            Ok(false) => return,
            Err(err) => {
                warn!(
                    path = %latest.display(),
                    error = %err,
                    "failed to look for previous snapshot; skipping backup"
                );
                return;
            }
        }

        match self.storage.remove(backup).await {
            Err(err) if !err.is_not_found() => {
                warn!(path = %backup.display(), error = %err, "failed to remove snapshot backup")
            }
            _ => {}
        }

        if let Err(err) = self.storage.rename(latest, backup).await {
            error!(
                from = %latest.display(),
                to = %backup.display(),
                error = %err,
                "failed to back up previous snapshot; overwriting it anyway"
            );
        }
    }
}

/// Resolves once shutdown is requested or its sender is gone.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    WaitingForTrigger,
    Draining,
    Saving { last: bool },
    Stopped,
}

/// Save the game state whenever a trigger arrives until `shutdown` flips to
/// `true`, then save one final time and return.
///
/// Save failures are logged and never end the loop. Dropping the shutdown
/// sender counts as a shutdown request. `state` holds a [`SaveTrigger`] of
/// its own, so `triggers` only closes early when it was created apart from
/// `state`; that too ends in the final save.
pub async fn run(
    state: SharedState,
    writer: SnapshotWriter,
    mut triggers: mpsc::Receiver<()>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(path = %writer.paths().latest.display(), "persistence loop started");
    let mut phase = Phase::WaitingForTrigger;

    loop {
        phase = match phase {
            Phase::WaitingForTrigger => tokio::select! {
                biased;
                _ = stop_requested(&mut shutdown) => {
                    info!("shutdown requested; performing final save");
                    Phase::Saving { last: true }
                }
                trigger = triggers.recv() => match trigger {
                    Some(()) => Phase::Draining,
                    None => {
                        info!("save queue closed; performing final save");
                        Phase::Saving { last: true }
                    }
                },
            },
            Phase::Draining => {
                let mut coalesced = 0_usize;
                while triggers.try_recv().is_ok() {
                    coalesced += 1;
                }
                debug!(coalesced, "save triggered");
                Phase::Saving { last: false }
            }
            Phase::Saving { last } => {
                match writer.save(state.game()).await {
                    Ok(()) => info!(path = %writer.paths().latest.display(), "game state saved"),
                    Err(err) => error!(error = ?err, "failed to save game state"),
                }
                if last {
                    Phase::Stopped
                } else {
                    Phase::WaitingForTrigger
                }
            }
            Phase::Stopped => break,
        };
    }

    info!("persistence loop stopped");
}
