//! Startup loading of the latest snapshot into the state store.

use std::{
    convert::Infallible,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::info;

use crate::{
    dao::{byte_store::ByteStorage, storage::StorageError},
    services::persistence::decode_snapshot,
    state::{
        board::BoardError,
        game::{GameState, PlayerName},
        store::StateStore,
    },
};

/// Reasons the server must not start with the snapshot on disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The snapshot exists but could not be read.
    #[error("failed to read snapshot")]
    Read(#[from] StorageError),
    /// The snapshot is not valid JSON in the expected layout.
    #[error("snapshot `{}` is malformed", path.display())]
    Decode {
        /// Snapshot location.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// A board in the snapshot breaks the board invariants.
    #[error("snapshot `{}` holds an invalid board for player `{player}`", path.display())]
    InvalidBoard {
        /// Snapshot location.
        path: PathBuf,
        /// Owner of the broken board.
        player: PlayerName,
        /// Violated board rule.
        #[source]
        source: BoardError,
    },
}

/// What the loader found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No snapshot yet: the store was left empty.
    Fresh,
    /// The store now holds the snapshot's players.
    Restored {
        /// Number of players restored.
        players: usize,
    },
}

/// Replace the store contents with the snapshot at `path`, if there is one.
pub async fn load_state(
    store: &StateStore<GameState>,
    storage: &dyn ByteStorage,
    path: &Path,
) -> Result<LoadOutcome, LoadError> {
    let Some(contents) = storage.read(path).await? else {
        info!(path = %path.display(), "no saved game state; starting empty");
        return Ok(LoadOutcome::Fresh);
    };

    let loaded = decode_snapshot(&contents).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    loaded
        .validate()
        .map_err(|(player, source)| LoadError::InvalidBoard {
            path: path.to_path_buf(),
            player,
            source,
        })?;

    let players = loaded.players.len();
    store
        .modify(|state| {
            *state = loaded;
            Ok::<_, Infallible>(())
        })
        .await
        .unwrap_or_else(|never| match never {});

    info!(path = %path.display(), players, "game state loaded");
    Ok(LoadOutcome::Restored { players })
}
