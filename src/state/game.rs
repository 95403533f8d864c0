use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

use crate::state::board::{BingoBoard, BoardError, generate_board};

/// Unique, case-sensitive player name.
pub type PlayerName = String;

/// Root object shared by every request handler and written to snapshots.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Every signed-up player keyed by name, in signup order.
    #[serde(rename = "Players", default)]
    #[serde_as(as = "DefaultOnNull")]
    pub players: IndexMap<PlayerName, PlayerRecord>,
}

/// Everything the server knows about one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Placeholder credential embedded in the session cookie.
    #[serde(rename = "Password")]
    pub password: String,
    /// Moderation flag, not enforced yet.
    #[serde(rename = "Approved")]
    pub approved: bool,
    /// The player's board.
    #[serde(rename = "Board")]
    pub board: BingoBoard,
}

impl PlayerRecord {
    /// New, unapproved player with a freshly drawn board.
    pub fn new(password: String) -> Self {
        Self {
            password,
            approved: false,
            board: generate_board(),
        }
    }
}

impl GameState {
    /// Check every board, returning the first player whose board is invalid.
    pub fn validate(&self) -> Result<(), (PlayerName, BoardError)> {
        for (name, player) in &self.players {
            player.board.validate().map_err(|err| (name.clone(), err))?;
        }
        Ok(())
    }
}
