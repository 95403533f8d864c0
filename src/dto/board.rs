use serde::{Deserialize, Serialize};

use crate::state::board::{DisplayBoard, DisplaySpace};

/// Change requested on a single space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceAction {
    /// Mark the goal as done.
    Complete,
    /// Undo a completion.
    Decomplete,
}

/// Query string of `POST /spaces/{x}/{y}`.
#[derive(Debug, Deserialize)]
pub struct SpaceActionQuery {
    /// Requested change.
    pub action: SpaceAction,
}

/// One space as shown to its owner.
#[derive(Clone, Debug, Serialize)]
pub struct SpaceView {
    /// Column, from the left.
    pub x: usize,
    /// Row, from the top.
    pub y: usize,
    /// Goal title.
    pub name: String,
    /// Goal explanation.
    pub description: String,
    /// Whether the goal is done.
    pub completed: bool,
    /// Where the uploaded photo can be fetched, if any.
    pub image_url: Option<String>,
    /// Set on the free center, which cannot be changed.
    pub locked: bool,
}

impl SpaceView {
    /// Project a space, resolving its image path against `base_path`.
    pub fn new(space: DisplaySpace, base_path: &str) -> Self {
        Self {
            x: space.position.x(),
            y: space.position.y(),
            name: space.goal.name.to_string(),
            description: space.goal.description.to_string(),
            completed: space.completed,
            image_url: space.image.map(|image| format!("{base_path}/{image}")),
            locked: space.locked,
        }
    }
}

/// A player's whole board together with the score.
#[derive(Debug, Serialize)]
pub struct BoardView {
    /// Owner of the board.
    pub user: String,
    /// Number of complete rows, columns and diagonals.
    pub score: usize,
    /// Spaces top to bottom, each row left to right.
    pub rows: Vec<Vec<SpaceView>>,
}

impl BoardView {
    /// Project a board for `user`.
    pub fn new(user: String, board: DisplayBoard, score: usize, base_path: &str) -> Self {
        Self {
            user,
            score,
            rows: board
                .rows()
                .map(|row| {
                    row.iter()
                        .cloned()
                        .map(|space| SpaceView::new(space, base_path))
                        .collect()
                })
                .collect(),
        }
    }
}
