//! Bingo board model: a fixed 5×5 grid of goal slots with a free center.

use std::fmt;

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use serde_with::{NoneAsEmptyString, serde_as};
use thiserror::Error;

use super::catalog::{FREE_SPACE, GOAL_COUNT, GOALS, Goal};

/// Width and height of a board.
pub const BOARD_SIZE: usize = 5;
/// Total number of cells on a board.
pub const BOARD_CELLS: usize = BOARD_SIZE * BOARD_SIZE;
/// Number of cells that never carry a catalog goal.
pub const FREE_CELLS: usize = 1;
/// Row-major index of the free center cell.
const CENTER_INDEX: usize = BOARD_CELLS / 2;
/// Persisted goal index of the free center cell.
const FREE_GOAL_INDEX: i32 = -1;

/// Errors raised when addressing or validating a board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Coordinates outside of the 5×5 grid.
    #[error("position ({x}, {y}) is outside of the board")]
    InvalidPosition {
        /// Requested column.
        x: usize,
        /// Requested row.
        y: usize,
    },
    /// The free center space cannot be changed.
    #[error("space {0} is locked")]
    Locked(Position),
    /// A persisted goal index does not reference the catalog.
    #[error("goal index {0} is not part of the catalog")]
    InvalidGoalIndex(i64),
    /// The free slot is somewhere else than the center, or missing from it.
    #[error("free space misplaced at {0}")]
    MisplacedFreeSpace(Position),
    /// The center space is not marked as completed.
    #[error("free space is not completed")]
    FreeSpaceIncomplete,
    /// The same goal appears on more than one space.
    #[error("goal {0} appears more than once")]
    DuplicateGoal(usize),
}

/// Validated coordinates of a board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    x: usize,
    y: usize,
}

impl Position {
    /// The free center space.
    pub const CENTER: Position = Position {
        x: BOARD_SIZE / 2,
        y: BOARD_SIZE / 2,
    };

    /// Validate `(x, y)` against the board bounds.
    pub fn new(x: usize, y: usize) -> Result<Self, BoardError> {
        if x >= BOARD_SIZE || y >= BOARD_SIZE {
            return Err(BoardError::InvalidPosition { x, y });
        }
        Ok(Self { x, y })
    }

    /// Column, from the left.
    pub fn x(self) -> usize {
        self.x
    }

    /// Row, from the top.
    pub fn y(self) -> usize {
        self.y
    }

    fn from_index(index: usize) -> Self {
        Self {
            x: index % BOARD_SIZE,
            y: index / BOARD_SIZE,
        }
    }

    fn index(self) -> usize {
        self.y * BOARD_SIZE + self.x
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Index into [`GOALS`], only constructible in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GoalIndex(usize);

impl GoalIndex {
    /// Check `index` against the catalog size.
    pub fn new(index: usize) -> Option<Self> {
        (index < GOAL_COUNT).then_some(Self(index))
    }

    /// Position in the catalog.
    pub fn get(self) -> usize {
        self.0
    }

    /// The catalog entry.
    pub fn goal(self) -> Goal {
        GOALS[self.0]
    }
}

/// Goal carried by a space: the free center or an index into [`GOALS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum GoalSlot {
    /// The free center space.
    Free,
    /// Index into the goal catalog.
    Goal(GoalIndex),
}

impl GoalSlot {
    /// Resolve the slot to its catalog entry.
    pub fn goal(self) -> Goal {
        match self {
            GoalSlot::Free => FREE_SPACE,
            GoalSlot::Goal(index) => index.goal(),
        }
    }
}

impl TryFrom<i64> for GoalSlot {
    type Error = BoardError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == i64::from(FREE_GOAL_INDEX) {
            return Ok(GoalSlot::Free);
        }
        usize::try_from(value)
            .ok()
            .and_then(GoalIndex::new)
            .map(GoalSlot::Goal)
            .ok_or(BoardError::InvalidGoalIndex(value))
    }
}

impl From<GoalSlot> for i64 {
    fn from(value: GoalSlot) -> Self {
        match value {
            GoalSlot::Free => i64::from(FREE_GOAL_INDEX),
            // Catalog indices are tiny, the cast cannot truncate.
            GoalSlot::Goal(index) => index.get() as i64,
        }
    }
}

/// One cell of a board.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BingoSpace {
    /// Goal assigned at generation time; never changes afterwards.
    #[serde(rename = "GoalIdx")]
    pub goal: GoalSlot,
    /// Whether the player marked this goal as done.
    #[serde(rename = "Completed")]
    pub completed: bool,
    /// Path of the uploaded photo, if any.
    #[serde(rename = "Image", default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub image: Option<String>,
}

impl BingoSpace {
    fn free() -> Self {
        Self {
            goal: GoalSlot::Free,
            completed: true,
            image: None,
        }
    }

    fn open(index: GoalIndex) -> Self {
        Self {
            goal: GoalSlot::Goal(index),
            completed: false,
            image: None,
        }
    }

    /// Whether the space is the locked free center.
    pub fn is_free(&self) -> bool {
        matches!(self.goal, GoalSlot::Free)
    }

    fn display(&self, position: Position) -> DisplaySpace {
        DisplaySpace {
            position,
            goal: self.goal.goal(),
            completed: self.completed,
            image: self.image.clone(),
            locked: self.is_free(),
        }
    }
}

/// Fixed 5×5 arrangement of spaces, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BingoBoard {
    spaces: [BingoSpace; BOARD_CELLS],
}

/// Draw a new board using the thread-local RNG.
pub fn generate_board() -> BingoBoard {
    generate_board_with(&mut rand::rng())
}

/// Draw a new board: every catalog goal lands exactly once on the non-center
/// cells (row-major order after a Fisher–Yates shuffle) and the center is the
/// completed free space.
pub fn generate_board_with<R: Rng + ?Sized>(rng: &mut R) -> BingoBoard {
    let mut goals: [GoalIndex; GOAL_COUNT] = std::array::from_fn(GoalIndex);
    goals.shuffle(rng);

    let spaces = std::array::from_fn(|cell| match cell.cmp(&CENTER_INDEX) {
        std::cmp::Ordering::Less => BingoSpace::open(goals[cell]),
        std::cmp::Ordering::Equal => BingoSpace::free(),
        std::cmp::Ordering::Greater => BingoSpace::open(goals[cell - 1]),
    });
    BingoBoard { spaces }
}

impl BingoBoard {
    /// Borrow the space at `position`.
    pub fn space(&self, position: Position) -> &BingoSpace {
        &self.spaces[position.index()]
    }

    /// Iterate over every space with its coordinates, row by row.
    pub fn spaces(&self) -> impl Iterator<Item = (Position, &BingoSpace)> {
        self.spaces
            .iter()
            .enumerate()
            .map(|(index, space)| (Position::from_index(index), space))
    }

    fn is_completed(&self, x: usize, y: usize) -> bool {
        self.spaces[y * BOARD_SIZE + x].completed
    }

    fn unlocked_mut(&mut self, position: Position) -> Result<&mut BingoSpace, BoardError> {
        let space = &mut self.spaces[position.index()];
        if space.is_free() {
            return Err(BoardError::Locked(position));
        }
        Ok(space)
    }

    /// Mark or unmark the goal at `position`.
    pub fn set_completed(&mut self, position: Position, completed: bool) -> Result<(), BoardError> {
        self.unlocked_mut(position)?.completed = completed;
        Ok(())
    }

    /// Attach an uploaded photo to the goal at `position`, completing it.
    /// Returns the photo it replaces, if any.
    pub fn attach_image(
        &mut self,
        position: Position,
        image: String,
    ) -> Result<Option<String>, BoardError> {
        let space = self.unlocked_mut(position)?;
        space.completed = true;
        Ok(space.image.replace(image))
    }

    fn line_complete(&self, mut cells: impl Iterator<Item = (usize, usize)>) -> bool {
        cells.all(|(x, y)| self.is_completed(x, y))
    }

    /// Number of complete lines: 5 rows, 5 columns and 2 diagonals.
    pub fn score(&self) -> usize {
        let rows = (0..BOARD_SIZE)
            .filter(|&y| self.line_complete((0..BOARD_SIZE).map(|x| (x, y))))
            .count();
        let columns = (0..BOARD_SIZE)
            .filter(|&x| self.line_complete((0..BOARD_SIZE).map(|y| (x, y))))
            .count();
        let diagonals = [
            self.line_complete((0..BOARD_SIZE).map(|i| (i, i))),
            self.line_complete((0..BOARD_SIZE).map(|i| (i, BOARD_SIZE - 1 - i))),
        ]
        .into_iter()
        .filter(|complete| *complete)
        .count();

        rows + columns + diagonals
    }

    /// Read-only view resolving each slot to its goal.
    pub fn display(&self) -> DisplayBoard {
        DisplayBoard {
            spaces: self
                .spaces()
                .map(|(position, space)| space.display(position))
                .collect(),
        }
    }

    /// Read-only view of a single space.
    pub fn display_space(&self, position: Position) -> DisplaySpace {
        self.space(position).display(position)
    }

    /// Check the invariants of a board that did not come from
    /// [`generate_board`], e.g. one read back from a snapshot.
    pub fn validate(&self) -> Result<(), BoardError> {
        let mut seen = [false; GOAL_COUNT];
        for (position, space) in self.spaces() {
            match (position == Position::CENTER, space.goal) {
                (true, GoalSlot::Free) if !space.completed => {
                    return Err(BoardError::FreeSpaceIncomplete);
                }
                (true, GoalSlot::Free) => {}
                (true, GoalSlot::Goal(_)) | (false, GoalSlot::Free) => {
                    return Err(BoardError::MisplacedFreeSpace(position));
                }
                (false, GoalSlot::Goal(index)) => {
                    if std::mem::replace(&mut seen[index.get()], true) {
                        return Err(BoardError::DuplicateGoal(index.get()));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Denormalized board, row-major, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBoard {
    /// Every space in row-major order.
    pub spaces: Vec<DisplaySpace>,
}

impl DisplayBoard {
    /// Iterate over the rows of the board, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[DisplaySpace]> {
        self.spaces.chunks(BOARD_SIZE)
    }
}

/// Denormalized space with its resolved goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySpace {
    /// Coordinates of the space.
    pub position: Position,
    /// Resolved goal.
    pub goal: Goal,
    /// Completion flag.
    pub completed: bool,
    /// Path of the uploaded photo, if any.
    pub image: Option<String>,
    /// Set on the free center, which cannot be changed.
    pub locked: bool,
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn pos(x: usize, y: usize) -> Position {
        Position::new(x, y).unwrap()
    }

    fn board_with(seed: u64, completed: &[(usize, usize)]) -> BingoBoard {
        let mut board = generate_board_with(&mut StdRng::seed_from_u64(seed));
        for &(x, y) in completed {
            board.set_completed(pos(x, y), true).unwrap();
        }
        board
    }

    #[test]
    fn generated_board_is_a_permutation_with_free_center() {
        for _ in 0..50 {
            let board = generate_board();
            let center = board.space(Position::CENTER);
            assert!(center.is_free());
            assert!(center.completed);

            let mut indices = board
                .spaces()
                .filter(|(position, _)| *position != Position::CENTER)
                .map(|(_, space)| match space.goal {
                    GoalSlot::Goal(index) => index.get(),
                    GoalSlot::Free => panic!("free slot outside of the center"),
                })
                .collect::<Vec<_>>();
            indices.sort_unstable();
            assert_eq!(indices, (0..GOAL_COUNT).collect::<Vec<_>>());
            assert!(board.validate().is_ok());
        }
    }

    #[test]
    fn fresh_board_scores_zero() {
        assert_eq!(generate_board().score(), 0);
    }

    #[test]
    fn first_row_scores_one() {
        let board = board_with(1, &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        assert_eq!(board.score(), 1);
    }

    #[test]
    fn main_diagonal_scores_one() {
        let board = board_with(2, &[(0, 0), (1, 1), (3, 3), (4, 4)]);
        assert_eq!(board.score(), 1);
    }

    #[test]
    fn center_column_and_anti_diagonal_need_four_cells() {
        let board = board_with(3, &[(2, 0), (2, 1), (2, 3), (2, 4)]);
        assert_eq!(board.score(), 1);

        let board = board_with(3, &[(4, 0), (3, 1), (1, 3), (0, 4)]);
        assert_eq!(board.score(), 1);
    }

    #[test]
    fn full_board_scores_every_line() {
        let all = (0..BOARD_SIZE)
            .flat_map(|y| (0..BOARD_SIZE).map(move |x| (x, y)))
            .filter(|&(x, y)| pos(x, y) != Position::CENTER)
            .collect::<Vec<_>>();
        assert_eq!(board_with(4, &all).score(), 12);
    }

    #[test]
    fn score_only_depends_on_completed_positions() {
        let completed = [(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (0, 1), (0, 2), (0, 3), (0, 4)];
        let first = board_with(10, &completed);
        let second = board_with(11, &completed);
        assert_ne!(first, second);
        assert_eq!(first.score(), 2);
        assert_eq!(first.score(), second.score());
    }

    #[test]
    fn center_space_is_locked() {
        let mut board = generate_board();
        assert_eq!(
            board.set_completed(Position::CENTER, false),
            Err(BoardError::Locked(Position::CENTER))
        );
        assert_eq!(
            board.attach_image(Position::CENTER, "images/x.jpg".into()),
            Err(BoardError::Locked(Position::CENTER))
        );
        assert!(board.space(Position::CENTER).completed);
    }

    #[test]
    fn attaching_an_image_completes_the_space() {
        let mut board = generate_board();
        let target = pos(1, 3);
        let replaced = board.attach_image(target, "images/a.jpg".into()).unwrap();
        assert_eq!(replaced, None);
        let space = board.space(target);
        assert!(space.completed);
        assert_eq!(space.image.as_deref(), Some("images/a.jpg"));

        let replaced = board.attach_image(target, "images/b.jpg".into()).unwrap();
        assert_eq!(replaced.as_deref(), Some("images/a.jpg"));
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        assert_eq!(
            Position::new(5, 0),
            Err(BoardError::InvalidPosition { x: 5, y: 0 })
        );
        assert!(Position::new(0, 5).is_err());
        assert!(Position::new(4, 4).is_ok());
    }

    #[test]
    fn display_resolves_goals_and_locks_center() {
        let board = generate_board();
        let view = board.display();
        assert_eq!(view.rows().count(), BOARD_SIZE);

        let center = &view.spaces[CENTER_INDEX];
        assert!(center.locked);
        assert_eq!(center.goal, FREE_SPACE);
        assert_eq!(view.spaces.iter().filter(|space| space.locked).count(), 1);

        let corner = board.display_space(pos(4, 0));
        assert_eq!(corner.goal, board.space(pos(4, 0)).goal.goal());
        assert_eq!(view.spaces[4], corner);
    }

    #[test]
    fn persisted_layout_uses_minus_one_for_free_space() {
        let board = generate_board();
        let json = serde_json::to_value(&board).unwrap();
        let cells = json.as_array().unwrap();
        assert_eq!(cells.len(), BOARD_CELLS);
        assert_eq!(cells[CENTER_INDEX]["GoalIdx"], -1);
        assert_eq!(cells[CENTER_INDEX]["Completed"], true);
        assert_eq!(cells[CENTER_INDEX]["Image"], "");
    }

    #[test]
    fn validate_rejects_duplicates_and_bad_indices() {
        let mut board = generate_board();
        let first = board.spaces[0].goal;
        board.spaces[1].goal = first;
        assert!(matches!(board.validate(), Err(BoardError::DuplicateGoal(_))));

        assert_eq!(
            GoalSlot::try_from(24_i64),
            Err(BoardError::InvalidGoalIndex(24))
        );
        assert_eq!(GoalSlot::try_from(-1_i64), Ok(GoalSlot::Free));
    }

    #[test]
    fn goal_indices_stay_inside_the_catalog() {
        assert_eq!(GoalIndex::new(GOAL_COUNT), None);
        assert_eq!(GoalIndex::new(usize::MAX), None);
        let last = GoalIndex::new(GOAL_COUNT - 1).unwrap();
        assert_eq!(GoalSlot::Goal(last).goal(), GOALS[GOAL_COUNT - 1]);
        assert_eq!(i64::from(GoalSlot::Goal(last)), (GOAL_COUNT - 1) as i64);
    }

    #[test]
    fn validate_rejects_incomplete_center() {
        let mut board = generate_board();
        board.spaces[CENTER_INDEX].completed = false;
        assert_eq!(board.validate(), Err(BoardError::FreeSpaceIncomplete));
    }
}
