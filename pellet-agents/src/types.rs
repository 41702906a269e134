//! Positional accessors the pellet evaluators need from a game
//!
//! These are only used for scoring, the search itself never looks at them.

use std::fmt;

use itertools::Itertools;
use multiagent_minimax::{TurnBasedGame, VictorDeterminableGame};
use serde::{Deserialize, Serialize};

/// A grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Column, growing to the east
    pub x: i32,
    /// Row, growing to the north
    pub y: i32,
}

impl Position {
    /// The cell at column `x`, row `y`
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Truncates fractional coordinates toward zero, so a ghost halfway between two cells counts
    /// as being in the one it left
    pub fn truncated(x: f64, y: f64) -> Self {
        Self {
            x: x.trunc() as i32,
            y: y.trunc() as i32,
        }
    }

    /// Grid distance, the sum of the absolute coordinate differences
    pub fn manhattan_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Where an adversary is, and how many more moves it stays harmless for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostState {
    /// Column, possibly between two cells
    pub x: f64,
    /// Row, possibly between two cells
    pub y: f64,
    /// Moves left before the ghost is dangerous again
    pub scared_timer: u32,
}

impl GhostState {
    /// The cell this ghost counts as being in
    pub fn grid_position(&self) -> Position {
        Position::truncated(self.x, self.y)
    }

    /// The ghost can currently be eaten
    pub fn is_scared(&self) -> bool {
        self.scared_timer > 0
    }
}

/// A game that knows where the maximizing agent is
pub trait PositionGettableGame {
    /// Position of the maximizing agent
    fn agent_position(&self) -> Position;
}

/// A game with food left to eat
pub trait FoodGettableGame {
    /// Every cell with food on it
    fn food_positions(&self) -> Vec<Position>;

    /// How much food is left
    fn food_count(&self) -> usize {
        self.food_positions().len()
    }
}

/// A game with ghosts in it
pub trait GhostGettableGame {
    /// One entry per ghost, in agent order
    fn ghost_states(&self) -> Vec<GhostState>;
}

/// A game on a board of known size
pub trait SizeDeterminableGame {
    /// Number of columns
    fn width(&self) -> u32;
    /// Number of rows
    fn height(&self) -> u32;
}

/// A game that keeps its own score
pub trait ScoreGettableGame {
    /// The running score the game itself keeps
    fn game_score(&self) -> f64;
}

/// Everything the pellet agents need from a game, bundled up
pub trait PelletGame:
    TurnBasedGame
    + VictorDeterminableGame
    + PositionGettableGame
    + FoodGettableGame
    + GhostGettableGame
    + SizeDeterminableGame
    + ScoreGettableGame
{
}

impl<T> PelletGame for T where
    T: TurnBasedGame
        + VictorDeterminableGame
        + PositionGettableGame
        + FoodGettableGame
        + GhostGettableGame
        + SizeDeterminableGame
        + ScoreGettableGame
{
}

/// Manhattan distance from the maximizing agent to the closest food, None when the board is clear
pub fn nearest_food_distance<T>(game: &T) -> Option<i32>
where
    T: PositionGettableGame + FoodGettableGame,
{
    let position = game.agent_position();

    game.food_positions()
        .iter()
        .map(|food| position.manhattan_distance(food))
        .min()
}

/// Manhattan distance from the maximizing agent to the closest ghost, None when there are no
/// ghosts to worry about
pub fn nearest_ghost_distance<T>(game: &T, ignore_scared: bool) -> Option<i32>
where
    T: PositionGettableGame + GhostGettableGame,
{
    let position = game.agent_position();

    game.ghost_states()
        .iter()
        .filter(|ghost| !(ignore_scared && ghost.is_scared()))
        .map(|ghost| position.manhattan_distance(&ghost.grid_position()))
        .min()
}

/// Manhattan distance from the maximizing agent to the closest ghost, measured from where the
/// ghosts really are rather than the cells they count as being in
pub fn nearest_ghost_distance_exact<T>(game: &T, ignore_scared: bool) -> Option<f64>
where
    T: PositionGettableGame + GhostGettableGame,
{
    let position = game.agent_position();

    game.ghost_states()
        .iter()
        .filter(|ghost| !(ignore_scared && ghost.is_scared()))
        .map(|ghost| (ghost.x - position.x as f64).abs() + (ghost.y - position.y as f64).abs())
        .min_by(|a, b| a.total_cmp(b))
}

/// Scared timers of every ghost, in agent order. Handy in traces
pub fn scared_timers<T: GhostGettableGame>(game: &T) -> String {
    game.ghost_states()
        .iter()
        .map(|ghost| ghost.scared_timer)
        .join(",")
}
