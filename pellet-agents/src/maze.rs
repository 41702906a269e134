//! A small grid maze for the pellet agents to play in
//!
//! Agent 0 eats food, every other agent is a ghost hunting it. Ghosts with a running scared timer
//! can be eaten instead.

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Context};
use multiagent_minimax::{TurnBasedGame, VictorDeterminableGame, MAXIMIZING_AGENT};
use serde::{Deserialize, Serialize};

use crate::types::{
    FoodGettableGame, GhostGettableGame, GhostState, Position, PositionGettableGame,
    ScoreGettableGame, SizeDeterminableGame,
};

const MOVE_COST: i64 = 1;
const FOOD_REWARD: i64 = 10;
const WIN_REWARD: i64 = 500;
const LOSE_PENALTY: i64 = 500;
const GHOST_REWARD: i64 = 200;

/// A move on the grid. Only the food eater may [Direction::Stop] freely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Up, towards larger `y`
    North,
    /// Down, towards smaller `y`
    South,
    /// Right, towards larger `x`
    East,
    /// Left, towards smaller `x`
    West,
    /// Stay put
    Stop,
}

impl Direction {
    /// Every direction, in the order legal actions are listed
    pub const ALL: [Direction; 5] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Stop,
    ];

    /// North is up, so it increases `y`
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Stop => (0, 0),
        }
    }

    /// The cell one step from `position` in this direction
    pub fn apply(self, position: Position) -> Position {
        let (dx, dy) = self.delta();
        Position::new(position.x + dx, position.y + dy)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::Stop => "stop",
        };
        f.write_str(s)
    }
}

/// An adversary, agents 1 and up in ghost order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ghost {
    /// Where the ghost is now
    pub position: Position,
    /// Where the ghost goes back to after being eaten
    pub start: Position,
    /// Ghost moves left before it is dangerous again
    #[serde(default)]
    pub scared_timer: u32,
}

impl Ghost {
    /// A ghost that isn't scared and starts where it stands
    pub fn new(position: Position) -> Self {
        Self {
            position,
            start: position,
            scared_timer: 0,
        }
    }
}

/// The whole game state. Cells run from `(0, 0)` in the bottom left
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    /// Number of columns
    pub width: u32,
    /// Number of rows
    pub height: u32,
    /// Cells nobody can move into
    #[serde(default)]
    pub walls: Vec<Position>,
    /// Food still on the board, in the order it was placed
    pub food: Vec<Position>,
    /// Where agent 0 is
    pub pacman: Position,
    /// Every adversary, ghost `i` is agent `i + 1`
    #[serde(default)]
    pub ghosts: Vec<Ghost>,
    /// Running score, see the reward constants at the top of this module
    #[serde(default)]
    pub score: i64,
    /// Set once an unscared ghost catches agent 0
    #[serde(default)]
    pub lost: bool,
}

impl Maze {
    /// An empty, wall-less maze with only the food eater in it
    pub fn new(width: u32, height: u32, pacman: Position) -> Self {
        Self {
            width,
            height,
            walls: vec![],
            food: vec![],
            pacman,
            ghosts: vec![],
            score: 0,
            lost: false,
        }
    }

    /// Adds walls to the maze
    pub fn with_walls(mut self, walls: impl IntoIterator<Item = Position>) -> Self {
        self.walls.extend(walls);
        self
    }

    /// Adds food to the maze
    pub fn with_food(mut self, food: impl IntoIterator<Item = Position>) -> Self {
        self.food.extend(food);
        self
    }

    /// Adds a ghost that starts, and respawns, at `position`
    pub fn with_ghost(mut self, position: Position) -> Self {
        self.ghosts.push(Ghost::new(position));
        self
    }

    /// Like [Maze::with_ghost], but the ghost stays edible for `scared_timer` of its own moves
    pub fn with_scared_ghost(mut self, position: Position, scared_timer: u32) -> Self {
        self.ghosts.push(Ghost {
            scared_timer,
            ..Ghost::new(position)
        });
        self
    }

    /// Loads a maze in the format of the files under `fixtures/`
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Couldn't parse maze from json")
    }

    fn is_open(&self, position: &Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.width
            && (position.y as u32) < self.height
            && !self.walls.contains(position)
    }

    fn open_moves(&self, from: Position) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(|d| *d != Direction::Stop)
            .filter(move |d| self.is_open(&d.apply(from)))
    }

    fn resolve_collisions(&mut self) {
        for ghost in self.ghosts.iter_mut() {
            if ghost.position != self.pacman {
                continue;
            }

            if ghost.scared_timer > 0 {
                self.score += GHOST_REWARD;
                ghost.position = ghost.start;
                ghost.scared_timer = 0;
            } else if !self.lost {
                self.score -= LOSE_PENALTY;
                self.lost = true;
            }
        }
    }

    fn move_pacman(&mut self, direction: Direction) {
        self.pacman = direction.apply(self.pacman);
        self.score -= MOVE_COST;

        if let Some(index) = self.food.iter().position(|f| *f == self.pacman) {
            self.food.remove(index);
            self.score += FOOD_REWARD;

            if self.food.is_empty() {
                self.score += WIN_REWARD;
            }
        }
    }

    fn move_ghost(&mut self, ghost_index: usize, direction: Direction) {
        let ghost = &mut self.ghosts[ghost_index];
        ghost.position = direction.apply(ghost.position);
        ghost.scared_timer = ghost.scared_timer.saturating_sub(1);
    }
}

impl TurnBasedGame for Maze {
    type Action = Direction;

    fn num_agents(&self) -> usize {
        1 + self.ghosts.len()
    }

    fn legal_actions(&self, agent: usize) -> Vec<Direction> {
        if self.is_over() {
            return vec![];
        }

        if agent == MAXIMIZING_AGENT {
            let mut moves: Vec<_> = self.open_moves(self.pacman).collect();
            moves.push(Direction::Stop);
            return moves;
        }

        let moves: Vec<_> = self.open_moves(self.ghosts[agent - 1].position).collect();
        if moves.is_empty() {
            vec![Direction::Stop]
        } else {
            moves
        }
    }

    fn successor(&self, agent: usize, action: &Direction) -> Self {
        let mut next = self.clone();

        if agent == MAXIMIZING_AGENT {
            next.move_pacman(*action);
        } else {
            next.move_ghost(agent - 1, *action);
        }
        next.resolve_collisions();

        next
    }
}

impl VictorDeterminableGame for Maze {
    fn is_win(&self) -> bool {
        !self.lost && self.food.is_empty()
    }

    fn is_lose(&self) -> bool {
        self.lost
    }
}

impl PositionGettableGame for Maze {
    fn agent_position(&self) -> Position {
        self.pacman
    }
}

impl FoodGettableGame for Maze {
    fn food_positions(&self) -> Vec<Position> {
        self.food.clone()
    }

    fn food_count(&self) -> usize {
        self.food.len()
    }
}

impl GhostGettableGame for Maze {
    fn ghost_states(&self) -> Vec<GhostState> {
        self.ghosts
            .iter()
            .map(|ghost| GhostState {
                x: ghost.position.x as f64,
                y: ghost.position.y as f64,
                scared_timer: ghost.scared_timer,
            })
            .collect()
    }
}

impl SizeDeterminableGame for Maze {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

impl ScoreGettableGame for Maze {
    fn game_score(&self) -> f64 {
        self.score as f64
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height as i32).rev() {
            for x in 0..self.width as i32 {
                let position = Position::new(x, y);
                let ghost = self.ghosts.iter().find(|g| g.position == position);

                let c = if let Some(ghost) = ghost {
                    if ghost.scared_timer > 0 {
                        'S'
                    } else {
                        'G'
                    }
                } else if self.pacman == position {
                    'P'
                } else if self.walls.contains(&position) {
                    '%'
                } else if self.food.contains(&position) {
                    '.'
                } else {
                    ' '
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Parses the same picture [Maze]'s `Display` draws, top row first
///
/// Every line is a row, blank ones included, so the height is the number of lines. Scared ghosts
/// parse with a timer of 1, since the picture doesn't say how long they have left
impl FromStr for Maze {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().collect();
        let height = rows.len();
        let width = rows
            .iter()
            .map(|r| r.chars().count())
            .max()
            .ok_or_else(|| anyhow!("Maze layout is empty"))?;

        let mut pacman = None;
        let mut maze = Maze::new(width as u32, height as u32, Position::default());

        for (row_index, row) in rows.iter().enumerate() {
            let y = (height - 1 - row_index) as i32;

            for (x, c) in row.chars().enumerate() {
                let position = Position::new(x as i32, y);

                match c {
                    '%' => maze.walls.push(position),
                    '.' => maze.food.push(position),
                    'G' => maze.ghosts.push(Ghost::new(position)),
                    'S' => maze.ghosts.push(Ghost {
                        scared_timer: 1,
                        ..Ghost::new(position)
                    }),
                    'P' => {
                        if pacman.replace(position).is_some() {
                            bail!("Maze layout has more than one P");
                        }
                    }
                    ' ' => {}
                    other => bail!("Unexpected character '{}' in maze layout at {}", other, position),
                }
            }
        }

        maze.pacman = pacman.ok_or_else(|| anyhow!("Maze layout has no P"))?;
        Ok(maze)
    }
}
