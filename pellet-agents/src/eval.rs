//! Evaluation functions for the food eater, one that scores its moves and two that score states

use std::{fmt, str::FromStr};

use anyhow::bail;
use multiagent_minimax::{ActionScorable, Scorable, TurnBasedGame, MAXIMIZING_AGENT};

use crate::types::{
    nearest_food_distance, nearest_ghost_distance, nearest_ghost_distance_exact, FoodGettableGame,
    PelletGame, PositionGettableGame, ScoreGettableGame, SizeDeterminableGame,
};

/// Tunables for [reflex_score]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflexWeights {
    /// Ghosts strictly closer than this make a move worthless
    pub danger_radius: i32,
    /// Don't count ghosts with a running scared timer as a danger
    pub ignore_scared_ghosts: bool,
}

impl Default for ReflexWeights {
    fn default() -> Self {
        Self {
            danger_radius: 2,
            ignore_scared_ghosts: false,
        }
    }
}

/// Tunables for [better_score]
///
/// `depletion_weight` has to stay large next to `proximity_weight`, eating food should always
/// matter more than shuffling closer to it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateWeights {
    /// A cleared board scores this many times the board's distance scale
    pub win_multiplier: f64,
    /// Ghosts strictly closer than this give `danger_score`
    pub danger_radius: i32,
    /// Score for being too close to a ghost. Has to be lower than any other score
    pub danger_score: f64,
    /// Weight of the reward for having little food left
    pub depletion_weight: f64,
    /// Weight of the reward for being close to the nearest food
    pub proximity_weight: f64,
    /// Don't count ghosts with a running scared timer as a danger
    pub ignore_scared_ghosts: bool,
}

impl Default for StateWeights {
    fn default() -> Self {
        Self {
            win_multiplier: 1000.0,
            danger_radius: 3,
            danger_score: -100_000.0,
            depletion_weight: 460.0,
            proximity_weight: 1.0,
            ignore_scared_ghosts: false,
        }
    }
}

fn closest_food<T>(game: &T) -> f64
where
    T: PositionGettableGame + FoodGettableGame,
{
    // Food under the agent has already been eaten, so a 0 can only come from a game that doesn't
    // consume food on contact. Treat it as adjacent rather than dividing by zero
    nearest_food_distance(game)
        .expect("There is food left, so there has to be a closest one")
        .max(1) as f64
}

fn in_danger(nearest_ghost: Option<f64>, danger_radius: i32) -> bool {
    matches!(nearest_ghost, Some(d) if d < danger_radius as f64)
}

impl<T: PelletGame> ActionScorable<T> for ReflexWeights {
    fn score_action(&self, game: &T, action: &T::Action) -> f64 {
        let successor = game.successor(MAXIMIZING_AGENT, action);
        let max_distance = game.width().max(game.height()) as f64;

        let food_left_before = game.food_count();
        let food_left = successor.food_count();

        // No food left means we win, so we choose this action regardless
        if food_left == 0 {
            return 2.0 * max_distance + 1.0;
        }

        // Ghosts between two cells count at their real distance here, unlike in the state score
        let nearest_ghost = nearest_ghost_distance_exact(&successor, self.ignore_scared_ghosts);
        if in_danger(nearest_ghost, self.danger_radius) {
            return 0.0;
        }

        let closest_food = closest_food(&successor);
        if food_left < food_left_before {
            max_distance + max_distance / closest_food
        } else {
            max_distance / closest_food
        }
    }
}

impl<T: PelletGame> Scorable<T> for StateWeights {
    fn score(&self, game: &T) -> f64 {
        let max_distance = 2.0 * (game.width() + game.height()) as f64;
        let food_left = game.food_count();

        if food_left == 0 {
            return self.win_multiplier * max_distance;
        }

        let nearest_ghost = nearest_ghost_distance(game, self.ignore_scared_ghosts).map(f64::from);
        if in_danger(nearest_ghost, self.danger_radius) {
            return self.danger_score;
        }

        self.depletion_weight * max_distance / food_left as f64
            + self.proximity_weight * max_distance / closest_food(game)
    }
}

/// Scores `action` for a reflex agent with the default [ReflexWeights]
///
/// Winning moves score highest, moves next to a ghost score 0, and otherwise we reward eating and
/// being close to the next food
pub fn reflex_score<T: PelletGame>(game: &T, action: &<T as TurnBasedGame>::Action) -> f64 {
    ReflexWeights::default().score_action(game, action)
}

/// Scores a state for the tree search with the default [StateWeights]
pub fn better_score<T: PelletGame>(game: &T) -> f64 {
    StateWeights::default().score(game)
}

/// The game's own running score
pub fn game_score<T: ScoreGettableGame>(game: &T) -> f64 {
    game.game_score()
}

/// The leaf evaluators that can be picked by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluatorKind {
    /// [game_score]
    #[default]
    Score,
    /// [better_score]
    Better,
}

impl EvaluatorKind {
    /// Every evaluator, in the order they are listed to users
    pub const ALL: [EvaluatorKind; 2] = [EvaluatorKind::Score, EvaluatorKind::Better];

    /// The short name this evaluator is known by
    pub fn name(self) -> &'static str {
        match self {
            EvaluatorKind::Score => "score",
            EvaluatorKind::Better => "better",
        }
    }
}

impl<T: PelletGame> Scorable<T> for EvaluatorKind {
    fn score(&self, game: &T) -> f64 {
        match self {
            EvaluatorKind::Score => game_score(game),
            EvaluatorKind::Better => better_score(game),
        }
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EvaluatorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "score" | "scoreEvaluationFunction" => Ok(EvaluatorKind::Score),
            "better" | "betterEvaluationFunction" => Ok(EvaluatorKind::Better),
            other => bail!(
                "Unknown evaluation function '{}', expected one of: {}",
                other,
                EvaluatorKind::ALL.map(|e| e.name()).join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::maze::{Direction, Maze};
    use crate::types::Position;

    use super::*;

    fn open_maze(pacman: (i32, i32), food: &[(i32, i32)], ghosts: &[(i32, i32)]) -> Maze {
        let mut maze = Maze::new(5, 5, Position::new(pacman.0, pacman.1))
            .with_food(food.iter().map(|(x, y)| Position::new(*x, *y)));
        for (x, y) in ghosts {
            maze = maze.with_ghost(Position::new(*x, *y));
        }
        maze
    }

    #[test]
    fn test_reflex_winning_move_beats_everything() {
        let maze = open_maze((0, 0), &[(1, 0)], &[(4, 4)]);

        let win = reflex_score(&maze, &Direction::East);
        assert_eq!(win, 2.0 * 5.0 + 1.0);

        for direction in [Direction::North, Direction::Stop] {
            assert!(reflex_score(&maze, &direction) < win);
        }
    }

    #[test]
    fn test_reflex_win_fires_when_board_already_clear() {
        // Even standing right next to a ghost
        let maze = open_maze((0, 0), &[], &[(1, 0)]);

        assert_eq!(reflex_score(&maze, &Direction::Stop), 11.0);
    }

    #[test]
    fn test_reflex_avoids_ghosts() {
        let maze = open_maze((2, 2), &[(0, 0), (4, 4)], &[(4, 2)]);

        // Moving east lands 1 away from the ghost
        assert_eq!(reflex_score(&maze, &Direction::East), 0.0);
        // Moving west keeps us 3 away, and 3 from the food at the origin
        assert_eq!(reflex_score(&maze, &Direction::West), 5.0 / 3.0);
    }

    #[test]
    fn test_reflex_rewards_eating() {
        let maze = open_maze((2, 2), &[(2, 3), (2, 0)], &[]);

        // Eats (2, 3), then the other food is 3 away
        assert_eq!(reflex_score(&maze, &Direction::North), 5.0 + 5.0 / 3.0);
        // Eats nothing, 1 away from the food at (2, 0)
        assert_eq!(reflex_score(&maze, &Direction::South), 5.0);
    }

    #[test]
    fn test_reflex_scared_ghosts_can_be_ignored() {
        let maze = Maze::new(5, 5, Position::new(2, 2))
            .with_food([Position::new(0, 0), Position::new(4, 4)])
            .with_scared_ghost(Position::new(4, 2), 10);
        let fearless = ReflexWeights {
            ignore_scared_ghosts: true,
            ..Default::default()
        };

        assert_eq!(reflex_score(&maze, &Direction::East), 0.0);
        assert_eq!(fearless.score_action(&maze, &Direction::East), 5.0 / 3.0);
    }

    #[test]
    fn test_danger_radius_is_strict() {
        assert!(in_danger(Some(1.5), 2));
        assert!(!in_danger(Some(2.0), 2));
        assert!(!in_danger(None, 2));
    }

    #[test]
    fn test_better_score_branches() {
        // 2 * (5 + 5)
        let scale = 20.0;

        let cleared = open_maze((0, 0), &[], &[(1, 0)]);
        assert_eq!(better_score(&cleared), 1000.0 * scale);

        let danger = open_maze((0, 0), &[(4, 4)], &[(2, 0)]);
        assert_eq!(better_score(&danger), -100_000.0);

        let calm = open_maze((0, 0), &[(0, 2), (4, 4)], &[(3, 0)]);
        assert_eq!(better_score(&calm), 460.0 * scale / 2.0 + scale / 2.0);
    }

    #[test]
    fn test_better_score_without_ghosts() {
        let maze = open_maze((0, 0), &[(0, 1)], &[]);

        assert_eq!(better_score(&maze), 460.0 * 20.0 + 20.0);
    }

    #[test]
    fn test_evaluator_kind_scores() {
        let mut maze = open_maze((0, 0), &[(0, 1)], &[]);
        maze.score = 42;

        assert_eq!(EvaluatorKind::Score.score(&maze), 42.0);
        assert_eq!(EvaluatorKind::Better.score(&maze), better_score(&maze));
    }

    #[test]
    fn test_evaluator_kind_names() {
        assert_eq!("score".parse::<EvaluatorKind>().unwrap(), EvaluatorKind::Score);
        assert_eq!(
            "scoreEvaluationFunction".parse::<EvaluatorKind>().unwrap(),
            EvaluatorKind::Score
        );
        assert_eq!(
            "betterEvaluationFunction".parse::<EvaluatorKind>().unwrap(),
            EvaluatorKind::Better
        );
        assert_eq!(EvaluatorKind::default(), EvaluatorKind::Score);

        let err = "worse".parse::<EvaluatorKind>().unwrap_err();
        assert!(err.to_string().contains("better"));
    }
}
