use decorum::N64;
use itertools::Itertools;
use rand::{seq::SliceRandom, Rng};

use crate::game::{Turn, TurnBasedGame, VictorDeterminableGame};

/// This trait is used to control something that can return a score from a game state
///
/// Higher scores are better for the maximizing agent. We use this trait to be able to layer in
/// different scoring approaches, closures and configured structs alike
pub trait Scorable<GameType> {
    /// Convert the given game state into a score
    fn score(&self, game: &GameType) -> f64;
}

impl<GameType, FnLike: Fn(&GameType) -> f64> Scorable<GameType> for FnLike {
    fn score(&self, game: &GameType) -> f64 {
        (self)(game)
    }
}

/// Scores a single candidate action from the current state, rather than a whole state
///
/// This is what one-ply reflex agents use to pick between their moves
pub trait ActionScorable<GameType: TurnBasedGame> {
    /// Score the result of the maximizing agent taking `action` from `game`
    fn score_action(&self, game: &GameType, action: &GameType::Action) -> f64;
}

impl<GameType, FnLike> ActionScorable<GameType> for FnLike
where
    GameType: TurnBasedGame,
    FnLike: Fn(&GameType, &GameType::Action) -> f64,
{
    fn score_action(&self, game: &GameType, action: &GameType::Action) -> f64 {
        (self)(game, action)
    }
}

/// Provides an implementation for `leaf_score` if the implementer implements the `score`
/// function.
///
/// `leaf_score` decides if a node is a leaf in the search tree, and only then asks the scoring
/// function about it. This is the one place the scoring function gets called from
pub trait LeafScorable<GameType>
where
    GameType: VictorDeterminableGame,
{
    /// The scoring function used for every leaf, terminal or not
    fn score(&self, node: &GameType) -> f64;

    /// Returns the score IFF this node is a leaf: we ran out of depth, or the game is won or
    /// lost. Otherwise returns None and the caller should keep searching
    fn leaf_score(&self, node: &GameType, turn: Turn) -> Option<f64> {
        if turn.depth_remaining == 0 || node.is_win() || node.is_lose() {
            return Some(self.score(node));
        }

        None
    }
}

/// All the indices that share the highest value
///
/// Panics if any value is NaN, since a NaN score would silently corrupt the comparison
pub fn best_indices(values: &[f64]) -> Vec<usize> {
    let best = match values.iter().map(|v| N64::from(*v)).max() {
        Some(best) => best,
        None => return vec![],
    };

    values
        .iter()
        .positions(|v| N64::from(*v) == best)
        .collect()
}

/// Pick the index of a highest value, uniformly at random between ties
pub fn choose_best<R: Rng + ?Sized>(values: &[f64], rng: &mut R) -> Option<usize> {
    best_indices(values).choose(rng).copied()
}

/// Index of the first highest value, in enumeration order
pub fn first_best(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
            Some((_, b)) if N64::from(*v) <= N64::from(b) => best,
            _ => Some((i, *v)),
        })
        .map(|(i, _)| i)
}

/// Index of the first lowest value, in enumeration order
pub fn first_worst(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |worst: Option<(usize, f64)>, (i, v)| match worst {
            Some((_, w)) if N64::from(*v) >= N64::from(w) => worst,
            _ => Some((i, *v)),
        })
        .map(|(i, _)| i)
}

/// Unweighted arithmetic mean
///
/// Every child of a chance node is equally likely, so this is the expected value
pub fn mean(values: &[f64]) -> f64 {
    assert!(
        !values.is_empty(),
        "Can't take the expectation over zero outcomes"
    );

    values.iter().sum::<f64>() / values.len() as f64
}
