use std::marker::PhantomData;

use derivative::Derivative;
use itertools::Itertools;
use rand::Rng;
use tracing::{debug, trace};

use crate::{
    game::{TurnBasedGame, MAXIMIZING_AGENT},
    score::{choose_best, ActionScorable},
};

#[derive(Derivative, Clone)]
#[derivative(Debug(bound = ""))]
/// A one-ply agent: it scores each of its own actions and takes the best one, without looking at
/// how the adversaries might respond
pub struct ReflexAgent<GameType, ScorableType>
where
    GameType: TurnBasedGame,
    ScorableType: ActionScorable<GameType>,
{
    #[derivative(Debug = "ignore")]
    score_function: ScorableType,
    /// Name used in traces
    pub name: &'static str,
    #[derivative(Debug = "ignore")]
    _phantom: PhantomData<fn(&GameType)>,
}

impl<GameType, ScorableType> ReflexAgent<GameType, ScorableType>
where
    GameType: TurnBasedGame,
    ScorableType: ActionScorable<GameType>,
{
    /// Construct a new `ReflexAgent`
    pub fn new(score_function: ScorableType, name: &'static str) -> Self {
        Self {
            score_function,
            name,
            _phantom: PhantomData,
        }
    }

    /// Score every legal action of the maximizing agent, in enumeration order
    pub fn scored_actions(&self, game: &GameType) -> Vec<(GameType::Action, f64)> {
        game.legal_actions(MAXIMIZING_AGENT)
            .into_iter()
            .map(|action| {
                let score = self.score_function.score_action(game, &action);
                trace!(agent_name = self.name, ?action, score, "scored action");
                (action, score)
            })
            .collect()
    }

    /// Pick one of the best scoring actions, uniformly at random between ties
    ///
    /// # Panics
    ///
    /// Panics if the maximizing agent has no legal actions
    pub fn choose_action<R: Rng + ?Sized>(&self, game: &GameType, rng: &mut R) -> GameType::Action {
        let (mut actions, scores): (Vec<_>, Vec<_>) = self.scored_actions(game).into_iter().unzip();

        let chosen = choose_best(&scores, rng)
            .expect("The maximizing agent has no legal actions to choose from");
        debug!(
            agent_name = self.name,
            chosen_score = scores[chosen],
            scores = %scores.iter().join(", "),
            "finished choose_action"
        );

        actions.swap_remove(chosen)
    }
}
