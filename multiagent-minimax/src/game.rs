//! The contract a game has to expose for the search to run over it.
//!
//! The search never mutates a game. Every move produces a brand new value through
//! [TurnBasedGame::successor], and the caller owns whatever it gets back.

use std::fmt::Debug;

/// Index of the agent whose action the search ultimately selects
pub const MAXIMIZING_AGENT: usize = 0;

/// A game where agents take turns one at a time, in a fixed cyclic order
pub trait TurnBasedGame: Sized {
    /// Whatever an agent can do on its turn
    type Action: Clone + Debug + PartialEq;

    /// Total number of agents in the game, including the maximizing agent. Always at least 1
    fn num_agents(&self) -> usize;

    /// All the actions `agent` may take from this state
    ///
    /// The order is significant for alpha-beta pruning, which explores actions in exactly this
    /// order
    fn legal_actions(&self, agent: usize) -> Vec<Self::Action>;

    /// The state after `agent` takes `action`. Only called with actions returned from
    /// [TurnBasedGame::legal_actions]
    fn successor(&self, agent: usize, action: &Self::Action) -> Self;
}

/// A game that knows when it has been won or lost by the maximizing agent
pub trait VictorDeterminableGame {
    /// The maximizing agent has won
    fn is_win(&self) -> bool;

    /// The maximizing agent has lost
    fn is_lose(&self) -> bool;

    /// Either terminal predicate holds
    fn is_over(&self) -> bool {
        self.is_win() || self.is_lose()
    }
}

/// Whose turn it is, and how many full rounds are left to search
///
/// A round is one move for every agent, so `depth_remaining` only goes down once control wraps
/// back around to the maximizing agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    /// The agent about to move
    pub agent: usize,
    /// Full rounds left before leaves get scored
    pub depth_remaining: usize,
}

impl Turn {
    /// The first turn of a search, with the maximizing agent to move
    pub fn root(depth: usize) -> Self {
        Self {
            agent: MAXIMIZING_AGENT,
            depth_remaining: depth,
        }
    }

    /// The turn that follows this one in a game with `num_agents` agents
    pub fn next(self, num_agents: usize) -> Self {
        debug_assert!(num_agents >= 1, "A game needs at least one agent");

        if self.agent + 1 < num_agents {
            Self {
                agent: self.agent + 1,
                ..self
            }
        } else {
            Self {
                agent: MAXIMIZING_AGENT,
                depth_remaining: self.depth_remaining.saturating_sub(1),
            }
        }
    }
}
