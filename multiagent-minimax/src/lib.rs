#![deny(missing_debug_implementations, missing_docs)]
#![warn(missing_copy_implementations)]
//! This crate implements depth limited adversarial search for turn based games with any number of
//! agents. You provide a 'scoring' function that turns a given game state into an `f64`, where
//! higher is better for the maximizing agent (always agent 0).
//!
//! Three policies are supported, see [SearchPolicy]:
//!
//! * minimax, where every adversary picks what is worst for us
//! * minimax with alpha-beta pruning, which gives the same values while skipping subtrees that
//!   can't matter
//! * expectimax, where every adversary picks uniformly at random
//!
//! The game itself is up to you, it only needs to implement [TurnBasedGame] and
//! [VictorDeterminableGame].
//!
//! ```rust
//! use multiagent_minimax::{
//!     SearchAgent, SearchOptions, SearchPolicy, TurnBasedGame, VictorDeterminableGame,
//! };
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Two agents take turns adding 1 or 2 to a running total. We want it high, they want it low
//! #[derive(Debug, Clone, Copy)]
//! struct Total(u32);
//!
//! impl TurnBasedGame for Total {
//!     type Action = u32;
//!
//!     fn num_agents(&self) -> usize { 2 }
//!     fn legal_actions(&self, _agent: usize) -> Vec<u32> { vec![1, 2] }
//!     fn successor(&self, _agent: usize, action: &u32) -> Self { Total(self.0 + action) }
//! }
//!
//! impl VictorDeterminableGame for Total {
//!     fn is_win(&self) -> bool { false }
//!     fn is_lose(&self) -> bool { false }
//! }
//!
//! let agent = SearchAgent::new(
//!     |game: &Total| game.0 as f64,
//!     "adder",
//!     SearchOptions {
//!         policy: SearchPolicy::AlphaBeta,
//!         ..Default::default()
//!     },
//! );
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! assert_eq!(agent.choose_action(&Total(0), &mut rng), 2);
//! assert_eq!(agent.search(&Total(0), &mut rng).value(), 6.0);
//! ```

mod engine;
mod game;
mod policy;
mod reflex;
mod score;
mod search_return;

pub use engine::{SearchAgent, SearchOptions};
pub use game::{Turn, TurnBasedGame, VictorDeterminableGame, MAXIMIZING_AGENT};
pub use policy::{Aggregation, SearchPolicy};
pub use reflex::ReflexAgent;
pub use score::{
    best_indices, choose_best, first_best, first_worst, mean, ActionScorable, LeafScorable,
    Scorable,
};
pub use search_return::SearchReturn;
