#![warn(missing_docs)]
//! Food-eating agents built on [multiagent_minimax], plus the evaluation functions they score
//! states with and a small maze to play them in.

pub mod agents;
pub mod eval;
pub mod maze;
pub mod types;

pub use agents::{
    agent_from_name, all_factories, AgentFactory, AgentOptions, BoxedAgent, BoxedFactory,
    PelletAgent, ReflexFactory, SearchFactory,
};
pub use eval::{better_score, game_score, reflex_score, EvaluatorKind, ReflexWeights, StateWeights};
pub use maze::{Direction, Ghost, Maze};
pub use types::{
    FoodGettableGame, GhostGettableGame, GhostState, PelletGame, Position, PositionGettableGame,
    ScoreGettableGame, SizeDeterminableGame,
};
