//! Agents that can be built by name, and the factories that build them

use anyhow::anyhow;
use multiagent_minimax::{ReflexAgent, SearchAgent, SearchOptions, SearchPolicy, TurnBasedGame};
use rand::RngCore;
use tracing::debug;

use crate::{
    eval::{EvaluatorKind, ReflexWeights},
    types::{nearest_ghost_distance, scared_timers, PelletGame},
};

/// An agent picked at runtime, usually through [agent_from_name]
pub type BoxedAgent<G> = Box<dyn PelletAgent<G> + Send + Sync>;
/// A factory picked at runtime, see [all_factories]
pub type BoxedFactory<G> = Box<dyn AgentFactory<G> + Send + Sync>;

/// Anything that can pick a move for the maximizing agent
pub trait PelletAgent<G: TurnBasedGame> {
    /// Name used in traces
    fn name(&self) -> &str;

    /// The action the maximizing agent should take from `game`
    ///
    /// # Panics
    ///
    /// Panics if the maximizing agent has no legal actions in `game`
    fn get_action(&self, game: &G, rng: &mut dyn RngCore) -> G::Action;
}

/// Builds one kind of agent, so agents can be looked up by name
pub trait AgentFactory<G: TurnBasedGame> {
    /// The name [agent_from_name] matches against
    fn name(&self) -> String;
    /// A fresh agent configured with `options`
    fn create(&self, options: AgentOptions) -> BoxedAgent<G>;
}

/// Knobs shared by every agent we can build by name
///
/// The reflex agent ignores both, it has its own evaluator and never looks ahead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentOptions {
    /// Leaf evaluator for the search agents, defaults to [EvaluatorKind::Score]
    pub evaluator: EvaluatorKind,
    /// Full rounds to search, defaults to 2
    pub depth: usize,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            evaluator: EvaluatorKind::Score,
            depth: 2,
        }
    }
}

impl<G: PelletGame> PelletAgent<G> for ReflexAgent<G, ReflexWeights> {
    fn name(&self) -> &str {
        self.name
    }

    fn get_action(&self, game: &G, rng: &mut dyn RngCore) -> G::Action {
        debug!(
            agent_name = self.name,
            nearest_ghost = ?nearest_ghost_distance(game, false),
            scared_timers = %scared_timers(game),
            "choosing reflex action"
        );
        self.choose_action(game, rng)
    }
}

impl<G: PelletGame> PelletAgent<G> for SearchAgent<G, EvaluatorKind> {
    fn name(&self) -> &str {
        self.name
    }

    fn get_action(&self, game: &G, rng: &mut dyn RngCore) -> G::Action {
        debug!(
            agent_name = self.name,
            num_agents = game.num_agents(),
            depth = self.options().depth,
            scared_timers = %scared_timers(game),
            "choosing search action"
        );
        self.choose_action(game, rng)
    }
}

/// Builds the one-ply agent scored by [ReflexWeights]
pub struct ReflexFactory;

impl<G: PelletGame + 'static> AgentFactory<G> for ReflexFactory {
    fn name(&self) -> String {
        "reflex".to_owned()
    }

    fn create(&self, _options: AgentOptions) -> BoxedAgent<G> {
        Box::new(ReflexAgent::new(ReflexWeights::default(), "reflex"))
    }
}

/// Builds a [SearchAgent] for one [SearchPolicy], named after the policy
pub struct SearchFactory {
    /// How the built agent models the ghosts
    pub policy: SearchPolicy,
}

impl<G: PelletGame + 'static> AgentFactory<G> for SearchFactory {
    fn name(&self) -> String {
        self.policy.name().to_owned()
    }

    fn create(&self, options: AgentOptions) -> BoxedAgent<G> {
        Box::new(SearchAgent::new(
            options.evaluator,
            self.policy.name(),
            SearchOptions {
                policy: self.policy,
                depth: options.depth,
                ..Default::default()
            },
        ))
    }
}

/// Every agent that can be built by name: `reflex`, then one per [SearchPolicy]
pub fn all_factories<G: PelletGame + 'static>() -> Vec<BoxedFactory<G>> {
    let mut factories: Vec<BoxedFactory<G>> = vec![Box::new(ReflexFactory)];
    factories.extend(
        SearchPolicy::ALL
            .into_iter()
            .map(|policy| Box::new(SearchFactory { policy }) as BoxedFactory<G>),
    );
    factories
}

/// Builds the agent registered under `name`
pub fn agent_from_name<G: PelletGame + 'static>(
    name: &str,
    options: AgentOptions,
) -> anyhow::Result<BoxedAgent<G>> {
    let factories = all_factories::<G>();

    factories
        .iter()
        .find(|f| f.name() == name)
        .map(|f| f.create(options))
        .ok_or_else(|| {
            anyhow!(
                "No agent named '{}', expected one of: {}",
                name,
                factories.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ")
            )
        })
}
