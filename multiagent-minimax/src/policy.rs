use std::{fmt, str::FromStr};

use anyhow::bail;

/// How the search treats the agents that aren't the maximizing agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPolicy {
    /// Every adversary picks whatever is worst for the maximizing agent
    #[default]
    Minimax,
    /// Same values as [SearchPolicy::Minimax], but skips subtrees that can't change the answer
    AlphaBeta,
    /// Every adversary picks uniformly at random between its legal actions
    Expectimax,
}

/// How the values of a node's children get folded into the value of the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Take the highest child
    Maximize,
    /// Take the lowest child
    Minimize,
    /// Take the mean of all children
    Average,
}

impl SearchPolicy {
    /// Every policy, in the order they are listed to users
    pub const ALL: [SearchPolicy; 3] = [
        SearchPolicy::Minimax,
        SearchPolicy::AlphaBeta,
        SearchPolicy::Expectimax,
    ];

    /// The aggregation used at a node where `agent` is moving
    pub fn aggregation(self, agent: usize) -> Aggregation {
        match (self, agent) {
            (_, crate::MAXIMIZING_AGENT) => Aggregation::Maximize,
            (SearchPolicy::Minimax | SearchPolicy::AlphaBeta, _) => Aggregation::Minimize,
            (SearchPolicy::Expectimax, _) => Aggregation::Average,
        }
    }

    /// Does this policy cut off branches using alpha-beta bounds
    pub fn prunes(self) -> bool {
        matches!(self, SearchPolicy::AlphaBeta)
    }

    /// Does this policy break ties between equally good root actions at random
    ///
    /// Alpha-beta has to stay order dependent for its cutoffs to make sense, so it always keeps
    /// the first best action instead
    pub fn breaks_ties_randomly(self) -> bool {
        !self.prunes()
    }

    /// The name this policy is known by
    pub fn name(self) -> &'static str {
        match self {
            SearchPolicy::Minimax => "minimax",
            SearchPolicy::AlphaBeta => "alphabeta",
            SearchPolicy::Expectimax => "expectimax",
        }
    }
}

impl fmt::Display for SearchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], "");

        match normalized.as_str() {
            "minimax" => Ok(SearchPolicy::Minimax),
            "alphabeta" => Ok(SearchPolicy::AlphaBeta),
            "expectimax" => Ok(SearchPolicy::Expectimax),
            _ => bail!(
                "Unknown search policy '{}', expected one of: {}",
                s,
                SearchPolicy::ALL.map(|p| p.name()).join(", ")
            ),
        }
    }
}
