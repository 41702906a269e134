use std::marker::PhantomData;

use derivative::Derivative;
use rand::Rng;
use tracing::{debug, info_span};

use crate::{
    game::{Turn, TurnBasedGame, VictorDeterminableGame, MAXIMIZING_AGENT},
    policy::{Aggregation, SearchPolicy},
    score::{choose_best, first_best, first_worst, mean, LeafScorable, Scorable},
    SearchReturn,
};

#[derive(Derivative, Clone)]
#[derivative(Debug(bound = ""))]
/// This is the struct that wraps a scoring function and a set of [SearchOptions] and can be used
/// to pick actions for the maximizing agent of any [TurnBasedGame]
///
/// It also outputs traces using the [tracing] crate.
pub struct SearchAgent<GameType, ScorableType>
where
    ScorableType: Scorable<GameType>,
{
    #[derivative(Debug = "ignore")]
    score_function: ScorableType,
    /// Name used in traces
    pub name: &'static str,
    options: SearchOptions,
    #[derivative(Debug = "ignore")]
    _phantom: PhantomData<fn(&GameType)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Optional properties that can be defined for a [SearchAgent]
///
/// The defaults (as implemented by [Default]) are as follows:
/// ```
/// use multiagent_minimax::{SearchOptions, SearchPolicy};
///
/// let defaults: SearchOptions = Default::default();
///
/// assert_eq!(defaults.policy, SearchPolicy::Minimax);
/// assert_eq!(defaults.depth, 2);
/// assert!(!defaults.record_tree);
/// ```
pub struct SearchOptions {
    /// How the adversaries are modeled
    pub policy: SearchPolicy,
    /// How many full rounds (one move per agent) to look ahead before scoring
    ///
    /// Defaults to 2
    pub depth: usize,
    /// Keep every explored child in the returned [SearchReturn]
    ///
    /// Useful for debugging with [SearchReturn::to_text_tree], but the whole tree is held in
    /// memory so this should stay off for deep searches. Defaults to false
    pub record_tree: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            policy: SearchPolicy::Minimax,
            depth: 2,
            record_tree: false,
        }
    }
}

/// Running bounds for alpha-beta pruning
///
/// `alpha` is the best value the maximizing agent can already guarantee on the current path, and
/// `beta` the best the minimizing agents can. Passed down by value, so siblings never share them
#[derive(Debug, Clone, Copy, PartialEq)]
struct Window {
    alpha: f64,
    beta: f64,
}

impl Window {
    fn unbounded() -> Self {
        Self {
            alpha: f64::NEG_INFINITY,
            beta: f64::INFINITY,
        }
    }

    /// Fold the best value found so far at a node into the window
    ///
    /// Returns true when the rest of the node's children can be skipped
    fn cuts_off(&mut self, aggregation: Aggregation, best_so_far: f64) -> bool {
        match aggregation {
            Aggregation::Maximize => {
                if best_so_far > self.beta {
                    return true;
                }
                self.alpha = self.alpha.max(best_so_far);
            }
            Aggregation::Minimize => {
                if best_so_far < self.alpha {
                    return true;
                }
                self.beta = self.beta.min(best_so_far);
            }
            Aggregation::Average => {
                unreachable!("Chance nodes are never searched with alpha-beta bounds")
            }
        }

        false
    }
}

impl<GameType, ScorableType> LeafScorable<GameType> for SearchAgent<GameType, ScorableType>
where
    GameType: VictorDeterminableGame,
    ScorableType: Scorable<GameType>,
{
    fn score(&self, node: &GameType) -> f64 {
        self.score_function.score(node)
    }
}

impl<GameType, ScorableType> SearchAgent<GameType, ScorableType>
where
    GameType: TurnBasedGame + VictorDeterminableGame,
    ScorableType: Scorable<GameType>,
{
    /// Construct a new `SearchAgent`
    ///
    /// [SearchOptions] implements [Default] so you can override specific options and rely on
    /// defaults for the rest.
    pub fn new(score_function: ScorableType, name: &'static str, options: SearchOptions) -> Self {
        Self {
            score_function,
            name,
            options,
            _phantom: PhantomData,
        }
    }

    /// The options this agent searches with
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Pick the action the maximizing agent should take from `game`
    ///
    /// This runs [SearchAgent::search] and returns the legal action at the chosen index. With a
    /// depth of 0 nothing gets chosen, so we fall back to the first legal action.
    ///
    /// # Panics
    ///
    /// Panics if the maximizing agent has no legal actions
    pub fn choose_action<R: Rng + ?Sized>(&self, game: &GameType, rng: &mut R) -> GameType::Action {
        info_span!(
            "search",
            agent_name = self.name,
            policy = %self.options.policy,
            depth = self.options.depth,
            chosen_value = tracing::field::Empty,
            chosen_index = tracing::field::Empty,
            nodes = tracing::field::Empty,
        )
        .in_scope(|| {
            let result = self.search(game, rng);

            let current_span = tracing::Span::current();
            current_span.record("chosen_value", result.value());
            current_span.record("nodes", result.node_count());

            let mut actions = game.legal_actions(MAXIMIZING_AGENT);
            assert!(
                !actions.is_empty(),
                "The maximizing agent has no legal actions to choose from"
            );

            let index = match result.chosen_index() {
                Some(index) => index,
                None => {
                    debug!("Search chose nothing at the root, taking the first legal action");
                    0
                }
            };
            current_span.record("chosen_index", index);

            actions.swap_remove(index)
        })
    }

    /// Runs the configured search from `game`, with the maximizing agent to move, returning the
    /// value of the root and the index of the chosen action.
    ///
    /// The return value is a recursive struct, see [SearchOptions::record_tree] to also get the
    /// values of all the explored children
    pub fn search<R: Rng + ?Sized>(
        &self,
        game: &GameType,
        rng: &mut R,
    ) -> SearchReturn<GameType::Action> {
        self.search_node(game, Turn::root(self.options.depth), Window::unbounded(), rng)
    }

    fn search_node<R: Rng + ?Sized>(
        &self,
        node: &GameType,
        turn: Turn,
        mut window: Window,
        rng: &mut R,
    ) -> SearchReturn<GameType::Action> {
        if let Some(value) = self.leaf_score(node, turn) {
            return SearchReturn::Leaf { value };
        }

        let actions = node.legal_actions(turn.agent);
        assert!(
            !actions.is_empty(),
            "Agent {} has no legal actions in a state that isn't over",
            turn.agent
        );

        let policy = self.options.policy;
        let aggregation = policy.aggregation(turn.agent);
        let next_turn = turn.next(node.num_agents());

        let mut values = Vec::with_capacity(actions.len());
        let mut options = vec![];
        let mut nodes = 1;
        let mut best_so_far: Option<f64> = None;

        for action in actions {
            let child = self.search_node(
                &node.successor(turn.agent, &action),
                next_turn,
                window,
                rng,
            );
            let value = child.value();
            nodes += child.node_count();
            values.push(value);

            if self.options.record_tree {
                options.push((action, child));
            }

            if policy.prunes() {
                let best = match (aggregation, best_so_far) {
                    (_, None) => value,
                    (Aggregation::Maximize, Some(best)) => best.max(value),
                    (_, Some(best)) => best.min(value),
                };
                best_so_far = Some(best);

                if window.cuts_off(aggregation, best) {
                    return SearchReturn::Node {
                        agent: turn.agent,
                        aggregation,
                        value: best,
                        chosen: None,
                        cutoff: true,
                        nodes,
                        options,
                    };
                }
            }
        }

        let (value, chosen) = match aggregation {
            Aggregation::Maximize => {
                let index = if policy.breaks_ties_randomly() {
                    choose_best(&values, rng)
                } else {
                    first_best(&values)
                }
                .expect("There is always at least one child to choose from");

                (values[index], Some(index))
            }
            Aggregation::Minimize => {
                let index =
                    first_worst(&values).expect("There is always at least one child to choose from");

                (values[index], Some(index))
            }
            Aggregation::Average => (mean(&values), None),
        };

        SearchReturn::Node {
            agent: turn.agent,
            aggregation,
            value,
            chosen,
            cutoff: false,
            nodes,
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, collections::HashSet, rc::Rc};

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Tree {
        /// A non-terminal node the scorer gives this value to
        Leaf(f64),
        Win(f64),
        Lose(f64),
        /// Heuristic value, then the children in action order
        Branch(f64, Vec<Tree>),
    }

    /// A game where the state is a hand built tree and an action is a child index
    #[derive(Debug, Clone)]
    struct TreeGame {
        tree: Tree,
        num_agents: usize,
        legal_action_calls: Rc<Cell<usize>>,
    }

    impl TreeGame {
        fn new(tree: Tree, num_agents: usize) -> Self {
            Self {
                tree,
                num_agents,
                legal_action_calls: Rc::new(Cell::new(0)),
            }
        }
    }

    impl TurnBasedGame for TreeGame {
        type Action = usize;

        fn num_agents(&self) -> usize {
            self.num_agents
        }

        fn legal_actions(&self, _agent: usize) -> Vec<usize> {
            self.legal_action_calls
                .set(self.legal_action_calls.get() + 1);

            match &self.tree {
                Tree::Branch(_, children) => (0..children.len()).collect(),
                _ => vec![],
            }
        }

        fn successor(&self, _agent: usize, action: &usize) -> Self {
            match &self.tree {
                Tree::Branch(_, children) => Self {
                    tree: children[*action].clone(),
                    ..self.clone()
                },
                _ => unreachable!("Leaves have no successors"),
            }
        }
    }

    impl VictorDeterminableGame for TreeGame {
        fn is_win(&self) -> bool {
            matches!(self.tree, Tree::Win(_))
        }

        fn is_lose(&self) -> bool {
            matches!(self.tree, Tree::Lose(_))
        }
    }

    fn tree_value(game: &TreeGame) -> f64 {
        match game.tree {
            Tree::Leaf(v) | Tree::Win(v) | Tree::Lose(v) | Tree::Branch(v, _) => v,
        }
    }

    fn agent(policy: SearchPolicy, depth: usize) -> SearchAgent<TreeGame, fn(&TreeGame) -> f64> {
        SearchAgent::new(
            tree_value as fn(&TreeGame) -> f64,
            "tree",
            SearchOptions {
                policy,
                depth,
                record_tree: true,
            },
        )
    }

    fn leaves(values: &[f64]) -> Vec<Tree> {
        values.iter().map(|v| Tree::Leaf(*v)).collect()
    }

    /// The textbook example: the maximizer should pick the first branch worth 3
    fn textbook_tree() -> Tree {
        Tree::Branch(
            0.0,
            vec![
                Tree::Branch(0.0, leaves(&[3.0, 12.0, 8.0])),
                Tree::Branch(0.0, leaves(&[2.0, 4.0, 6.0])),
                Tree::Branch(0.0, leaves(&[14.0, 5.0, 2.0])),
            ],
        )
    }

    fn random_tree(rng: &mut StdRng, plies: usize) -> Tree {
        if plies == 0 {
            return Tree::Leaf(rng.gen_range(0..20) as f64);
        }

        let branching = rng.gen_range(1..=3);
        Tree::Branch(
            0.0,
            (0..branching).map(|_| random_tree(rng, plies - 1)).collect(),
        )
    }

    #[test]
    fn test_depth_zero_only_scores_the_root() {
        let game = TreeGame::new(Tree::Branch(7.5, leaves(&[1.0, 2.0])), 2);
        let calls = Cell::new(0);
        let scorer = |g: &TreeGame| {
            calls.set(calls.get() + 1);
            tree_value(g)
        };
        let agent = SearchAgent::new(
            &scorer,
            "depth-zero",
            SearchOptions {
                depth: 0,
                ..Default::default()
            },
        );

        let result = agent.search(&game, &mut StdRng::seed_from_u64(0));

        assert_eq!(result, SearchReturn::Leaf { value: 7.5 });
        assert_eq!(calls.get(), 1);
        assert_eq!(game.legal_action_calls.get(), 0);
    }

    #[test]
    fn test_terminal_states_short_circuit() {
        for tree in [Tree::Win(100.0), Tree::Lose(-100.0)] {
            let expected = match tree {
                Tree::Win(v) | Tree::Lose(v) => v,
                _ => unreachable!(),
            };
            let game = TreeGame::new(tree, 2);

            for policy in SearchPolicy::ALL {
                let result = agent(policy, 4).search(&game, &mut StdRng::seed_from_u64(0));
                assert_eq!(result, SearchReturn::Leaf { value: expected });
            }

            assert_eq!(game.legal_action_calls.get(), 0);
        }
    }

    #[test]
    fn test_minimax_textbook_tree() {
        let game = TreeGame::new(textbook_tree(), 2);

        let result = agent(SearchPolicy::Minimax, 1).search(&game, &mut StdRng::seed_from_u64(0));

        assert_eq!(result.value(), 3.0);
        assert_eq!(result.chosen_index(), Some(0));
        assert_eq!(result.node_count(), 13);
        assert_eq!(result.chosen_route(), vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn test_alpha_beta_prunes_without_changing_the_answer() {
        let game = TreeGame::new(textbook_tree(), 2);
        let mut rng = StdRng::seed_from_u64(0);

        let minimax = agent(SearchPolicy::Minimax, 1).search(&game, &mut rng);
        let alpha_beta = agent(SearchPolicy::AlphaBeta, 1).search(&game, &mut rng);

        assert_eq!(alpha_beta.value(), minimax.value());
        assert_eq!(alpha_beta.chosen_index(), Some(0));
        assert_eq!(alpha_beta.node_count(), 11);
        assert!(alpha_beta.node_count() < minimax.node_count());

        match alpha_beta {
            SearchReturn::Node { options, .. } => {
                assert!(matches!(
                    options[1].1,
                    SearchReturn::Node {
                        cutoff: true,
                        chosen: None,
                        ..
                    }
                ));
            }
            SearchReturn::Leaf { .. } => panic!("The root should be a node"),
        }
    }

    #[test]
    fn test_alpha_beta_matches_minimax_on_random_trees() {
        for seed in 0..200 {
            let mut tree_rng = StdRng::seed_from_u64(seed);
            let num_agents = tree_rng.gen_range(1..=3);
            let depth = tree_rng.gen_range(0..=2);
            let game = TreeGame::new(random_tree(&mut tree_rng, num_agents * depth), num_agents);

            let minimax = agent(SearchPolicy::Minimax, depth)
                .search(&game, &mut StdRng::seed_from_u64(seed));
            let alpha_beta = agent(SearchPolicy::AlphaBeta, depth)
                .search(&game, &mut StdRng::seed_from_u64(seed));

            assert_eq!(
                minimax.value(),
                alpha_beta.value(),
                "seed {seed} with {num_agents} agents at depth {depth}"
            );
            assert!(alpha_beta.node_count() <= minimax.node_count());
        }
    }

    #[test]
    fn test_expectimax_averages_adversary() {
        let game = TreeGame::new(
            Tree::Branch(0.0, vec![Tree::Branch(0.0, leaves(&[10.0, 20.0, 30.0]))]),
            2,
        );

        let result =
            agent(SearchPolicy::Expectimax, 1).search(&game, &mut StdRng::seed_from_u64(0));

        assert_eq!(result.value(), 20.0);
        assert_eq!(result.chosen_index(), Some(0));
        match result {
            SearchReturn::Node { options, .. } => assert_eq!(options[0].1.chosen_index(), None),
            SearchReturn::Leaf { .. } => panic!("The root should be a node"),
        }
    }

    #[test]
    fn test_expectimax_prefers_better_average_over_better_worst_case() {
        let game = TreeGame::new(
            Tree::Branch(
                0.0,
                vec![
                    Tree::Branch(0.0, leaves(&[5.0, 5.0])),
                    Tree::Branch(0.0, leaves(&[0.0, 100.0])),
                ],
            ),
            2,
        );
        let mut rng = StdRng::seed_from_u64(0);

        let minimax = agent(SearchPolicy::Minimax, 1).search(&game, &mut rng);
        let expectimax = agent(SearchPolicy::Expectimax, 1).search(&game, &mut rng);

        assert_eq!(minimax.chosen_index(), Some(0));
        assert_eq!(minimax.value(), 5.0);
        assert_eq!(expectimax.chosen_index(), Some(1));
        assert_eq!(expectimax.value(), 50.0);
    }

    #[test]
    fn test_random_tie_break_reaches_every_tied_action() {
        let game = TreeGame::new(
            Tree::Branch(
                0.0,
                vec![
                    Tree::Branch(0.0, leaves(&[4.0])),
                    Tree::Branch(0.0, leaves(&[1.0])),
                    Tree::Branch(0.0, leaves(&[4.0])),
                    Tree::Branch(0.0, leaves(&[4.0])),
                ],
            ),
            2,
        );

        for policy in [SearchPolicy::Minimax, SearchPolicy::Expectimax] {
            let agent = agent(policy, 1);
            let chosen: HashSet<usize> = (0..200)
                .filter_map(|seed| {
                    agent
                        .search(&game, &mut StdRng::seed_from_u64(seed))
                        .chosen_index()
                })
                .collect();

            assert_eq!(chosen, HashSet::from([0, 2, 3]), "{policy}");
        }

        let alpha_beta = agent(SearchPolicy::AlphaBeta, 1);
        for seed in 0..20 {
            let result = alpha_beta.search(&game, &mut StdRng::seed_from_u64(seed));
            assert_eq!(result.chosen_index(), Some(0));
        }
    }

    #[test]
    fn test_depth_counts_full_rounds() {
        // Three agents and a depth of 1 means the maximizer and both adversaries move once
        let game = TreeGame::new(
            Tree::Branch(
                0.0,
                vec![
                    Tree::Branch(
                        0.0,
                        vec![
                            Tree::Branch(0.0, leaves(&[9.0, 7.0])),
                            Tree::Branch(0.0, leaves(&[8.0, 6.0])),
                        ],
                    ),
                    Tree::Branch(0.0, vec![Tree::Branch(0.0, leaves(&[5.0]))]),
                ],
            ),
            3,
        );

        for policy in [SearchPolicy::Minimax, SearchPolicy::AlphaBeta] {
            let result = agent(policy, 1).search(&game, &mut StdRng::seed_from_u64(0));

            assert_eq!(result.value(), 6.0, "{policy}");
            assert_eq!(result.chosen_index(), Some(0), "{policy}");
        }

        let result = agent(SearchPolicy::Expectimax, 1).search(&game, &mut StdRng::seed_from_u64(0));
        assert_eq!(result.value(), 7.5);
    }

    #[test]
    fn test_terminal_children_are_scored_directly() {
        let game = TreeGame::new(
            Tree::Branch(
                0.0,
                vec![Tree::Branch(0.0, leaves(&[1.0])), Tree::Win(1000.0)],
            ),
            2,
        );

        for policy in SearchPolicy::ALL {
            let result = agent(policy, 1).search(&game, &mut StdRng::seed_from_u64(0));

            assert_eq!(result.value(), 1000.0, "{policy}");
            assert_eq!(result.chosen_index(), Some(1), "{policy}");
        }
        assert_eq!(game.legal_action_calls.get(), 3 * 2);
    }

    #[test]
    fn test_choose_action_returns_the_legal_action() {
        let game = TreeGame::new(textbook_tree(), 2);

        for policy in SearchPolicy::ALL {
            let action = agent(policy, 1).choose_action(&game, &mut StdRng::seed_from_u64(1));
            assert_eq!(action, 0, "{policy}");
        }
    }

    #[test]
    fn test_choose_action_at_depth_zero_takes_first_action() {
        let game = TreeGame::new(textbook_tree(), 2);

        let action = agent(SearchPolicy::Minimax, 0).choose_action(&game, &mut StdRng::seed_from_u64(0));

        assert_eq!(action, 0);
    }

    #[test]
    fn test_options_are_kept() {
        let options = agent(SearchPolicy::Expectimax, 3).options();

        assert_eq!(options.policy, SearchPolicy::Expectimax);
        assert_eq!(options.depth, 3);
        assert!(options.record_tree);
    }

    #[test]
    #[should_panic(expected = "no legal actions")]
    fn test_no_legal_actions_is_a_contract_violation() {
        let game = TreeGame::new(Tree::Branch(0.0, vec![]), 2);

        agent(SearchPolicy::Minimax, 1).search(&game, &mut StdRng::seed_from_u64(0));
    }
}
