use std::fmt::Debug;
use text_trees::StringTreeNode;

use crate::policy::Aggregation;

#[derive(Debug, Clone, PartialEq)]
/// This is returned from a run of the search
/// It contains the value of the node, the chosen action index, and (optionally) everything we
/// learned about the children
pub enum SearchReturn<Action: Clone + Debug> {
    /// This is a non-leaf node in the game tree
    Node {
        /// Which agent was moving at this node
        agent: usize,
        /// How the children were folded into `value`
        aggregation: Aggregation,
        /// The value of this node
        value: f64,
        /// Index into the moving agent's legal actions of the action we settled on
        ///
        /// This is only meaningful at the root for the maximizing agent. Chance nodes and
        /// nodes that were cut off never pick anything
        chosen: Option<usize>,
        /// Whether alpha-beta stopped looking at this node's children early
        cutoff: bool,
        /// Number of nodes visited in this subtree, this one included
        nodes: usize,
        /// The explored children, in the order they were explored
        ///
        /// Only populated when the search was asked to record the tree
        options: Vec<(Action, Self)>,
    },
    /// Represents a leaf node in the game tree
    /// This happens when we reach a terminal state (win/lose)
    /// or when we run out of depth
    Leaf {
        #[allow(missing_docs)]
        value: f64,
    },
}

impl<Action: Clone + Debug> SearchReturn<Action> {
    /// Returns the value for this node
    pub fn value(&self) -> f64 {
        match self {
            SearchReturn::Node { value, .. } => *value,
            SearchReturn::Leaf { value } => *value,
        }
    }

    /// Returns the index of the action chosen at this node, if any
    pub fn chosen_index(&self) -> Option<usize> {
        match self {
            SearchReturn::Node { chosen, .. } => *chosen,
            SearchReturn::Leaf { .. } => None,
        }
    }

    /// Number of nodes visited to produce this result
    pub fn node_count(&self) -> usize {
        match self {
            SearchReturn::Node { nodes, .. } => *nodes,
            SearchReturn::Leaf { .. } => 1,
        }
    }

    /// Returns all the actions in the 'route' through the game tree that the search took
    /// This is useful for debugging as it shows each of the actions the agents made during the
    /// simulation
    ///
    /// The route stops at the first node that didn't choose an action, or that wasn't recorded
    pub fn chosen_route(&self) -> Vec<(usize, Action)> {
        match self {
            SearchReturn::Leaf { .. } => vec![],
            SearchReturn::Node {
                agent,
                options,
                chosen,
                ..
            } => match chosen.and_then(|i| options.get(i)) {
                Some((action, child)) => {
                    let mut tail = child.chosen_route();
                    tail.insert(0, (*agent, action.clone()));
                    tail
                }
                None => vec![],
            },
        }
    }

    /// This returns a visual representation of the game tree that the search generated
    /// It shows the value, the moving agent and the action taken at each level
    ///
    /// Returns None for leaves, and for nodes whose children weren't recorded
    pub fn to_text_tree(&self) -> Option<String> {
        let tree_node = self.to_text_tree_node("".to_owned())?;
        Some(format!("{}", tree_node))
    }

    fn to_text_tree_node(&self, label: String) -> Option<StringTreeNode> {
        match self {
            SearchReturn::Leaf { .. } => None,
            SearchReturn::Node { options, .. } if options.is_empty() => None,
            SearchReturn::Node {
                agent,
                aggregation,
                options,
                value,
                cutoff,
                ..
            } => {
                let cutoff_marker = if *cutoff { " (cutoff)" } else { "" };
                let mut node = StringTreeNode::new(format!(
                    "{}{:?} {}{}",
                    label, aggregation, value, cutoff_marker
                ));
                for (action, result) in options {
                    let child_label = format!("agent {} {:?}: ", agent, action);
                    match result.to_text_tree_node(child_label.clone()) {
                        Some(next_node) => node.push_node(next_node),
                        None => node.push_node(StringTreeNode::new(format!(
                            "{}{}",
                            child_label,
                            result.value()
                        ))),
                    }
                }

                Some(node)
            }
        }
    }
}
