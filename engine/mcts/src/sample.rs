//! Training targets extracted from a finished search.

use games_uttt::{Observation, NUM_CELLS};

use crate::node::SearchTree;
use crate::search::SearchError;

/// One (input, policy target, value target) triple for the root position.
#[derive(Debug, Clone)]
pub struct TrainingSample {
    /// Encoding of the root board.
    pub observation: Observation,

    /// Target distribution over the 81 cells, indexed by
    /// [`games_uttt::Move::index`]. Sums to 1.
    pub policy: [f32; NUM_CELLS],

    /// Target value for the side to move at the root, in [-1, 1].
    pub value: f32,
}

impl TrainingSample {
    /// Build the targets for the root of `tree`.
    ///
    /// A classified root spreads the policy evenly over the children sharing
    /// its classification and takes the classification as value. Otherwise
    /// the policy is the children's visit share and the value is the win rate
    /// of the most visited child.
    pub fn from_tree(tree: &SearchTree) -> Result<Self, SearchError> {
        let root_id = tree.root();
        let root = tree.get(root_id);
        let children = tree.children(root_id);
        if children.is_empty() {
            return Err(if root.is_terminal() {
                SearchError::NoLegalMoves
            } else {
                SearchError::NoVisits
            });
        }

        let mut policy = [0.0f32; NUM_CELLS];
        let value;

        if root.is_terminal() {
            let tag = root.terminal_tag();
            for &child in children {
                let node = tree.get(child);
                if node.terminal_tag() == tag {
                    if let Some(mv) = node.last_move() {
                        policy[mv.index()] = 1.0;
                    }
                }
            }
            let x_result = tag.result().unwrap_or(0.0);
            value = x_result * root.board.side_to_move().sign();
        } else {
            let mut best: Option<(u32, f32)> = None;
            for &child in children {
                let node = tree.get(child);
                if let Some(mv) = node.last_move() {
                    policy[mv.index()] = node.visits as f32;
                }
                if node.visits > 0 && best.map_or(true, |(visits, _)| node.visits > visits) {
                    best = Some((node.visits, node.win_rate()));
                }
            }
            value = best.ok_or(SearchError::NoVisits)?.1;
        }

        let total: f32 = policy.iter().sum();
        if total <= 0.0 {
            return Err(SearchError::NoVisits);
        }
        for p in policy.iter_mut() {
            *p /= total;
        }

        Ok(Self {
            observation: root.board.observation(),
            policy,
            value,
        })
    }
}
