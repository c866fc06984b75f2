//! MCTS search implementation.
//!
//! Each iteration runs the classic four phases:
//! 1. Selection: descend by rank value until a leaf or a terminal node,
//!    collapsing terminal classifications upwards on the way
//! 2. Expansion: add a child for every legal move
//! 3. Evaluation: a random child's evaluation (plain) or the node's own
//!    evaluation (guided)
//! 4. Backpropagation: update statistics up to the root
//!
//! The loop stops when the root is classified, the iteration budget is used
//! up or the deadline passes. The deadline is only checked between iterations.

use std::time::{Duration, Instant};

use games_uttt::{Board, Move};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::{MctsConfig, SearchMode};
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::node::{Ranking, SearchNode, SearchTree, TerminalTag};
use crate::sample::TrainingSample;
use crate::tree::NodeId;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Evaluator error: {0}")]
    EvaluatorError(#[from] EvaluatorError),

    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("No child of the search root matches the given board")]
    NoMatchingChild,

    #[error("Search root has no visited children")]
    NoVisits,
}

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The root's game-theoretic value is known.
    RootTerminal,
    NodeBudget,
    Timeout,
}

/// Summary of one call to [`MctsSearch::run`].
#[derive(Debug, Clone)]
pub struct SearchStats {
    pub iterations: u32,
    pub tree_nodes: usize,
    pub elapsed: Duration,
    pub stop_reason: StopReason,
}

/// MCTS search state.
///
/// The tree survives between calls to [`run`](Self::run), so a search can be
/// extended, and [`advance_to`](Self::advance_to) carries the relevant
/// subtree over to the next position in a game.
pub struct MctsSearch<'a, E: Evaluator> {
    tree: SearchTree,
    evaluator: &'a E,
    config: MctsConfig,
}

impl<'a, E: Evaluator> MctsSearch<'a, E> {
    /// Create a new MCTS search rooted at `board`.
    pub fn new(board: Board, evaluator: &'a E, config: MctsConfig) -> Self {
        Self {
            tree: SearchTree::new(SearchNode::new(board)),
            evaluator,
            config,
        }
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Position at the root of the tree.
    pub fn root_board(&self) -> &Board {
        &self.tree.get(self.tree.root()).board
    }

    pub fn is_root_terminal(&self) -> bool {
        self.tree.is_terminal_node(self.tree.root())
    }

    /// Search until the root is classified or a budget runs out.
    pub fn run(&mut self, rng: &mut ChaCha20Rng) -> Result<SearchStats, SearchError> {
        let start = Instant::now();
        let mut iterations = 0u32;

        let stop_reason = loop {
            if self.is_root_terminal() {
                break StopReason::RootTerminal;
            }
            if iterations >= self.config.max_nodes {
                break StopReason::NodeBudget;
            }
            if start.elapsed() >= self.config.timeout {
                break StopReason::Timeout;
            }
            iterations += 1;
            self.iterate(rng)?;
        };

        let stats = SearchStats {
            iterations,
            tree_nodes: self.tree.len(),
            elapsed: start.elapsed(),
            stop_reason,
        };
        debug!(
            mode = ?self.config.mode,
            iterations,
            tree_nodes = stats.tree_nodes,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            stop_reason = ?stop_reason,
            "MCTS search complete"
        );
        Ok(stats)
    }

    /// One select -> expand -> evaluate -> backpropagate pass.
    fn iterate(&mut self, rng: &mut ChaCha20Rng) -> Result<(), SearchError> {
        let ranking = self.config.ranking();
        let leaf = self.select(ranking);

        if let Some(result) = self.tree.get(leaf).terminal_tag().result() {
            self.tree.backpropagate(leaf, result);
            trace!(leaf = leaf.0, result, "terminal node revisited");
            return Ok(());
        }

        let (evaluated, value) = match self.config.mode {
            SearchMode::Rollout => {
                self.tree.expand(leaf);
                if let Some(result) = self.decisive_result(leaf) {
                    self.tree.backpropagate(leaf, result);
                    return Ok(());
                }
                let children = self.tree.children(leaf);
                let child = children[rng.gen_range(0..children.len())];
                (child, self.evaluate(child, rng)?)
            }
            SearchMode::Guided => {
                let eval = self.evaluator.evaluate(&self.tree.get(leaf).board, rng)?;
                eval.validate()?;
                self.tree.expand_with_policy(leaf, &eval.policy);
                if let Some(result) = self.decisive_result(leaf) {
                    self.tree.backpropagate(leaf, result);
                    return Ok(());
                }
                let side = self.tree.get(leaf).board.side_to_move();
                (leaf, eval.value * side.sign())
            }
        };

        self.tree.backpropagate(evaluated, value);
        trace!(
            leaf = leaf.0,
            evaluated = evaluated.0,
            children = self.tree.children(leaf).len(),
            value,
            "MCTS iteration complete"
        );
        Ok(())
    }

    /// X-relative evaluation of a node.
    fn evaluate(&self, id: NodeId, rng: &mut ChaCha20Rng) -> Result<f32, SearchError> {
        let board = &self.tree.get(id).board;
        let eval = self.evaluator.evaluate(board, rng)?;
        eval.validate()?;
        Ok(eval.value * board.side_to_move().sign())
    }

    fn decisive_result(&self, id: NodeId) -> Option<f32> {
        let tag = self.tree.get(id).tag;
        if tag.is_decisive() {
            tag.result()
        } else {
            None
        }
    }

    /// Descend from the root by rank value.
    ///
    /// When every child of a node is terminal, or its best child is decisive,
    /// the node inherits that child's tag and selection stops there. A drawn
    /// best child is returned itself.
    fn select(&mut self, ranking: Ranking) -> NodeId {
        let mut current = self.tree.root();

        while !(self.tree.is_leaf(current) || self.tree.is_terminal_node(current)) {
            let Some(best) = self.tree.best_child_by_rank(current, ranking) else {
                break;
            };
            let all_terminal = self
                .tree
                .children(current)
                .iter()
                .all(|&child| self.tree.is_terminal_node(child));

            if all_terminal {
                let tag = self.tree.get(best).terminal_tag();
                self.tree.get_mut(current).tag = tag;
                return current;
            }
            if self.tree.is_terminal_node(best) {
                let tag = self.tree.get(best).terminal_tag();
                if tag == TerminalTag::Draw {
                    return best;
                }
                self.tree.get_mut(current).tag = tag;
                return current;
            }
            current = best;
        }

        current
    }

    /// Move to play: by rank value if the root is classified, otherwise the
    /// most visited child.
    pub fn best_move(&self) -> Result<Move, SearchError> {
        let root = self.tree.root();
        if self.tree.is_leaf(root) {
            return Err(if self.is_root_terminal() {
                SearchError::NoLegalMoves
            } else {
                SearchError::NoVisits
            });
        }

        let child = if self.is_root_terminal() {
            self.tree.best_child_by_rank(root, self.config.ranking())
        } else {
            self.tree.best_child_by_visits(root)
        };
        child
            .and_then(|id| self.tree.get(id).last_move())
            .ok_or(SearchError::NoLegalMoves)
    }

    /// Move sampled with probability proportional to visit count. A
    /// classified root falls back to [`best_move`](Self::best_move).
    pub fn sample_move(&self, rng: &mut ChaCha20Rng) -> Result<Move, SearchError> {
        let root = self.tree.root();
        if self.is_root_terminal() || self.tree.is_leaf(root) {
            return self.best_move();
        }

        let children = self.tree.children(root);
        let total: u64 = children
            .iter()
            .map(|&child| self.tree.get(child).visits as u64)
            .sum();
        if total == 0 {
            return self.best_move();
        }

        let mut pick = rng.gen_range(0..total);
        for &child in children {
            let visits = self.tree.get(child).visits as u64;
            if pick < visits {
                return self.tree.get(child).last_move().ok_or(SearchError::NoLegalMoves);
            }
            pick -= visits;
        }
        Err(SearchError::NoVisits)
    }

    /// The move the configured driver plays: greedy for plain search,
    /// visit-proportional sampling for guided search.
    pub fn choose_move(&self, rng: &mut ChaCha20Rng) -> Result<Move, SearchError> {
        match self.config.mode {
            SearchMode::Rollout => self.best_move(),
            SearchMode::Guided => self.sample_move(rng),
        }
    }

    /// Move the root to `board`, which must be the current root position or
    /// one ply after it.
    ///
    /// The matching child's subtree is kept and everything else is dropped.
    /// An unexpanded root, or a legal reply that expansion never generated
    /// (expansion stops at the first winning move), starts a fresh tree.
    pub fn advance_to(&mut self, board: &Board) -> Result<(), SearchError> {
        let root = self.tree.root();
        if self.root_board() == board {
            return Ok(());
        }

        if !self.tree.is_leaf(root) {
            if let Some(child) = self.tree.find_child(root, board) {
                self.tree.reroot(child);
                debug!(
                    kept_nodes = self.tree.len(),
                    root_visits = self.tree.get(self.tree.root()).visits,
                    "Reused search subtree"
                );
                return Ok(());
            }
            if !self.is_successor(board) {
                return Err(SearchError::NoMatchingChild);
            }
        }

        self.tree = SearchTree::new(SearchNode::new(board.clone()));
        Ok(())
    }

    fn is_successor(&self, board: &Board) -> bool {
        let root = self.root_board();
        let Some(mv) = board.last_move() else {
            return false;
        };
        if board.plies() != root.plies() + 1 || !root.legal_moves().contains(&mv) {
            return false;
        }
        let mut next = root.clone();
        next.apply(mv);
        next == *board
    }

    /// Policy and value targets for the root position.
    pub fn training_sample(&self) -> Result<TrainingSample, SearchError> {
        TrainingSample::from_tree(&self.tree)
    }
}
