//! Move selection policies for the arena

use anyhow::{anyhow, Result};
use games_uttt::{Board, Move};
use mcts::{
    Evaluator, MctsConfig, MctsSearch, RolloutEvaluator, SearchMode, SearchStats,
    TrainingSample, UniformEvaluator,
};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::config::Config;

static ROLLOUT: RolloutEvaluator = RolloutEvaluator;
static UNIFORM: UniformEvaluator = UniformEvaluator;

/// Which search drives a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    Random,
    /// Plain MCTS with random rollouts
    Mcts,
    /// Guided MCTS with a uniform evaluator
    Guided,
    AlphaBeta,
}

impl PlayerKind {
    pub fn name(self) -> &'static str {
        match self {
            PlayerKind::Random => "random",
            PlayerKind::Mcts => "mcts",
            PlayerKind::Guided => "guided",
            PlayerKind::AlphaBeta => "alphabeta",
        }
    }
}

impl fmt::Display for PlayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlayerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(PlayerKind::Random),
            "mcts" => Ok(PlayerKind::Mcts),
            "guided" => Ok(PlayerKind::Guided),
            "alphabeta" | "alpha-beta" => Ok(PlayerKind::AlphaBeta),
            _ => Err(anyhow!(
                "unknown player '{}', expected one of random, mcts, guided, alphabeta",
                s
            )),
        }
    }
}

/// A chosen move plus what the search learned while choosing it.
#[derive(Debug, Clone)]
pub struct Selection {
    pub mv: Move,
    pub search: Option<SearchStats>,
    pub sample: Option<TrainingSample>,
}

impl Selection {
    fn plain(mv: Move) -> Self {
        Self {
            mv,
            search: None,
            sample: None,
        }
    }
}

/// Trait for move selection policies.
pub trait Policy {
    fn kind(&self) -> PlayerKind;

    /// Select a move for the side to move on `board`, which must not be
    /// finished.
    fn select_move(&mut self, board: &Board, rng: &mut ChaCha20Rng) -> Result<Selection>;

    /// Forget per-game state before a new game starts.
    fn new_game(&mut self) {}
}

/// Build the policy for `kind` from the arena configuration.
pub fn build_policy(kind: PlayerKind, config: &Config) -> Box<dyn Policy> {
    match kind {
        PlayerKind::Random => Box::new(RandomPolicy),
        PlayerKind::Mcts => Box::new(MctsPolicy::new(
            &ROLLOUT,
            config.mcts_config(SearchMode::Rollout),
            config.reuse_tree,
        )),
        PlayerKind::Guided => Box::new(MctsPolicy::new(
            &UNIFORM,
            config.mcts_config(SearchMode::Guided),
            config.reuse_tree,
        )),
        PlayerKind::AlphaBeta => Box::new(AlphaBetaPolicy::new(config.depth)),
    }
}

/// Uniformly random legal moves.
#[derive(Debug, Default)]
pub struct RandomPolicy;

impl Policy for RandomPolicy {
    fn kind(&self) -> PlayerKind {
        PlayerKind::Random
    }

    fn select_move(&mut self, board: &Board, rng: &mut ChaCha20Rng) -> Result<Selection> {
        board
            .legal_moves()
            .choose(rng)
            .copied()
            .map(Selection::plain)
            .ok_or_else(|| anyhow!("no legal moves"))
    }
}

/// MCTS player. With `reuse_tree` the subtree under the played move, and
/// then under the opponent's reply, is carried over to the next turn.
pub struct MctsPolicy<E: Evaluator + 'static> {
    evaluator: &'static E,
    config: MctsConfig,
    reuse_tree: bool,
    search: MctsSearch<'static, E>,
}

impl<E: Evaluator + 'static> fmt::Debug for MctsPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MctsPolicy")
            .field("mode", &self.config.mode)
            .field("max_nodes", &self.config.max_nodes)
            .field("reuse_tree", &self.reuse_tree)
            .field("tree_nodes", &self.tree_nodes())
            .finish()
    }
}

impl<E: Evaluator + 'static> MctsPolicy<E> {
    pub fn new(evaluator: &'static E, config: MctsConfig, reuse_tree: bool) -> Self {
        let search = MctsSearch::new(Board::new(), evaluator, config.clone());
        Self {
            evaluator,
            config,
            reuse_tree,
            search,
        }
    }

    /// Nodes currently held by the search tree.
    pub fn tree_nodes(&self) -> usize {
        self.search.tree().len()
    }

    fn reset(&mut self, board: &Board) {
        self.search = MctsSearch::new(board.clone(), self.evaluator, self.config.clone());
    }
}

impl<E: Evaluator + 'static> Policy for MctsPolicy<E> {
    fn kind(&self) -> PlayerKind {
        match self.config.mode {
            SearchMode::Rollout => PlayerKind::Mcts,
            SearchMode::Guided => PlayerKind::Guided,
        }
    }

    fn new_game(&mut self) {
        self.reset(&Board::new());
    }

    fn select_move(&mut self, board: &Board, rng: &mut ChaCha20Rng) -> Result<Selection> {
        if self.reuse_tree {
            self.search.advance_to(board)?;
        } else {
            self.reset(board);
        }

        let stats = self.search.run(rng)?;
        let mv = self.search.choose_move(rng)?;
        let sample = match self.search.training_sample() {
            Ok(sample) => Some(sample),
            Err(e) => {
                debug!(plies = board.plies(), error = %e, "No training sample for this move");
                None
            }
        };

        if self.reuse_tree {
            let mut next = board.clone();
            next.apply(mv);
            self.search.advance_to(&next)?;
        }

        Ok(Selection {
            mv,
            search: Some(stats),
            sample,
        })
    }
}

/// Fixed-depth alpha-beta player.
#[derive(Debug)]
pub struct AlphaBetaPolicy {
    depth: u32,
}

impl AlphaBetaPolicy {
    pub fn new(depth: u32) -> Self {
        Self { depth }
    }
}

impl Policy for AlphaBetaPolicy {
    fn kind(&self) -> PlayerKind {
        PlayerKind::AlphaBeta
    }

    fn select_move(&mut self, board: &Board, _rng: &mut ChaCha20Rng) -> Result<Selection> {
        let mut scratch = board.clone();
        let result = alphabeta::search(&mut scratch, self.depth);
        result
            .best_move
            .map(Selection::plain)
            .ok_or_else(|| anyhow!("alpha-beta found no move at depth {}", self.depth))
    }
}
