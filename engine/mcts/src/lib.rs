//! Monte Carlo Tree Search (MCTS) for Ultimate Tic-Tac-Toe.
//!
//! One search engine serves two drivers that differ only in how a leaf is
//! valued:
//!
//! - **Plain** ([`SearchMode::Rollout`]): UCT selection; after expanding a
//!   leaf, one of its new children is picked at random and evaluated, usually
//!   by a random playout ([`RolloutEvaluator`]). The most visited root child
//!   is played.
//! - **Guided** ([`SearchMode::Guided`]): PUCT selection; the expanded leaf is
//!   evaluated once, its policy seeds the children's priors and its value is
//!   backpropagated directly. The move played is sampled in proportion to
//!   visit counts.
//!
//! Each iteration runs four phases:
//!
//! 1. **Selection**: descend by rank value. Forced wins and losses are ranked
//!    outside the range of exploration scores, so solved subtrees propagate
//!    their classification upwards instead of being sampled again.
//! 2. **Expansion**: add a child for every legal move. A winning move ends
//!    the enumeration and classifies the parent.
//! 3. **Evaluation**: ask the [`Evaluator`] for a value.
//! 4. **Backpropagation**: update visit counts and scores up to the root.
//!
//! # Usage
//!
//! ```rust
//! use games_uttt::Board;
//! use mcts::{MctsConfig, MctsSearch, RolloutEvaluator};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let evaluator = RolloutEvaluator::new();
//! let config = MctsConfig::for_testing().with_max_nodes(50);
//! let mut search = MctsSearch::new(Board::new(), &evaluator, config);
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let stats = search.run(&mut rng).unwrap();
//! assert_eq!(stats.iterations, 50);
//!
//! let mv = search.best_move().unwrap();
//! assert!(Board::new().legal_moves().contains(&mv));
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         MctsSearch                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────┐        ┌──────────────────────┐   │
//! │  │ Tree<SearchNode>     │        │     Evaluator        │   │
//! │  │ (arena, board snaps) │        │ (policy / value)     │   │
//! │  └──────────┬───────────┘        └──────────┬───────────┘   │
//! │             ▼                               ▼               │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │     select → expand → evaluate → backpropagate       │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod evaluator;
pub mod node;
pub mod sample;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::{MctsConfig, SearchMode};
pub use evaluator::{
    EvalResult, Evaluator, EvaluatorError, ModelEvaluator, RolloutEvaluator, UniformEvaluator,
};
pub use node::{Ranking, SearchNode, SearchTree, TerminalTag, TreeStats};
pub use sample::TrainingSample;
pub use search::{MctsSearch, SearchError, SearchStats, StopReason};
pub use tree::{NodeId, Tree, TreeNode};
