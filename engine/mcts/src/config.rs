//! MCTS configuration parameters.

use std::time::Duration;

use crate::node::Ranking;

/// How a freshly expanded leaf is valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Plain MCTS: UCT selection, and the evaluator is run on one randomly
    /// chosen new child (a random rollout with [`crate::RolloutEvaluator`]).
    Rollout,
    /// AlphaZero-style MCTS: PUCT selection, and the evaluator is run once on
    /// the expanded node; its policy seeds child priors and its value is
    /// backpropagated directly.
    Guided,
}

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Leaf valuation strategy (selects the plain or guided driver).
    pub mode: SearchMode,

    /// Wall-clock budget per search. Checked between iterations only.
    pub timeout: Duration,

    /// Maximum number of select/expand/evaluate iterations per search.
    pub max_nodes: u32,

    /// Exploration constant of the UCT formula.
    pub c_uct: f32,

    /// Exploration constant of the PUCT formula.
    pub c_puct: f32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self::plain()
    }
}

impl MctsConfig {
    /// Plain random-rollout MCTS: 5 seconds or 1000 iterations.
    pub fn plain() -> Self {
        Self {
            mode: SearchMode::Rollout,
            timeout: Duration::from_secs(5),
            max_nodes: 1000,
            c_uct: 2.0,
            c_puct: 2.0,
        }
    }

    /// Evaluator-guided MCTS: 1 second or 1000 iterations.
    pub fn guided() -> Self {
        Self {
            mode: SearchMode::Guided,
            timeout: Duration::from_secs(1),
            ..Self::plain()
        }
    }

    /// Create a fast config for testing. The iteration budget is the only
    /// effective limit, which keeps tests deterministic.
    pub fn for_testing() -> Self {
        Self {
            timeout: Duration::from_secs(3600),
            max_nodes: 200,
            ..Self::plain()
        }
    }

    /// Ranking function used during selection.
    pub fn ranking(&self) -> Ranking {
        match self.mode {
            SearchMode::Rollout => Ranking::Uct { c: self.c_uct },
            SearchMode::Guided => Ranking::Puct { c: self.c_puct },
        }
    }

    /// Builder pattern: set the search mode.
    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder pattern: set the wall-clock budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder pattern: set the iteration budget.
    pub fn with_max_nodes(mut self, n: u32) -> Self {
        self.max_nodes = n;
        self
    }

    pub fn with_c_uct(mut self, c: f32) -> Self {
        self.c_uct = c;
        self
    }

    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }
}
