//! Search tree node: a board snapshot plus MCTS statistics.
//!
//! Scores are kept in negamax form. A node's `score` accumulates results from
//! the point of view of the player who made the move leading to it, which is
//! the player choosing among it and its siblings. The win rate of a child is
//! therefore directly comparable across siblings without sign juggling.

use games_uttt::{Board, Move, Outcome, Player, NUM_CELLS};

use crate::tree::{NodeId, Tree};

/// Rank of a child that wins the game for the player choosing it.
pub const RANK_WIN: f32 = 3.0;
/// Rank of a child that has never been visited.
pub const RANK_UNVISITED: f32 = 2.0;
/// Rank of a drawn child.
pub const RANK_DRAW: f32 = 0.0;
/// Rank of a child that loses the game for the player choosing it.
pub const RANK_LOSS: f32 = -3.0;

/// Classification of a node once its game-theoretic value is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TerminalTag {
    #[default]
    Open,
    XWon,
    OWon,
    Draw,
}

impl TerminalTag {
    pub fn from_outcome(outcome: Outcome) -> Self {
        match outcome {
            Outcome::XWins => TerminalTag::XWon,
            Outcome::OWins => TerminalTag::OWon,
            Outcome::Draw => TerminalTag::Draw,
        }
    }

    /// Result from X's point of view, `None` while open.
    pub fn result(self) -> Option<f32> {
        match self {
            TerminalTag::Open => None,
            TerminalTag::XWon => Some(1.0),
            TerminalTag::OWon => Some(-1.0),
            TerminalTag::Draw => Some(0.0),
        }
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            TerminalTag::XWon => Some(Player::X),
            TerminalTag::OWon => Some(Player::O),
            TerminalTag::Open | TerminalTag::Draw => None,
        }
    }

    #[inline]
    pub fn is_open(self) -> bool {
        self == TerminalTag::Open
    }

    /// Won by either side.
    #[inline]
    pub fn is_decisive(self) -> bool {
        self.winner().is_some()
    }
}

/// Exploration formula applied to visited, non-terminal children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ranking {
    /// `win_rate + sqrt(c * ln(N_parent) / N)`
    Uct { c: f32 },
    /// `win_rate + prior * sqrt(c * N_parent) / (1 + N)`
    Puct { c: f32 },
}

impl Ranking {
    #[inline]
    pub fn score(self, node: &SearchNode, parent_visits: u32) -> f32 {
        match self {
            Ranking::Uct { c } => node.uct(parent_visits, c),
            Ranking::Puct { c } => node.puct(parent_visits, c),
        }
    }
}

/// Payload of a search tree node.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Position reached by the move path from the root. Owned, never shared.
    pub board: Board,

    /// Number of backpropagations that reached this node.
    pub visits: u32,

    /// Sum of results, from the view of the player who moved into this node.
    pub score: f32,

    pub tag: TerminalTag,

    /// Evaluator prior for the move leading here (guided search only).
    pub prior: Option<f32>,
}

impl SearchNode {
    /// Open, unvisited node for `board`.
    pub fn new(board: Board) -> Self {
        Self {
            board,
            visits: 0,
            score: 0.0,
            tag: TerminalTag::Open,
            prior: None,
        }
    }

    fn with_tag(board: Board, tag: TerminalTag) -> Self {
        Self {
            tag,
            ..Self::new(board)
        }
    }

    /// The player who chooses between this node and its siblings.
    #[inline]
    pub fn chooser(&self) -> Player {
        self.board.side_to_move().opponent()
    }

    /// Average result for the chooser.
    ///
    /// Must only be called on visited nodes.
    #[inline]
    pub fn win_rate(&self) -> f32 {
        debug_assert!(self.visits > 0, "win rate of an unvisited node");
        self.score / self.visits as f32
    }

    #[inline]
    pub fn uct(&self, parent_visits: u32, c: f32) -> f32 {
        self.win_rate() + (c * (parent_visits as f32).ln() / self.visits as f32).sqrt()
    }

    /// PUCT tolerates unvisited nodes: their win rate counts as 0.
    #[inline]
    pub fn puct(&self, parent_visits: u32, c: f32) -> f32 {
        let q = if self.visits == 0 { 0.0 } else { self.win_rate() };
        let prior = self.prior.unwrap_or(0.0);
        q + prior * (c * parent_visits as f32).sqrt() / (1.0 + self.visits as f32)
    }

    /// Selection key, in descending preference: forced win for the chooser,
    /// unvisited, exploration score squashed into (-1, 1), draw, forced loss.
    pub fn rank_value(&self, parent_visits: u32, ranking: Ranking) -> f32 {
        if let Some(winner) = self.tag.winner() {
            return if winner == self.chooser() {
                RANK_WIN
            } else {
                RANK_LOSS
            };
        }
        if self.tag == TerminalTag::Draw {
            return RANK_DRAW;
        }
        if self.visits == 0 {
            return RANK_UNVISITED;
        }
        ranking.score(self, parent_visits).tanh()
    }

    /// Tagged, or the board itself is finished.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !self.tag.is_open() || self.board.is_game_over()
    }

    /// The tag, or the board's own outcome for an untagged finished board.
    pub fn terminal_tag(&self) -> TerminalTag {
        match (self.tag, self.board.outcome()) {
            (TerminalTag::Open, Some(outcome)) => TerminalTag::from_outcome(outcome),
            (tag, _) => tag,
        }
    }

    /// The move that led from the parent to this node.
    #[inline]
    pub fn last_move(&self) -> Option<Move> {
        self.board.last_move()
    }
}

/// Statistics about a search tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    /// Root win rate from the view of the player who moved into the root.
    pub root_value: f32,
    pub max_depth: u32,
}

/// The MCTS tree: an arena of [`SearchNode`]s.
pub type SearchTree = Tree<SearchNode>;

impl Tree<SearchNode> {
    #[inline]
    pub fn is_terminal_node(&self, id: NodeId) -> bool {
        self.get(id).is_terminal()
    }

    /// Add one visit and an X-relative `result` to `id` and every ancestor.
    ///
    /// The score is flipped per ply so each node accumulates the result for
    /// the player who moved into it.
    pub fn backpropagate(&mut self, id: NodeId, result: f32) {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visits += 1;
            node.score += if node.board.is_x_to_move() {
                -result
            } else {
                result
            };
            current = self.parent(id);
        }
    }

    /// Add a child for every legal move of `id`.
    ///
    /// A move that wins the game tags `id` with the winner and becomes its
    /// only remaining child; enumeration stops there. Drawn children are
    /// tagged `Draw` and enumeration continues.
    pub fn expand(&mut self, id: NodeId) {
        self.expand_children(id, None);
    }

    /// Like [`expand`](Self::expand), but every open child also receives its
    /// prior from `policy` (81 entries indexed by [`Move::index`]), restricted
    /// to the legal cells and renormalized.
    pub fn expand_with_policy(&mut self, id: NodeId, policy: &[f32]) {
        let priors = legal_priors(&self.get(id).board, policy);
        self.expand_children(id, Some(&priors));
    }

    fn expand_children(&mut self, id: NodeId, priors: Option<&[f32; NUM_CELLS]>) {
        debug_assert!(self.is_leaf(id), "expanding a node twice");

        // Children capture snapshots of this scratch board, one per move.
        let mut board = self.get(id).board.clone();
        for mv in board.legal_moves() {
            board.apply(mv);
            let child = match board.outcome() {
                None => SearchNode {
                    prior: priors.map(|p| p[mv.index()]),
                    ..SearchNode::new(board.clone())
                },
                Some(Outcome::Draw) => SearchNode::with_tag(board.clone(), TerminalTag::Draw),
                Some(outcome) => {
                    let tag = TerminalTag::from_outcome(outcome);
                    self.get_mut(id).tag = tag;
                    self.add_child(id, SearchNode::with_tag(board, tag));
                    return;
                }
            };
            self.add_child(id, child);
            board.undo();
        }
    }

    /// First child with the highest rank value.
    pub fn best_child_by_rank(&self, id: NodeId, ranking: Ranking) -> Option<NodeId> {
        let parent_visits = self.get(id).visits;
        first_max_by_key(self.children(id), |child| {
            self.get(child).rank_value(parent_visits, ranking)
        })
    }

    /// First child with the most visits.
    pub fn best_child_by_visits(&self, id: NodeId) -> Option<NodeId> {
        first_max_by_key(self.children(id), |child| self.get(child).visits as f32)
    }

    /// Child whose board equals `board`.
    pub fn find_child(&self, id: NodeId, board: &Board) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.get(child).board == *board)
    }

    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root());
        TreeStats {
            total_nodes: self.len(),
            root_visits: root.visits,
            root_value: if root.visits == 0 {
                0.0
            } else {
                root.win_rate()
            },
            max_depth: self.max_depth(),
        }
    }
}

/// Ties go to the earliest candidate, so move generation order decides.
fn first_max_by_key(ids: &[NodeId], key: impl Fn(NodeId) -> f32) -> Option<NodeId> {
    let mut best: Option<(NodeId, f32)> = None;
    for &id in ids {
        let value = key(id);
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((id, value)),
        }
    }
    best.map(|(id, _)| id)
}

/// Zero illegal cells and renormalize over the legal ones. Falls back to a
/// uniform prior when the policy puts no usable mass on a legal cell.
fn legal_priors(board: &Board, policy: &[f32]) -> [f32; NUM_CELLS] {
    debug_assert_eq!(policy.len(), NUM_CELLS, "policy must cover every cell");

    let legal = board.legal_moves();
    let mut priors = [0.0; NUM_CELLS];
    for mv in &legal {
        let p = policy.get(mv.index()).copied().unwrap_or(0.0);
        if p.is_finite() && p > 0.0 {
            priors[mv.index()] = p;
        }
    }

    let sum: f32 = priors.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        for p in priors.iter_mut() {
            *p /= sum;
        }
    } else if !legal.is_empty() {
        let uniform = 1.0 / legal.len() as f32;
        for mv in &legal {
            priors[mv.index()] = uniform;
        }
    }
    priors
}
