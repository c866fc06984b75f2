//! Depth-limited negamax with alpha-beta pruning.
//!
//! Every call maximizes from the point of view of `side`, the player to move
//! at that call; recursive calls negate the returned value and swap and
//! negate the window. The search is exact on finished games. Positions at the
//! depth limit score a neutral 0: there is no heuristic evaluation.
//!
//! The board is walked in place with [`Board::apply`] and [`Board::undo`] and
//! is returned unchanged.
//!
//! ```rust
//! use alphabeta::search;
//! use games_uttt::Board;
//!
//! let mut board = Board::new();
//! let result = search(&mut board, 0);
//! assert_eq!(result.value, 0.0);
//! assert_eq!(result.best_move, None);
//! ```

use games_uttt::{Board, Move, Player};
use tracing::debug;

/// Value of a position and the move that achieves it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaBetaResult {
    /// Score for the side to move at the searched position: +1 forced win,
    /// -1 forced loss, 0 draw or unresolved within the depth limit.
    pub value: f32,

    /// `None` at finished positions and at the depth limit.
    pub best_move: Option<Move>,

    /// Positions visited, the root included.
    pub nodes: u64,
}

/// Search `board` to `depth` plies from the side to move's point of view.
pub fn search(board: &mut Board, depth: u32) -> AlphaBetaResult {
    let side = board.side_to_move();
    let result = negamax(board, depth, f32::NEG_INFINITY, f32::INFINITY, side);
    debug!(
        depth,
        value = result.value,
        best_move = ?result.best_move,
        nodes = result.nodes,
        "Alpha-beta search complete"
    );
    result
}

/// Negamax over the window `(alpha, beta)` with `side` to move.
///
/// Fail-soft: the returned value may lie outside the window, in which case
/// it is a bound on the true value.
pub fn negamax(
    board: &mut Board,
    depth: u32,
    alpha: f32,
    beta: f32,
    side: Player,
) -> AlphaBetaResult {
    let mut nodes = 0;
    let (value, best_move) = negamax_inner(board, depth, alpha, beta, side, &mut nodes);
    AlphaBetaResult {
        value,
        best_move,
        nodes,
    }
}

fn negamax_inner(
    board: &mut Board,
    depth: u32,
    mut alpha: f32,
    beta: f32,
    side: Player,
    nodes: &mut u64,
) -> (f32, Option<Move>) {
    *nodes += 1;

    if let Some(outcome) = board.outcome() {
        return (outcome.score_for(side), None);
    }
    if depth == 0 {
        return (0.0, None);
    }

    let mut max_eval = f32::NEG_INFINITY;
    let mut best_move = None;
    for mv in board.legal_moves() {
        board.apply(mv);
        let (child, _) = negamax_inner(board, depth - 1, -beta, -alpha, side.opponent(), nodes);
        board.undo();

        let eval = -child;
        if eval > max_eval {
            max_eval = eval;
            best_move = Some(mv);
        }
        alpha = alpha.max(max_eval);
        if alpha >= beta {
            break;
        }
    }

    (max_eval, best_move)
}
