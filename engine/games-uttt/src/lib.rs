//! Ultimate Tic-Tac-Toe board engine
//!
//! This crate provides a compact, bit-encoded representation of Ultimate
//! Tic-Tac-Toe: a 9×9 grid made of nine 3×3 sub-boards ("blocks"). A move in
//! local cell `k` of any block sends the opponent to block `k`, unless that
//! block is already claimed or full, in which case the opponent may play in
//! any open block.
//!
//! The [`Board`] is mutated in strict stack discipline through
//! [`Board::apply`] and [`Board::undo`], which makes it cheap to walk game
//! trees in place.
//!
//! # Usage
//!
//! ```rust
//! use games_uttt::{Board, Move, Player};
//!
//! let mut board = Board::new();
//! assert_eq!(board.legal_moves().len(), 81);
//!
//! // X plays the centre cell of the top-left block, O is sent to block 4.
//! board.apply(Move::new(0, 4));
//! assert_eq!(board.side_to_move(), Player::O);
//! assert_eq!(board.active_block(), Some(4));
//!
//! board.undo();
//! assert_eq!(board, Board::new());
//! ```

use rand::Rng;
use rand_chacha::ChaCha20Rng;

/// Mask covering the nine cells of a block (or the nine blocks of the grid).
pub const BOARD_MASK: u16 = 0b1_1111_1111;

/// Number of cells on the full 9×9 grid.
pub const NUM_CELLS: usize = 81;

/// Number of feature planes in an [`Observation`].
pub const NUM_PLANES: usize = 6;

/// Total number of floats in an [`Observation`].
pub const OBS_SIZE: usize = NUM_PLANES * NUM_CELLS;

/// Ply count at which the game is treated as over regardless of position.
pub const MAX_PLIES: usize = 80;

/// The eight winning triples of a 3×3 block (bit = row * 3 + col).
pub const WIN_LINES: [u16; 8] = [
    0b000_000_111,
    0b000_111_000,
    0b111_000_000, // rows
    0b001_001_001,
    0b010_010_010,
    0b100_100_100, // columns
    0b100_010_001,
    0b001_010_100, // diagonals
];

/// Returns true if the 9-bit mask contains a full row, column or diagonal.
///
/// Rows and columns are found with shift-and chains: a bit survives two
/// shifts only if its whole line is set.
#[inline]
pub const fn is_won(mask: u16) -> bool {
    let rows = ((((mask & 0b001_001_001) << 1) & mask) << 1) & mask;
    let cols = ((((mask & 0b000_000_111) << 3) & mask) << 3) & mask;
    let diag = (mask & 0b100_010_001) == 0b100_010_001 || (mask & 0b001_010_100) == 0b001_010_100;
    rows != 0 || cols != 0 || diag
}

/// One of the two sides. X always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// The other side.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// +1 for X, -1 for O. Multiplying an X-relative score by this yields
    /// the score from this player's point of view.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Player::X => 1.0,
            Player::O => -1.0,
        }
    }
}

/// Final result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    XWins,
    OWins,
    Draw,
}

impl Outcome {
    /// Score from X's point of view: +1 win, -1 loss, 0 draw.
    #[inline]
    pub fn score(self) -> f32 {
        match self {
            Outcome::XWins => 1.0,
            Outcome::OWins => -1.0,
            Outcome::Draw => 0.0,
        }
    }

    /// Score from `player`'s point of view.
    #[inline]
    pub fn score_for(self, player: Player) -> f32 {
        self.score() * player.sign()
    }

    /// The winning side, if any.
    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::XWins => Some(Player::X),
            Outcome::OWins => Some(Player::O),
            Outcome::Draw => None,
        }
    }
}

/// A move: a block index and a single-bit mask of the cell inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    block: u8,
    cell: u16,
}

impl Move {
    /// Create a move from a block index and a local cell index (both 0-8).
    #[inline]
    pub fn new(block: u8, local: u8) -> Self {
        debug_assert!(block < 9 && local < 9, "move out of range: {block}/{local}");
        Self {
            block,
            cell: 1 << local,
        }
    }

    /// Block (sub-board) index, 0-8.
    #[inline]
    pub fn block(self) -> u8 {
        self.block
    }

    /// Single-bit cell mask within the block.
    #[inline]
    pub fn cell(self) -> u16 {
        self.cell
    }

    /// Local cell index within the block, 0-8. This is also the block the
    /// opponent is sent to.
    #[inline]
    pub fn local(self) -> u8 {
        self.cell.trailing_zeros() as u8
    }

    /// Row and column on the full 9×9 grid.
    pub fn row_col(self) -> (usize, usize) {
        let block = self.block as usize;
        let local = self.local() as usize;
        ((block / 3) * 3 + local / 3, (block % 3) * 3 + local % 3)
    }

    /// Row-major index on the 9×9 grid, 0-80. Policy vectors use this layout.
    #[inline]
    pub fn index(self) -> usize {
        let (row, col) = self.row_col();
        row * 9 + col
    }

    /// Inverse of [`Move::row_col`].
    pub fn from_row_col(row: usize, col: usize) -> Self {
        debug_assert!(row < 9 && col < 9);
        let block = (row / 3) * 3 + col / 3;
        let local = (row % 3) * 3 + col % 3;
        Self::new(block as u8, local as u8)
    }

    /// Inverse of [`Move::index`].
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::from_row_col(index / 9, index % 9)
    }
}

/// Ultimate Tic-Tac-Toe game state.
///
/// Occupancy is kept as one 9-bit mask per block and side, plus one 9-bit
/// mask per side of claimed blocks. The move list and the active-block
/// stack make [`Board::undo`] exact; `active` always holds one more entry
/// than `moves`, and its top is the constraint for the side to move.
#[derive(Debug, Clone)]
pub struct Board {
    x: [u16; 9],
    o: [u16; 9],
    global_x: u16,
    global_o: u16,
    /// Block the mover is restricted to at each ply (`None` = any open block)
    active: Vec<Option<u8>>,
    moves: Vec<Move>,
}

impl Board {
    /// Create an empty board with X to move and no constraint.
    pub fn new() -> Self {
        let mut active = Vec::with_capacity(NUM_CELLS + 1);
        active.push(None);
        Self {
            x: [0; 9],
            o: [0; 9],
            global_x: 0,
            global_o: 0,
            active,
            moves: Vec::with_capacity(NUM_CELLS),
        }
    }

    /// Number of half-moves played.
    #[inline]
    pub fn plies(&self) -> usize {
        self.moves.len()
    }

    /// Side to move, derived from the ply count.
    #[inline]
    pub fn side_to_move(&self) -> Player {
        if self.plies() % 2 == 0 {
            Player::X
        } else {
            Player::O
        }
    }

    #[inline]
    pub fn is_x_to_move(&self) -> bool {
        self.side_to_move() == Player::X
    }

    /// Block the side to move is restricted to, or `None` for any open block.
    #[inline]
    pub fn active_block(&self) -> Option<u8> {
        self.active[self.moves.len()]
    }

    /// Moves played so far, oldest first.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn last_move(&self) -> Option<Move> {
        self.moves.last().copied()
    }

    /// Mask of blocks claimed by `player`.
    #[inline]
    pub fn claimed_by(&self, player: Player) -> u16 {
        match player {
            Player::X => self.global_x,
            Player::O => self.global_o,
        }
    }

    /// Owner of a single cell, if occupied.
    pub fn cell(&self, block: u8, local: u8) -> Option<Player> {
        let bit = 1u16 << local;
        if self.x[block as usize] & bit != 0 {
            Some(Player::X)
        } else if self.o[block as usize] & bit != 0 {
            Some(Player::O)
        } else {
            None
        }
    }

    #[inline]
    fn occupied(&self, block: usize) -> u16 {
        self.x[block] | self.o[block]
    }

    #[inline]
    fn is_claimed(&self, block: usize) -> bool {
        (self.global_x | self.global_o) & (1 << block) != 0
    }

    #[inline]
    fn is_full(&self, block: usize) -> bool {
        self.occupied(block) == BOARD_MASK
    }

    /// A block accepts moves when nobody has claimed it and it has an empty cell.
    #[inline]
    fn is_open(&self, block: usize) -> bool {
        !self.is_claimed(block) && !self.is_full(block)
    }

    fn push_empty_cells(&self, block: usize, out: &mut Vec<Move>) {
        let mut empty = BOARD_MASK & !self.occupied(block);
        while empty != 0 {
            let lsb = empty & empty.wrapping_neg();
            out.push(Move {
                block: block as u8,
                cell: lsb,
            });
            empty ^= lsb;
        }
    }

    /// All legal moves for the side to move.
    ///
    /// Unconstrained: every empty cell of every open block. Constrained:
    /// every empty cell of the active block. Empty when no move exists.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut result = Vec::with_capacity(NUM_CELLS);
        match self.active_block() {
            None => {
                for block in (0..9).filter(|&b| self.is_open(b)) {
                    self.push_empty_cells(block, &mut result);
                }
            }
            Some(block) => self.push_empty_cells(block as usize, &mut result),
        }
        result
    }

    /// Legal moves as a bit per grid index (see [`Move::index`]).
    pub fn legal_mask(&self) -> u128 {
        self.legal_moves()
            .into_iter()
            .fold(0u128, |mask, mv| mask | (1u128 << mv.index()))
    }

    fn has_legal_move(&self) -> bool {
        match self.active_block() {
            None => (0..9).any(|b| self.is_open(b)),
            Some(block) => self.occupied(block as usize) != BOARD_MASK,
        }
    }

    /// Play `mv` for the side to move.
    ///
    /// The move must target an empty cell; legality with respect to the
    /// active block is the caller's responsibility.
    pub fn apply(&mut self, mv: Move) {
        let block = mv.block as usize;
        debug_assert!(block < 9 && mv.cell.count_ones() == 1 && mv.cell & BOARD_MASK != 0);
        debug_assert!(self.occupied(block) & mv.cell == 0, "cell already occupied");

        let already_claimed = self.is_claimed(block);
        let (own, global) = match self.side_to_move() {
            Player::X => (&mut self.x[block], &mut self.global_x),
            Player::O => (&mut self.o[block], &mut self.global_o),
        };
        *own ^= mv.cell;
        if !already_claimed && is_won(*own) {
            *global |= 1 << block;
        }

        let next = mv.local() as usize;
        let next_active = if self.is_open(next) {
            Some(next as u8)
        } else {
            None
        };
        self.moves.push(mv);
        self.active.push(next_active);
    }

    /// Take back the last move.
    ///
    /// # Panics
    ///
    /// Panics if no move has been applied.
    pub fn undo(&mut self) {
        let Some(mv) = self.moves.pop() else {
            panic!("undo called without a matching apply");
        };
        self.active.pop();

        let block = mv.block as usize;
        // With the move popped, the side to move is the side that made it.
        let (own, global) = match self.side_to_move() {
            Player::X => (&mut self.x[block], &mut self.global_x),
            Player::O => (&mut self.o[block], &mut self.global_o),
        };
        let was_won = is_won(*own);
        *own ^= mv.cell;
        if was_won && !is_won(*own) {
            *global &= !(1 << block);
        }
    }

    /// True once a side has won the global grid, no legal move remains, or
    /// the ply limit is reached.
    pub fn is_game_over(&self) -> bool {
        is_won(self.global_x)
            || is_won(self.global_o)
            || !self.has_legal_move()
            || self.plies() == MAX_PLIES
    }

    /// Outcome of a finished game, `None` while the game is running.
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.is_game_over() {
            return None;
        }
        Some(if is_won(self.global_x) {
            Outcome::XWins
        } else if is_won(self.global_o) {
            Outcome::OWins
        } else {
            Outcome::Draw
        })
    }

    /// Game result from X's point of view (+1, -1 or 0), `None` while running.
    pub fn result(&self) -> Option<f32> {
        self.outcome().map(Outcome::score)
    }

    /// Tensor encoding consumed by evaluators.
    pub fn observation(&self) -> Observation {
        Observation::from_board(self)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Two boards are equal when they have the same stones and the same
/// active-block history. Claimed masks follow from the stones.
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.o == other.o && self.active == other.active
    }
}

impl Eq for Board {}

/// Play uniformly random legal moves on a private copy of `board` until the
/// game ends.
pub fn random_rollout(board: &Board, rng: &mut ChaCha20Rng) -> Outcome {
    let mut board = board.clone();
    loop {
        if let Some(outcome) = board.outcome() {
            return outcome;
        }
        let moves = board.legal_moves();
        board.apply(moves[rng.gen_range(0..moves.len())]);
    }
}

/// Neural-network-friendly encoding of a [`Board`].
///
/// Six 9×9 planes, stored `[plane][row][col]` in row-major order:
///
/// | Plane | Content |
/// |---|---|
/// | 0 | cells occupied by X |
/// | 1 | cells occupied by O |
/// | 2 | cells that are legal for the side to move |
/// | 3 | blocks claimed by X, broadcast over their 3×3 extent |
/// | 4 | blocks claimed by O, broadcast over their 3×3 extent |
/// | 5 | blocks that are full without being claimed (drawn) |
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub planes: [f32; OBS_SIZE],
}

impl Observation {
    pub const PLANE_X: usize = 0;
    pub const PLANE_O: usize = 1;
    pub const PLANE_LEGAL: usize = 2;
    pub const PLANE_X_CLAIMED: usize = 3;
    pub const PLANE_O_CLAIMED: usize = 4;
    pub const PLANE_DRAWN: usize = 5;

    /// Create observation from board state
    pub fn from_board(board: &Board) -> Self {
        let mut planes = [0.0; OBS_SIZE];
        let legal = board.legal_mask();

        for index in 0..NUM_CELLS {
            let mv = Move::from_index(index);
            let block = mv.block as usize;
            let block_bit = 1u16 << block;

            let mut set = |plane: usize, on: bool| {
                if on {
                    planes[plane * NUM_CELLS + index] = 1.0;
                }
            };
            set(Self::PLANE_X, board.x[block] & mv.cell != 0);
            set(Self::PLANE_O, board.o[block] & mv.cell != 0);
            set(Self::PLANE_LEGAL, legal & (1u128 << index) != 0);
            set(Self::PLANE_X_CLAIMED, board.global_x & block_bit != 0);
            set(Self::PLANE_O_CLAIMED, board.global_o & block_bit != 0);
            set(
                Self::PLANE_DRAWN,
                board.is_full(block) && !board.is_claimed(block),
            );
        }

        Self { planes }
    }

    /// Value at `(plane, row, col)`.
    #[inline]
    pub fn get(&self, plane: usize, row: usize, col: usize) -> f32 {
        self.planes[plane * NUM_CELLS + row * 9 + col]
    }

    /// One 9×9 plane as a flat slice.
    pub fn plane(&self, plane: usize) -> &[f32] {
        &self.planes[plane * NUM_CELLS..(plane + 1) * NUM_CELLS]
    }

    /// Encode as little-endian f32 bytes (486 floats).
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.reserve(OBS_SIZE * 4);
        for &value in &self.planes {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;

#[cfg(test)]
mod tests;
