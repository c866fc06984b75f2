//! Test positions shared by the engine crates.
//!
//! Built with [`Board::apply`], which does not enforce the active block, so
//! stones can be placed freely as long as X and O alternate.

use crate::{Board, Move};

/// Board after playing `(block, local)` pairs from the opening.
pub fn after(moves: &[(u8, u8)]) -> Board {
    let mut board = Board::new();
    for &(block, local) in moves {
        board.apply(Move::new(block, local));
    }
    board
}

/// Alternate X and O stones, X first.
fn interleave(x: &[(u8, u8)], o: &[(u8, u8)]) -> Board {
    debug_assert!(x.len() == o.len() || x.len() == o.len() + 1);
    let mut moves = Vec::with_capacity(x.len() + o.len());
    for (i, &stone) in x.iter().enumerate() {
        moves.push(stone);
        if let Some(&reply) = o.get(i) {
            moves.push(reply);
        }
    }
    after(&moves)
}

/// X owns blocks 0 and 1 and is sent to block 2, where cell 2 completes
/// the top row of blocks and wins the game. Cells 2-8 of block 2 are legal.
pub fn x_to_win() -> Board {
    after(&[
        (0, 0),
        (6, 0),
        (0, 1),
        (6, 4),
        (0, 2),
        (7, 0),
        (1, 0),
        (7, 4),
        (1, 1),
        (8, 0),
        (1, 2),
        (8, 4),
        (2, 0),
        (6, 5),
        (2, 1),
        (7, 2),
    ])
}

/// X to move with a single legal move, (4, 8), which fills block 4 and
/// sends O to block 8. O owns blocks 2 and 5 and holds cells 0 and 1 of
/// block 8, so (8, 2) wins the right column for O.
pub fn x_forced_loss() -> Board {
    let x = [
        (4, 0),
        (4, 2),
        (4, 3),
        (4, 7),
        (0, 0),
        (0, 1),
        (1, 0),
        (1, 1),
        (3, 0),
        (3, 1),
        (6, 0),
        (6, 1),
    ];
    let o = [
        (2, 0),
        (2, 1),
        (2, 2),
        (5, 0),
        (5, 1),
        (5, 2),
        (8, 0),
        (8, 1),
        (4, 1),
        (4, 5),
        (4, 6),
        (4, 4),
    ];
    interleave(&x, &o)
}

/// 79 plies, no block claimed. O is to move with cells 4 and 8 of block 8
/// left; either reply reaches the ply limit as a draw.
pub fn o_to_draw() -> Board {
    // Neither side has a line in a block filled this way.
    const FIVE: [u8; 5] = [0, 2, 3, 7, 8];
    const FOUR: [u8; 4] = [1, 4, 5, 6];

    let mut x = Vec::new();
    let mut o = Vec::new();
    for block in 0..8u8 {
        let (five, four) = if block % 2 == 0 {
            (&mut x, &mut o)
        } else {
            (&mut o, &mut x)
        };
        five.extend(FIVE.iter().map(|&cell| (block, cell)));
        four.extend(FOUR.iter().map(|&cell| (block, cell)));
    }
    x.extend([(8, 0), (8, 2), (8, 3), (8, 7)]);
    o.extend([(8, 1), (8, 5), (8, 6)]);
    interleave(&x, &o)
}
