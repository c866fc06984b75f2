use super::*;
use rand::SeedableRng;

/// X claims blocks 0, 1 and 2 (top row of the grid) while O scatters stones
/// in blocks 6-8 without completing a line. Constraints are ignored; the
/// engine does not enforce them in `apply`.
const X_TOP_ROW_GAME: [(u8, u8); 17] = [
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
    (7, 5),
    (2, 2),
];

fn play(board: &mut Board, moves: &[(u8, u8)]) {
    for &(block, local) in moves {
        board.apply(Move::new(block, local));
    }
}

/// Snapshot of every field `undo` must restore.
fn snapshot(board: &Board) -> ([u16; 9], [u16; 9], u16, u16, Vec<Option<u8>>, Vec<Move>) {
    (
        board.x,
        board.o,
        board.global_x,
        board.global_o,
        board.active.clone(),
        board.moves.clone(),
    )
}

#[test]
fn test_initial_board() {
    let board = Board::new();
    assert_eq!(board.plies(), 0);
    assert_eq!(board.side_to_move(), Player::X);
    assert_eq!(board.active_block(), None);
    assert!(!board.is_game_over());
    assert_eq!(board.outcome(), None);
    assert_eq!(board.result(), None);
}

#[test]
fn test_initial_legal_moves() {
    let board = Board::new();
    let moves = board.legal_moves();
    assert_eq!(moves.len(), 81);

    let mut seen = [false; NUM_CELLS];
    for mv in &moves {
        assert!(!seen[mv.index()], "duplicate move {:?}", mv);
        seen[mv.index()] = true;
    }
    assert!(seen.iter().all(|&s| s));
    assert_eq!(board.legal_mask(), (1u128 << 81) - 1);
}

#[test]
fn test_win_detection_exhaustive() {
    for mask in 0u16..512 {
        let expected = WIN_LINES.iter().any(|&line| mask & line == line);
        assert_eq!(is_won(mask), expected, "mask {:#011b}", mask);
    }
}

#[test]
fn test_win_detection_examples() {
    assert!(is_won(0b000_000_111));
    assert!(is_won(0b100_010_001));
    assert!(!is_won(0b010_101_010));
    assert!(!is_won(0));
}

#[test]
fn test_first_move_sets_constraint() {
    for mv in Board::new().legal_moves() {
        let mut board = Board::new();
        board.apply(mv);
        assert_eq!(board.active_block(), Some(mv.local()));
        assert_eq!(board.side_to_move(), Player::O);

        for reply in board.legal_moves() {
            assert_eq!(reply.block(), mv.local());
        }
    }
}

#[test]
fn test_constrained_moves_skip_occupied_cells() {
    let mut board = Board::new();
    board.apply(Move::new(4, 4)); // X: centre of centre, O sent to block 4
    let moves = board.legal_moves();
    assert_eq!(moves.len(), 8);
    assert!(moves.iter().all(|m| m.block() == 4 && m.local() != 4));
}

#[test]
fn test_claiming_a_block() {
    let mut board = Board::new();
    play(&mut board, &[(0, 0), (8, 8), (0, 1), (8, 7), (0, 2)]);

    assert_eq!(board.claimed_by(Player::X), 0b1);
    assert_eq!(board.claimed_by(Player::O), 0);
    // X's last local cell was 2: block 2 is open, so O is sent there.
    assert_eq!(board.active_block(), Some(2));

    // O plays local 0 and would send X into the claimed block 0.
    board.apply(Move::new(2, 0));
    assert_eq!(board.active_block(), None);

    let moves = board.legal_moves();
    assert!(moves.iter().all(|m| m.block() != 0));
    // Block 0 is excluded entirely; O holds three cells elsewhere.
    assert_eq!(moves.len(), 81 - 9 - 3);
}

#[test]
fn test_full_block_releases_constraint() {
    let mut board = Board::new();
    // Fill block 4 without a line: X 0,2,3,7,8 / O 1,4,5,6.
    play(
        &mut board,
        &[
            (4, 0),
            (4, 1),
            (4, 2),
            (4, 4),
            (4, 3),
            (4, 5),
            (4, 7),
            (4, 6),
            (4, 8),
        ],
    );
    assert_eq!(board.claimed_by(Player::X) | board.claimed_by(Player::O), 0);
    // Last local cell was 8, block 8 is open.
    assert_eq!(board.active_block(), Some(8));

    board.apply(Move::new(8, 4)); // O sends X to the full block 4
    assert_eq!(board.active_block(), None);
    assert!(board.legal_moves().iter().all(|m| m.block() != 4));
}

#[test]
fn test_global_win_and_result() {
    let mut board = Board::new();
    play(&mut board, &X_TOP_ROW_GAME);

    assert_eq!(board.claimed_by(Player::X), 0b111);
    assert!(board.is_game_over());
    assert_eq!(board.outcome(), Some(Outcome::XWins));
    assert_eq!(board.result(), Some(1.0));

    board.undo();
    assert_eq!(board.claimed_by(Player::X), 0b011);
    assert!(!board.is_game_over());
    assert_eq!(board.result(), None);
}

#[test]
fn test_undo_restores_every_field() {
    let mut board = Board::new();
    let mut before = Vec::new();
    for &(block, local) in &X_TOP_ROW_GAME {
        before.push(snapshot(&board));
        board.apply(Move::new(block, local));
    }
    while let Some(expected) = before.pop() {
        board.undo();
        assert_eq!(snapshot(&board), expected);
    }
    assert_eq!(board, Board::new());
}

#[test]
#[should_panic(expected = "undo called without a matching apply")]
fn test_undo_without_apply_panics() {
    let mut board = Board::new();
    board.undo();
}

#[test]
fn test_random_games_round_trip_and_legality() {
    for seed in 0..20 {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut board = Board::new();

        while !board.is_game_over() {
            let moves = board.legal_moves();
            assert!(!moves.is_empty());

            for &mv in &moves {
                let block = mv.block();
                assert_eq!(board.cell(block, mv.local()), None);
                assert_eq!(
                    (board.claimed_by(Player::X) | board.claimed_by(Player::O)) & (1 << block),
                    0,
                    "move into claimed block {}",
                    block
                );
                if let Some(active) = board.active_block() {
                    assert_eq!(block, active);
                }

                let before = snapshot(&board);
                board.apply(mv);
                assert_eq!(board.plies(), before.5.len() + 1);
                assert_eq!(board.active.len(), board.moves.len() + 1);
                board.undo();
                assert_eq!(snapshot(&board), before);
            }

            board.apply(moves[rng.gen_range(0..moves.len())]);
        }

        assert!(board.outcome().is_some());
    }
}

#[test]
fn test_terminal_agreement() {
    for seed in 100..120 {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut board = Board::new();
        loop {
            let moves = board.legal_moves();
            let expected = is_won(board.claimed_by(Player::X))
                || is_won(board.claimed_by(Player::O))
                || moves.is_empty()
                || board.plies() == MAX_PLIES;
            assert_eq!(board.is_game_over(), expected);
            if expected {
                break;
            }
            board.apply(moves[rng.gen_range(0..moves.len())]);
        }
    }
}

#[test]
fn test_cells_never_double_occupied() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    for _ in 0..10 {
        let mut board = Board::new();
        while !board.is_game_over() {
            let moves = board.legal_moves();
            board.apply(moves[rng.gen_range(0..moves.len())]);
            for block in 0..9 {
                assert_eq!(board.x[block] & board.o[block], 0);
            }
        }
    }
}

#[test]
fn test_equality_uses_active_history() {
    let mut a = Board::new();
    let mut b = Board::new();
    assert_eq!(a, b);

    play(&mut a, &[(0, 1), (1, 0)]);
    play(&mut b, &[(0, 1), (1, 0)]);
    assert_eq!(a, b);

    // Same stones, different move order, different constraint history.
    let mut c = Board::new();
    play(&mut c, &[(0, 1), (1, 0), (2, 2), (3, 3)]);
    let mut d = Board::new();
    play(&mut d, &[(2, 2), (3, 3), (0, 1), (1, 0)]);
    assert_ne!(c, d);

    assert_eq!(c.clone(), c);
}

#[test]
fn test_move_index_layout() {
    // Block 0 local 0 is the top-left cell; block 8 local 8 the bottom-right.
    assert_eq!(Move::new(0, 0).index(), 0);
    assert_eq!(Move::new(8, 8).index(), 80);
    // Block 1 local 3 sits on row 1, column 3.
    assert_eq!(Move::new(1, 3).row_col(), (1, 3));
    assert_eq!(Move::new(5, 7).row_col(), (5, 7));

    for index in 0..NUM_CELLS {
        assert_eq!(Move::from_index(index).index(), index);
    }
}

#[test]
fn test_observation_initial() {
    let obs = Board::new().observation();
    assert!(obs.plane(Observation::PLANE_X).iter().all(|&v| v == 0.0));
    assert!(obs.plane(Observation::PLANE_O).iter().all(|&v| v == 0.0));
    assert!(obs.plane(Observation::PLANE_LEGAL).iter().all(|&v| v == 1.0));
    assert!(obs.plane(Observation::PLANE_DRAWN).iter().all(|&v| v == 0.0));
}

#[test]
fn test_observation_after_moves() {
    let mut board = Board::new();
    board.apply(Move::new(0, 4)); // X at row 1, col 1
    board.apply(Move::new(4, 0)); // O at row 3, col 3; X sent to block 0

    let obs = board.observation();
    assert_eq!(obs.get(Observation::PLANE_X, 1, 1), 1.0);
    assert_eq!(obs.get(Observation::PLANE_O, 3, 3), 1.0);
    assert_eq!(obs.get(Observation::PLANE_O, 1, 1), 0.0);

    // Only the empty cells of block 0 are legal.
    let legal: f32 = obs.plane(Observation::PLANE_LEGAL).iter().sum();
    assert_eq!(legal, 8.0);
    assert_eq!(obs.get(Observation::PLANE_LEGAL, 0, 0), 1.0);
    assert_eq!(obs.get(Observation::PLANE_LEGAL, 1, 1), 0.0);
    assert_eq!(obs.get(Observation::PLANE_LEGAL, 3, 4), 0.0);
}

#[test]
fn test_observation_claimed_blocks_broadcast() {
    let mut board = Board::new();
    play(&mut board, &X_TOP_ROW_GAME[..5]);

    let obs = board.observation();
    for row in 0..3 {
        for col in 0..3 {
            assert_eq!(obs.get(Observation::PLANE_X_CLAIMED, row, col), 1.0);
        }
    }
    let claimed: f32 = obs.plane(Observation::PLANE_X_CLAIMED).iter().sum();
    assert_eq!(claimed, 9.0);
    assert!(obs.plane(Observation::PLANE_O_CLAIMED).iter().all(|&v| v == 0.0));
}

#[test]
fn test_observation_byte_encoding() {
    let obs = Board::new().observation();
    let mut buf = Vec::new();
    obs.encode(&mut buf);
    assert_eq!(buf.len(), OBS_SIZE * 4);

    // Plane 2 starts at float 162 and is all ones on the empty board.
    let offset = Observation::PLANE_LEGAL * NUM_CELLS * 4;
    let first = f32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap());
    assert_eq!(first, 1.0);
}

#[test]
fn test_random_rollout_is_reproducible() {
    let board = Board::new();
    let mut rng_a = ChaCha20Rng::seed_from_u64(42);
    let mut rng_b = ChaCha20Rng::seed_from_u64(42);

    let a = random_rollout(&board, &mut rng_a);
    let b = random_rollout(&board, &mut rng_b);
    assert_eq!(a, b);
}

#[test]
fn test_random_rollout_from_finished_game() {
    let mut board = Board::new();
    play(&mut board, &X_TOP_ROW_GAME);
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    assert_eq!(random_rollout(&board, &mut rng), Outcome::XWins);
}

#[test]
fn test_outcome_scores() {
    assert_eq!(Outcome::XWins.score(), 1.0);
    assert_eq!(Outcome::OWins.score(), -1.0);
    assert_eq!(Outcome::Draw.score(), 0.0);
    assert_eq!(Outcome::OWins.score_for(Player::O), 1.0);
    assert_eq!(Outcome::XWins.score_for(Player::O), -1.0);
    assert_eq!(Outcome::Draw.winner(), None);
    assert_eq!(Player::X.opponent(), Player::O);
}

#[test]
fn test_forced_loss_position() {
    let mut board = fixtures::x_forced_loss();
    assert_eq!(board.plies(), 24);
    assert_eq!(board.active_block(), Some(4));
    assert_eq!(board.claimed_by(Player::O), 0b0_0010_0100);
    assert_eq!(board.legal_moves(), vec![Move::new(4, 8)]);

    board.apply(Move::new(4, 8));
    assert!(!board.is_game_over());
    assert_eq!(board.active_block(), Some(8));
    assert_eq!(board.legal_moves()[0], Move::new(8, 2));

    board.apply(Move::new(8, 2));
    assert_eq!(board.outcome(), Some(Outcome::OWins));
}

#[test]
fn test_drawn_endgame_position() {
    let board = fixtures::o_to_draw();
    assert_eq!(board.plies(), MAX_PLIES - 1);
    assert_eq!(board.side_to_move(), Player::O);
    assert_eq!(board.claimed_by(Player::X) | board.claimed_by(Player::O), 0);
    assert_eq!(board.legal_moves(), vec![Move::new(8, 4), Move::new(8, 8)]);

    for mv in board.legal_moves() {
        let mut next = board.clone();
        next.apply(mv);
        assert_eq!(next.outcome(), Some(Outcome::Draw), "{:?}", mv);
    }
}
