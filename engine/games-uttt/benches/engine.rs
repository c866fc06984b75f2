use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use games_uttt::{random_rollout, Board};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Board after `plies` random moves (or fewer if the game ends first).
fn random_position(seed: u64, plies: usize) -> Board {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut board = Board::new();
    for _ in 0..plies {
        if board.is_game_over() {
            break;
        }
        let moves = board.legal_moves();
        board.apply(moves[rng.gen_range(0..moves.len())]);
    }
    board
}

fn bench_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("uttt_legal_moves");
    let opening = Board::new();
    let midgame = random_position(7, 20);

    group.bench_function("opening", |b| b.iter(|| black_box(opening.legal_moves())));
    group.bench_function("midgame", |b| b.iter(|| black_box(midgame.legal_moves())));
    group.finish();
}

fn bench_apply_undo(c: &mut Criterion) {
    let mut group = c.benchmark_group("uttt_apply_undo");
    group.bench_function("all_replies_midgame", |b| {
        let mut board = random_position(11, 20);
        let moves = board.legal_moves();
        b.iter(|| {
            for &mv in &moves {
                board.apply(mv);
                black_box(board.is_game_over());
                board.undo();
            }
        });
    });
    group.finish();
}

fn bench_observation(c: &mut Criterion) {
    let mut group = c.benchmark_group("uttt_observation");
    let board = random_position(3, 30);

    group.bench_function("from_board", |b| b.iter(|| black_box(board.observation())));
    group.bench_function("encode", |b| {
        let obs = board.observation();
        b.iter_batched(
            || Vec::with_capacity(2048),
            |mut buffer| {
                obs.encode(&mut buffer);
                buffer
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_rollout(c: &mut Criterion) {
    let mut group = c.benchmark_group("uttt_rollout");
    group.bench_function("from_opening", |b| {
        let board = Board::new();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        b.iter(|| black_box(random_rollout(&board, &mut rng)));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_legal_moves,
    bench_apply_undo,
    bench_observation,
    bench_rollout
);
criterion_main!(benches);
