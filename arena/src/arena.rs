//! Match runner: plays games between two policies and tracks the results

use anyhow::{anyhow, Result};
use games_uttt::{Board, Outcome};
use mcts::TrainingSample;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info};

use crate::config::Config;
use crate::player::{build_policy, Policy};
use crate::stats::{ArenaStats, ArenaStatsSnapshot};

/// A finished game.
#[derive(Debug)]
pub struct GameRecord {
    pub outcome: Outcome,
    pub plies: usize,
    /// One sample per MCTS move, in move order
    pub samples: Vec<TrainingSample>,
}

/// Play one game from the opening to the end.
pub fn play_game(
    x: &mut dyn Policy,
    o: &mut dyn Policy,
    rng: &mut ChaCha20Rng,
    stats: &mut ArenaStats,
) -> Result<GameRecord> {
    let mut board = Board::new();
    let mut samples = Vec::new();
    x.new_game();
    o.new_game();

    let outcome = loop {
        if let Some(outcome) = board.outcome() {
            break outcome;
        }

        let policy: &mut dyn Policy = if board.is_x_to_move() { &mut *x } else { &mut *o };
        let selection = policy.select_move(&board, rng)?;
        if !board.legal_moves().contains(&selection.mv) {
            return Err(anyhow!(
                "{} player chose illegal move {:?} at ply {}",
                policy.kind(),
                selection.mv,
                board.plies()
            ));
        }

        if let Some(search) = &selection.search {
            stats.record_search(search);
        }
        if let Some(sample) = selection.sample {
            samples.push(sample);
        }

        debug!(ply = board.plies(), player = %policy.kind(), mv = ?selection.mv, "Move played");
        board.apply(selection.mv);
    };

    Ok(GameRecord {
        outcome,
        plies: board.plies(),
        samples,
    })
}

/// Runs the configured number of games between the X and O players.
pub struct Arena {
    config: Config,
    x: Box<dyn Policy>,
    o: Box<dyn Policy>,
    rng: ChaCha20Rng,
    stats: ArenaStats,
    samples: Vec<TrainingSample>,
}

impl Arena {
    pub fn new(config: Config) -> Result<Self> {
        let x_kind = config.x_kind()?;
        let o_kind = config.o_kind()?;
        let x = build_policy(x_kind, &config);
        let o = build_policy(o_kind, &config);
        let rng = ChaCha20Rng::seed_from_u64(config.seed);
        let stats = ArenaStats::new(&config.data_dir, x_kind.name(), o_kind.name());

        Ok(Self {
            config,
            x,
            o,
            rng,
            stats,
            samples: Vec::new(),
        })
    }

    /// Play every game, writing a stats snapshot after each one.
    pub fn run(&mut self) -> Result<ArenaStatsSnapshot> {
        for game in 1..=self.config.games {
            let record = play_game(
                self.x.as_mut(),
                self.o.as_mut(),
                &mut self.rng,
                &mut self.stats,
            )?;

            self.stats.record_game(record.plies, record.outcome);
            self.stats.record_samples(record.samples.len());
            info!(
                game,
                outcome = ?record.outcome,
                plies = record.plies,
                samples = record.samples.len(),
                "Game finished"
            );
            self.samples.extend(record.samples);
            self.stats.write_stats();
        }

        Ok(self.stats.snapshot())
    }

    pub fn stats_path(&self) -> &str {
        self.stats.stats_path()
    }

    /// Training samples collected so far.
    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{AlphaBetaPolicy, RandomPolicy};
    use tempfile::tempdir;

    fn config(data_dir: &str, x_player: &str, o_player: &str) -> Config {
        Config {
            games: 2,
            x_player: x_player.into(),
            o_player: o_player.into(),
            reuse_tree: true,
            seed: 42,
            max_nodes: 30,
            timeout_ms: 60_000,
            guided_timeout_ms: 60_000,
            c_uct: 2.0,
            c_puct: 2.0,
            depth: 1,
            log_level: "info".into(),
            data_dir: data_dir.into(),
        }
    }

    #[test]
    fn test_random_game_finishes() {
        let dir = tempdir().unwrap();
        let mut stats = ArenaStats::new(dir.path().to_str().unwrap(), "random", "random");
        let mut rng = ChaCha20Rng::seed_from_u64(3);

        let record = play_game(&mut RandomPolicy, &mut RandomPolicy, &mut rng, &mut stats).unwrap();
        assert!(record.plies <= games_uttt::MAX_PLIES);
        assert!(record.samples.is_empty());
        assert_eq!(stats.snapshot().mcts_searches, 0);
    }

    #[test]
    fn test_same_seed_same_game() {
        let dir = tempdir().unwrap();
        let mut stats = ArenaStats::new(dir.path().to_str().unwrap(), "random", "alphabeta");

        let mut first = ChaCha20Rng::seed_from_u64(9);
        let mut second = ChaCha20Rng::seed_from_u64(9);
        let a = play_game(
            &mut RandomPolicy,
            &mut AlphaBetaPolicy::new(1),
            &mut first,
            &mut stats,
        )
        .unwrap();
        let b = play_game(
            &mut RandomPolicy,
            &mut AlphaBetaPolicy::new(1),
            &mut second,
            &mut stats,
        )
        .unwrap();
        assert_eq!(a.outcome, b.outcome);
        assert_eq!(a.plies, b.plies);
    }

    #[test]
    fn test_arena_run_records_every_game() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path().to_str().unwrap(), "mcts", "random");
        let mut arena = Arena::new(cfg).unwrap();
        let snapshot = arena.run().unwrap();

        assert_eq!(snapshot.games_completed, 2);
        assert_eq!(snapshot.x_wins + snapshot.o_wins + snapshot.draws, 2);
        assert_eq!(snapshot.x_player, "mcts");
        assert!(snapshot.mcts_searches > 0);
        assert_eq!(snapshot.training_samples, arena.samples().len() as u64);
        assert!(dir.path().join("arena_stats.json").exists());
        assert!(arena.stats_path().ends_with("arena_stats.json"));
    }

    #[test]
    fn test_guided_samples_are_distributions() {
        let dir = tempdir().unwrap();
        let mut cfg = config(dir.path().to_str().unwrap(), "guided", "alphabeta");
        cfg.games = 1;

        let mut arena = Arena::new(cfg).unwrap();
        arena.run().unwrap();

        assert!(!arena.samples().is_empty());
        for sample in arena.samples() {
            let total: f32 = sample.policy.iter().sum();
            assert!((total - 1.0).abs() < 1e-4);
            assert!((-1.0..=1.0).contains(&sample.value));
        }
    }

    #[test]
    fn test_unknown_player_is_rejected() {
        let dir = tempdir().unwrap();
        let cfg = config(dir.path().to_str().unwrap(), "mcts", "oracle");
        assert!(Arena::new(cfg).is_err());
    }
}
