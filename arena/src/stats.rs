//! Match statistics tracking and persistence.
//!
//! Tracks game outcomes and lengths plus MCTS search totals. Snapshots are
//! written to `arena_stats.json` in the data directory.

use games_uttt::Outcome;
use mcts::{SearchStats, StopReason};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

/// Aggregated arena statistics.
#[derive(Debug)]
pub struct ArenaStats {
    x_player: String,
    o_player: String,
    games_completed: u32,
    x_wins: u32,
    o_wins: u32,
    draws: u32,
    /// Sum of game lengths for average calculation
    total_plies: u64,
    mcts_searches: u64,
    mcts_iterations: u64,
    mcts_search_us: u64,
    /// Searches that ended because the root was solved
    mcts_solved_roots: u64,
    training_samples: u64,
    start_time: Instant,
    stats_path: String,
}

/// Serializable stats for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaStatsSnapshot {
    pub x_player: String,
    pub o_player: String,
    pub games_completed: u32,
    pub x_wins: u32,
    pub o_wins: u32,
    pub draws: u32,
    pub total_plies: u64,
    pub avg_game_length: f64,
    pub mcts_searches: u64,
    pub mcts_avg_iterations: f64,
    pub mcts_avg_search_us: f64,
    pub mcts_solved_roots: u64,
    pub training_samples: u64,
    pub runtime_seconds: f64,
    pub timestamp: u64,
}

impl ArenaStats {
    /// Create new stats tracker.
    pub fn new(data_dir: &str, x_player: &str, o_player: &str) -> Self {
        let stats_path = format!("{}/arena_stats.json", data_dir);

        // Ensure data directory exists
        if let Err(e) = fs::create_dir_all(data_dir) {
            warn!("Failed to create data directory: {}", e);
        }

        Self {
            x_player: x_player.to_string(),
            o_player: o_player.to_string(),
            games_completed: 0,
            x_wins: 0,
            o_wins: 0,
            draws: 0,
            total_plies: 0,
            mcts_searches: 0,
            mcts_iterations: 0,
            mcts_search_us: 0,
            mcts_solved_roots: 0,
            training_samples: 0,
            start_time: Instant::now(),
            stats_path,
        }
    }

    /// Record a finished game.
    pub fn record_game(&mut self, plies: usize, outcome: Outcome) {
        self.games_completed += 1;
        self.total_plies += plies as u64;

        match outcome {
            Outcome::XWins => self.x_wins += 1,
            Outcome::OWins => self.o_wins += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    /// Record one MCTS search.
    pub fn record_search(&mut self, stats: &SearchStats) {
        self.mcts_searches += 1;
        self.mcts_iterations += stats.iterations as u64;
        self.mcts_search_us += stats.elapsed.as_micros() as u64;
        if stats.stop_reason == StopReason::RootTerminal {
            self.mcts_solved_roots += 1;
        }
    }

    pub fn record_samples(&mut self, count: usize) {
        self.training_samples += count as u64;
    }

    /// Get a snapshot of current stats.
    pub fn snapshot(&self) -> ArenaStatsSnapshot {
        let games = self.games_completed;
        let runtime = self.start_time.elapsed().as_secs_f64();

        let avg_game_length = if games > 0 {
            self.total_plies as f64 / games as f64
        } else {
            0.0
        };

        let (mcts_avg_iterations, mcts_avg_search_us) = if self.mcts_searches > 0 {
            let searches = self.mcts_searches as f64;
            (
                self.mcts_iterations as f64 / searches,
                self.mcts_search_us as f64 / searches,
            )
        } else {
            (0.0, 0.0)
        };

        ArenaStatsSnapshot {
            x_player: self.x_player.clone(),
            o_player: self.o_player.clone(),
            games_completed: games,
            x_wins: self.x_wins,
            o_wins: self.o_wins,
            draws: self.draws,
            total_plies: self.total_plies,
            avg_game_length,
            mcts_searches: self.mcts_searches,
            mcts_avg_iterations,
            mcts_avg_search_us,
            mcts_solved_roots: self.mcts_solved_roots,
            training_samples: self.training_samples,
            runtime_seconds: runtime,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Write the current snapshot to `arena_stats.json`. Failures are logged
    /// and otherwise ignored.
    pub fn write_stats(&self) {
        let result = serde_json::to_vec_pretty(&self.snapshot())
            .map_err(std::io::Error::from)
            .and_then(|json| write_atomic(Path::new(&self.stats_path), &json));

        match result {
            Ok(()) => debug!("Wrote arena stats to {}", self.stats_path),
            Err(e) => warn!("Failed to write arena stats to {}: {}", self.stats_path, e),
        }
    }

    pub fn stats_path(&self) -> &str {
        &self.stats_path
    }
}

/// Write `bytes` next to `path` and rename over it, so readers never see a
/// partial file.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let temp_path = path.with_extension("json.tmp");
    let written = fs::File::create(&temp_path)
        .and_then(|mut file| file.write_all(bytes))
        .and_then(|()| fs::rename(&temp_path, path));
    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}
