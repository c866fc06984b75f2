//! Arena - match runner for the Ultimate Tic-Tac-Toe search engines
//!
//! Plays a configured number of games between two players:
//! 1. `random`: uniformly random legal moves
//! 2. `mcts`: plain MCTS with random rollouts
//! 3. `guided`: PUCT-guided MCTS with a uniform evaluator
//! 4. `alphabeta`: fixed-depth negamax with alpha-beta pruning
//!
//! MCTS moves yield training samples, which are kept in memory and counted.
//! A JSON stats snapshot is written to `<data_dir>/arena_stats.json` after
//! every game.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

mod arena;
mod config;
mod player;
mod stats;

use crate::arena::Arena;
use crate::config::Config;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    info!(
        games = config.games,
        x_player = %config.x_player,
        o_player = %config.o_player,
        reuse_tree = config.reuse_tree,
        seed = config.seed,
        "Starting arena"
    );
    let mut arena = Arena::new(config)?;
    match arena.run() {
        Ok(summary) => {
            info!(
                games = summary.games_completed,
                x_wins = summary.x_wins,
                o_wins = summary.o_wins,
                draws = summary.draws,
                avg_game_length = summary.avg_game_length,
                mcts_searches = summary.mcts_searches,
                training_samples = arena.samples().len(),
                "Arena completed, stats written to {}",
                arena.stats_path()
            );
            Ok(())
        }
        Err(e) => {
            error!("Arena failed: {}", e);
            Err(e)
        }
    }
}
