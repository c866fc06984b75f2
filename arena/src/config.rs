//! Configuration for the arena
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser};
use engine_config::{load_config, CentralConfig};
use mcts::{MctsConfig, SearchMode};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

use crate::player::PlayerKind;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_games() -> u32 {
    CENTRAL_CONFIG.arena.games
}

fn default_x_player() -> String {
    CENTRAL_CONFIG.arena.x_player.clone()
}

fn default_o_player() -> String {
    CENTRAL_CONFIG.arena.o_player.clone()
}

fn default_reuse_tree() -> bool {
    CENTRAL_CONFIG.arena.reuse_tree
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.common.seed
}

fn default_max_nodes() -> u32 {
    CENTRAL_CONFIG.mcts.max_nodes
}

fn default_timeout_ms() -> u64 {
    CENTRAL_CONFIG.mcts.timeout_ms
}

fn default_guided_timeout_ms() -> u64 {
    CENTRAL_CONFIG.mcts.guided_timeout_ms
}

fn default_c_uct() -> f64 {
    CENTRAL_CONFIG.mcts.c_uct
}

fn default_c_puct() -> f64 {
    CENTRAL_CONFIG.mcts.c_puct
}

fn default_depth() -> u32 {
    CENTRAL_CONFIG.alphabeta.depth
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "arena")]
#[command(about = "Ultimate Tic-Tac-Toe arena - plays matches between search players")]
#[command(
    long_about = "Plays a series of Ultimate Tic-Tac-Toe games between two players
(random, mcts, guided, alphabeta), collects MCTS training samples in memory and
writes a JSON stats snapshot to the data directory.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Number of games to play
    #[arg(long, default_value_t = default_games())]
    pub games: u32,

    /// Player moving first (random, mcts, guided, alphabeta)
    #[arg(long, default_value_t = default_x_player())]
    pub x_player: String,

    /// Player moving second (random, mcts, guided, alphabeta)
    #[arg(long, default_value_t = default_o_player())]
    pub o_player: String,

    /// Keep the MCTS subtree of the played move between turns
    #[arg(long, default_value_t = default_reuse_tree(), action = ArgAction::Set)]
    pub reuse_tree: bool,

    /// Seed for the match random number generator
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// MCTS iteration budget per move
    #[arg(long, default_value_t = default_max_nodes())]
    pub max_nodes: u32,

    /// Plain MCTS time budget per move in milliseconds
    #[arg(long, default_value_t = default_timeout_ms())]
    pub timeout_ms: u64,

    /// Guided MCTS time budget per move in milliseconds
    #[arg(long, default_value_t = default_guided_timeout_ms())]
    pub guided_timeout_ms: u64,

    /// UCT exploration constant
    #[arg(long, default_value_t = default_c_uct())]
    pub c_uct: f64,

    /// PUCT exploration constant
    #[arg(long, default_value_t = default_c_puct())]
    pub c_puct: f64,

    /// Alpha-beta search depth in plies
    #[arg(long, default_value_t = default_depth())]
    pub depth: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Directory for the stats snapshot
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.games == 0 {
            return Err(anyhow!("games must be greater than 0"));
        }

        self.x_kind()?;
        self.o_kind()?;

        if self.max_nodes == 0 {
            return Err(anyhow!("max_nodes must be greater than 0"));
        }

        if self.timeout_ms == 0 || self.guided_timeout_ms == 0 {
            return Err(anyhow!(
                "timeout_ms and guided_timeout_ms must be greater than 0"
            ));
        }

        for (name, c) in [("c_uct", self.c_uct), ("c_puct", self.c_puct)] {
            if !c.is_finite() || c < 0.0 {
                return Err(anyhow!("{} must be a non-negative number, got {}", name, c));
            }
        }

        if self.depth == 0 {
            return Err(anyhow!("depth must be greater than 0"));
        }

        if self.data_dir.is_empty() {
            return Err(anyhow!("data_dir cannot be empty"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    pub fn x_kind(&self) -> Result<PlayerKind> {
        self.x_player.parse()
    }

    pub fn o_kind(&self) -> Result<PlayerKind> {
        self.o_player.parse()
    }

    /// Search parameters for an MCTS player of the given mode.
    pub fn mcts_config(&self, mode: SearchMode) -> MctsConfig {
        let (base, timeout_ms) = match mode {
            SearchMode::Rollout => (MctsConfig::plain(), self.timeout_ms),
            SearchMode::Guided => (MctsConfig::guided(), self.guided_timeout_ms),
        };
        base.with_timeout(Duration::from_millis(timeout_ms))
            .with_max_nodes(self.max_nodes)
            .with_c_uct(self.c_uct as f32)
            .with_c_puct(self.c_puct as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            games: 2,
            x_player: "mcts".into(),
            o_player: "random".into(),
            reuse_tree: true,
            seed: 42,
            max_nodes: 50,
            timeout_ms: 60_000,
            guided_timeout_ms: 60_000,
            c_uct: 2.0,
            c_puct: 2.0,
            depth: 2,
            log_level: "info".into(),
            data_dir: "../data".into(),
        }
    }

    #[test]
    fn validate_accepts_valid_configuration() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_games() {
        let mut cfg = base_config();
        cfg.games = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("games"));
    }

    #[test]
    fn validate_rejects_unknown_player() {
        let mut cfg = base_config();
        cfg.o_player = "minimax".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("unknown player"));
    }

    #[test]
    fn validate_rejects_zero_max_nodes() {
        let mut cfg = base_config();
        cfg.max_nodes = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_nodes"));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut cfg = base_config();
        cfg.guided_timeout_ms = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn validate_rejects_negative_exploration() {
        let mut cfg = base_config();
        cfg.c_puct = -1.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("c_puct"));

        cfg.c_puct = 2.0;
        cfg.c_uct = f64::NAN;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("c_uct"));
    }

    #[test]
    fn validate_rejects_zero_depth() {
        let mut cfg = base_config();
        cfg.depth = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("depth"));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut cfg = base_config();
        cfg.log_level = "nope".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }

    #[test]
    fn player_kinds_parse() {
        let mut cfg = base_config();
        cfg.x_player = "alphabeta".into();
        cfg.o_player = "guided".into();
        assert_eq!(cfg.x_kind().unwrap(), PlayerKind::AlphaBeta);
        assert_eq!(cfg.o_kind().unwrap(), PlayerKind::Guided);
    }

    #[test]
    fn mcts_config_uses_mode_timeout() {
        let mut cfg = base_config();
        cfg.timeout_ms = 500;
        cfg.guided_timeout_ms = 100;
        cfg.c_puct = 1.5;

        let plain = cfg.mcts_config(SearchMode::Rollout);
        assert_eq!(plain.mode, SearchMode::Rollout);
        assert_eq!(plain.timeout, Duration::from_millis(500));
        assert_eq!(plain.max_nodes, 50);

        let guided = cfg.mcts_config(SearchMode::Guided);
        assert_eq!(guided.mode, SearchMode::Guided);
        assert_eq!(guided.timeout, Duration::from_millis(100));
        assert!((guided.c_puct - 1.5).abs() < f32::EPSILON);
    }
}
