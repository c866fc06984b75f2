//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time, so every binary agrees on
//! the same values without shipping the file.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
    alphabeta: AlphaBetaDefaults,
    arena: ArenaDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    log_level: String,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    timeout_ms: u64,
    guided_timeout_ms: u64,
    max_nodes: u32,
    c_uct: f64,
    c_puct: f64,
}

#[derive(Debug, Deserialize)]
struct AlphaBetaDefaults {
    depth: u32,
}

#[derive(Debug, Deserialize)]
struct ArenaDefaults {
    games: u32,
    x_player: String,
    o_player: String,
    reuse_tree: bool,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}
pub fn seed() -> u64 {
    DEFAULTS.common.seed
}

// MCTS
pub fn timeout_ms() -> u64 {
    DEFAULTS.mcts.timeout_ms
}
pub fn guided_timeout_ms() -> u64 {
    DEFAULTS.mcts.guided_timeout_ms
}
pub fn max_nodes() -> u32 {
    DEFAULTS.mcts.max_nodes
}
pub fn c_uct() -> f64 {
    DEFAULTS.mcts.c_uct
}
pub fn c_puct() -> f64 {
    DEFAULTS.mcts.c_puct
}

// Alpha-beta
pub fn depth() -> u32 {
    DEFAULTS.alphabeta.depth
}

// Arena
pub fn games() -> u32 {
    DEFAULTS.arena.games
}
pub fn x_player() -> &'static str {
    &DEFAULTS.arena.x_player
}
pub fn o_player() -> &'static str {
    &DEFAULTS.arena.o_player
}
pub fn reuse_tree() -> bool {
    DEFAULTS.arena.reuse_tree
}
