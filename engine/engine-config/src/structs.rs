//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_timeout_ms() -> u64 {
    defaults::timeout_ms()
}
fn d_guided_timeout_ms() -> u64 {
    defaults::guided_timeout_ms()
}
fn d_max_nodes() -> u32 {
    defaults::max_nodes()
}
fn d_c_uct() -> f64 {
    defaults::c_uct()
}
fn d_c_puct() -> f64 {
    defaults::c_puct()
}
fn d_depth() -> u32 {
    defaults::depth()
}
fn d_games() -> u32 {
    defaults::games()
}
fn d_x_player() -> String {
    defaults::x_player().into()
}
fn d_o_player() -> String {
    defaults::o_player().into()
}
fn d_reuse_tree() -> bool {
    defaults::reuse_tree()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub alphabeta: AlphaBetaConfig,
    #[serde(default)]
    pub arena: ArenaConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    /// Directory for run artifacts (stats snapshots)
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
    /// Seed for every random source
    #[serde(default = "d_seed")]
    pub seed: u64,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
            seed: defaults::seed(),
        }
    }
}

/// MCTS (Monte Carlo Tree Search) configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    /// Wall-clock budget per plain search, in milliseconds
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
    /// Wall-clock budget per guided search, in milliseconds
    #[serde(default = "d_guided_timeout_ms")]
    pub guided_timeout_ms: u64,
    /// Iteration budget per search
    #[serde(default = "d_max_nodes")]
    pub max_nodes: u32,
    #[serde(default = "d_c_uct")]
    pub c_uct: f64,
    #[serde(default = "d_c_puct")]
    pub c_puct: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            timeout_ms: defaults::timeout_ms(),
            guided_timeout_ms: defaults::guided_timeout_ms(),
            max_nodes: defaults::max_nodes(),
            c_uct: defaults::c_uct(),
            c_puct: defaults::c_puct(),
        }
    }
}

/// Alpha-beta search configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AlphaBetaConfig {
    /// Search depth in plies
    #[serde(default = "d_depth")]
    pub depth: u32,
}

impl Default for AlphaBetaConfig {
    fn default() -> Self {
        Self {
            depth: defaults::depth(),
        }
    }
}

/// Match runner configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ArenaConfig {
    #[serde(default = "d_games")]
    pub games: u32,
    #[serde(default = "d_x_player")]
    pub x_player: String,
    #[serde(default = "d_o_player")]
    pub o_player: String,
    /// Carry MCTS subtrees over between moves
    #[serde(default = "d_reuse_tree")]
    pub reuse_tree: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            games: defaults::games(),
            x_player: defaults::x_player().into(),
            o_player: defaults::o_player().into(),
            reuse_tree: defaults::reuse_tree(),
        }
    }
}
