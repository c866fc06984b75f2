//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared by
//! the search engines and the arena binary.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`UTTT_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! UTTT_<SECTION>_<KEY>=value
//!
//! Examples:
//!     UTTT_COMMON_SEED=7
//!     UTTT_COMMON_DATA_DIR=/data
//!     UTTT_MCTS_MAX_NODES=5000
//!     UTTT_ALPHABETA_DEPTH=6
//!     UTTT_ARENA_O_PLAYER=alphabeta
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;
