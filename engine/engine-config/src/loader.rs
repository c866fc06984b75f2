//! Finding, reading and overriding config.toml.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where config.toml is looked for when `UTTT_CONFIG` is unset or stale.
pub const CONFIG_SEARCH_PATHS: &[&str] = &["config.toml", "../config.toml"];

/// Environment variable naming an explicit config file.
const CONFIG_ENV: &str = "UTTT_CONFIG";

/// Load the central configuration.
///
/// The file named by `UTTT_CONFIG` wins; otherwise the first existing entry
/// of [`CONFIG_SEARCH_PATHS`] is used, and built-in defaults when there is
/// none. `UTTT_<SECTION>_<KEY>` overrides are applied on top in every case.
pub fn load_config() -> CentralConfig {
    match locate_config() {
        Some(path) => {
            info!(path = %path.display(), "Loading config");
            load_from_path(&path)
        }
        None => {
            debug!("No config.toml found, using built-in defaults");
            apply_env_overrides(CentralConfig::default())
        }
    }
}

fn locate_config() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(explicit);
        if path.exists() {
            return Some(path);
        }
        warn!("{}={} does not exist, searching defaults", CONFIG_ENV, path.display());
    }

    CONFIG_SEARCH_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

/// Load configuration from `path`, falling back to defaults if the file
/// cannot be read or parsed.
pub fn load_from_path(path: &Path) -> CentralConfig {
    let parsed: Result<CentralConfig, String> = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| toml::from_str(&content).map_err(|e| e.to_string()));

    let config = parsed.unwrap_or_else(|e| {
        warn!("Ignoring {}: {}", path.display(), e);
        CentralConfig::default()
    });
    apply_env_overrides(config)
}

/// Overwrite `$config.$section.$field` from the environment variable `$key`.
macro_rules! env_override {
    ($config:ident . $section:ident . $field:ident <- $key:literal) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    ($config:ident . $section:ident . $field:ident <- $key:literal as parsed) => {
        if let Ok(raw) = std::env::var($key) {
            match raw.parse() {
                Ok(v) => $config.$section.$field = v,
                Err(_) => warn!("Ignoring {}={}: not a valid value", $key, raw),
            }
        }
    };
}

/// Apply `UTTT_<SECTION>_<KEY>` environment overrides.
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    env_override!(config.common.data_dir <- "UTTT_COMMON_DATA_DIR");
    env_override!(config.common.log_level <- "UTTT_COMMON_LOG_LEVEL");
    env_override!(config.common.seed <- "UTTT_COMMON_SEED" as parsed);

    env_override!(config.mcts.timeout_ms <- "UTTT_MCTS_TIMEOUT_MS" as parsed);
    env_override!(config.mcts.guided_timeout_ms <- "UTTT_MCTS_GUIDED_TIMEOUT_MS" as parsed);
    env_override!(config.mcts.max_nodes <- "UTTT_MCTS_MAX_NODES" as parsed);
    env_override!(config.mcts.c_uct <- "UTTT_MCTS_C_UCT" as parsed);
    env_override!(config.mcts.c_puct <- "UTTT_MCTS_C_PUCT" as parsed);

    env_override!(config.alphabeta.depth <- "UTTT_ALPHABETA_DEPTH" as parsed);

    env_override!(config.arena.games <- "UTTT_ARENA_GAMES" as parsed);
    env_override!(config.arena.x_player <- "UTTT_ARENA_X_PLAYER");
    env_override!(config.arena.o_player <- "UTTT_ARENA_O_PLAYER");
    env_override!(config.arena.reuse_tree <- "UTTT_ARENA_REUSE_TREE" as parsed);

    config
}
