mod config;
mod persistence;
pub mod snapshot;
pub mod sqlite;

pub use config::{AttestationConfig, Config, GardenConfig, RewardConfig, TimerConfig};
pub use persistence::{MemoryStore, PersistenceProvider};
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the Tendly data directory, creating it if needed.
///
/// `TENDLY_DATA_DIR` wins when set. Otherwise `~/.config/tendly`, or
/// `~/.config/tendly-dev` when `TENDLY_ENV=dev`.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TENDLY_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TENDLY_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tendly-dev")
            } else {
                base_dir.join("tendly")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
