//! Data directory layout.
//!
//! Everything Raf Way writes lives under one directory: the SQLite database,
//! `config.toml`, an optional `report.json`, and the CLI's saved credentials.

pub mod credentials;

use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "RAFWAY_DATA_DIR";

/// Resolve the data directory: `RAFWAY_DATA_DIR`, else `~/.rafway`, else `./.rafway`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|h| h.join(".rafway"))
        .unwrap_or_else(|| PathBuf::from(".rafway"))
}
