//! Saved CLI credentials.
//!
//! `rafway login` keeps the bearer token in `{data_dir}/credentials.json` so
//! later commands stay signed in. The file is written with owner-only
//! permissions on Unix.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rafway_types::profile::UserId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub uid: UserId,
    pub token: String,
}

pub fn credentials_path(data_dir: &Path) -> PathBuf {
    data_dir.join("credentials.json")
}

/// Read saved credentials. A missing or unreadable file means signed out.
pub async fn load_credentials(data_dir: &Path) -> Option<Credentials> {
    let path = credentials_path(data_dir);
    let content = tokio::fs::read_to_string(&path).await.ok()?;
    match serde_json::from_str(&content) {
        Ok(credentials) => Some(credentials),
        Err(err) => {
            tracing::warn!("Ignoring malformed {}: {err}", path.display());
            None
        }
    }
}

pub async fn save_credentials(data_dir: &Path, credentials: &Credentials) -> std::io::Result<()> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = credentials_path(data_dir);
    let json = serde_json::to_string_pretty(credentials).map_err(std::io::Error::other)?;
    tokio::fs::write(&path, json).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).await?;
    }
    Ok(())
}

/// Remove saved credentials. Returns whether a file was removed.
pub async fn clear_credentials(data_dir: &Path) -> std::io::Result<bool> {
    match tokio::fs::remove_file(credentials_path(data_dir)).await {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}
