mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./marquee.toml",
        "~/.config/marquee/config.toml",
        "/etc/marquee/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Database path with `~` expanded.
pub fn database_path(config: &Config) -> PathBuf {
    let raw = config.database.path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.auth.session_timeout_hours == 0 {
        anyhow::bail!("Session timeout must be at least one hour");
    }

    if config.player.idle_timeout_ms == 0 {
        anyhow::bail!("Player idle timeout cannot be 0");
    }

    if config.database.path.as_os_str().is_empty() {
        anyhow::bail!("Database path cannot be empty");
    }

    if let Some(ref dir) = config.server.static_dir {
        if !dir.exists() {
            tracing::warn!("Static directory does not exist: {:?}", dir);
        }
    }

    if !config.auth.require_admin_session {
        tracing::warn!("Admin sessions are disabled; catalog writes are unauthenticated");
    }

    Ok(())
}
