use marquee_player::PlayerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    /// Defaults handed to playback clients.
    #[serde(default)]
    pub player: PlayerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Built web client to serve for non-API paths.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file; a leading `~` is expanded.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("marquee.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Require an admin session for catalog writes. Disable only for local development.
    #[serde(default = "default_require_admin_session")]
    pub require_admin_session: bool,

    /// Session timeout in hours (default: 24)
    #[serde(default = "default_session_timeout")]
    pub session_timeout_hours: u64,
}

fn default_require_admin_session() -> bool {
    true
}

fn default_session_timeout() -> u64 {
    24
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            require_admin_session: default_require_admin_session(),
            session_timeout_hours: default_session_timeout(),
        }
    }
}
