//! Player tuning knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_idle_timeout_ms() -> u64 {
    3000
}

fn default_mobile_breakpoint() -> u32 {
    768
}

fn default_skip_seconds() -> u32 {
    10
}

fn default_command_buffer() -> usize {
    64
}

/// Player configuration, embeddable as a `[player]` TOML table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Inactivity before the controls hide.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Viewports narrower than this lock to landscape in fullscreen.
    #[serde(default = "default_mobile_breakpoint")]
    pub mobile_breakpoint: u32,

    /// Step for the jump back/forward controls.
    #[serde(default = "default_skip_seconds")]
    pub skip_seconds: u32,

    /// Capacity of a session's command channel.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: default_idle_timeout_ms(),
            mobile_breakpoint: default_mobile_breakpoint(),
            skip_seconds: default_skip_seconds(),
            command_buffer: default_command_buffer(),
        }
    }
}

impl PlayerConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Whether a viewport this wide counts as mobile.
    pub fn is_mobile_width(&self, width: u32) -> bool {
        width < self.mobile_breakpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.idle_timeout(), Duration::from_secs(3));
        assert!(config.is_mobile_width(767));
        assert!(!config.is_mobile_width(768));
        assert_eq!(config.skip_seconds, 10);
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: PlayerConfig = serde_json::from_str(r#"{"idle_timeout_ms": 5000}"#).unwrap();
        assert_eq!(config.idle_timeout_ms, 5000);
        assert_eq!(config.mobile_breakpoint, 768);
    }
}
