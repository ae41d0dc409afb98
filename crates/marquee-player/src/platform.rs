//! Seams between the controller and whatever actually plays and shows video.

use async_trait::async_trait;
use thiserror::Error;

/// A request the platform refused or cannot perform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("{operation} rejected: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}

impl PlatformError {
    pub fn rejected(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            reason: reason.into(),
        }
    }
}

/// Screen orientation for [`DisplaySurface::lock_orientation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

/// The media element: decodes and outputs audio/video.
///
/// Calls are synchronous commands; progress comes back as events fed to the
/// controller (`on_metadata_loaded`, `on_time_update`, `on_ended`).
pub trait MediaOutput: Send + 'static {
    /// Point the output at a new URL, discarding the current one.
    fn load(&mut self, url: &str);

    /// Release the current media, if any.
    fn unload(&mut self);

    /// Start or resume playback. May be refused, e.g. by an autoplay policy.
    fn play(&mut self) -> Result<(), PlatformError>;

    fn pause(&mut self);

    /// The element's own paused flag, which is authoritative over cached state.
    fn is_paused(&self) -> bool;

    fn set_current_time(&mut self, seconds: f64);

    fn set_volume(&mut self, volume: f64);

    fn set_playback_rate(&mut self, rate: f64);
}

/// The surface the player is shown on.
///
/// Fullscreen and orientation requests complete asynchronously and may be
/// rejected; callers must only update state once a request resolves.
#[async_trait]
pub trait DisplaySurface: Send + Sync + 'static {
    async fn request_fullscreen(&self) -> Result<(), PlatformError>;

    async fn exit_fullscreen(&self) -> Result<(), PlatformError>;

    async fn lock_orientation(&self, orientation: Orientation) -> Result<(), PlatformError>;

    async fn unlock_orientation(&self) -> Result<(), PlatformError>;

    /// Current viewport width in CSS pixels.
    fn viewport_width(&self) -> u32;
}
