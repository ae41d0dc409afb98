//! Marquee-Player: a headless playback controller.
//!
//! The controller binds a logical playback state (play flag, position,
//! volume, brightness, speed, subtitle choice, control visibility and
//! fullscreen) to a media output, independent of any UI toolkit.
//!
//! - [`state`] - value types and the [`PlaybackState`] snapshot
//! - [`platform`] - the [`MediaOutput`] and [`DisplaySurface`] seams
//! - [`controller`] - the synchronous [`PlaybackController`]
//! - [`session`] - a tokio task that drives a controller, its idle timer and
//!   asynchronous fullscreen requests
//! - [`headless`] - in-process platform implementations
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use marquee_common::MediaSource;
//! use marquee_player::headless::{HeadlessDisplay, HeadlessMedia};
//! use marquee_player::{PlayerConfig, PlayerSession};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), marquee_player::PlayerError> {
//! let session = PlayerSession::spawn(
//!     HeadlessMedia::default(),
//!     Arc::new(HeadlessDisplay::default()),
//!     PlayerConfig::default(),
//! );
//! let player = session.handle();
//!
//! player
//!     .load_source(Some(MediaSource::new("https://cdn.example/movie.mp4", "Server 1")))
//!     .await?;
//! player.toggle_play_pause().await?;
//!
//! let state = player.snapshot().await?;
//! assert!(state.is_playing);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod headless;
pub mod platform;
pub mod session;
pub mod state;

pub use config::PlayerConfig;
pub use controller::{FullscreenTransition, IdleTimer, PlaybackController};
pub use platform::{DisplaySurface, MediaOutput, Orientation, PlatformError};
pub use session::{PlayerCommand, PlayerError, PlayerHandle, PlayerSession};
pub use state::{
    format_time, Brightness, Panel, PlaybackSpeed, PlaybackState, SubtitleTrack, Visibility,
    Volume,
};
