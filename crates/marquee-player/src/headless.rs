//! In-process platform implementations for tests and non-graphical hosts.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::platform::{DisplaySurface, MediaOutput, Orientation, PlatformError};

/// A media element that only records what it was told.
#[derive(Debug, Clone)]
pub struct HeadlessMedia {
    url: Option<String>,
    paused: bool,
    current_time: f64,
    volume: f64,
    playback_rate: f64,
    refuse_play: bool,
}

impl Default for HeadlessMedia {
    fn default() -> Self {
        Self {
            url: None,
            paused: true,
            current_time: 0.0,
            volume: 1.0,
            playback_rate: 1.0,
            refuse_play: false,
        }
    }
}

impl HeadlessMedia {
    /// Make every `play()` fail, like a browser blocking autoplay.
    #[must_use]
    pub fn refuse_play(mut self) -> Self {
        self.refuse_play = true;
        self
    }

    pub fn loaded_url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }
}

impl MediaOutput for HeadlessMedia {
    fn load(&mut self, url: &str) {
        self.url = Some(url.to_string());
        self.paused = true;
        self.current_time = 0.0;
    }

    fn unload(&mut self) {
        self.url = None;
        self.paused = true;
        self.current_time = 0.0;
    }

    fn play(&mut self) -> Result<(), PlatformError> {
        if self.refuse_play {
            return Err(PlatformError::rejected("play", "playback not allowed"));
        }
        if self.url.is_none() {
            return Err(PlatformError::rejected("play", "no source loaded"));
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.playback_rate = rate;
    }
}

/// A display request as seen by [`HeadlessDisplay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRequest {
    EnterFullscreen,
    ExitFullscreen,
    LockOrientation(Orientation),
    UnlockOrientation,
}

/// A display with a fixed viewport that can be told to refuse requests.
#[derive(Debug)]
pub struct HeadlessDisplay {
    viewport_width: u32,
    latency: Duration,
    reject_fullscreen: bool,
    reject_orientation: bool,
    requests: Mutex<Vec<DisplayRequest>>,
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        Self::new(1280)
    }
}

impl HeadlessDisplay {
    pub fn new(viewport_width: u32) -> Self {
        Self {
            viewport_width,
            latency: Duration::ZERO,
            reject_fullscreen: false,
            reject_orientation: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Delay before each request resolves.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    #[must_use]
    pub fn rejecting_fullscreen(mut self) -> Self {
        self.reject_fullscreen = true;
        self
    }

    /// Refuse orientation locks, like a desktop browser.
    #[must_use]
    pub fn rejecting_orientation(mut self) -> Self {
        self.reject_orientation = true;
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<DisplayRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    async fn record(&self, request: DisplayRequest) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl DisplaySurface for HeadlessDisplay {
    async fn request_fullscreen(&self) -> Result<(), PlatformError> {
        self.record(DisplayRequest::EnterFullscreen).await;
        if self.reject_fullscreen {
            return Err(PlatformError::rejected("requestFullscreen", "permission denied"));
        }
        Ok(())
    }

    async fn exit_fullscreen(&self) -> Result<(), PlatformError> {
        self.record(DisplayRequest::ExitFullscreen).await;
        if self.reject_fullscreen {
            return Err(PlatformError::rejected("exitFullscreen", "permission denied"));
        }
        Ok(())
    }

    async fn lock_orientation(&self, orientation: Orientation) -> Result<(), PlatformError> {
        self.record(DisplayRequest::LockOrientation(orientation)).await;
        if self.reject_orientation {
            return Err(PlatformError::Unsupported("screen orientation lock"));
        }
        Ok(())
    }

    async fn unlock_orientation(&self) -> Result<(), PlatformError> {
        self.record(DisplayRequest::UnlockOrientation).await;
        if self.reject_orientation {
            return Err(PlatformError::Unsupported("screen orientation unlock"));
        }
        Ok(())
    }

    fn viewport_width(&self) -> u32 {
        self.viewport_width
    }
}
