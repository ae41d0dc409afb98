//! The playback controller.
//!
//! [`PlaybackController`] owns the [`PlaybackState`], the media output and the
//! idle-hide deadline. It is synchronous: time is passed in explicitly and
//! asynchronous platform requests are split into a `begin_*` step that says
//! what to ask for and a `complete_*` step that applies the answer. The
//! session driver in [`crate::session`] supplies the clock and runs the
//! requests.

use std::time::Duration;

use marquee_common::MediaSource;
use tokio::time::Instant;

use crate::config::PlayerConfig;
use crate::platform::{MediaOutput, PlatformError};
use crate::state::{
    Brightness, Panel, PlaybackSpeed, PlaybackState, SubtitleTrack, Visibility, Volume,
};

/// Single-slot idle deadline.
///
/// Scheduling replaces any pending deadline, so at most one hide is ever
/// pending and a superseded deadline can never fire.
#[derive(Debug, Clone)]
pub struct IdleTimer {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl IdleTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    /// Replace the pending deadline with `now + timeout`.
    pub fn reschedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.timeout);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the deadline if it has passed.
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Direction of a pending fullscreen request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenTransition {
    Enter,
    Exit,
}

impl FullscreenTransition {
    /// Fullscreen flag once this transition is confirmed.
    pub fn target(self) -> bool {
        matches!(self, Self::Enter)
    }
}

/// Binds a [`PlaybackState`] to a [`MediaOutput`].
pub struct PlaybackController<M> {
    media: M,
    state: PlaybackState,
    idle: IdleTimer,
    skip_step: i64,
    fullscreen_in_flight: bool,
}

impl<M: MediaOutput> PlaybackController<M> {
    /// Create a controller with no source loaded (disabled).
    pub fn new(mut media: M, config: &PlayerConfig) -> Self {
        let state = PlaybackState::default();
        media.set_volume(state.volume.value());
        media.set_playback_rate(state.speed.rate());

        Self {
            media,
            state,
            idle: IdleTimer::new(config.idle_timeout()),
            skip_step: i64::from(config.skip_seconds),
            fullscreen_in_flight: false,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn idle_deadline(&self) -> Option<Instant> {
        self.idle.deadline()
    }

    pub fn fullscreen_in_flight(&self) -> bool {
        self.fullscreen_in_flight
    }

    /// Switch to a new source, or to the disabled state with `None`.
    ///
    /// Position, duration and the play flag reset; volume, brightness, speed
    /// and subtitle choice carry over to the new source.
    pub fn load_source(&mut self, source: Option<MediaSource>) {
        match &source {
            Some(src) => {
                tracing::debug!(url = %src.url, label = %src.label, "Loading media source");
                self.media.load(&src.url);
                self.media.set_volume(self.state.volume.value());
                self.media.set_playback_rate(self.state.speed.rate());
            }
            None => {
                tracing::debug!("No playable source, player disabled");
                self.media.unload();
            }
        }

        self.state.source = source;
        self.state.is_playing = false;
        self.state.current_time = 0.0;
        self.state.duration = 0.0;
    }

    /// Play if the media is paused, pause otherwise.
    ///
    /// The media element's paused flag decides, so rapid repeated toggles
    /// can never leave `is_playing` out of sync with the element.
    pub fn toggle_play_pause(&mut self) {
        if self.state.is_disabled() {
            return;
        }

        if self.media.is_paused() {
            match self.media.play() {
                Ok(()) => self.state.is_playing = true,
                Err(e) => {
                    tracing::warn!(error = %e, "Play request refused");
                    self.state.is_playing = false;
                }
            }
        } else {
            self.media.pause();
            self.state.is_playing = false;
        }
    }

    /// Seek to `fraction` of the duration. No-op until the duration is known.
    pub fn seek_to(&mut self, fraction: f64) {
        if self.state.is_disabled() || !self.state.duration_known() || fraction.is_nan() {
            return;
        }
        let target = fraction.clamp(0.0, 1.0) * self.state.duration;
        self.set_position(target);
    }

    /// Jump by `delta_seconds`, clamped to `[0, duration]`.
    pub fn skip(&mut self, delta_seconds: i64) {
        if self.state.is_disabled() || !self.state.duration_known() {
            return;
        }
        let target = (self.state.current_time + delta_seconds as f64).clamp(0.0, self.state.duration);
        self.set_position(target);
    }

    pub fn skip_forward(&mut self) {
        self.skip(self.skip_step);
    }

    pub fn skip_back(&mut self) {
        self.skip(-self.skip_step);
    }

    fn set_position(&mut self, seconds: f64) {
        self.media.set_current_time(seconds);
        self.state.current_time = seconds;
    }

    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_nan() {
            return;
        }
        self.state.volume = Volume::new(volume);
        self.media.set_volume(self.state.volume.value());
    }

    /// Brightness only affects the rendered picture.
    pub fn set_brightness(&mut self, brightness: f64) {
        if brightness.is_nan() {
            return;
        }
        self.state.brightness = Brightness::new(brightness);
    }

    pub fn select_subtitle(&mut self, track: SubtitleTrack) {
        self.state.subtitle = track;
        self.close_panel();
    }

    pub fn select_playback_speed(&mut self, speed: PlaybackSpeed) {
        self.state.speed = speed;
        self.media.set_playback_rate(speed.rate());
        self.close_panel();
    }

    /// Open `panel`, closing any other, or close it if it is already open.
    ///
    /// Ignored while the controls are hidden.
    pub fn toggle_panel(&mut self, panel: Panel) {
        if let Visibility::Visible { panel: open } = self.state.visibility {
            let next = if open == Some(panel) { None } else { Some(panel) };
            self.state.visibility = Visibility::Visible { panel: next };
        }
    }

    fn close_panel(&mut self) {
        if let Visibility::Visible { .. } = self.state.visibility {
            self.state.visibility = Visibility::IDLE;
        }
    }

    /// Pointer movement or touch: show the controls and restart the idle timer.
    ///
    /// An open panel stays open.
    pub fn notify_interaction(&mut self, now: Instant) {
        if self.state.visibility == Visibility::Hidden {
            self.state.visibility = Visibility::IDLE;
        }
        self.idle.reschedule(now);
    }

    /// Hide the controls and close every panel.
    pub fn hide_all(&mut self) {
        self.idle.cancel();
        self.state.visibility = Visibility::Hidden;
    }

    /// Hide if the idle deadline has passed. Returns whether it fired.
    pub fn fire_idle(&mut self, now: Instant) -> bool {
        if self.idle.take_if_due(now) {
            self.state.visibility = Visibility::Hidden;
            true
        } else {
            false
        }
    }

    /// Decide which fullscreen request to make.
    ///
    /// Returns `None` while another request is in flight or when disabled.
    /// State is not touched until [`Self::complete_fullscreen`].
    pub fn begin_fullscreen_toggle(&mut self) -> Option<FullscreenTransition> {
        if self.state.is_disabled() || self.fullscreen_in_flight {
            return None;
        }
        self.fullscreen_in_flight = true;
        Some(if self.state.is_fullscreen {
            FullscreenTransition::Exit
        } else {
            FullscreenTransition::Enter
        })
    }

    /// Apply the platform's answer. Returns `true` if the transition happened.
    pub fn complete_fullscreen(
        &mut self,
        transition: FullscreenTransition,
        result: Result<(), PlatformError>,
    ) -> bool {
        self.fullscreen_in_flight = false;
        match result {
            Ok(()) => {
                self.state.is_fullscreen = transition.target();
                true
            }
            Err(e) => {
                tracing::warn!(?transition, error = %e, "Fullscreen request failed");
                false
            }
        }
    }

    /// Fullscreen changed outside our requests, e.g. the user pressed Escape.
    pub fn on_fullscreen_change(&mut self, is_fullscreen: bool) {
        self.state.is_fullscreen = is_fullscreen;
    }

    /// Duration became known. Non-finite durations (live streams) stay unknown.
    pub fn on_metadata_loaded(&mut self, duration: f64) {
        self.state.duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        // A time update may have arrived before the metadata.
        if self.state.duration_known() {
            self.state.current_time = self.state.current_time.min(self.state.duration);
        }
    }

    pub fn on_time_update(&mut self, current_time: f64) {
        if current_time.is_nan() {
            return;
        }
        let upper = if self.state.duration_known() {
            self.state.duration
        } else {
            f64::MAX
        };
        self.state.current_time = current_time.clamp(0.0, upper);
    }

    /// Playback reached the end. Does not advance to another item.
    ///
    /// The output is paused too so the next toggle plays again.
    pub fn on_ended(&mut self) {
        self.media.pause();
        self.state.is_playing = false;
    }
}
