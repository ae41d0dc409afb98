//! Async driver for a [`PlaybackController`].
//!
//! A session is a single tokio task that owns the controller. Everything that
//! mutates playback state arrives as a [`PlayerCommand`] on one channel, is
//! applied in order, and the resulting [`PlaybackState`] is published on a
//! watch channel. The task also sleeps on the idle deadline and awaits
//! fullscreen/orientation requests, applying their results only when they
//! resolve.

use std::sync::Arc;

use marquee_common::MediaSource;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;

use crate::config::PlayerConfig;
use crate::controller::{FullscreenTransition, PlaybackController};
use crate::platform::{DisplaySurface, MediaOutput, Orientation, PlatformError};
use crate::state::{Panel, PlaybackSpeed, PlaybackState, SubtitleTrack};

/// Errors from talking to a session.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("player session has shut down")]
    SessionClosed,
}

/// Inputs to a session: user actions, media events and platform notifications.
#[derive(Debug)]
pub enum PlayerCommand {
    LoadSource(Option<MediaSource>),
    TogglePlayPause,
    SeekTo(f64),
    Skip(i64),
    SkipForward,
    SkipBack,
    SetVolume(f64),
    SetBrightness(f64),
    SelectSubtitle(SubtitleTrack),
    SelectSpeed(PlaybackSpeed),
    TogglePanel(Panel),
    ToggleFullscreen,
    /// Pointer move or touch start over the player.
    Interaction,
    /// Click on the background outside every control.
    BackgroundClick,
    MetadataLoaded { duration: f64 },
    TimeUpdate { current_time: f64 },
    Ended,
    /// Fullscreen changed without a request from us.
    FullscreenChanged(bool),
    /// Reply with the state after all earlier commands were applied.
    Snapshot(oneshot::Sender<PlaybackState>),
    Shutdown,
}

/// Cloneable handle for sending commands to a session.
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<PlayerCommand>,
    state: watch::Receiver<PlaybackState>,
}

impl PlayerHandle {
    pub async fn send(&self, command: PlayerCommand) -> Result<(), PlayerError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlayerError::SessionClosed)
    }

    /// Latest published state.
    pub fn state(&self) -> PlaybackState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.clone()
    }

    /// State after every previously sent command has been applied.
    pub async fn snapshot(&self) -> Result<PlaybackState, PlayerError> {
        let (tx, rx) = oneshot::channel();
        self.send(PlayerCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| PlayerError::SessionClosed)
    }

    pub async fn load_source(&self, source: Option<MediaSource>) -> Result<(), PlayerError> {
        self.send(PlayerCommand::LoadSource(source)).await
    }

    pub async fn toggle_play_pause(&self) -> Result<(), PlayerError> {
        self.send(PlayerCommand::TogglePlayPause).await
    }

    pub async fn seek_to(&self, fraction: f64) -> Result<(), PlayerError> {
        self.send(PlayerCommand::SeekTo(fraction)).await
    }

    pub async fn skip(&self, delta_seconds: i64) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Skip(delta_seconds)).await
    }

    pub async fn set_volume(&self, volume: f64) -> Result<(), PlayerError> {
        self.send(PlayerCommand::SetVolume(volume)).await
    }

    pub async fn set_brightness(&self, brightness: f64) -> Result<(), PlayerError> {
        self.send(PlayerCommand::SetBrightness(brightness)).await
    }

    pub async fn toggle_panel(&self, panel: Panel) -> Result<(), PlayerError> {
        self.send(PlayerCommand::TogglePanel(panel)).await
    }

    pub async fn toggle_fullscreen(&self) -> Result<(), PlayerError> {
        self.send(PlayerCommand::ToggleFullscreen).await
    }

    pub async fn notify_interaction(&self) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Interaction).await
    }

    pub async fn background_click(&self) -> Result<(), PlayerError> {
        self.send(PlayerCommand::BackgroundClick).await
    }

    /// Ask the session to stop. Pending platform requests are abandoned.
    pub async fn shutdown(&self) -> Result<(), PlayerError> {
        self.send(PlayerCommand::Shutdown).await
    }
}

/// A running player session.
pub struct PlayerSession {
    handle: PlayerHandle,
    task: JoinHandle<()>,
}

impl PlayerSession {
    /// Spawn a session task on the current runtime. The player starts disabled
    /// until a source is loaded.
    pub fn spawn<M, D>(media: M, display: Arc<D>, config: PlayerConfig) -> Self
    where
        M: MediaOutput,
        D: DisplaySurface,
    {
        let controller = PlaybackController::new(media, &config);
        let (state_tx, state_rx) = watch::channel(controller.state().clone());
        let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer.max(1));

        let actor = SessionActor {
            controller,
            display,
            config,
            commands: cmd_rx,
            state_tx,
            fullscreen: JoinSet::new(),
            orientation: JoinSet::new(),
        };
        let task = tokio::spawn(actor.run());

        Self {
            handle: PlayerHandle {
                commands: cmd_tx,
                state: state_rx,
            },
            task,
        }
    }

    pub fn handle(&self) -> PlayerHandle {
        self.handle.clone()
    }

    /// Wait for the session task to finish.
    pub async fn join(self) {
        let Self { handle, task } = self;
        drop(handle);
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Player session task failed");
        }
    }
}

struct SessionActor<M, D> {
    controller: PlaybackController<M>,
    display: Arc<D>,
    config: PlayerConfig,
    commands: mpsc::Receiver<PlayerCommand>,
    state_tx: watch::Sender<PlaybackState>,
    fullscreen: JoinSet<(FullscreenTransition, Result<(), PlatformError>)>,
    orientation: JoinSet<()>,
}

async fn idle_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl<M: MediaOutput, D: DisplaySurface> SessionActor<M, D> {
    async fn run(mut self) {
        tracing::debug!("Player session started");

        loop {
            let deadline = self.controller.idle_deadline();

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(PlayerCommand::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },
                _ = idle_elapsed(deadline) => {
                    if self.controller.fire_idle(Instant::now()) {
                        tracing::trace!("Controls hidden after inactivity");
                    }
                }
                Some(joined) = self.fullscreen.join_next() => match joined {
                    Ok((transition, result)) => self.finish_fullscreen(transition, result),
                    Err(e) => {
                        tracing::warn!(error = %e, "Fullscreen request task failed");
                        self.controller.complete_fullscreen(
                            FullscreenTransition::Enter,
                            Err(PlatformError::rejected("fullscreen", e.to_string())),
                        );
                    }
                },
                Some(_) = self.orientation.join_next() => {}
            }

            self.publish();
        }

        self.fullscreen.abort_all();
        self.orientation.abort_all();
        tracing::debug!("Player session stopped");
    }

    fn apply(&mut self, command: PlayerCommand) {
        let ctl = &mut self.controller;
        match command {
            PlayerCommand::LoadSource(source) => ctl.load_source(source),
            PlayerCommand::TogglePlayPause => ctl.toggle_play_pause(),
            PlayerCommand::SeekTo(fraction) => ctl.seek_to(fraction),
            PlayerCommand::Skip(delta) => ctl.skip(delta),
            PlayerCommand::SkipForward => ctl.skip_forward(),
            PlayerCommand::SkipBack => ctl.skip_back(),
            PlayerCommand::SetVolume(volume) => ctl.set_volume(volume),
            PlayerCommand::SetBrightness(brightness) => ctl.set_brightness(brightness),
            PlayerCommand::SelectSubtitle(track) => ctl.select_subtitle(track),
            PlayerCommand::SelectSpeed(speed) => ctl.select_playback_speed(speed),
            PlayerCommand::TogglePanel(panel) => ctl.toggle_panel(panel),
            PlayerCommand::ToggleFullscreen => self.start_fullscreen(),
            PlayerCommand::Interaction => ctl.notify_interaction(Instant::now()),
            PlayerCommand::BackgroundClick => ctl.hide_all(),
            PlayerCommand::MetadataLoaded { duration } => ctl.on_metadata_loaded(duration),
            PlayerCommand::TimeUpdate { current_time } => ctl.on_time_update(current_time),
            PlayerCommand::Ended => ctl.on_ended(),
            PlayerCommand::FullscreenChanged(is_fullscreen) => {
                let was_fullscreen = ctl.state().is_fullscreen;
                ctl.on_fullscreen_change(is_fullscreen);
                if was_fullscreen && !is_fullscreen {
                    self.adjust_orientation(FullscreenTransition::Exit);
                }
            }
            PlayerCommand::Snapshot(reply) => {
                let _ = reply.send(ctl.state().clone());
            }
            PlayerCommand::Shutdown => {}
        }
    }

    fn start_fullscreen(&mut self) {
        let Some(transition) = self.controller.begin_fullscreen_toggle() else {
            tracing::trace!("Fullscreen toggle ignored");
            return;
        };

        let display = Arc::clone(&self.display);
        self.fullscreen.spawn(async move {
            let result = match transition {
                FullscreenTransition::Enter => display.request_fullscreen().await,
                FullscreenTransition::Exit => display.exit_fullscreen().await,
            };
            (transition, result)
        });
    }

    fn finish_fullscreen(
        &mut self,
        transition: FullscreenTransition,
        result: Result<(), PlatformError>,
    ) {
        // The platform may have reported the exit while our request was in
        // flight; the orientation was released then.
        let already_exited =
            matches!(transition, FullscreenTransition::Exit) && !self.controller.state().is_fullscreen;

        if self.controller.complete_fullscreen(transition, result) {
            tracing::debug!(fullscreen = transition.target(), "Fullscreen changed");
            if !already_exited {
                self.adjust_orientation(transition);
            }
        }
    }

    /// Lock to landscape after entering fullscreen on a narrow viewport, and
    /// release the lock after leaving. Failures are logged only.
    fn adjust_orientation(&mut self, transition: FullscreenTransition) {
        let width = self.display.viewport_width();
        if !self.config.is_mobile_width(width) {
            return;
        }

        let display = Arc::clone(&self.display);
        self.orientation.spawn(async move {
            let result = match transition {
                FullscreenTransition::Enter => {
                    display.lock_orientation(Orientation::Landscape).await
                }
                FullscreenTransition::Exit => display.unlock_orientation().await,
            };
            if let Err(e) = result {
                tracing::warn!(?transition, viewport_width = width, error = %e, "Orientation change failed");
            }
        });
    }

    fn publish(&self) {
        let current = self.controller.state();
        self.state_tx.send_if_modified(|published| {
            if published != current {
                *published = current.clone();
                true
            } else {
                false
            }
        });
    }
}
