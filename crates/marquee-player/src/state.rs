//! Playback state and the value types it is made of.
//!
//! Range-limited values are newtypes that clamp on construction, so a stored
//! volume or brightness is always valid. Control visibility is a single enum
//! carrying the open panel, which makes "two panels open at once" and "a panel
//! open while controls are hidden" unrepresentable.

use std::fmt;

use marquee_common::MediaSource;
use serde::{Deserialize, Serialize};

/// Volume bounds.
pub mod volume_bounds {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 1.0;
    pub const DEFAULT: f64 = 1.0;
}

/// Brightness filter bounds.
pub mod brightness_bounds {
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 1.5;
    pub const DEFAULT: f64 = 1.0;
}

/// Audio volume, always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(f64);

impl Volume {
    /// Creates a volume, clamping to the valid range.
    #[must_use]
    pub fn new(volume: f64) -> Self {
        Self(volume.clamp(volume_bounds::MIN, volume_bounds::MAX))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_muted(self) -> bool {
        self.0 <= volume_bounds::MIN
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(volume_bounds::DEFAULT)
    }
}

/// Visual brightness multiplier, always within `[0.5, 1.5]`.
///
/// Brightness is a render-time filter on the picture and never reaches the
/// media output.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Brightness(f64);

impl Brightness {
    /// Creates a brightness level, clamping to the valid range.
    #[must_use]
    pub fn new(brightness: f64) -> Self {
        Self(brightness.clamp(brightness_bounds::MIN, brightness_bounds::MAX))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// CSS-style filter expression, e.g. `brightness(1.2)`.
    #[must_use]
    pub fn css_filter(self) -> String {
        format!("brightness({})", self.0)
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self(brightness_bounds::DEFAULT)
    }
}

/// The selectable playback rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackSpeed {
    #[serde(rename = "0.5x")]
    Half,
    #[serde(rename = "0.75x")]
    ThreeQuarters,
    #[default]
    #[serde(rename = "1x")]
    Normal,
    #[serde(rename = "1.25x")]
    OneAndAQuarter,
    #[serde(rename = "1.5x")]
    OneAndAHalf,
    #[serde(rename = "1.75x")]
    OneAndThreeQuarters,
    #[serde(rename = "2x")]
    Double,
}

impl PlaybackSpeed {
    /// All rates in menu order.
    pub const ALL: [PlaybackSpeed; 7] = [
        Self::Half,
        Self::ThreeQuarters,
        Self::Normal,
        Self::OneAndAQuarter,
        Self::OneAndAHalf,
        Self::OneAndThreeQuarters,
        Self::Double,
    ];

    /// Rate multiplier handed to the media output.
    #[must_use]
    pub fn rate(self) -> f64 {
        match self {
            Self::Half => 0.5,
            Self::ThreeQuarters => 0.75,
            Self::Normal => 1.0,
            Self::OneAndAQuarter => 1.25,
            Self::OneAndAHalf => 1.5,
            Self::OneAndThreeQuarters => 1.75,
            Self::Double => 2.0,
        }
    }

    /// Look up the speed with exactly this rate.
    pub fn from_rate(rate: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.rate() == rate)
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.rate())
    }
}

/// Subtitle language choice. `Off` is displayed as "None".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SubtitleTrack {
    English,
    Spanish,
    Italian,
    French,
    Portuguese,
    #[default]
    #[serde(rename = "None")]
    Off,
}

impl SubtitleTrack {
    /// All options in menu order.
    pub const ALL: [SubtitleTrack; 6] = [
        Self::English,
        Self::Spanish,
        Self::Italian,
        Self::French,
        Self::Portuguese,
        Self::Off,
    ];
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::English => "English",
            Self::Spanish => "Spanish",
            Self::Italian => "Italian",
            Self::French => "French",
            Self::Portuguese => "Portuguese",
            Self::Off => "None",
        };
        f.write_str(name)
    }
}

/// Control panels. At most one is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Settings,
    Subtitle,
    Playback,
    Volume,
    Brightness,
}

impl Panel {
    pub const ALL: [Panel; 5] = [
        Self::Settings,
        Self::Subtitle,
        Self::Playback,
        Self::Volume,
        Self::Brightness,
    ];
}

/// Whether the control overlay is shown, and which panel is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Visibility {
    Visible { panel: Option<Panel> },
    Hidden,
}

impl Visibility {
    /// Controls shown, no panel open.
    pub const IDLE: Visibility = Visibility::Visible { panel: None };
}

impl Default for Visibility {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Snapshot of everything a renderer needs to draw the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub source: Option<MediaSource>,
    pub is_playing: bool,
    /// Seconds.
    pub current_time: f64,
    /// Seconds; 0 until metadata has loaded.
    pub duration: f64,
    pub volume: Volume,
    pub brightness: Brightness,
    pub speed: PlaybackSpeed,
    pub subtitle: SubtitleTrack,
    pub visibility: Visibility,
    pub is_fullscreen: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            source: None,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: Volume::default(),
            brightness: Brightness::default(),
            speed: PlaybackSpeed::default(),
            subtitle: SubtitleTrack::default(),
            visibility: Visibility::default(),
            is_fullscreen: false,
        }
    }
}

impl PlaybackState {
    /// No playable source: controls render but do nothing.
    pub fn is_disabled(&self) -> bool {
        self.source.is_none()
    }

    pub fn controls_visible(&self) -> bool {
        matches!(self.visibility, Visibility::Visible { .. })
    }

    pub fn open_panel(&self) -> Option<Panel> {
        match self.visibility {
            Visibility::Visible { panel } => panel,
            Visibility::Hidden => None,
        }
    }

    pub fn duration_known(&self) -> bool {
        self.duration > 0.0
    }

    /// Fraction of the progress bar to fill.
    pub fn progress_fraction(&self) -> f64 {
        if self.duration_known() {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Format seconds as `m:ss` (minutes are not wrapped into hours).
///
/// ```
/// use marquee_player::format_time;
///
/// assert_eq!(format_time(65.0), "1:05");
/// assert_eq!(format_time(3725.9), "62:05");
/// ```
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_clamps() {
        for (input, expected) in [(-0.5, 0.0), (0.0, 0.0), (0.42, 0.42), (1.0, 1.0), (7.0, 1.0)] {
            assert_eq!(Volume::new(input).value(), expected, "input {}", input);
        }
        assert!(Volume::new(-1.0).is_muted());
    }

    #[test]
    fn test_brightness_clamps() {
        for (input, expected) in [(0.0, 0.5), (0.5, 0.5), (1.2, 1.2), (1.5, 1.5), (3.0, 1.5)] {
            assert_eq!(Brightness::new(input).value(), expected, "input {}", input);
        }
        assert_eq!(Brightness::new(1.2).css_filter(), "brightness(1.2)");
        assert_eq!(Brightness::default().css_filter(), "brightness(1)");
    }

    #[test]
    fn test_speed_rates() {
        assert_eq!(PlaybackSpeed::default().rate(), 1.0);
        assert_eq!(PlaybackSpeed::from_rate(1.75), Some(PlaybackSpeed::OneAndThreeQuarters));
        assert_eq!(PlaybackSpeed::from_rate(3.0), None);
        assert_eq!(PlaybackSpeed::OneAndAQuarter.to_string(), "1.25x");
        assert_eq!(PlaybackSpeed::Double.to_string(), "2x");
    }

    #[test]
    fn test_subtitle_names() {
        assert_eq!(SubtitleTrack::default(), SubtitleTrack::Off);
        assert_eq!(SubtitleTrack::Off.to_string(), "None");
        assert_eq!(
            serde_json::to_string(&SubtitleTrack::Off).unwrap(),
            "\"None\""
        );
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.99), "0:09");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(600.0), "10:00");
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
    }

    #[test]
    fn test_initial_state() {
        let state = PlaybackState::default();
        assert!(state.is_disabled());
        assert!(state.controls_visible());
        assert_eq!(state.open_panel(), None);
        assert_eq!(state.progress_fraction(), 0.0);
    }

    #[test]
    fn test_progress_fraction() {
        let state = PlaybackState {
            current_time: 30.0,
            duration: 120.0,
            ..Default::default()
        };
        assert_eq!(state.progress_fraction(), 0.25);
    }

    #[test]
    fn test_visibility_serialization() {
        let json = serde_json::to_value(Visibility::Visible {
            panel: Some(Panel::Volume),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"state": "visible", "panel": "volume"}));
        let hidden = serde_json::to_value(Visibility::Hidden).unwrap();
        assert_eq!(hidden, serde_json::json!({"state": "hidden"}));
    }
}
