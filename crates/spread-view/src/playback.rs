//! Cursor playback and the timeline keyboard shortcuts.
//!
//! Playback advances the cursor by the wall-clock time elapsed since the
//! previous tick, so the sweep speed does not depend on how often ticks
//! arrive. A full 0 to 100 sweep takes [`Playback::sweep`]; stepping past 100
//! wraps back to 0.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::state::{CURSOR_MAX, CURSOR_MIN};
use crate::ViewError;

/// Wall-clock duration of a full sweep.
pub const DEFAULT_SWEEP: Duration = Duration::from_millis(50_000);

/// Cursor units moved by one Left/Right key press.
pub const DEFAULT_STEP: f64 = 5.0;

const MIN_SWEEP: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct Playback {
    playing: bool,
    sweep: Duration,
    last_tick: Option<Instant>,
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(DEFAULT_SWEEP)
    }
}

impl Playback {
    pub fn new(sweep: Duration) -> Self {
        Self {
            playing: false,
            sweep: sweep.max(MIN_SWEEP),
            last_tick: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn sweep(&self) -> Duration {
        self.sweep
    }

    /// Start playing. The first tick after this only records its time.
    pub fn start(&mut self) {
        self.playing = true;
        self.last_tick = None;
    }

    /// Stop playing. Later ticks return `None` until restarted.
    pub fn stop(&mut self) {
        self.playing = false;
        self.last_tick = None;
    }

    /// Returns the new playing state.
    pub fn toggle(&mut self) -> bool {
        if self.playing {
            self.stop();
        } else {
            self.start();
        }
        self.playing
    }

    /// Cursor after advancing `cursor` to `now`, or `None` when stopped.
    pub fn tick(&mut self, cursor: f64, now: Instant) -> Option<f64> {
        if !self.playing {
            return None;
        }
        let elapsed = match self.last_tick.replace(now) {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        let advanced =
            cursor + elapsed.as_secs_f64() / self.sweep.as_secs_f64() * (CURSOR_MAX - CURSOR_MIN);
        Some(if advanced > CURSOR_MAX {
            CURSOR_MIN
        } else {
            advanced
        })
    }
}

/// Keyboard shortcuts of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineKey {
    /// Toggle playback.
    Space,
    /// Step back and stop playback.
    Left,
    /// Step forward and stop playback.
    Right,
    /// Clear topic and platform selection.
    Escape,
}

impl fmt::Display for TimelineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimelineKey::Space => "space",
            TimelineKey::Left => "left",
            TimelineKey::Right => "right",
            TimelineKey::Escape => "escape",
        };
        f.write_str(s)
    }
}

impl FromStr for TimelineKey {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "space" => Ok(TimelineKey::Space),
            "left" | "arrowleft" => Ok(TimelineKey::Left),
            "right" | "arrowright" => Ok(TimelineKey::Right),
            "escape" | "esc" => Ok(TimelineKey::Escape),
            _ => Err(ViewError::UnknownKey(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_does_not_advance() {
        let mut playback = Playback::new(Duration::from_secs(10));
        playback.start();
        assert_eq!(playback.tick(42.0, Instant::now()), Some(42.0));
    }

    #[test]
    fn zero_sweep_is_raised_to_minimum() {
        assert_eq!(Playback::new(Duration::ZERO).sweep(), MIN_SWEEP);
    }

    #[test]
    fn browser_key_names_parse() {
        assert_eq!("ArrowLeft".parse::<TimelineKey>(), Ok(TimelineKey::Left));
        assert_eq!("Esc".parse::<TimelineKey>(), Ok(TimelineKey::Escape));
        assert!("enter".parse::<TimelineKey>().is_err());
    }
}
