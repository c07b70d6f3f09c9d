//! Visualization state: time cursor, selections and the derived visible set.

use std::fmt;

use serde::{Serialize, Serializer};
use spread_data::Timeline;
use spread_model::{PostEvent, TimeRange};

pub const CURSOR_MIN: f64 = 0.0;
pub const CURSOR_MAX: f64 = 100.0;

/// Platform selection. `All` is the "no selection" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlatformFilter {
    #[default]
    All,
    Code(String),
}

impl PlatformFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, PlatformFilter::All)
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            PlatformFilter::All => None,
            PlatformFilter::Code(code) => Some(code),
        }
    }

    /// Whether a node on `platform` counts as selected. Everything matches `All`.
    pub fn matches(&self, platform: Option<&str>) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Code(code) => platform == Some(code.as_str()),
        }
    }
}

impl fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformFilter::All => write!(f, "all"),
            PlatformFilter::Code(code) => write!(f, "{code}"),
        }
    }
}

impl Serialize for PlatformFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The one mutable piece of the dashboard. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    cursor: f64,
    platform: PlatformFilter,
    topic: Option<String>,
    drag_mode: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            cursor: CURSOR_MIN,
            platform: PlatformFilter::All,
            topic: None,
            drag_mode: false,
        }
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Set the cursor, clamped to 0-100. NaN resets to 0.
    pub fn set_cursor(&mut self, cursor: f64) -> f64 {
        self.cursor = if cursor.is_nan() {
            CURSOR_MIN
        } else {
            cursor.clamp(CURSOR_MIN, CURSOR_MAX)
        };
        self.cursor
    }

    pub fn platform(&self) -> &PlatformFilter {
        &self.platform
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn drag_mode(&self) -> bool {
        self.drag_mode
    }

    /// Events at or before the cursor time, scoped to the selected topic.
    ///
    /// Platform selection is deliberately not applied here.
    pub fn visible_posts<'a>(&self, timeline: &'a Timeline) -> Vec<&'a PostEvent> {
        visible_posts(&timeline.events, timeline.range, self.cursor, self.topic.as_deref())
    }

    /// Toggle: selecting the current topic clears it.
    pub fn select_topic(&mut self, topic_id: &str) -> Option<&str> {
        if self.topic.as_deref() == Some(topic_id) {
            self.topic = None;
        } else {
            self.topic = Some(topic_id.to_string());
        }
        self.topic.as_deref()
    }

    /// Toggle against the `All` sentinel.
    pub fn select_platform(&mut self, code: &str) -> &PlatformFilter {
        if self.platform.code() == Some(code) {
            self.platform = PlatformFilter::All;
        } else {
            self.platform = PlatformFilter::Code(code.to_string());
        }
        &self.platform
    }

    pub fn clear_selection(&mut self) {
        self.topic = None;
        self.platform = PlatformFilter::All;
    }

    pub fn toggle_drag_mode(&mut self) -> bool {
        self.drag_mode = !self.drag_mode;
        self.drag_mode
    }
}

/// Filter `events` to those at or before the cursor, then to `topic` if set.
pub fn visible_posts<'a>(
    events: &'a [PostEvent],
    range: TimeRange,
    cursor: f64,
    topic: Option<&str>,
) -> Vec<&'a PostEvent> {
    let limit = range.absolute_time(cursor);
    events
        .iter()
        .filter(|e| e.timestamp as f64 <= limit)
        .filter(|e| topic.map_or(true, |t| e.topic_id == t))
        .collect()
}
