//! The dashboard controller.
//!
//! One explicitly owned value holds everything the views need. Mutations go
//! through `&mut self`; each one ends in [`Dashboard::refresh`], which
//! recomputes the visible set, redraws the charts and publishes a snapshot on
//! the watch channel returned by [`Dashboard::subscribe`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use spread_data::{Dataset, Timeline};
use spread_model::PostEvent;
use tokio::sync::watch;

use crate::chart::{Chart, ChartKind, ChartScene, ChartSet};
use crate::highlight::{self, HighlightOutcome};
use crate::playback::{Playback, TimelineKey, DEFAULT_STEP, DEFAULT_SWEEP};
use crate::propagation_map::{layout_map, MapScene};
use crate::state::{visible_posts, PlatformFilter, ViewState, CURSOR_MAX};
use crate::time_trend::TimeTrendChart;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    /// Duration of a full playback sweep.
    pub sweep: Duration,
    /// Cursor units per Left/Right key.
    pub step: f64,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            sweep: DEFAULT_SWEEP,
            step: DEFAULT_STEP,
        }
    }
}

/// State published after every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub revision: u64,
    pub cursor: f64,
    pub platform: PlatformFilter,
    pub topic: Option<String>,
    pub drag_mode: bool,
    pub playing: bool,
    pub visible: usize,
    pub highlighted: Option<String>,
}

/// Headline numbers shown beside the diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoSummary {
    pub total: usize,
    /// Events at or before the cursor, ignoring topic selection.
    pub in_window: usize,
    /// Size of the shared visible set.
    pub visible: usize,
    pub current_time: Option<DateTime<Utc>>,
    pub topic: Option<String>,
    pub platform: PlatformFilter,
}

impl InfoSummary {
    pub fn lines(&self) -> Vec<String> {
        if self.total == 0 {
            return vec!["No data available".to_string()];
        }
        vec![
            format!("总帖子数: {}", self.total),
            format!("可见帖子数: {}", self.in_window),
            format!(
                "当前时间: {}",
                self.current_time
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string())
            ),
            format!("主题: {}", self.topic.as_deref().unwrap_or("全部")),
            format!(
                "平台: {}",
                match &self.platform {
                    PlatformFilter::All => "全部".to_string(),
                    PlatformFilter::Code(code) => code.clone(),
                }
            ),
        ]
    }
}

pub struct Dashboard {
    dataset: Arc<Dataset>,
    timeline: Arc<Timeline>,
    state: ViewState,
    charts: ChartSet,
    playback: Playback,
    step: f64,
    highlight: Option<HighlightOutcome>,
    revision: u64,
    updates: watch::Sender<ViewSnapshot>,
}

impl Dashboard {
    pub fn new(dataset: Arc<Dataset>, options: DashboardOptions) -> Self {
        let timeline = Arc::new(Timeline::from_dataset(&dataset));
        let charts = ChartSet::new(Arc::clone(&dataset));
        let state = ViewState::new();
        let (updates, _) = watch::channel(ViewSnapshot {
            revision: 0,
            cursor: state.cursor(),
            platform: PlatformFilter::All,
            topic: None,
            drag_mode: false,
            playing: false,
            visible: 0,
            highlighted: None,
        });

        let mut dashboard = Self {
            dataset,
            timeline,
            state,
            charts,
            playback: Playback::new(options.sweep),
            step: options.step,
            highlight: None,
            revision: 0,
            updates,
        };
        dashboard.refresh();

        tracing::info!(
            events = dashboard.timeline.events.len(),
            topics = dashboard.timeline.topics.len(),
            start = dashboard.timeline.range.start,
            end = dashboard.timeline.range.end,
            "Dashboard ready"
        );
        dashboard
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn timeline(&self) -> &Arc<Timeline> {
        &self.timeline
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn charts(&self) -> &ChartSet {
        &self.charts
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// Most recent highlight request since the last redraw.
    pub fn last_highlight(&self) -> Option<&HighlightOutcome> {
        self.highlight.as_ref()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.updates.subscribe()
    }

    pub fn visible_posts(&self) -> Vec<&PostEvent> {
        self.state.visible_posts(&self.timeline)
    }

    /// Recompute the visible set, redraw every chart and publish a snapshot.
    ///
    /// A redraw drops all chart highlights.
    pub fn refresh(&mut self) {
        let visible = self.state.visible_posts(&self.timeline);
        let all: Vec<&PostEvent> = self.timeline.events.iter().collect();
        self.charts.update(&visible, &all);
        self.charts
            .trend_mut()
            .set_progress(self.state.cursor(), self.playback.is_playing());
        self.highlight = None;
        let visible_count = visible.len();
        self.publish(visible_count);
    }

    fn publish(&mut self, visible: usize) {
        self.revision += 1;
        let highlighted = match &self.highlight {
            Some(HighlightOutcome::Applied { post_id, .. }) => Some(post_id.clone()),
            _ => None,
        };
        self.updates.send_replace(ViewSnapshot {
            revision: self.revision,
            cursor: self.state.cursor(),
            platform: self.state.platform().clone(),
            topic: self.state.topic().map(str::to_string),
            drag_mode: self.state.drag_mode(),
            playing: self.playback.is_playing(),
            visible,
            highlighted,
        });
    }

    fn publish_current(&mut self) {
        let visible = self.state.visible_posts(&self.timeline).len();
        self.publish(visible);
    }

    /// Move the cursor without touching playback.
    pub fn set_cursor(&mut self, cursor: f64) -> f64 {
        let cursor = self.state.set_cursor(cursor);
        self.refresh();
        cursor
    }

    /// Track click or handle drag at `fraction` (0-1) along the track.
    /// Cancels playback.
    pub fn scrub(&mut self, fraction: f64) -> f64 {
        self.playback.stop();
        self.set_cursor(TimeTrendChart::position_to_cursor(fraction))
    }

    pub fn select_topic(&mut self, topic_id: &str) -> Option<String> {
        self.charts.clear_highlights();
        let selected = self.state.select_topic(topic_id).map(str::to_string);
        tracing::info!(topic = ?selected, "Topic selection changed");
        self.refresh();
        selected
    }

    pub fn select_platform(&mut self, code: &str) -> PlatformFilter {
        self.charts.clear_highlights();
        let selected = self.state.select_platform(code).clone();
        tracing::info!(platform = %selected, "Platform selection changed");
        self.refresh();
        selected
    }

    /// Drop topic and platform selection and all highlights.
    pub fn clear_selection(&mut self) {
        self.state.clear_selection();
        self.charts.clear_highlights();
        tracing::info!("Topic and platform selection cleared");
        self.refresh();
    }

    pub fn highlight_post(&mut self, post_id: &str) -> HighlightOutcome {
        let outcome = highlight::highlight(
            &self.dataset,
            &self.timeline,
            self.state.topic(),
            &mut self.charts,
            post_id,
        );
        if outcome.is_applied() {
            self.highlight = Some(outcome.clone());
            self.publish_current();
        }
        outcome
    }

    pub fn clear_highlights(&mut self) {
        self.charts.clear_highlights();
        self.highlight = None;
        self.publish_current();
    }

    pub fn toggle_drag_mode(&mut self) -> bool {
        let enabled = self.state.toggle_drag_mode();
        tracing::debug!(enabled, "Drag mode toggled");
        self.publish_current();
        enabled
    }

    /// Returns the new playing state.
    pub fn toggle_playback(&mut self) -> bool {
        let playing = self.playback.toggle();
        tracing::debug!(playing, cursor = self.state.cursor(), "Playback toggled");
        self.charts
            .trend_mut()
            .set_progress(self.state.cursor(), playing);
        self.publish_current();
        playing
    }

    pub fn stop_playback(&mut self) {
        if self.playback.is_playing() {
            self.playback.stop();
            self.charts
                .trend_mut()
                .set_progress(self.state.cursor(), false);
            self.publish_current();
        }
    }

    /// Advance playback to `now`. Returns `false` once playback is stopped,
    /// telling the driver not to schedule another tick.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.playback.tick(self.state.cursor(), now) {
            Some(cursor) => {
                self.set_cursor(cursor);
                true
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, key: TimelineKey) {
        match key {
            TimelineKey::Space => {
                self.toggle_playback();
            }
            TimelineKey::Left => {
                self.playback.stop();
                self.set_cursor(self.state.cursor() - self.step);
            }
            TimelineKey::Right => {
                self.playback.stop();
                self.set_cursor((self.state.cursor() + self.step).min(CURSOR_MAX));
            }
            TimelineKey::Escape => self.clear_selection(),
        }
    }

    pub fn info(&self) -> InfoSummary {
        let range = self.timeline.range;
        let in_window = visible_posts(&self.timeline.events, range, self.state.cursor(), None).len();
        let current_time = if self.timeline.is_empty() {
            None
        } else {
            DateTime::from_timestamp_millis(range.absolute_time(self.state.cursor()) as i64)
        };
        InfoSummary {
            total: self.timeline.events.len(),
            in_window,
            visible: self.visible_posts().len(),
            current_time,
            topic: self.state.topic().map(str::to_string),
            platform: self.state.platform().clone(),
        }
    }

    pub fn scene(&self, kind: ChartKind) -> Option<ChartScene> {
        self.charts.get(kind).map(|c| c.scene())
    }

    pub fn scenes(&self) -> Vec<ChartScene> {
        self.charts.scenes()
    }

    /// Earliest post of the selected topic over the whole timeline.
    fn first_of_selected_topic(&self) -> Option<&str> {
        let topic = self.state.topic()?;
        self.timeline
            .events
            .iter()
            .find(|e| e.topic_id == topic)
            .map(|e| e.post_id.as_str())
    }

    pub fn map(&self) -> MapScene {
        let visible = self.visible_posts();
        layout_map(&visible, &self.state, self.first_of_selected_topic())
    }

    /// Topic ids with their event count and total effect, in source order.
    pub fn topics(&self) -> Vec<(String, usize, f64)> {
        self.timeline
            .topics
            .iter()
            .map(|t| (t.topic_id.clone(), t.events.len(), t.total_effect))
            .collect()
    }
}
