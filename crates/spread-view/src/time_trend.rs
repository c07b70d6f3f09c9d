//! Daily post counts over the whole timeline, plus the scrub control.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use spread_model::PostEvent;

use crate::chart::{Chart, ChartConfig, ChartKind, ChartScene, ScrubControl, TrendPoint};
use crate::state::{CURSOR_MAX, CURSOR_MIN};

const PLAY_LABEL: &str = "播放";
const PAUSE_LABEL: &str = "暂停";
const KEY_HINT: &str = "空格键: 播放/暂停 | ←→: 快退/快进";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub count: usize,
    pub total_effect: f64,
}

/// One bucket per calendar day (UTC) from the first to the last event,
/// days without events included with zero counts.
pub fn daily_buckets(events: &[&PostEvent]) -> Vec<DayBucket> {
    let mut per_day: BTreeMap<NaiveDate, (usize, f64)> = BTreeMap::new();
    for event in events {
        if let Some(date) = event.date() {
            let entry = per_day.entry(date).or_default();
            entry.0 += 1;
            entry.1 += event.propagation_effect;
        }
    }

    let (Some(first), Some(last)) = (
        per_day.keys().next().copied(),
        per_day.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| {
            let (count, total_effect) = per_day.get(&date).copied().unwrap_or((0, 0.0));
            DayBucket {
                date,
                count,
                total_effect,
            }
        })
        .collect()
}

/// Line/area chart of [`DayBucket`]s with a track, handle and play button.
pub struct TimeTrendChart {
    config: ChartConfig,
    buckets: Vec<DayBucket>,
    cursor: f64,
    playing: bool,
    highlighted: Option<String>,
}

impl TimeTrendChart {
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            buckets: Vec::new(),
            cursor: CURSOR_MIN,
            playing: false,
            highlighted: None,
        }
    }

    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Mirror the dashboard's cursor and playback flag on the scrub control.
    pub fn set_progress(&mut self, cursor: f64, playing: bool) {
        self.cursor = cursor;
        self.playing = playing;
    }

    /// Cursor for a point on the track, `fraction` being 0 at the left end
    /// and 1 at the right end.
    pub fn position_to_cursor(fraction: f64) -> f64 {
        if fraction.is_nan() {
            return CURSOR_MIN;
        }
        (fraction * CURSOR_MAX).clamp(CURSOR_MIN, CURSOR_MAX)
    }

    /// Bucket under the handle at `cursor`.
    pub fn bucket_at(&self, cursor: f64) -> Option<&DayBucket> {
        let last = self.buckets.len().checked_sub(1)?;
        let index = (cursor.clamp(CURSOR_MIN, CURSOR_MAX) / CURSOR_MAX * last as f64).round();
        self.buckets.get(index as usize)
    }
}

impl Chart for TimeTrendChart {
    fn kind(&self) -> ChartKind {
        self.config.kind
    }

    fn update(&mut self, events: &[&PostEvent]) {
        self.buckets = daily_buckets(events);
        self.highlighted = None;
    }

    /// `label` is an ISO date (`2024-01-03`).
    fn highlight(&mut self, label: &str) {
        self.highlighted = Some(label.to_string());
    }

    fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    fn scene(&self) -> ChartScene {
        if self.buckets.is_empty() {
            return ChartScene::Empty {
                kind: self.config.kind,
                title: self.config.title.to_string(),
                message: self.config.empty_message.to_string(),
            };
        }

        let points = self
            .buckets
            .iter()
            .map(|b| {
                let date = b.date.to_string();
                let opacity = match &self.highlighted {
                    None => self.config.base_opacity,
                    Some(h) if *h == date => 1.0,
                    Some(_) => self.config.dim_opacity,
                };
                TrendPoint {
                    date: b.date,
                    count: b.count,
                    total_effect: b.total_effect,
                    opacity,
                    tooltip: format!(
                        "{date}\nPosts: {}\nTotal Effect: {:.2}",
                        b.count, b.total_effect
                    ),
                }
            })
            .collect();

        ChartScene::Trend {
            kind: self.config.kind,
            title: self.config.title.to_string(),
            color: self.config.color.to_string(),
            max_count: self.buckets.iter().map(|b| b.count).max().unwrap_or(0),
            points,
            scrub: ScrubControl {
                cursor: self.cursor,
                playing: self.playing,
                button: if self.playing { PAUSE_LABEL } else { PLAY_LABEL },
                hint: KEY_HINT,
            },
        }
    }
}
