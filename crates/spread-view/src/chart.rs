//! Chart capability, per-chart configuration and renderable scenes.
//!
//! Every chart is driven through the same [`Chart`] trait. What differs between
//! the eight dashboard charts lives in [`ChartConfig`]: how events are grouped,
//! the shape drawn and the opacities used for highlighting.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use spread_data::Dataset;
use spread_model::{Dimension, PostEvent};

use crate::{CategoryChart, TimeTrendChart, ViewError};

/// Category used when an event has no value for a chart's dimension.
pub const UNKNOWN_LABEL: &str = "Unknown";

pub const BAR_COLOR: &str = "#709AD2";
pub const TREND_COLOR: &str = "#A29C92";
pub const HIGHLIGHT_STROKE_COLOR: &str = "#4a90e2";
pub const WEDGE_STROKE_COLOR: &str = "white";
pub const FALLBACK_PLATFORM_COLOR: &str = "#ccc";

const PLATFORM_COLORS: &[(&str, &str)] = &[
    ("DY", "#AC6158"),
    ("XHS", "#3E5555"),
    ("WYXW", "#C3AB32"),
    ("JRTT", "#AD748C"),
    ("VX", "#E17D66"),
    ("P_0", "#4A90E2"),
    ("P_1", "#C3AB32"),
    ("P_2", "#AC6158"),
    ("P_3", "#AD748C"),
    ("P_4", "#3E5555"),
    ("P_5", "#FF6B35"),
    ("微博", "#4A90E2"),
    ("微信", "#FF6B35"),
    ("抖音", "#AC6158"),
    ("今日头条", "#AD748C"),
    ("小红书", "#3E5555"),
    ("网易新闻", "#C3AB32"),
];

/// Alternating wedge fills for charts without a fixed palette.
const ALTERNATING_PALETTE: &[&str] = &["#709AD2", "#C6B79A"];

/// Display color for a raw platform code.
pub fn platform_color(code: &str) -> &'static str {
    PLATFORM_COLORS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_PLATFORM_COLOR)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    PlatformShare,
    TimeTrend,
    ContentCategory,
    EventSubject,
    PostStance,
    Emotion,
    UserType,
    Geography,
}

impl ChartKind {
    pub const ALL: [ChartKind; 8] = [
        ChartKind::PlatformShare,
        ChartKind::TimeTrend,
        ChartKind::ContentCategory,
        ChartKind::EventSubject,
        ChartKind::PostStance,
        ChartKind::Emotion,
        ChartKind::UserType,
        ChartKind::Geography,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::PlatformShare => "platform_share",
            ChartKind::TimeTrend => "time_trend",
            ChartKind::ContentCategory => "content_category",
            ChartKind::EventSubject => "event_subject",
            ChartKind::PostStance => "post_stance",
            ChartKind::Emotion => "emotion",
            ChartKind::UserType => "user_type",
            ChartKind::Geography => "geography",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        ChartKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| ViewError::UnknownChart(s.to_string()))
    }
}

/// What an event is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// The event's raw platform code.
    Platform,
    /// A classification label of the event's converted post.
    Post(Dimension),
    /// Identity label of the post's user. Events without a user are skipped.
    UserIdentity,
    /// Region of the post's user. Events without a user are skipped.
    UserRegion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartShape {
    Bars,
    Wedges,
}

/// How a category chart counts and draws its events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryLayout {
    pub key: GroupKey,
    pub shape: ChartShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WedgePalette {
    /// Fill by platform color.
    Platform,
    /// Alternate between two fills.
    Alternating,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: &str, width: f64) -> Self {
        Self {
            color: color.to_string(),
            width,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub title: &'static str,
    /// `None` for the time trend, which buckets by day.
    pub layout: Option<CategoryLayout>,
    /// Opacity of every mark when nothing is highlighted.
    pub base_opacity: f64,
    /// Opacity of non-matching marks while a category is highlighted.
    pub dim_opacity: f64,
    /// Stroke width of the highlighted mark.
    pub highlight_stroke_width: f64,
    pub color: &'static str,
    pub palette: WedgePalette,
    pub value_axis: &'static str,
    pub empty_message: &'static str,
}

impl ChartConfig {
    fn bars(kind: ChartKind, title: &'static str, key: GroupKey, empty: &'static str) -> Self {
        Self {
            kind,
            title,
            layout: Some(CategoryLayout {
                key,
                shape: ChartShape::Bars,
            }),
            base_opacity: 1.0,
            dim_opacity: 0.3,
            highlight_stroke_width: 3.0,
            color: BAR_COLOR,
            palette: WedgePalette::Alternating,
            value_axis: "帖子数量",
            empty_message: empty,
        }
    }

    fn wedges(
        kind: ChartKind,
        title: &'static str,
        key: GroupKey,
        palette: WedgePalette,
        empty: &'static str,
    ) -> Self {
        Self {
            kind,
            title,
            layout: Some(CategoryLayout {
                key,
                shape: ChartShape::Wedges,
            }),
            base_opacity: 1.0,
            dim_opacity: 0.3,
            highlight_stroke_width: 4.0,
            color: BAR_COLOR,
            palette,
            value_axis: "帖子数",
            empty_message: empty,
        }
    }

    /// The dashboard's configuration for `kind`.
    pub fn for_kind(kind: ChartKind) -> Self {
        match kind {
            ChartKind::PlatformShare => Self::wedges(
                kind,
                "平台分布",
                GroupKey::Platform,
                WedgePalette::Platform,
                "No platform data available",
            ),
            ChartKind::TimeTrend => Self {
                kind,
                title: "时间趋势",
                layout: None,
                base_opacity: 1.0,
                dim_opacity: 0.3,
                highlight_stroke_width: 3.0,
                color: TREND_COLOR,
                palette: WedgePalette::Alternating,
                value_axis: "帖子数量",
                empty_message: "No trend data available",
            },
            ChartKind::ContentCategory => Self::bars(
                kind,
                "内容分类",
                GroupKey::Post(Dimension::InfoType),
                "No content data available",
            ),
            ChartKind::EventSubject => Self::bars(
                kind,
                "事件主体",
                GroupKey::Post(Dimension::EventSubject),
                "No subject data available",
            ),
            ChartKind::PostStance => Self::bars(
                kind,
                "帖子立场",
                GroupKey::Post(Dimension::PostStance),
                "No stance data available",
            ),
            ChartKind::Emotion => Self::bars(
                kind,
                "情绪类型",
                GroupKey::Post(Dimension::Emotion),
                "No emotion data available",
            ),
            ChartKind::UserType => Self {
                value_axis: "Users",
                ..Self::wedges(
                    kind,
                    "用户类型",
                    GroupKey::UserIdentity,
                    WedgePalette::Alternating,
                    "No user data available",
                )
            },
            ChartKind::Geography => Self {
                base_opacity: 0.8,
                value_axis: "用户数量",
                ..Self::bars(
                    kind,
                    "地理分布",
                    GroupKey::UserRegion,
                    "No geographic data available",
                )
            },
        }
    }

    /// Fill for the `index`-th wedge labelled `label`.
    pub fn wedge_color(&self, index: usize, label: &str) -> String {
        match self.palette {
            WedgePalette::Platform => platform_color(label).to_string(),
            WedgePalette::Alternating => {
                ALTERNATING_PALETTE[index % ALTERNATING_PALETTE.len()].to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarMark {
    pub label: String,
    pub value: usize,
    pub color: String,
    pub opacity: f64,
    pub stroke: Option<Stroke>,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WedgeMark {
    pub label: String,
    pub value: usize,
    /// Radians, clockwise from 12 o'clock.
    pub start_angle: f64,
    pub end_angle: f64,
    pub percentage: f64,
    pub color: String,
    pub opacity: f64,
    pub stroke: Stroke,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: usize,
    pub total_effect: f64,
    pub opacity: f64,
    pub tooltip: String,
}

/// Scrub control of the time trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrubControl {
    /// 0-100.
    pub cursor: f64,
    pub playing: bool,
    /// Label of the play button.
    pub button: &'static str,
    pub hint: &'static str,
}

/// Declarative output of one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ChartScene {
    Empty {
        kind: ChartKind,
        title: String,
        message: String,
    },
    Bars {
        kind: ChartKind,
        title: String,
        value_axis: String,
        max_value: usize,
        bars: Vec<BarMark>,
    },
    Wedges {
        kind: ChartKind,
        title: String,
        total: usize,
        wedges: Vec<WedgeMark>,
    },
    Trend {
        kind: ChartKind,
        title: String,
        color: String,
        max_count: usize,
        points: Vec<TrendPoint>,
        scrub: ScrubControl,
    },
}

impl ChartScene {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartScene::Empty { kind, .. }
            | ChartScene::Bars { kind, .. }
            | ChartScene::Wedges { kind, .. }
            | ChartScene::Trend { kind, .. } => *kind,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChartScene::Empty { .. })
    }
}

/// Common capability of every dashboard chart.
pub trait Chart: Send + Sync {
    fn kind(&self) -> ChartKind;

    /// Re-derive the aggregation from scratch. Clears any highlight.
    fn update(&mut self, events: &[&PostEvent]);

    /// Emphasize the mark labelled `label` and dim the rest.
    fn highlight(&mut self, label: &str);

    fn clear_highlight(&mut self);

    fn highlighted(&self) -> Option<&str>;

    fn scene(&self) -> ChartScene;
}

/// The eight charts of the dashboard.
pub struct ChartSet {
    categories: Vec<CategoryChart>,
    trend: TimeTrendChart,
}

impl ChartSet {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let categories = ChartKind::ALL
            .into_iter()
            .filter_map(|k| CategoryChart::new(ChartConfig::for_kind(k), Arc::clone(&dataset)))
            .collect();
        Self {
            categories,
            trend: TimeTrendChart::new(ChartConfig::for_kind(ChartKind::TimeTrend)),
        }
    }

    /// Redraw every chart. The trend always shows the full timeline.
    pub fn update(&mut self, visible: &[&PostEvent], all: &[&PostEvent]) {
        for chart in &mut self.categories {
            chart.update(visible);
        }
        self.trend.update(all);
    }

    pub fn trend(&self) -> &TimeTrendChart {
        &self.trend
    }

    pub fn trend_mut(&mut self) -> &mut TimeTrendChart {
        &mut self.trend
    }

    pub fn category(&self, kind: ChartKind) -> Option<&CategoryChart> {
        self.categories.iter().find(|c| c.kind() == kind)
    }

    pub fn get(&self, kind: ChartKind) -> Option<&dyn Chart> {
        if kind == ChartKind::TimeTrend {
            return Some(&self.trend as &dyn Chart);
        }
        self.categories
            .iter()
            .find(|c| c.kind() == kind)
            .map(|c| c as &dyn Chart)
    }

    pub fn get_mut(&mut self, kind: ChartKind) -> Option<&mut dyn Chart> {
        if kind == ChartKind::TimeTrend {
            return Some(&mut self.trend as &mut dyn Chart);
        }
        self.categories
            .iter_mut()
            .find(|c| c.kind() == kind)
            .map(|c| c as &mut dyn Chart)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Chart> {
        ChartKind::ALL.into_iter().filter_map(|k| self.get(k))
    }

    pub fn clear_highlights(&mut self) {
        for chart in &mut self.categories {
            chart.clear_highlight();
        }
        self.trend.clear_highlight();
    }

    pub fn scenes(&self) -> Vec<ChartScene> {
        self.iter().map(|c| c.scene()).collect()
    }
}
