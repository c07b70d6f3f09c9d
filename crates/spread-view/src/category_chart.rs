use std::f64::consts::TAU;
use std::sync::Arc;

use spread_data::Dataset;
use spread_model::{PostEvent, User};

use crate::aggregate::{group_counts, CategoryCount};
use crate::chart::{
    BarMark, CategoryLayout, Chart, ChartConfig, ChartKind, ChartScene, ChartShape, GroupKey, Stroke,
    WedgeMark,
    HIGHLIGHT_STROKE_COLOR, UNKNOWN_LABEL, WEDGE_STROKE_COLOR,
};

const WEDGE_STROKE_WIDTH: f64 = 2.0;

/// Count-per-category chart drawn as bars or wedges.
pub struct CategoryChart {
    config: ChartConfig,
    layout: CategoryLayout,
    dataset: Arc<Dataset>,
    counts: Vec<CategoryCount>,
    total: usize,
    highlighted: Option<String>,
}

impl CategoryChart {
    /// `None` when `config` has no category layout.
    pub fn new(config: ChartConfig, dataset: Arc<Dataset>) -> Option<Self> {
        let layout = config.layout?;
        Some(Self {
            config,
            layout,
            dataset,
            counts: Vec::new(),
            total: 0,
            highlighted: None,
        })
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Categories from the last update, largest first.
    pub fn counts(&self) -> &[CategoryCount] {
        &self.counts
    }

    /// Events counted by the last update.
    pub fn total(&self) -> usize {
        self.total
    }

    fn user(&self, event: &PostEvent) -> Option<&User> {
        event.user_id.as_deref().and_then(|id| self.dataset.user(id))
    }

    /// Category of `event`, or `None` when this chart skips it.
    fn label_for(&self, event: &PostEvent) -> Option<String> {
        let label = match self.layout.key {
            GroupKey::Platform => event.platform.clone(),
            GroupKey::Post(dimension) => self
                .dataset
                .converted(&event.post_id)
                .and_then(|post| post.label(dimension))
                .map(str::to_string),
            GroupKey::UserIdentity => self.user(event)?.identity_label.clone(),
            GroupKey::UserRegion => self.user(event)?.region.clone(),
        };
        Some(label.unwrap_or_else(|| UNKNOWN_LABEL.to_string()))
    }

    fn is_highlighted(&self, label: &str) -> bool {
        self.highlighted.as_deref() == Some(label)
    }

    fn mark_opacity(&self, label: &str) -> f64 {
        match &self.highlighted {
            None => self.config.base_opacity,
            Some(h) if h == label => 1.0,
            Some(_) => self.config.dim_opacity,
        }
    }

    fn bar_tooltip(&self, count: &CategoryCount) -> String {
        let platforms = count
            .by_platform
            .iter()
            .map(|(platform, n)| format!("{platform}: {n}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{}\n{}: {}\nPlatforms: {}",
            count.label, self.config.value_axis, count.count, platforms
        )
    }

    fn bars(&self) -> ChartScene {
        let bars = self
            .counts
            .iter()
            .map(|c| BarMark {
                label: c.label.clone(),
                value: c.count,
                color: self.config.color.to_string(),
                opacity: self.mark_opacity(&c.label),
                stroke: self.is_highlighted(&c.label).then(|| {
                    Stroke::new(HIGHLIGHT_STROKE_COLOR, self.config.highlight_stroke_width)
                }),
                tooltip: self.bar_tooltip(c),
            })
            .collect();
        ChartScene::Bars {
            kind: self.config.kind,
            title: self.config.title.to_string(),
            value_axis: self.config.value_axis.to_string(),
            max_value: self.counts.first().map_or(0, |c| c.count),
            bars,
        }
    }

    fn wedges(&self) -> ChartScene {
        let sum: usize = self.counts.iter().map(|c| c.count).sum();
        let mut angle = 0.0;
        let wedges = self
            .counts
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let share = c.count as f64 / sum as f64;
                let start_angle = angle;
                angle += share * TAU;
                let percentage = share * 100.0;
                let stroke_width = if self.is_highlighted(&c.label) {
                    self.config.highlight_stroke_width
                } else {
                    WEDGE_STROKE_WIDTH
                };
                WedgeMark {
                    label: c.label.clone(),
                    value: c.count,
                    start_angle,
                    end_angle: angle,
                    percentage,
                    color: self.config.wedge_color(i, &c.label),
                    opacity: self.mark_opacity(&c.label),
                    stroke: Stroke::new(WEDGE_STROKE_COLOR, stroke_width),
                    tooltip: format!(
                        "{}\n{}: {}\nPercentage: {:.1}%",
                        c.label, self.config.value_axis, c.count, percentage
                    ),
                }
            })
            .collect();
        ChartScene::Wedges {
            kind: self.config.kind,
            title: self.config.title.to_string(),
            total: sum,
            wedges,
        }
    }
}

impl Chart for CategoryChart {
    fn kind(&self) -> ChartKind {
        self.config.kind
    }

    fn update(&mut self, events: &[&PostEvent]) {
        let items: Vec<(String, Option<String>)> = events
            .iter()
            .filter_map(|e| self.label_for(e).map(|label| (label, e.platform.clone())))
            .collect();
        self.total = items.len();
        self.counts = group_counts(items, UNKNOWN_LABEL);
        self.highlighted = None;
        tracing::trace!(
            chart = %self.config.kind,
            events = events.len(),
            counted = self.total,
            categories = self.counts.len(),
            "Chart updated"
        );
    }

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
        if self.counts.is_empty() {
            return ChartScene::Empty {
                kind: self.config.kind,
                title: self.config.title.to_string(),
                message: self.config.empty_message.to_string(),
            };
        }
        match self.layout.shape {
            ChartShape::Wedges => self.wedges(),
            ChartShape::Bars => self.bars(),
        }
    }
}
