//! Cross-chart highlighting of one post's categories.

use serde::Serialize;
use spread_data::{Dataset, Timeline};
use spread_model::{qualitative_summary, Dimension, PostEvent};

use crate::chart::{ChartKind, ChartSet};

/// One `highlight` call issued to a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightTarget {
    pub chart: ChartKind,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HighlightOutcome {
    Applied {
        post_id: String,
        topic_id: String,
        targets: Vec<HighlightTarget>,
        /// Short subject/nature phrase, when the post record is known.
        summary: Option<String>,
    },
    /// A topic is selected and the post belongs to another one.
    OutsideTopic {
        post_id: String,
        selected_topic: String,
    },
    UnknownPost {
        post_id: String,
    },
}

impl HighlightOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, HighlightOutcome::Applied { .. })
    }
}

/// Charts grouped by a classification label of the converted post.
const POST_DIMENSION_CHARTS: [(ChartKind, Dimension); 4] = [
    (ChartKind::ContentCategory, Dimension::InfoType),
    (ChartKind::EventSubject, Dimension::EventSubject),
    (ChartKind::PostStance, Dimension::PostStance),
    (ChartKind::Emotion, Dimension::Emotion),
];

/// Every chart/label pair `event` belongs to. Absent values produce no target.
pub fn highlight_targets(dataset: &Dataset, event: &PostEvent) -> Vec<HighlightTarget> {
    let mut targets = Vec::new();
    let mut push = |chart: ChartKind, label: Option<&str>| {
        if let Some(label) = label {
            targets.push(HighlightTarget {
                chart,
                label: label.to_string(),
            });
        }
    };

    push(ChartKind::PlatformShare, event.platform.as_deref());

    let converted = dataset.converted(&event.post_id);
    for (chart, dimension) in POST_DIMENSION_CHARTS {
        push(chart, converted.and_then(|p| p.label(dimension)));
    }

    let user = event.user_id.as_deref().and_then(|id| dataset.user(id));
    push(
        ChartKind::UserType,
        user.and_then(|u| u.identity_label.as_deref()),
    );
    push(ChartKind::Geography, user.and_then(|u| u.region.as_deref()));

    targets
}

/// Highlight `post_id` in every chart it has a category in.
///
/// No-op when `selected_topic` is set and the post is outside it.
pub fn highlight(
    dataset: &Dataset,
    timeline: &Timeline,
    selected_topic: Option<&str>,
    charts: &mut ChartSet,
    post_id: &str,
) -> HighlightOutcome {
    // A post shared by several topics resolves to its event in the selected one.
    let scoped = selected_topic.and_then(|topic| {
        timeline
            .events
            .iter()
            .find(|e| e.post_id == post_id && e.topic_id == topic)
    });
    let Some(event) = scoped.or_else(|| timeline.event(post_id)) else {
        return HighlightOutcome::UnknownPost {
            post_id: post_id.to_string(),
        };
    };

    if let Some(topic) = selected_topic {
        if event.topic_id != topic {
            return HighlightOutcome::OutsideTopic {
                post_id: post_id.to_string(),
                selected_topic: topic.to_string(),
            };
        }
    }

    let targets = highlight_targets(dataset, event);
    for target in &targets {
        if let Some(chart) = charts.get_mut(target.chart) {
            chart.highlight(&target.label);
        }
    }

    tracing::debug!(
        post = %post_id,
        topic = %event.topic_id,
        charts = targets.len(),
        "Post highlighted"
    );

    HighlightOutcome::Applied {
        post_id: post_id.to_string(),
        topic_id: event.topic_id.clone(),
        targets,
        summary: dataset.post(post_id).map(qualitative_summary),
    }
}
