//! Flattening topic paths into one time-ordered event sequence.

use std::collections::HashMap;

use serde::Serialize;
use spread_model::{parse_timestamp, PostEvent, RawPost, TimeRange, TopicPath};

use crate::Dataset;

/// Effect used when a path entry's post is unknown or carries no effect.
pub const DEFAULT_PROPAGATION_EFFECT: f64 = 1.0;

/// One topic's events in path order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicTimeline {
    pub topic_id: String,
    pub events: Vec<PostEvent>,
    pub total_effect: f64,
}

/// All events across topics, ascending by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeline {
    pub events: Vec<PostEvent>,
    pub range: TimeRange,
    pub topics: Vec<TopicTimeline>,
}

impl Timeline {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        process(&dataset.topics, &dataset.post_index)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// First event (in time order) for `post_id`.
    pub fn event(&self, post_id: &str) -> Option<&PostEvent> {
        self.events.iter().find(|e| e.post_id == post_id)
    }

    pub fn topic(&self, topic_id: &str) -> Option<&TopicTimeline> {
        self.topics.iter().find(|t| t.topic_id == topic_id)
    }
}

/// Join every path entry to its post and order the result by time.
///
/// Entries whose post is not indexed still produce an event, with the default
/// effect and no owning user. Entries with an unreadable time are dropped.
/// The sort is stable, so equal timestamps keep topic-then-path order.
pub fn process(topics: &[TopicPath], post_index: &HashMap<String, RawPost>) -> Timeline {
    let mut events = Vec::new();
    let mut topic_timelines = Vec::with_capacity(topics.len());

    for topic in topics {
        let mut topic_events = Vec::with_capacity(topic.path.len());
        for (index, entry) in topic.path.iter().enumerate() {
            let Some(timestamp) = parse_timestamp(&entry.time) else {
                tracing::warn!(
                    topic = %topic.topic_id,
                    post = %entry.post_id,
                    time = %entry.time,
                    "Dropping path entry with unreadable time"
                );
                continue;
            };
            let post = post_index.get(&entry.post_id);
            topic_events.push(PostEvent {
                post_id: entry.post_id.clone(),
                topic_id: topic.topic_id.clone(),
                index,
                timestamp,
                platform: entry
                    .platform
                    .clone()
                    .or_else(|| post.and_then(|p| p.platform.clone())),
                propagation_effect: post
                    .and_then(|p| p.propagation_effect)
                    .filter(|effect| *effect != 0.0 && !effect.is_nan())
                    .unwrap_or(DEFAULT_PROPAGATION_EFFECT),
                user_id: post.and_then(|p| p.user_id.clone()),
            });
        }

        events.extend(topic_events.iter().cloned());
        topic_timelines.push(TopicTimeline {
            topic_id: topic.topic_id.clone(),
            total_effect: topic_events.iter().map(|e| e.propagation_effect).sum(),
            events: topic_events,
        });
    }

    events.sort_by_key(|e| e.timestamp);

    let range = match (events.first(), events.last()) {
        (Some(first), Some(last)) => TimeRange {
            start: first.timestamp,
            end: last.timestamp,
        },
        _ => TimeRange::default(),
    };

    tracing::debug!(
        events = events.len(),
        topics = topic_timelines.len(),
        start = range.start,
        end = range.end,
        "Timeline processed"
    );

    Timeline {
        events,
        range,
        topics: topic_timelines,
    }
}
