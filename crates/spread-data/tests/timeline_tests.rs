use std::collections::HashMap;

use spread_data::*;
use spread_model::{parse_timestamp, PathEntry, RawPost, TimeRange, TopicPath};

fn entry(post_id: &str, time: &str) -> PathEntry {
    PathEntry {
        post_id: post_id.into(),
        time: time.into(),
        platform: None,
    }
}

fn post(post_id: &str, effect: f64, platform: &str) -> RawPost {
    RawPost {
        post_id: post_id.into(),
        platform: Some(platform.into()),
        user_id: Some(format!("U-{post_id}")),
        propagation_effect: Some(effect),
        ..Default::default()
    }
}

fn index(posts: Vec<RawPost>) -> HashMap<String, RawPost> {
    posts.into_iter().map(|p| (p.post_id.clone(), p)).collect()
}

#[test]
fn test_two_post_example() {
    let topics = vec![TopicPath {
        topic_id: "T1".into(),
        path: vec![entry("P1", "2024-01-01"), entry("P2", "2024-01-03")],
    }];
    let posts = index(vec![post("P1", 2.0, "DY"), post("P2", 1.0, "XHS")]);

    let timeline = process(&topics, &posts);
    let ids: Vec<&str> = timeline.events.iter().map(|e| e.post_id.as_str()).collect();
    assert_eq!(ids, vec!["P1", "P2"]);
    assert_eq!(
        timeline.range,
        TimeRange {
            start: parse_timestamp("2024-01-01").unwrap(),
            end: parse_timestamp("2024-01-03").unwrap(),
        }
    );
    assert_eq!(timeline.events[0].propagation_effect, 2.0);
    assert_eq!(timeline.events[0].platform.as_deref(), Some("DY"));
    assert_eq!(timeline.events[1].platform.as_deref(), Some("XHS"));
}

#[test]
fn test_missing_post_gets_defaults() {
    let topics = vec![TopicPath {
        topic_id: "T1".into(),
        path: vec![entry("GHOST", "2024-01-01")],
    }];
    let timeline = process(&topics, &HashMap::new());
    assert_eq!(timeline.events.len(), 1);
    let event = &timeline.events[0];
    assert_eq!(event.propagation_effect, DEFAULT_PROPAGATION_EFFECT);
    assert!(event.user_id.is_none());
    assert!(event.platform.is_none());
}

#[test]
fn test_zero_effect_falls_back_to_default() {
    let topics = vec![TopicPath {
        topic_id: "T1".into(),
        path: vec![entry("P1", "2024-01-01")],
    }];
    let timeline = process(&topics, &index(vec![post("P1", 0.0, "DY")]));
    assert_eq!(timeline.events[0].propagation_effect, 1.0);
}

#[test]
fn test_path_platform_wins_over_post_platform() {
    let topics = vec![TopicPath {
        topic_id: "T1".into(),
        path: vec![PathEntry {
            post_id: "P1".into(),
            time: "2024-01-01".into(),
            platform: Some("JRTT".into()),
        }],
    }];
    let timeline = process(&topics, &index(vec![post("P1", 1.0, "DY")]));
    assert_eq!(timeline.events[0].platform.as_deref(), Some("JRTT"));
}

#[test]
fn test_sort_is_stable_across_topics() {
    let topics = vec![
        TopicPath {
            topic_id: "A".into(),
            path: vec![entry("A0", "2024-01-02"), entry("A1", "2024-01-05")],
        },
        TopicPath {
            topic_id: "B".into(),
            path: vec![entry("B0", "2024-01-02"), entry("B1", "2024-01-01")],
        },
    ];
    let timeline = process(&topics, &HashMap::new());
    let ids: Vec<&str> = timeline.events.iter().map(|e| e.post_id.as_str()).collect();
    assert_eq!(ids, vec!["B1", "A0", "B0", "A1"]);
    assert_eq!(timeline.events[1].index, 0);
    assert_eq!(timeline.events[0].index, 1);
}

#[test]
fn test_empty_topics_use_sentinel_range() {
    let timeline = process(&[], &HashMap::new());
    assert!(timeline.is_empty());
    assert_eq!(timeline.range, TimeRange { start: 0, end: 100 });
}

#[test]
fn test_unreadable_time_is_dropped() {
    let topics = vec![TopicPath {
        topic_id: "T1".into(),
        path: vec![entry("P1", "not a date"), entry("P2", "2024-01-01")],
    }];
    let timeline = process(&topics, &HashMap::new());
    assert_eq!(timeline.events.len(), 1);
    assert_eq!(timeline.events[0].post_id, "P2");
    assert_eq!(timeline.events[0].index, 1);
}

#[test]
fn test_topic_timelines_total_effect() {
    let topics = vec![
        TopicPath {
            topic_id: "T1".into(),
            path: vec![entry("P1", "2024-01-01"), entry("P2", "2024-01-02")],
        },
        TopicPath {
            topic_id: "T2".into(),
            path: vec![entry("P3", "2024-01-01")],
        },
    ];
    let posts = index(vec![post("P1", 2.0, "DY"), post("P2", 3.5, "DY")]);
    let timeline = process(&topics, &posts);
    assert_eq!(timeline.topics.len(), 2);
    assert_eq!(timeline.topic("T1").unwrap().total_effect, 5.5);
    assert_eq!(timeline.topic("T2").unwrap().total_effect, 1.0);
    assert_eq!(timeline.event("P3").unwrap().topic_id, "T2");
}

#[test]
fn test_from_dataset_uses_post_index() {
    let dataset = Dataset::from_records(
        vec![TopicPath {
            topic_id: "T1".into(),
            path: vec![entry("P1", "2024-01-01")],
        }],
        vec![post("P1", 4.0, "VX")],
        Vec::new(),
    );
    let timeline = Timeline::from_dataset(&dataset);
    assert_eq!(timeline.events[0].propagation_effect, 4.0);
    assert_eq!(timeline.events[0].user_id.as_deref(), Some("U-P1"));
}
