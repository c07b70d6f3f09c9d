#![allow(dead_code)]

use std::sync::Arc;

use spread_data::Dataset;
use spread_model::{parse_csv, parse_timestamp, RawPost, TopicPath, User};

pub const TOPICS: &str = r#"[
    {"话题编号": "T1", "路径": [
        {"帖文ID": "P1", "时间": "2024-01-01"},
        {"帖文ID": "P2", "时间": "2024-01-03"},
        {"帖文ID": "P3", "时间": "2024-01-05"}
    ]},
    {"话题编号": "T2", "路径": [
        {"帖文ID": "P4", "时间": "2024-01-02"},
        {"帖文ID": "P5", "时间": "2024-01-05", "平台": "XHS"}
    ]}
]"#;

pub const POSTS: &str = r#"[
    {"帖文ID": "P1", "平台": "DY", "事件主体": "A", "帖文立场": "A", "信息类型": "B",
     "情绪类型": "F3", "用户ID": "U1", "传播效果": 2},
    {"帖文ID": "P2", "平台": "XHS", "事件主体": "B", "帖文立场": "C", "信息类型": "A",
     "情绪类型": "F3", "用户ID": "U2", "传播效果": 1},
    {"帖文ID": "P3", "平台": "DY", "事件主体": "A", "帖文立场": "A", "信息类型": "B",
     "情绪类型": "F1", "用户ID": "U3", "传播效果": 3},
    {"帖文ID": "P4", "平台": "VX", "事件主体": "D", "信息类型": "B",
     "情绪类型": "F2", "用户ID": "U1", "传播效果": 5}
]"#;

pub const USERS: &str = "用户ID,身份标签,精准地域\nU1,媒体,北京\nU2,个人,上海\n";

/// Five events over 2024-01-01..=2024-01-05 across two topics.
///
/// Time order: P1, P4, P2, P3, P5. P3's user is not in the user table and P5
/// has no post record.
pub fn dataset() -> Dataset {
    let topics: Vec<TopicPath> = serde_json::from_str(TOPICS).unwrap();
    let posts: Vec<RawPost> = serde_json::from_str(POSTS).unwrap();
    let users: Vec<User> = parse_csv(USERS).iter().filter_map(User::from_row).collect();
    Dataset::from_records(topics, posts, users)
}

pub fn shared() -> Arc<Dataset> {
    Arc::new(dataset())
}

/// Cursor at which the visible set ends on `date`.
pub fn cursor_at(date: &str) -> f64 {
    let start = parse_timestamp("2024-01-01").unwrap() as f64;
    let end = parse_timestamp("2024-01-05").unwrap() as f64;
    (parse_timestamp(date).unwrap() as f64 - start) / (end - start) * 100.0
}
