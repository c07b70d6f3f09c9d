use spread_model::*;

#[test]
fn test_raw_post_from_source_keys() {
    let json = r#"{
        "帖文ID": 101,
        "平台": "DY",
        "事件主体": "A",
        "事件范围": ["A", "B"],
        "情绪类型": "F2",
        "用户ID": 5001,
        "传播效果": 2.5,
        "标题": "ignored"
    }"#;
    let post: RawPost = serde_json::from_str(json).unwrap();
    assert_eq!(post.post_id, "101");
    assert_eq!(post.platform.as_deref(), Some("DY"));
    assert_eq!(post.event_scope, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(post.user_id.as_deref(), Some("5001"));
    assert_eq!(post.propagation_effect, Some(2.5));
    assert!(post.stance.is_none());
}

#[test]
fn test_raw_post_from_english_aliases() {
    let json = r#"{"post_id": "P1", "platform": "XHS", "propagation_effect": "4", "user_id": ""}"#;
    let post: RawPost = serde_json::from_str(json).unwrap();
    assert_eq!(post.post_id, "P1");
    assert_eq!(post.propagation_effect, Some(4.0));
    assert!(post.user_id.is_none(), "empty user id is treated as missing");
}

#[test]
fn test_raw_post_requires_id() {
    let json = r#"{"平台": "DY"}"#;
    assert!(serde_json::from_str::<RawPost>(json).is_err());
}

#[test]
fn test_topic_path_deserializes() {
    let json = r#"[{"话题编号": 3, "路径": [
        {"帖文ID": "P1", "时间": "2024-01-01", "平台": "DY"},
        {"帖文ID": "P2", "时间": "2024-01-03 08:30:00"}
    ]}]"#;
    let topics: Vec<TopicPath> = serde_json::from_str(json).unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].topic_id, "3");
    assert_eq!(topics[0].path.len(), 2);
    assert_eq!(topics[0].path[0].platform.as_deref(), Some("DY"));
    assert!(topics[0].path[1].platform.is_none());
}

#[test]
fn test_user_from_row() {
    let rows = parse_csv("用户ID,身份标签,精准地域\nU1,媒体,\n,个人,上海");
    let users: Vec<User> = rows.iter().filter_map(User::from_row).collect();
    assert_eq!(users.len(), 1, "rows without an id are skipped");
    assert_eq!(users[0].user_id, "U1");
    assert_eq!(users[0].identity_label.as_deref(), Some("媒体"));
    assert!(users[0].region.is_none());
}

#[test]
fn test_parse_timestamp_formats() {
    let day = parse_timestamp("2024-01-01").unwrap();
    assert_eq!(day, 1_704_067_200_000);
    assert_eq!(parse_timestamp("2024/01/01"), Some(day));
    assert_eq!(parse_timestamp("2024-01-01 00:00:00"), Some(day));
    assert_eq!(parse_timestamp("2024-01-01T00:00:00"), Some(day));
    assert_eq!(parse_timestamp("2024-01-01T08:00:00+08:00"), Some(day));
    assert_eq!(parse_timestamp("2024-01-01 01:30"), Some(day + 90 * 60 * 1000));
    assert_eq!(parse_timestamp("1704067200000"), Some(day));
}

#[test]
fn test_parse_timestamp_rejects_garbage() {
    assert_eq!(parse_timestamp(""), None);
    assert_eq!(parse_timestamp("yesterday"), None);
    assert_eq!(parse_timestamp("2024-13-45"), None);
}

#[test]
fn test_parse_timestamp_short_digit_runs() {
    assert_eq!(parse_timestamp("2024"), parse_timestamp("2024-01-01"));
    assert_eq!(parse_timestamp(" 1999 "), parse_timestamp("1999-01-01"));
    assert_eq!(parse_timestamp("42"), None);
    assert_eq!(parse_timestamp("20240501"), None);
    assert_eq!(parse_timestamp("1000000000"), Some(1_000_000_000));
}

#[test]
fn test_time_range_cursor_mapping() {
    let range = TimeRange { start: 1_000, end: 3_000 };
    assert_eq!(range.absolute_time(0.0), 1_000.0);
    assert_eq!(range.absolute_time(50.0), 2_000.0);
    assert_eq!(range.absolute_time(100.0), 3_000.0);
    assert_eq!(TimeRange::default(), EMPTY_TIME_RANGE);
    assert_eq!(EMPTY_TIME_RANGE.span_ms(), 100);
}

#[test]
fn test_post_event_date() {
    let event = PostEvent {
        post_id: "P1".into(),
        topic_id: "T1".into(),
        index: 0,
        timestamp: parse_timestamp("2024-02-29 23:59:59").unwrap(),
        platform: None,
        propagation_effect: 1.0,
        user_id: None,
    };
    assert_eq!(
        event.date(),
        chrono::NaiveDate::from_ymd_opt(2024, 2, 29)
    );
}
