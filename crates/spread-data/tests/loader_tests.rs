use std::time::Duration;

use spread_data::*;

const TOPICS: &str = r#"[
    {"话题编号": "T1", "路径": [
        {"帖文ID": "P1", "时间": "2024-01-01", "平台": "DY"},
        {"帖文ID": "P2", "时间": "2024-01-03", "平台": "XHS"}
    ]}
]"#;

const POSTS: &str = r#"[
    {"帖文ID": "P1", "平台": "DY", "情绪类型": "F3", "用户ID": "U1", "传播效果": 2},
    {"帖文ID": "P2", "平台": "XHS", "情绪类型": "F9", "用户ID": "U2", "传播效果": 1}
]"#;

const USERS: &str = "用户ID,身份标签,精准地域\nU1,媒体,北京\nU2,个人,上海\n";

fn fixture() -> StaticFetcher {
    let sources = SourceSet::default();
    StaticFetcher::new()
        .with(&sources.topics, TOPICS)
        .with(&sources.posts, POSTS)
        .with(&sources.users, USERS)
}

/// Never resolves, standing in for a hung fetch.
struct HangingFetcher;

impl Fetch for HangingFetcher {
    async fn fetch(&self, _location: &str) -> Result<String, LoadError> {
        std::future::pending::<()>().await;
        Ok(String::new())
    }
}

#[tokio::test]
async fn test_load_builds_all_indices() {
    let dataset = load(&fixture(), &SourceSet::default()).await.unwrap();
    assert_eq!(dataset.topics.len(), 1);
    assert_eq!(dataset.posts.len(), 2);
    assert_eq!(dataset.converted_posts.len(), 2);
    assert_eq!(dataset.users.len(), 2);
    assert_eq!(dataset.post_index.len(), 2);
    assert_eq!(dataset.converted_index.len(), 2);
    assert_eq!(dataset.user_index.len(), 2);

    let converted = dataset.converted("P1").unwrap();
    assert_eq!(converted.emotion.as_deref(), Some("愤怒"));
    assert_eq!(converted.platform.as_deref(), Some("抖音"));
    // Unmapped code is kept verbatim.
    assert_eq!(dataset.converted("P2").unwrap().emotion.as_deref(), Some("F9"));

    let user = dataset.user_for_post("P2").unwrap();
    assert_eq!(user.region.as_deref(), Some("上海"));
}

#[tokio::test]
async fn test_every_post_has_a_converted_twin() {
    let dataset = load(&fixture(), &SourceSet::default()).await.unwrap();
    for post in &dataset.posts {
        assert!(dataset.converted(&post.post_id).is_some());
    }
}

#[test]
fn test_duplicate_ids_last_write_wins() {
    let posts = vec![
        spread_model::RawPost {
            post_id: "P1".into(),
            platform: Some("DY".into()),
            ..Default::default()
        },
        spread_model::RawPost {
            post_id: "P1".into(),
            platform: Some("VX".into()),
            ..Default::default()
        },
    ];
    let dataset = Dataset::from_records(Vec::new(), posts, Vec::new());
    assert_eq!(dataset.posts.len(), 2);
    assert_eq!(dataset.post_index.len(), 1);
    assert_eq!(dataset.post("P1").unwrap().platform.as_deref(), Some("VX"));
    assert_eq!(dataset.converted("P1").unwrap().platform.as_deref(), Some("微信"));
}

#[tokio::test]
async fn test_missing_source_fails_whole_load() {
    let sources = SourceSet::default();
    let fetcher = StaticFetcher::new()
        .with(&sources.topics, TOPICS)
        .with(&sources.posts, POSTS);
    let err = load(&fetcher, &sources).await.unwrap_err();
    assert!(matches!(err, LoadError::Missing(ref name) if name == "user.csv"));
}

#[tokio::test]
async fn test_malformed_json_is_parse_error() {
    let sources = SourceSet::default();
    let fetcher = fixture().with(&sources.posts, "{not json");
    let err = load(&fetcher, &sources).await.unwrap_err();
    assert!(matches!(err, LoadError::Parse { ref location, .. } if location == "post.json"));
}

#[tokio::test]
async fn test_load_or_empty_degrades_to_no_data() {
    let dataset = load_or_empty(&StaticFetcher::new(), &SourceSet::default(), None).await;
    assert!(dataset.is_empty());
    assert!(dataset.post_index.is_empty());
    assert!(dataset.user_index.is_empty());
}

#[tokio::test]
async fn test_timeout_abandons_hung_load() {
    let err = load_with_timeout(
        &HangingFetcher,
        &SourceSet::default(),
        Some(Duration::from_millis(20)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LoadError::Timeout(_)));
}

#[tokio::test]
async fn test_fs_fetcher_reads_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let sources = SourceSet::default();
    std::fs::write(dir.path().join(&sources.topics), TOPICS).unwrap();
    std::fs::write(dir.path().join(&sources.posts), POSTS).unwrap();
    std::fs::write(dir.path().join(&sources.users), USERS).unwrap();

    let fetcher = FsFetcher::new(dir.path());
    let dataset = load(&fetcher, &sources).await.unwrap();
    assert_eq!(dataset.posts.len(), 2);
    assert_eq!(dataset.users.len(), 2);
}

#[tokio::test]
async fn test_fs_fetcher_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FsFetcher::new(dir.path()).fetch("absent.json").await.unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[tokio::test]
async fn test_byte_order_marks_are_ignored() {
    let sources = SourceSet::default();
    let fetcher = StaticFetcher::new()
        .with(&sources.topics, format!("\u{feff}{TOPICS}"))
        .with(&sources.posts, format!("\u{feff}{POSTS}"))
        .with(&sources.users, format!("\u{feff}{USERS}"));

    let dataset = load(&fetcher, &sources).await.unwrap();
    assert_eq!(dataset.topics.len(), 1);
    assert_eq!(dataset.posts.len(), 2);
    assert_eq!(dataset.users.len(), 2);
    assert_eq!(
        dataset.user_for_post("P1").and_then(|u| u.region.as_deref()),
        Some("北京")
    );
}

#[tokio::test]
async fn test_fs_fetcher_files_with_byte_order_marks() {
    let dir = tempfile::tempdir().unwrap();
    let sources = SourceSet::default();
    std::fs::write(dir.path().join(&sources.topics), TOPICS).unwrap();
    std::fs::write(dir.path().join(&sources.posts), format!("\u{feff}{POSTS}")).unwrap();
    std::fs::write(dir.path().join(&sources.users), format!("\u{feff}{USERS}")).unwrap();

    let dataset = load(&FsFetcher::new(dir.path()), &sources).await.unwrap();
    assert_eq!(dataset.posts.len(), 2);
    assert_eq!(dataset.users.len(), 2);
}
