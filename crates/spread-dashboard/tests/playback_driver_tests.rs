//! Playback driver against real time with a short sweep.

use std::sync::Arc;
use std::time::Duration;

use spread_dashboard::{PlaybackDriver, SharedDashboard};
use spread_data::Dataset;
use spread_model::{PathEntry, TopicPath};
use spread_view::{Dashboard, DashboardOptions};
use tokio::sync::RwLock;

fn dashboard() -> SharedDashboard {
    let dataset = Dataset::from_records(
        vec![TopicPath {
            topic_id: "T1".to_string(),
            path: vec![
                PathEntry {
                    post_id: "P1".to_string(),
                    time: "2024-06-01".to_string(),
                    platform: Some("DY".to_string()),
                },
                PathEntry {
                    post_id: "P2".to_string(),
                    time: "2024-06-10".to_string(),
                    platform: Some("DY".to_string()),
                },
            ],
        }],
        Vec::new(),
        Vec::new(),
    );
    Arc::new(RwLock::new(Dashboard::new(
        Arc::new(dataset),
        DashboardOptions {
            sweep: Duration::from_millis(400),
            step: 5.0,
        },
    )))
}

#[tokio::test]
async fn test_driver_advances_cursor_while_playing() {
    let dashboard = dashboard();
    tokio::spawn(PlaybackDriver::new(dashboard.clone(), Duration::from_millis(10)).run());

    assert!(dashboard.write().await.toggle_playback());
    tokio::time::sleep(Duration::from_millis(150)).await;

    let cursor = dashboard.read().await.state().cursor();
    assert!(cursor > 0.0, "cursor should advance, got {cursor}");
}

#[tokio::test]
async fn test_driver_idles_after_pause() {
    let dashboard = dashboard();
    tokio::spawn(PlaybackDriver::new(dashboard.clone(), Duration::from_millis(10)).run());

    dashboard.write().await.toggle_playback();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(!dashboard.write().await.toggle_playback());

    let paused_at = dashboard.read().await.state().cursor();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(dashboard.read().await.state().cursor(), paused_at);
}

#[tokio::test]
async fn test_driver_resumes_after_seek() {
    let dashboard = dashboard();
    tokio::spawn(PlaybackDriver::new(dashboard.clone(), Duration::from_millis(10)).run());

    dashboard.write().await.set_cursor(40.0);
    dashboard.write().await.toggle_playback();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let cursor = dashboard.read().await.state().cursor();
    assert!(cursor > 40.0, "cursor should advance from 40, got {cursor}");
    assert!(dashboard.read().await.is_playing());
}
