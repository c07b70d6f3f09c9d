//! HTTP API tests against a server bound to an ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::StreamExt;
use serde_json::{json, Value};
use spread_dashboard::{SharedDashboard, WebServer};
use spread_data::Dataset;
use spread_model::{PathEntry, RawPost, TopicPath, User};
use spread_view::{Dashboard, DashboardOptions};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

fn entry(post_id: &str, time: &str) -> PathEntry {
    PathEntry {
        post_id: post_id.to_string(),
        time: time.to_string(),
        platform: None,
    }
}

fn post(post_id: &str, platform: &str, user: &str) -> RawPost {
    RawPost {
        post_id: post_id.to_string(),
        platform: Some(platform.to_string()),
        event_subject: Some("A".to_string()),
        emotion: Some("F1".to_string()),
        user_id: Some(user.to_string()),
        propagation_effect: Some(3.0),
        ..Default::default()
    }
}

fn dataset() -> Dataset {
    Dataset::from_records(
        vec![
            TopicPath {
                topic_id: "T1".to_string(),
                path: vec![entry("P1", "2024-05-01"), entry("P2", "2024-05-03")],
            },
            TopicPath {
                topic_id: "T2".to_string(),
                path: vec![entry("P3", "2024-05-05")],
            },
        ],
        vec![
            post("P1", "DY", "U1"),
            post("P2", "WB", "U1"),
            post("P3", "DY", "U1"),
        ],
        vec![User {
            user_id: "U1".to_string(),
            identity_label: Some("个人".to_string()),
            region: Some("深圳".to_string()),
        }],
    )
}

struct TestServer {
    addr: SocketAddr,
    dashboard: SharedDashboard,
    client: reqwest::Client,
    _web_root: tempfile::TempDir,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.expect("request");
        read_json(resp).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> (u16, Value) {
        let mut req = self.client.post(self.url(path));
        if let Some(body) = body {
            req = req.json(&body);
        }
        read_json(req.send().await.expect("request")).await
    }

    async fn delete(&self, path: &str) -> (u16, Value) {
        let resp = self.client.delete(self.url(path)).send().await.expect("request");
        read_json(resp).await
    }
}

async fn read_json(resp: reqwest::Response) -> (u16, Value) {
    let status = resp.status().as_u16();
    (status, resp.json().await.expect("json body"))
}

async fn start() -> TestServer {
    let web_root = tempfile::tempdir().expect("temp dir");
    std::fs::write(web_root.path().join("index.html"), "<html>dashboard</html>")
        .expect("write index");

    let dashboard: SharedDashboard = Arc::new(RwLock::new(Dashboard::new(
        Arc::new(dataset()),
        DashboardOptions::default(),
    )));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let server = WebServer::new(
        addr.to_string(),
        dashboard.clone(),
        Some(web_root.path().to_path_buf()),
    );
    tokio::spawn(server.serve(listener));

    TestServer {
        addr,
        dashboard,
        client: reqwest::Client::new(),
        _web_root: web_root,
    }
}

/// Next `data:` payload of a server-sent event stream.
async fn next_event(resp: &mut reqwest::Response, buffer: &mut String) -> Value {
    loop {
        if let Some(end) = buffer.find("\n\n") {
            let event: String = buffer.drain(..end + 2).collect();
            let data = event.trim().strip_prefix("data: ").expect("data line");
            return serde_json::from_str(data).expect("snapshot json");
        }
        let chunk = resp
            .chunk()
            .await
            .expect("read chunk")
            .expect("stream still open");
        buffer.push_str(&String::from_utf8_lossy(&chunk));
    }
}

/// Next text frame of the snapshot socket, parsed as JSON.
async fn next_snapshot(socket: &mut WebSocketStream<MaybeTlsStream<TcpStream>>) -> Value {
    loop {
        match socket.next().await {
            Some(Ok(Message::Text(text))) => {
                return serde_json::from_str(&text).expect("snapshot json");
            }
            Some(Ok(_)) => continue,
            other => panic!("websocket closed: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_health() {
    let server = start().await;
    let (status, body) = server.get("/api/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["ok"], true);
    assert_eq!(body["service"], "spread-dashboard");
}

#[tokio::test]
async fn test_summary_reports_totals() {
    let server = start().await;
    let (status, body) = server.get("/api/summary").await;
    assert_eq!(status, 200);
    assert_eq!(body["info"]["total"], 3);
    assert_eq!(body["topics"], 2);
    assert_eq!(body["lines"][0], "总帖子数: 3");
}

#[tokio::test]
async fn test_charts_by_kind() {
    let server = start().await;

    let (status, body) = server.get("/api/charts").await;
    assert_eq!(status, 200);
    assert_eq!(body["charts"].as_array().map(Vec::len), Some(8));

    let (status, body) = server.get("/api/charts/time-trend").await;
    assert_eq!(status, 200);
    assert_eq!(body["shape"], "trend");

    let (status, body) = server.get("/api/charts/word_cloud").await;
    assert_eq!(status, 404);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "unknown_chart");
}

#[tokio::test]
async fn test_cursor_post() {
    let server = start().await;

    let (status, body) = server.post("/api/cursor", Some(json!({"cursor": 50}))).await;
    assert_eq!(status, 200);
    assert_eq!(body["cursor"], 50.0);
    assert_eq!(server.dashboard.read().await.visible_posts().len(), 2);

    let (status, body) = server.post("/api/cursor", Some(json!({"fraction": 1.0}))).await;
    assert_eq!(status, 200);
    assert_eq!(body["cursor"], 100.0);

    let (status, body) = server.post("/api/cursor", Some(json!({}))).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "missing_cursor");
}

#[tokio::test]
async fn test_cursor_post_stops_playback() {
    let server = start().await;
    let (_, body) = server.post("/api/playback/toggle", None).await;
    assert_eq!(body["playing"], true);

    server.post("/api/cursor", Some(json!({"cursor": 10}))).await;
    assert!(!server.dashboard.read().await.is_playing());
}

#[tokio::test]
async fn test_topic_selection() {
    let server = start().await;

    let (status, body) = server.post("/api/topics/T9/select", None).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "unknown_topic");

    let (status, body) = server.post("/api/topics/T1/select", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["topic"], "T1");

    let (_, body) = server.get("/api/topics").await;
    assert_eq!(body["topics"][0]["selected"], true);
    assert_eq!(body["topics"][1]["selected"], false);

    let (_, body) = server.post("/api/topics/T1/select", None).await;
    assert_eq!(body["topic"], Value::Null);
}

#[tokio::test]
async fn test_highlight_outcomes() {
    let server = start().await;
    server.post("/api/cursor", Some(json!({"cursor": 100}))).await;

    let (status, body) = server.post("/api/posts/P9/highlight", None).await;
    assert_eq!(status, 404);
    assert_eq!(body["ok"], false);

    server.post("/api/topics/T2/select", None).await;
    let (status, _) = server.post("/api/posts/P1/highlight", None).await;
    assert_eq!(status, 409);

    let (status, body) = server.post("/api/posts/P3/highlight", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["ok"], true);
    assert_eq!(
        server.dashboard.read().await.subscribe().borrow().highlighted.as_deref(),
        Some("P3")
    );

    let (status, _) = server.delete("/api/highlight").await;
    assert_eq!(status, 200);
    assert_eq!(server.dashboard.read().await.subscribe().borrow().highlighted, None);
}

#[tokio::test]
async fn test_timeline_keys() {
    let server = start().await;

    let (status, body) = server.post("/api/keys/right", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["cursor"], 5.0);

    let (_, body) = server.post("/api/keys/space", None).await;
    assert_eq!(body["playing"], true);

    let (status, body) = server.post("/api/keys/enter", None).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "unknown_key");
}

#[tokio::test]
async fn test_platform_and_clear() {
    let server = start().await;

    let (_, body) = server.post("/api/platforms/DY/select", None).await;
    assert_eq!(body["platform"], "DY");

    let (_, body) = server.post("/api/drag/toggle", None).await;
    assert_eq!(body["drag_mode"], true);

    server.post("/api/clear", None).await;
    let (_, state) = server.get("/api/state").await;
    assert_eq!(state["topic"], Value::Null);
    assert_eq!(state["platform"], "all");
    assert_eq!(state["drag_mode"], true);
}

#[tokio::test]
async fn test_map_and_timeline() {
    let server = start().await;
    server.post("/api/cursor", Some(json!({"cursor": 100}))).await;

    let (_, map) = server.get("/api/map").await;
    assert_eq!(map["nodes"].as_array().map(Vec::len), Some(3));
    assert_eq!(map["links"].as_array().map(Vec::len), Some(1));

    let (_, timeline) = server.get("/api/timeline").await;
    assert_eq!(timeline["events"].as_array().map(Vec::len), Some(3));
    assert_eq!(timeline["days"].as_array().map(Vec::len), Some(5));
}

#[tokio::test]
async fn test_events_stream_sends_snapshots() {
    let server = start().await;
    let mut resp = server
        .client
        .get(server.url("/api/events"))
        .send()
        .await
        .expect("open event stream");
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers()["content-type"], "text/event-stream");

    let mut buffer = String::new();
    let first = next_event(&mut resp, &mut buffer).await;
    assert_eq!(first["cursor"], 0.0);

    server.post("/api/cursor", Some(json!({"cursor": 30}))).await;
    let next = next_event(&mut resp, &mut buffer).await;
    assert_eq!(next["cursor"], 30.0);
    assert!(next["revision"].as_u64() > first["revision"].as_u64());
}

#[tokio::test]
async fn test_websocket_stream_sends_snapshots() {
    let server = start().await;
    let (mut socket, _) =
        tokio_tungstenite::connect_async(format!("ws://{}/api/stream", server.addr))
            .await
            .expect("websocket connect");

    let first = next_snapshot(&mut socket).await;
    assert_eq!(first["type"], "snapshot");
    assert_eq!(first["state"]["topic"], Value::Null);

    server.post("/api/topics/T1/select", None).await;
    let next = next_snapshot(&mut socket).await;
    assert_eq!(next["state"]["topic"], "T1");
}

#[tokio::test]
async fn test_static_index() {
    let server = start().await;
    let resp = server.client.get(server.url("/")).send().await.expect("request");
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.expect("body"), "<html>dashboard</html>");

    let resp = server
        .client
        .get(server.url("/dashboard/deep/link"))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status().as_u16(), 404);
    assert_eq!(resp.text().await.expect("body"), "<html>dashboard</html>");
}
