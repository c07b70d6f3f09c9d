//! HTTP JSON API, snapshot streams and static dashboard assets.

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path as AxumPath, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use bytes::Bytes;
use futures_util::stream;
use serde::Deserialize;
use spread_view::{ChartKind, Dashboard, HighlightOutcome, TimelineKey};
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};

use crate::SharedDashboard;

/// Environment variable naming the static asset directory.
pub const WEB_ROOT_ENV: &str = "SPREAD_WEB_ROOT";

#[derive(Clone)]
struct WebState {
    dashboard: SharedDashboard,
}

pub struct WebServer {
    bind_addr: String,
    dashboard: SharedDashboard,
    web_root: PathBuf,
}

impl WebServer {
    pub fn new(bind_addr: String, dashboard: SharedDashboard, web_root: Option<PathBuf>) -> Self {
        Self {
            bind_addr,
            dashboard,
            web_root: web_root.unwrap_or_else(detect_web_root),
        }
    }

    pub fn router(&self) -> Router {
        let index_file = self.web_root.join("index.html");
        let static_service =
            ServeDir::new(&self.web_root).not_found_service(ServeFile::new(index_file));

        Router::new()
            .route("/api/health", get(api_health))
            .route("/api/summary", get(api_summary))
            .route("/api/state", get(api_state))
            .route("/api/charts", get(api_charts))
            .route("/api/charts/:kind", get(api_chart))
            .route("/api/map", get(api_map))
            .route("/api/timeline", get(api_timeline))
            .route("/api/topics", get(api_topics))
            .route("/api/topics/:topic_id/select", post(api_select_topic))
            .route("/api/platforms/:code/select", post(api_select_platform))
            .route("/api/posts/:post_id/highlight", post(api_highlight_post))
            .route("/api/highlight", delete(api_clear_highlight))
            .route("/api/cursor", post(api_cursor))
            .route("/api/playback/toggle", post(api_playback_toggle))
            .route("/api/keys/:key", post(api_key))
            .route("/api/drag/toggle", post(api_drag_toggle))
            .route("/api/clear", post(api_clear))
            .route("/api/events", get(api_events))
            .route("/api/stream", get(api_stream))
            .fallback_service(static_service)
            .with_state(WebState {
                dashboard: self.dashboard.clone(),
            })
    }

    pub async fn run(self) -> Result<(), anyhow::Error> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<(), anyhow::Error> {
        let app = self.router();
        tracing::info!(
            addr = %listener.local_addr()?,
            web_root = %self.web_root.display(),
            "HTTP dashboard listening"
        );
        axum::serve(listener, app).await?;
        Ok(())
    }
}

fn detect_web_root() -> PathBuf {
    if let Ok(path) = std::env::var(WEB_ROOT_ENV) {
        let p = PathBuf::from(path);
        if p.join("index.html").exists() {
            return p;
        }
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let candidates = [
        cwd.join("web"),
        cwd.join("dist"),
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../web"),
    ];

    for c in candidates {
        if c.join("index.html").exists() {
            return c;
        }
    }

    cwd
}

fn error_response(status: StatusCode, error: &str) -> Response {
    (
        status,
        Json(serde_json::json!({"ok": false, "error": error})),
    )
        .into_response()
}

pub fn summary_payload(dashboard: &Dashboard) -> serde_json::Value {
    let info = dashboard.info();
    serde_json::json!({
        "info": info,
        "lines": info.lines(),
        "topics": dashboard.timeline().topics.len(),
        "range": dashboard.timeline().range,
    })
}

pub fn topics_payload(dashboard: &Dashboard) -> serde_json::Value {
    let selected = dashboard.state().topic();
    let topics: Vec<serde_json::Value> = dashboard
        .topics()
        .into_iter()
        .map(|(topic_id, events, total_effect)| {
            serde_json::json!({
                "selected": selected == Some(topic_id.as_str()),
                "topic_id": topic_id,
                "events": events,
                "total_effect": total_effect,
            })
        })
        .collect();
    serde_json::json!({ "topics": topics })
}

pub fn timeline_payload(dashboard: &Dashboard) -> serde_json::Value {
    let timeline = dashboard.timeline();
    serde_json::json!({
        "range": timeline.range,
        "events": timeline.events,
        "days": dashboard.charts().trend().buckets(),
    })
}

async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "ok": true,
        "service": "spread-dashboard",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn api_summary(State(web): State<WebState>) -> Json<serde_json::Value> {
    let dashboard = web.dashboard.read().await;
    Json(summary_payload(&dashboard))
}

async fn api_state(State(web): State<WebState>) -> Json<serde_json::Value> {
    let snapshot = web.dashboard.read().await.subscribe().borrow().clone();
    Json(serde_json::json!(snapshot))
}

async fn api_charts(State(web): State<WebState>) -> Json<serde_json::Value> {
    let dashboard = web.dashboard.read().await;
    Json(serde_json::json!({ "charts": dashboard.scenes() }))
}

async fn api_chart(
    State(web): State<WebState>,
    AxumPath(kind): AxumPath<String>,
) -> impl IntoResponse {
    let Ok(kind) = kind.parse::<ChartKind>() else {
        return error_response(StatusCode::NOT_FOUND, "unknown_chart");
    };
    let dashboard = web.dashboard.read().await;
    match dashboard.scene(kind) {
        Some(scene) => Json(serde_json::json!(scene)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "unknown_chart"),
    }
}

async fn api_map(State(web): State<WebState>) -> Json<serde_json::Value> {
    let dashboard = web.dashboard.read().await;
    Json(serde_json::json!(dashboard.map()))
}

async fn api_timeline(State(web): State<WebState>) -> Json<serde_json::Value> {
    let dashboard = web.dashboard.read().await;
    Json(timeline_payload(&dashboard))
}

async fn api_topics(State(web): State<WebState>) -> Json<serde_json::Value> {
    let dashboard = web.dashboard.read().await;
    Json(topics_payload(&dashboard))
}

async fn api_select_topic(
    State(web): State<WebState>,
    AxumPath(topic_id): AxumPath<String>,
) -> impl IntoResponse {
    let mut dashboard = web.dashboard.write().await;
    if dashboard.timeline().topic(&topic_id).is_none() {
        return error_response(StatusCode::NOT_FOUND, "unknown_topic");
    }
    let selected = dashboard.select_topic(&topic_id);
    Json(serde_json::json!({"ok": true, "topic": selected})).into_response()
}

async fn api_select_platform(
    State(web): State<WebState>,
    AxumPath(code): AxumPath<String>,
) -> Json<serde_json::Value> {
    let selected = web.dashboard.write().await.select_platform(&code);
    Json(serde_json::json!({"ok": true, "platform": selected}))
}

async fn api_highlight_post(
    State(web): State<WebState>,
    AxumPath(post_id): AxumPath<String>,
) -> impl IntoResponse {
    let outcome = web.dashboard.write().await.highlight_post(&post_id);
    let status = match &outcome {
        HighlightOutcome::Applied { .. } => StatusCode::OK,
        HighlightOutcome::OutsideTopic { .. } => StatusCode::CONFLICT,
        HighlightOutcome::UnknownPost { .. } => StatusCode::NOT_FOUND,
    };
    (
        status,
        Json(serde_json::json!({"ok": outcome.is_applied(), "outcome": outcome})),
    )
}

async fn api_clear_highlight(State(web): State<WebState>) -> Json<serde_json::Value> {
    web.dashboard.write().await.clear_highlights();
    Json(serde_json::json!({"ok": true}))
}

#[derive(Debug, Deserialize)]
struct CursorRequest {
    /// Absolute cursor, 0-100.
    #[serde(default)]
    cursor: Option<f64>,
    /// Position along the track, 0-1.
    #[serde(default)]
    fraction: Option<f64>,
}

async fn api_cursor(
    State(web): State<WebState>,
    Json(req): Json<CursorRequest>,
) -> impl IntoResponse {
    let mut dashboard = web.dashboard.write().await;
    let cursor = match (req.cursor, req.fraction) {
        (Some(cursor), _) => {
            dashboard.stop_playback();
            dashboard.set_cursor(cursor)
        }
        (None, Some(fraction)) => dashboard.scrub(fraction),
        (None, None) => return error_response(StatusCode::BAD_REQUEST, "missing_cursor"),
    };
    Json(serde_json::json!({"ok": true, "cursor": cursor})).into_response()
}

async fn api_playback_toggle(State(web): State<WebState>) -> Json<serde_json::Value> {
    let playing = web.dashboard.write().await.toggle_playback();
    Json(serde_json::json!({"ok": true, "playing": playing}))
}

async fn api_key(
    State(web): State<WebState>,
    AxumPath(key): AxumPath<String>,
) -> impl IntoResponse {
    let Ok(key) = key.parse::<TimelineKey>() else {
        return error_response(StatusCode::BAD_REQUEST, "unknown_key");
    };
    let mut dashboard = web.dashboard.write().await;
    dashboard.handle_key(key);
    Json(serde_json::json!({
        "ok": true,
        "key": key,
        "cursor": dashboard.state().cursor(),
        "playing": dashboard.is_playing(),
    }))
    .into_response()
}

async fn api_drag_toggle(State(web): State<WebState>) -> Json<serde_json::Value> {
    let enabled = web.dashboard.write().await.toggle_drag_mode();
    Json(serde_json::json!({"ok": true, "drag_mode": enabled}))
}

async fn api_clear(State(web): State<WebState>) -> Json<serde_json::Value> {
    web.dashboard.write().await.clear_selection();
    Json(serde_json::json!({"ok": true}))
}

/// Server-sent events: the current snapshot, then one per change.
async fn api_events(State(web): State<WebState>) -> Response {
    let updates = web.dashboard.read().await.subscribe();
    let sse_stream = stream::unfold((updates, true), |(mut updates, first)| async move {
        if !first {
            updates.changed().await.ok()?;
        }
        let snapshot = updates.borrow_and_update().clone();
        let text = format!("data: {}\n\n", serde_json::json!(snapshot));
        Some((Ok::<Bytes, Infallible>(Bytes::from(text)), (updates, false)))
    });

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(sse_stream),
    )
        .into_response()
}

async fn api_stream(ws: WebSocketUpgrade, State(web): State<WebState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| stream_loop(socket, web.dashboard))
}

async fn stream_loop(mut socket: WebSocket, dashboard: SharedDashboard) {
    let mut updates = dashboard.read().await.subscribe();
    loop {
        let payload = {
            let snapshot = updates.borrow_and_update().clone();
            serde_json::json!({
                "type": "snapshot",
                "time": chrono::Utc::now(),
                "state": snapshot,
            })
            .to_string()
        };

        if socket.send(Message::Text(payload.into())).await.is_err() {
            break;
        }
        if updates.changed().await.is_err() {
            break;
        }
    }
}
