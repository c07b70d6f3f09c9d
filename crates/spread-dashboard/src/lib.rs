//! Spread Dashboard - surfaces for the propagation dashboard
//!
//! Shares one [`Dashboard`] between a ratatui terminal console, an axum HTTP
//! JSON API (with a WebSocket snapshot stream) and the playback driver. Every
//! operation takes the write lock and runs to completion, so each surface
//! always observes a consistent visible set.

pub mod config;
pub mod console;
pub mod playback_driver;
pub mod web_server;

use std::sync::Arc;

use spread_view::Dashboard;
use tokio::sync::RwLock;

pub use config::{ConfigError, DashboardConfig};
pub use console::run_console;
pub use playback_driver::PlaybackDriver;
pub use web_server::WebServer;

/// The dashboard as shared between surfaces.
pub type SharedDashboard = Arc<RwLock<Dashboard>>;
