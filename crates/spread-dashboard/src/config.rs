//! Dashboard configuration.
//!
//! Read from a TOML file whose every section and field is optional. Lookup
//! order: the `--config` flag, then `SPREAD_CONFIG`, then
//! `<config dir>/spread/config.toml` when it exists, then built-in defaults.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spread_data::SourceSet;
use spread_view::DashboardOptions;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "SPREAD_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Log destination in console mode. Logging is off there when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Where the three sources live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_root")]
    pub root: PathBuf,
    #[serde(default = "default_topics_source")]
    pub topics: String,
    #[serde(default = "default_posts_source")]
    pub posts: String,
    #[serde(default = "default_users_source")]
    pub users: String,
    /// Abandon the initial load after this many seconds. Unset waits forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Wall-clock length of a full 0-100 sweep.
    #[serde(default = "default_sweep_ms")]
    pub sweep_ms: u64,
    /// Interval between playback ticks.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    /// Cursor units per arrow key.
    #[serde(default = "default_step")]
    pub step: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Static asset directory. Detected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_root: Option<PathBuf>,
}

fn default_log_filter() -> String {
    "info".to_string()
}
fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}
fn default_topics_source() -> String {
    SourceSet::default().topics
}
fn default_posts_source() -> String {
    SourceSet::default().posts
}
fn default_users_source() -> String {
    SourceSet::default().users
}
fn default_sweep_ms() -> u64 {
    50_000
}
fn default_frame_ms() -> u64 {
    100
}
fn default_step() -> f64 {
    spread_view::DEFAULT_STEP
}
fn default_true() -> bool {
    true
}
fn default_bind_addr() -> String {
    "127.0.0.1:9380".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            log_file: None,
            data: DataConfig::default(),
            playback: PlaybackConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: default_data_root(),
            topics: default_topics_source(),
            posts: default_posts_source(),
            users: default_users_source(),
            load_timeout_secs: None,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sweep_ms: default_sweep_ms(),
            frame_ms: default_frame_ms(),
            step: default_step(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_addr: default_bind_addr(),
            web_root: None,
        }
    }
}

impl DataConfig {
    pub fn sources(&self) -> SourceSet {
        SourceSet {
            topics: self.topics.clone(),
            posts: self.posts.clone(),
            users: self.users.clone(),
        }
    }

    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_secs.map(Duration::from_secs)
    }
}

impl PlaybackConfig {
    pub fn options(&self) -> DashboardOptions {
        DashboardOptions {
            sweep: Duration::from_millis(self.sweep_ms),
            step: self.step,
        }
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }
}

impl DashboardConfig {
    pub fn from_toml(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text, &path.display().to_string())
    }

    /// Resolve the config file and load it, or fall back to defaults when no
    /// file is named and none exists at the default location.
    pub fn load(flag: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let path = resolve_path(
            flag,
            std::env::var_os(CONFIG_ENV),
            default_config_path().filter(|p| p.exists()),
        );
        match path {
            Some(path) => Ok((Self::load_file(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        http_addr: Option<String>,
        no_http: bool,
    ) -> Self {
        if let Some(dir) = data_dir {
            self.data.root = dir;
        }
        if let Some(addr) = http_addr {
            self.http.bind_addr = addr;
        }
        if no_http {
            self.http.enabled = false;
        }
        self
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// `<config dir>/spread/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("spread").join("config.toml"))
}

/// Pick the config file: flag, then environment, then an existing default.
pub fn resolve_path(
    flag: Option<&Path>,
    env: Option<OsString>,
    existing_default: Option<PathBuf>,
) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .or(existing_default)
}
