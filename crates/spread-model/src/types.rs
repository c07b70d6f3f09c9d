//! Source records and derived view records.
//!
//! The source files use Chinese column names (`帖文ID`, `话题编号`, ...);
//! English aliases are accepted on input so hand-written fixtures stay readable.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::csv::Row;
use crate::mapping::Dimension;

/// Time range used when there are no events, so cursor math stays defined.
pub const EMPTY_TIME_RANGE: TimeRange = TimeRange { start: 0, end: 100 };

/// A post record as it appears in the posts source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    #[serde(rename = "帖文ID", alias = "post_id", deserialize_with = "id_from_value")]
    pub post_id: String,
    #[serde(rename = "平台", alias = "platform", default)]
    pub platform: Option<String>,
    #[serde(rename = "事件主体", alias = "event_subject", default)]
    pub event_subject: Option<String>,
    #[serde(rename = "事件性质", alias = "event_nature", default)]
    pub event_nature: Option<String>,
    /// Multi-valued scope codes.
    #[serde(
        rename = "事件范围",
        alias = "event_scope",
        default,
        deserialize_with = "codes_from_value"
    )]
    pub event_scope: Vec<String>,
    #[serde(rename = "帖文立场", alias = "stance", default)]
    pub stance: Option<String>,
    #[serde(rename = "信息类型", alias = "info_type", default)]
    pub info_type: Option<String>,
    #[serde(rename = "情绪类型", alias = "emotion", default)]
    pub emotion: Option<String>,
    #[serde(rename = "信息属性", alias = "info_attribute", default)]
    pub info_attribute: Option<String>,
    #[serde(
        rename = "用户ID",
        alias = "user_id",
        default,
        deserialize_with = "opt_id_from_value"
    )]
    pub user_id: Option<String>,
    #[serde(
        rename = "传播效果",
        alias = "propagation_effect",
        default,
        deserialize_with = "opt_number_from_value"
    )]
    pub propagation_effect: Option<f64>,
}

/// A post with every classification code replaced by its label.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConvertedPost {
    pub post_id: String,
    pub platform: Option<String>,
    pub event_subject: Option<String>,
    pub event_nature: Option<String>,
    pub event_scope: Vec<String>,
    pub stance: Option<String>,
    pub info_type: Option<String>,
    pub emotion: Option<String>,
    pub info_attribute: Option<String>,
    pub user_id: Option<String>,
    pub propagation_effect: Option<f64>,
}

impl ConvertedPost {
    /// Label under `dimension`. Multi-valued dimensions yield their first label.
    pub fn label(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::EventSubject => self.event_subject.as_deref(),
            Dimension::EventNature => self.event_nature.as_deref(),
            Dimension::EventScope => self.event_scope.first().map(String::as_str),
            Dimension::PostStance => self.stance.as_deref(),
            Dimension::InfoType => self.info_type.as_deref(),
            Dimension::Emotion => self.emotion.as_deref(),
            Dimension::Platform => self.platform.as_deref(),
            Dimension::InfoAttribute => self.info_attribute.as_deref(),
        }
    }
}

/// A row of the user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub user_id: String,
    /// Identity label (身份标签), e.g. media outlet or individual.
    pub identity_label: Option<String>,
    /// Precise region (精准地域).
    pub region: Option<String>,
}

impl User {
    /// Build a user from a parsed CSV row. Rows without a user id are skipped.
    pub fn from_row(row: &Row) -> Option<Self> {
        let user_id = column(row, &["用户ID", "user_id"])?;
        Some(Self {
            user_id,
            identity_label: column(row, &["身份标签", "identity_label"]),
            region: column(row, &["精准地域", "region"]),
        })
    }
}

fn column(row: &Row, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| row.get(*name))
        .filter(|v| !v.is_empty())
        .cloned()
}

/// One step of a topic's propagation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathEntry {
    #[serde(rename = "帖文ID", alias = "post_id", deserialize_with = "id_from_value")]
    pub post_id: String,
    #[serde(rename = "时间", alias = "time", deserialize_with = "id_from_value")]
    pub time: String,
    #[serde(rename = "平台", alias = "platform", default)]
    pub platform: Option<String>,
}

/// A topic and its ordered propagation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicPath {
    #[serde(rename = "话题编号", alias = "topic_id", deserialize_with = "id_from_value")]
    pub topic_id: String,
    #[serde(rename = "路径", alias = "path", default)]
    pub path: Vec<PathEntry>,
}

/// A path entry joined against its post record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostEvent {
    pub post_id: String,
    pub topic_id: String,
    /// Position of the entry within its topic's path.
    pub index: usize,
    /// Milliseconds since the Unix epoch, UTC.
    pub timestamp: i64,
    /// Raw platform code.
    pub platform: Option<String>,
    pub propagation_effect: f64,
    pub user_id: Option<String>,
}

impl PostEvent {
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Calendar day (UTC) the event falls on.
    pub fn date(&self) -> Option<NaiveDate> {
        self.datetime().map(|dt| dt.date_naive())
    }
}

/// Inclusive range of event timestamps in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    /// Map a 0-100 cursor onto an absolute timestamp.
    pub fn absolute_time(&self, cursor: f64) -> f64 {
        self.start as f64 + (self.end - self.start) as f64 * cursor / 100.0
    }

    pub fn span_ms(&self) -> i64 {
        self.end - self.start
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        EMPTY_TIME_RANGE
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Shortest all-digit text read as epoch milliseconds.
const EPOCH_MS_MIN_DIGITS: usize = 10;

/// Parse an event time into milliseconds since the epoch.
///
/// Accepts RFC 3339, common date-time and date layouts (naive values are UTC)
/// and bare integers. Integers of at least ten digits are epoch milliseconds,
/// four digits are a year starting on 1 January, any other length is rejected.
pub fn parse_timestamp(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return match text.len() {
            n if n >= EPOCH_MS_MIN_DIGITS => text.parse().ok(),
            4 => NaiveDate::from_ymd_opt(text.parse().ok()?, 1, 1)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc().timestamp_millis()),
            _ => None,
        };
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| naive.and_utc().timestamp_millis());
        }
    }
    None
}

fn id_from_value<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn opt_id_from_value<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) if s.is_empty() => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        serde_json::Value::Null => Ok(None),
        other => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn opt_number_from_value<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::Number(n) => Ok(n.as_f64()),
        serde_json::Value::String(s) => Ok(s.trim().parse().ok()),
        _ => Ok(None),
    }
}

fn codes_from_value<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()),
        serde_json::Value::String(s) if s.is_empty() => Ok(Vec::new()),
        serde_json::Value::String(s) => Ok(vec![s]),
        _ => Ok(Vec::new()),
    }
}
