//! Dataset loading and id indices.
//!
//! All three sources are fetched concurrently and the load fails as a whole
//! if any of them fails. Callers that prefer to keep running use
//! [`load_or_empty`], which logs the failure once and yields an empty dataset.

use std::collections::HashMap;
use std::time::Duration;

use spread_model::{convert_post, parse_csv, ConvertedPost, RawPost, TopicPath, User};

use crate::{Fetch, LoadError};

/// Names of the three sources, resolved by a [`Fetch`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    pub topics: String,
    pub posts: String,
    pub users: String,
}

impl Default for SourceSet {
    fn default() -> Self {
        Self {
            topics: "paths_data.json".to_string(),
            posts: "post.json".to_string(),
            users: "user.csv".to_string(),
        }
    }
}

/// Everything loaded at startup. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub topics: Vec<TopicPath>,
    pub posts: Vec<RawPost>,
    pub converted_posts: Vec<ConvertedPost>,
    pub users: Vec<User>,
    pub post_index: HashMap<String, RawPost>,
    pub converted_index: HashMap<String, ConvertedPost>,
    pub user_index: HashMap<String, User>,
}

impl Dataset {
    /// Convert the posts and build the three indices.
    ///
    /// Duplicate ids overwrite earlier records (last write wins).
    pub fn from_records(topics: Vec<TopicPath>, posts: Vec<RawPost>, users: Vec<User>) -> Self {
        let converted_posts: Vec<ConvertedPost> = posts.iter().map(convert_post).collect();

        let post_index = posts
            .iter()
            .map(|p| (p.post_id.clone(), p.clone()))
            .collect();
        let converted_index = converted_posts
            .iter()
            .map(|p| (p.post_id.clone(), p.clone()))
            .collect();
        let user_index = users
            .iter()
            .map(|u| (u.user_id.clone(), u.clone()))
            .collect();

        Self {
            topics,
            posts,
            converted_posts,
            users,
            post_index,
            converted_index,
            user_index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty() && self.posts.is_empty() && self.users.is_empty()
    }

    pub fn post(&self, post_id: &str) -> Option<&RawPost> {
        self.post_index.get(post_id)
    }

    pub fn converted(&self, post_id: &str) -> Option<&ConvertedPost> {
        self.converted_index.get(post_id)
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.user_index.get(user_id)
    }

    /// Follow post -> owning user id -> user record.
    pub fn user_for_post(&self, post_id: &str) -> Option<&User> {
        self.post(post_id)
            .and_then(|p| p.user_id.as_deref())
            .and_then(|id| self.user(id))
    }
}

/// Drop a leading UTF-8 byte-order mark.
fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Fetch and parse all three sources.
pub async fn load<F: Fetch>(fetcher: &F, sources: &SourceSet) -> Result<Dataset, LoadError> {
    let (topics_text, posts_text, users_text) = tokio::try_join!(
        fetcher.fetch(&sources.topics),
        fetcher.fetch(&sources.posts),
        fetcher.fetch(&sources.users),
    )?;

    let topics: Vec<TopicPath> =
        serde_json::from_str(strip_bom(&topics_text)).map_err(|source| LoadError::Parse {
            location: sources.topics.clone(),
            source,
        })?;
    let posts: Vec<RawPost> =
        serde_json::from_str(strip_bom(&posts_text)).map_err(|source| LoadError::Parse {
            location: sources.posts.clone(),
            source,
        })?;
    let users: Vec<User> = parse_csv(strip_bom(&users_text))
        .iter()
        .filter_map(User::from_row)
        .collect();

    let dataset = Dataset::from_records(topics, posts, users);
    tracing::info!(
        topics = dataset.topics.len(),
        posts = dataset.posts.len(),
        converted = dataset.converted_posts.len(),
        users = dataset.users.len(),
        post_index = dataset.post_index.len(),
        user_index = dataset.user_index.len(),
        "Dataset loaded"
    );
    Ok(dataset)
}

/// [`load`], abandoned with [`LoadError::Timeout`] once `timeout` elapses.
/// `None` waits indefinitely.
pub async fn load_with_timeout<F: Fetch>(
    fetcher: &F,
    sources: &SourceSet,
    timeout: Option<Duration>,
) -> Result<Dataset, LoadError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, load(fetcher, sources))
            .await
            .map_err(|_| LoadError::Timeout(limit))?,
        None => load(fetcher, sources).await,
    }
}

/// Load, falling back to an empty dataset so every view renders "no data".
pub async fn load_or_empty<F: Fetch>(
    fetcher: &F,
    sources: &SourceSet,
    timeout: Option<Duration>,
) -> Dataset {
    match load_with_timeout(fetcher, sources, timeout).await {
        Ok(dataset) => dataset,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load dataset, continuing without data");
            Dataset::default()
        }
    }
}
