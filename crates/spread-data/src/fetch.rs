//! Source fetchers: where the raw topic, post and user text comes from.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::LoadError;

/// Retrieves the raw text of a named source.
pub trait Fetch: Send + Sync {
    fn fetch(&self, location: &str) -> impl Future<Output = Result<String, LoadError>> + Send;
}

/// Reads sources as files relative to a data directory.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Fetch for FsFetcher {
    async fn fetch(&self, location: &str) -> Result<String, LoadError> {
        let path = self.root.join(location);
        tracing::debug!(path = %path.display(), "Reading source");
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoadError::Io {
                location: path.display().to_string(),
                source,
            })
    }
}

/// Serves sources from memory. Used for embedded demo data and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    sources: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, location: &str, text: impl Into<String>) -> Self {
        self.insert(location, text);
        self
    }

    pub fn insert(&mut self, location: &str, text: impl Into<String>) {
        self.sources.insert(location.to_string(), text.into());
    }
}

impl Fetch for StaticFetcher {
    async fn fetch(&self, location: &str) -> Result<String, LoadError> {
        self.sources
            .get(location)
            .cloned()
            .ok_or_else(|| LoadError::Missing(location.to_string()))
    }
}
