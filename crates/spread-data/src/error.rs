use std::time::Duration;

/// Errors that abort a dataset load. Any one of them fails the whole load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("source {0} is not available")]
    Missing(String),

    #[error("failed to parse {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("loading timed out after {0:?}")]
    Timeout(Duration),
}
