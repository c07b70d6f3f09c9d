//! Spread Data - loading the three dashboard sources and deriving the timeline
//!
//! The loader fetches topic paths, posts and users concurrently, converts the
//! posts to labelled form and indexes everything by id. The timeline processor
//! then joins every path entry to its post and orders the result by time.

pub mod error;
pub mod fetch;
pub mod loader;
pub mod timeline;

pub use error::LoadError;
pub use fetch::{Fetch, FsFetcher, StaticFetcher};
pub use loader::{load, load_or_empty, load_with_timeout, Dataset, SourceSet};
pub use timeline::{process, Timeline, TopicTimeline, DEFAULT_PROPAGATION_EFFECT};
