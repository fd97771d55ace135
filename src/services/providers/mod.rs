/// External collaborator abstractions
///
/// Poster/cast metadata and text sentiment come from outside the core. Both
/// sit behind async traits so implementations can be swapped (or mocked) and
/// so their failures can never fail a recommendation result: handlers catch
/// errors and substitute the documented sentinels.
use crate::error::AppResult;

pub mod sentiment;
pub mod tmdb;

pub use sentiment::{HttpSentimentClassifier, Sentiment, SentimentClassifier, SentimentLabel};
pub use tmdb::TmdbProvider;

/// Sentinel returned when a cast list cannot be produced
pub const CAST_NOT_AVAILABLE: &str = "Cast not available";

/// Movie metadata lookups by title
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Poster image URL for a title, when one exists
    async fn lookup_poster(&self, title: &str) -> AppResult<Option<String>>;

    /// Joined cast list for a title; [`CAST_NOT_AVAILABLE`] when empty
    async fn lookup_cast(&self, title: &str) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
