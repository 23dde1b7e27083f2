/// Movie metadata provider abstraction
///
/// Poster paths come from a remote metadata service. The trait keeps the HTTP
/// details out of the poster resolver and lets tests substitute canned responses.
use crate::error::AppResult;

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for remote movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch the poster path for a movie
    ///
    /// `Ok(None)` means the service answered but has no poster on file. Any
    /// transport, status or decoding failure is an `Err`.
    async fn fetch_poster_path(&self, movie_id: i64) -> AppResult<Option<String>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
