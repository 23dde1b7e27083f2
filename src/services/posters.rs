use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::AppResult,
    models::MovieRecord,
    services::providers::MetadataProvider,
};

/// TMDB image CDN base
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
/// Poster width requested from the CDN
pub const POSTER_SIZE: &str = "w500";
/// Shown whenever a movie has no resolvable poster
pub const PLACEHOLDER_URL: &str = "https://via.placeholder.com/500x750.png?text=No+Image";

/// Builds the image URL for a poster path, falling back to the placeholder
pub fn to_display_url(poster_path: Option<&str>) -> String {
    match poster_path {
        Some(path) if !path.is_empty() => format!("{}/{}{}", IMAGE_BASE_URL, POSTER_SIZE, path),
        _ => PLACEHOLDER_URL.to_string(),
    }
}

/// Outcome counts of a backfill pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    pub attempted: usize,
    /// Lookups that returned a poster path
    pub resolved: usize,
    /// Lookups that succeeded but had no poster on file
    pub empty: usize,
    pub failed: usize,
}

/// Resolves poster paths through a metadata provider
///
/// Remote failures never escape: they are logged and reported as "no poster".
#[derive(Clone)]
pub struct PosterResolver {
    provider: Arc<dyn MetadataProvider>,
    backfill_delay: Duration,
}

impl PosterResolver {
    pub fn new(provider: Arc<dyn MetadataProvider>, backfill_delay: Duration) -> Self {
        Self {
            provider,
            backfill_delay,
        }
    }

    /// Provider lookup with the failure reason intact
    ///
    /// `backfill` goes through this instead of `resolve_poster_path` so it can
    /// count failures separately from "no poster on file"; both still end up as `None`.
    async fn try_resolve(&self, movie_id: i64) -> AppResult<Option<String>> {
        self.provider.fetch_poster_path(movie_id).await
    }

    /// Single best-effort lookup; `None` on any failure
    pub async fn resolve_poster_path(&self, movie_id: i64) -> Option<String> {
        match self.try_resolve(movie_id).await {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(
                    movie_id = movie_id,
                    provider = self.provider.name(),
                    error = %e,
                    "Poster lookup failed, using placeholder"
                );
                None
            }
        }
    }

    /// Resolves the poster of every record at `positions`, in order
    ///
    /// Lookups run one at a time with `backfill_delay` between consecutive calls.
    /// A failed lookup leaves that record's poster as `None` and the pass continues.
    pub async fn backfill(
        &self,
        records: &mut [MovieRecord],
        positions: &[usize],
    ) -> BackfillSummary {
        let mut summary = BackfillSummary::default();

        tracing::info!(
            missing = positions.len(),
            provider = self.provider.name(),
            "Starting poster backfill"
        );

        for (n, &position) in positions.iter().enumerate() {
            if n > 0 && !self.backfill_delay.is_zero() {
                tokio::time::sleep(self.backfill_delay).await;
            }

            let Some(record) = records.get_mut(position) else {
                tracing::error!(position = position, "Backfill position out of range");
                continue;
            };

            summary.attempted += 1;
            record.poster_path = match self.try_resolve(record.id).await {
                Ok(Some(path)) => {
                    summary.resolved += 1;
                    Some(path)
                }
                Ok(None) => {
                    summary.empty += 1;
                    None
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(
                        movie_id = record.id,
                        title = %record.title,
                        error = %e,
                        "Poster lookup failed during backfill"
                    );
                    None
                }
            };
        }

        tracing::info!(
            attempted = summary.attempted,
            resolved = summary.resolved,
            empty = summary.empty,
            failed = summary.failed,
            "Poster backfill completed"
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::providers::MockMetadataProvider;
    use mockall::predicate::eq;

    fn resolver_with(mock: MockMetadataProvider) -> PosterResolver {
        PosterResolver::new(Arc::new(mock), Duration::ZERO)
    }

    #[test]
    fn test_display_url_with_path() {
        assert_eq!(
            to_display_url(Some("/abc.jpg")),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }

    #[test]
    fn test_display_url_without_path() {
        assert_eq!(to_display_url(None), PLACEHOLDER_URL);
        assert_eq!(to_display_url(Some("")), PLACEHOLDER_URL);
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_fetch_poster_path()
            .with(eq(19995))
            .times(1)
            .returning(|_| Ok(Some("/avatar.jpg".to_string())));
        mock.expect_name().return_const("mock");

        let resolver = resolver_with(mock);
        assert_eq!(
            resolver.resolve_poster_path(19995).await,
            Some("/avatar.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_failure_degrades_to_none() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_fetch_poster_path()
            .times(1)
            .returning(|_| Err(AppError::ExternalApi("TMDB API returned status 404".to_string())));
        mock.expect_name().return_const("mock");

        let resolver = resolver_with(mock);
        assert_eq!(resolver.resolve_poster_path(1).await, None);
    }

    #[tokio::test]
    async fn test_backfill_failure_leaves_placeholder() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_fetch_poster_path()
            .returning(|_| Err(AppError::ExternalApi("timed out".to_string())));
        mock.expect_name().return_const("mock");

        let mut records = vec![MovieRecord::new(1, "Avatar", None)];
        let summary = resolver_with(mock).backfill(&mut records, &[0]).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(records[0].poster_path, None);
        assert_eq!(
            to_display_url(records[0].poster_path.as_deref()),
            PLACEHOLDER_URL
        );
    }

    #[tokio::test]
    async fn test_backfill_continues_past_failures() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_fetch_poster_path().returning(|id| match id {
            1 => Ok(Some("/one.jpg".to_string())),
            2 => Err(AppError::ExternalApi("boom".to_string())),
            _ => Ok(None),
        });
        mock.expect_name().return_const("mock");

        let mut records = vec![
            MovieRecord::new(1, "One", None),
            MovieRecord::new(2, "Two", None),
            MovieRecord::new(3, "Three", None),
        ];
        let summary = resolver_with(mock).backfill(&mut records, &[0, 1, 2]).await;

        assert_eq!(
            summary,
            BackfillSummary {
                attempted: 3,
                resolved: 1,
                empty: 1,
                failed: 1,
            }
        );
        assert_eq!(records[0].poster_path, Some("/one.jpg".to_string()));
        assert_eq!(records[1].poster_path, None);
        assert_eq!(records[2].poster_path, None);
    }

    #[tokio::test]
    async fn test_backfill_paces_consecutive_lookups() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_fetch_poster_path()
            .times(3)
            .returning(|_| Ok(None));
        mock.expect_name().return_const("mock");

        let resolver = PosterResolver::new(Arc::new(mock), Duration::from_millis(200));
        let mut records = vec![
            MovieRecord::new(1, "One", None),
            MovieRecord::new(2, "Two", None),
            MovieRecord::new(3, "Three", None),
        ];

        let start = std::time::Instant::now();
        let summary = resolver.backfill(&mut records, &[0, 1, 2]).await;
        let elapsed = start.elapsed();

        assert_eq!(summary.attempted, 3);
        // Two gaps between three lookups, none after the last
        assert!(elapsed >= Duration::from_millis(400), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1500), "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_backfill_only_touches_listed_positions() {
        let mut mock = MockMetadataProvider::new();
        mock.expect_fetch_poster_path()
            .with(eq(2))
            .times(1)
            .returning(|_| Ok(Some("/two.jpg".to_string())));
        mock.expect_name().return_const("mock");

        let mut records = vec![
            MovieRecord::new(1, "One", Some("/kept.jpg".to_string())),
            MovieRecord::new(2, "Two", None),
        ];
        resolver_with(mock).backfill(&mut records, &[1]).await;

        assert_eq!(records[0].poster_path, Some("/kept.jpg".to_string()));
        assert_eq!(records[1].poster_path, Some("/two.jpg".to_string()));
    }
}
