use std::sync::Arc;

use crate::{
    catalog::Catalog,
    models::Recommendations,
    services::posters::to_display_url,
};

/// Number of similar titles returned per query
pub const RECOMMENDATION_COUNT: usize = 5;

/// Content-based recommendations over the precomputed similarity matrix
///
/// Read-only over a loaded catalog, so one engine can serve concurrent queries.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Arc<Catalog>,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Ranks column indices of row `index` by score, highest first
    ///
    /// Stable on ties: equal scores keep their column order.
    fn ranked(&self, index: usize) -> Vec<(usize, f64)> {
        let mut scores: Vec<(usize, f64)> = self
            .catalog
            .similarity_row(index)
            .iter()
            .copied()
            .enumerate()
            .collect();
        // Scores are finite (enforced by SimilarityMatrix::new), so total_cmp is plain numeric order
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores
    }

    /// Top similar titles to `title` with their poster URLs
    ///
    /// Unknown titles yield an empty result. The highest-ranked entry is dropped
    /// as the movie itself; if another movie scores at least as high as the
    /// self-similarity and precedes it, that movie is dropped instead.
    pub fn recommend(&self, title: &str) -> Recommendations {
        let Some(index) = self.catalog.find_index_by_title(title) else {
            tracing::debug!(title = %title, "Title not in catalog");
            return Recommendations::empty();
        };

        let mut recommendations = Recommendations::empty();
        for (position, _score) in self
            .ranked(index)
            .into_iter()
            .skip(1)
            .take(RECOMMENDATION_COUNT)
        {
            let record = self.catalog.record_at(position);
            recommendations.push(
                record.title.clone(),
                to_display_url(record.poster_path.as_deref()),
            );
        }

        tracing::debug!(
            title = %title,
            index = index,
            results = recommendations.len(),
            "Recommendations computed"
        );

        recommendations
    }
}
