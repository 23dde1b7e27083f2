use serde::{Deserialize, Serialize};

pub mod artifact;

pub use artifact::{CatalogArtifact, Column, DecodedCatalog};

/// A single movie in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    /// TMDB movie ID, also the key for poster lookups
    pub id: i64,
    pub title: String,
    /// Path fragment issued by TMDB (e.g. "/abc.jpg"), `None` when nothing is on file
    pub poster_path: Option<String>,
}

impl MovieRecord {
    pub fn new(id: i64, title: impl Into<String>, poster_path: Option<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster_path,
        }
    }
}

/// Ordered recommendation result
///
/// `titles` and `poster_urls` are positionally aligned and always the same length.
/// An empty result is how an unknown title is reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    pub titles: Vec<String>,
    pub poster_urls: Vec<String>,
}

impl Recommendations {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, title: String, poster_url: String) {
        self.titles.push(title);
        self.poster_urls.push(poster_url);
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Iterates over (title, poster URL) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.titles
            .iter()
            .zip(self.poster_urls.iter())
            .map(|(t, p)| (t.as_str(), p.as_str()))
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Subset of the TMDB `GET /movie/{id}` response we care about
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    #[serde(default)]
    pub poster_path: Option<String>,
}

// ============================================================================
// HTTP Response Types
// ============================================================================

/// One recommended title as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedTitle {
    pub title: String,
    pub poster_url: String,
}

/// Response body for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub selected: String,
    pub recommendations: Vec<RecommendedTitle>,
}

impl RecommendationResponse {
    pub fn new(selected: String, recommendations: &Recommendations) -> Self {
        Self {
            selected,
            recommendations: recommendations
                .iter()
                .map(|(title, poster_url)| RecommendedTitle {
                    title: title.to_string(),
                    poster_url: poster_url.to_string(),
                })
                .collect(),
        }
    }
}
