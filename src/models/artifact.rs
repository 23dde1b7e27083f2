use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};
use crate::models::MovieRecord;

/// One column of a serialized data frame
///
/// Accepts either a plain JSON array or an object keyed by row index
/// (`{"0": ..., "1": ...}`), which is what a column-oriented dump produces.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Column<T> {
    Sequence(Vec<T>),
    Indexed(BTreeMap<String, T>),
}

impl<T> Column<T> {
    /// Converts the column into a map ordered by numeric row index
    fn into_rows(self, name: &str) -> AppResult<BTreeMap<usize, T>> {
        match self {
            Column::Sequence(values) => Ok(values.into_iter().enumerate().collect()),
            Column::Indexed(values) => {
                let mut rows = BTreeMap::new();
                for (key, value) in values {
                    let idx = key.parse::<usize>().map_err(|_| {
                        AppError::InvalidArtifact(format!(
                            "column '{}' has non-numeric row index '{}'",
                            name, key
                        ))
                    })?;
                    if rows.insert(idx, value).is_some() {
                        return Err(AppError::InvalidArtifact(format!(
                            "column '{}' has more than one entry for row {}",
                            name, idx
                        )));
                    }
                }
                Ok(rows)
            }
        }
    }
}

/// On-disk catalog: parallel columns, one entry per movie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogArtifact {
    pub movie_id: Column<i64>,
    pub title: Column<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<Column<Option<String>>>,
}

/// Records decoded from a catalog artifact
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCatalog {
    pub records: Vec<MovieRecord>,
    /// Positions of records with no poster entry at all (not even `null`)
    pub missing_posters: Vec<usize>,
}

impl CatalogArtifact {
    /// Builds an artifact with a complete `poster_path` column
    pub fn from_records(records: &[MovieRecord]) -> Self {
        let mut movie_id = BTreeMap::new();
        let mut title = BTreeMap::new();
        let mut poster_path = BTreeMap::new();

        for (idx, record) in records.iter().enumerate() {
            let key = idx.to_string();
            movie_id.insert(key.clone(), record.id);
            title.insert(key.clone(), record.title.clone());
            poster_path.insert(key, record.poster_path.clone());
        }

        Self {
            movie_id: Column::Indexed(movie_id),
            title: Column::Indexed(title),
            poster_path: Some(Column::Indexed(poster_path)),
        }
    }

    /// Decodes the columns into records ordered by row index
    ///
    /// `movie_id` and `title` must cover exactly the same rows. Poster entries for
    /// unknown rows are rejected; rows without a poster entry are reported as missing.
    pub fn into_records(self) -> AppResult<DecodedCatalog> {
        let ids = self.movie_id.into_rows("movie_id")?;
        let mut titles = self.title.into_rows("title")?;
        let mut posters = match self.poster_path {
            Some(column) => Some(column.into_rows("poster_path")?),
            None => None,
        };

        if ids.len() != titles.len() {
            return Err(AppError::InvalidArtifact(format!(
                "column length mismatch: {} movie ids, {} titles",
                ids.len(),
                titles.len()
            )));
        }

        let mut records = Vec::with_capacity(ids.len());
        let mut missing_posters = Vec::new();

        for (position, (row, id)) in ids.into_iter().enumerate() {
            let title = titles.remove(&row).ok_or_else(|| {
                AppError::InvalidArtifact(format!("row {} has a movie id but no title", row))
            })?;

            let poster_path = match posters.as_mut().and_then(|p| p.remove(&row)) {
                Some(path) => path,
                None => {
                    missing_posters.push(position);
                    None
                }
            };

            records.push(MovieRecord {
                id,
                title,
                poster_path,
            });
        }

        if let Some(leftover) = posters.filter(|p| !p.is_empty()) {
            return Err(AppError::InvalidArtifact(format!(
                "poster_path has {} entries for rows not in the catalog",
                leftover.len()
            )));
        }

        Ok(DecodedCatalog {
            records,
            missing_posters,
        })
    }
}
