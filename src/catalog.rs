use std::path::{Path, PathBuf};

use crate::{
    error::{AppError, AppResult},
    models::{CatalogArtifact, DecodedCatalog, MovieRecord},
    services::posters::PosterResolver,
};

/// Dense, row-indexed similarity scores
///
/// Row `i`, column `j` is the similarity of movie `i` to movie `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    /// Wraps the rows, rejecting anything that is not square or not finite
    pub fn new(rows: Vec<Vec<f64>>) -> AppResult<Self> {
        let size = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != size) {
            return Err(AppError::InvalidArtifact(format!(
                "similarity matrix is not square: row {} has {} columns, expected {}",
                i,
                row.len(),
                size
            )));
        }
        for (i, row) in rows.iter().enumerate() {
            if let Some(j) = row.iter().position(|score| !score.is_finite()) {
                return Err(AppError::InvalidArtifact(format!(
                    "similarity matrix has a non-finite score at ({}, {})",
                    i, j
                )));
            }
        }
        Ok(Self { rows })
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.rows[index]
    }
}

/// Movie records plus their similarity matrix, index-aligned
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<MovieRecord>,
    similarity: SimilarityMatrix,
}

impl Catalog {
    /// Pairs records with a matrix of matching dimension
    pub fn new(records: Vec<MovieRecord>, similarity: SimilarityMatrix) -> AppResult<Self> {
        ensure_aligned(&records, &similarity)?;
        Ok(Self {
            records,
            similarity,
        })
    }

    /// Loads both artifacts, backfilling and persisting missing poster paths first
    pub async fn load(
        catalog_path: &Path,
        similarity_path: &Path,
        resolver: &PosterResolver,
    ) -> AppResult<Self> {
        let DecodedCatalog {
            mut records,
            missing_posters,
        } = read_catalog(catalog_path).await?;
        let similarity = read_similarity(similarity_path).await?;

        tracing::info!(
            records = records.len(),
            missing_posters = missing_posters.len(),
            catalog = %catalog_path.display(),
            "Catalog loaded"
        );

        // Checked before the backfill so a bad matrix fails fast
        ensure_aligned(&records, &similarity)?;

        if !missing_posters.is_empty() {
            resolver.backfill(&mut records, &missing_posters).await;
            write_catalog(catalog_path, &records).await?;
        }

        Self::new(records, similarity)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of the first record whose title matches exactly
    pub fn find_index_by_title(&self, title: &str) -> Option<usize> {
        self.records.iter().position(|record| record.title == title)
    }

    /// Record at `index`
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn record_at(&self, index: usize) -> &MovieRecord {
        &self.records[index]
    }

    /// Similarity scores of movie `index` against every movie
    pub fn similarity_row(&self, index: usize) -> &[f64] {
        self.similarity.row(index)
    }

    /// All titles in catalog order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.title.as_str())
    }
}

fn ensure_aligned(records: &[MovieRecord], similarity: &SimilarityMatrix) -> AppResult<()> {
    if similarity.size() != records.len() {
        return Err(AppError::InvalidArtifact(format!(
            "similarity matrix is {0}x{0} but the catalog has {1} movies",
            similarity.size(),
            records.len()
        )));
    }
    Ok(())
}

async fn read_catalog(path: &Path) -> AppResult<DecodedCatalog> {
    let raw = tokio::fs::read_to_string(path).await?;
    let artifact: CatalogArtifact = serde_json::from_str(&raw)?;
    artifact.into_records()
}

async fn read_similarity(path: &Path) -> AppResult<SimilarityMatrix> {
    let raw = tokio::fs::read_to_string(path).await?;
    let rows: Vec<Vec<f64>> = serde_json::from_str(&raw)?;
    SimilarityMatrix::new(rows)
}

/// Overwrites the catalog artifact, via a sibling temp file and rename
pub async fn write_catalog(path: &Path, records: &[MovieRecord]) -> AppResult<()> {
    let json = serde_json::to_string(&CatalogArtifact::from_records(records))?;

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).ok_or_else(|| {
        AppError::Internal(format!("catalog path has no file name: {}", path.display()))
    })?;
    tmp_name.push(".tmp");
    let tmp_path: PathBuf = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, json).await?;
    tokio::fs::rename(&tmp_path, path).await?;

    tracing::info!(
        records = records.len(),
        catalog = %path.display(),
        "Catalog persisted"
    );

    Ok(())
}
