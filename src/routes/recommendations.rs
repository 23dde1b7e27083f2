use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::RecommendationResponse,
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default)]
    pub title: Option<String>,
}

/// Handler for the recommendations endpoint
///
/// No selection is rejected here and never reaches the engine. Unknown titles
/// come back as an empty list.
pub async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let selected = match params.title {
        Some(title) if !title.is_empty() => title,
        _ => {
            tracing::warn!("Recommendation requested without a selected movie");
            return Err(AppError::InvalidInput("Please select a movie.".to_string()));
        }
    };

    let recommendations = state.engine.recommend(&selected);

    tracing::info!(
        title = %selected,
        results = recommendations.len(),
        "Recommendations served"
    );

    Ok(Json(RecommendationResponse::new(selected, &recommendations)))
}
