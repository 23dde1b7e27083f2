use axum::{extract::State, Json};

use crate::routes::AppState;

/// Lists every title in catalog order, for the selection control
pub async fn list(State(state): State<AppState>) -> Json<Vec<String>> {
    let titles = state
        .engine
        .catalog()
        .titles()
        .map(str::to_string)
        .collect();
    Json(titles)
}
