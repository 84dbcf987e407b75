use crate::services::{DatabaseProbe, DiagnosticsResponse};
use crate::startup::AppState;
use axum::{extract::State, Json};

/// Always answers 200; probe failures are described in the body.
pub async fn test_database(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    let probe = DatabaseProbe::run(state.store.as_deref()).await;
    Json(DiagnosticsResponse::render(
        probe,
        state.database_env.url_set,
        state.database_env.name_set,
    ))
}
