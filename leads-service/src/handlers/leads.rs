use crate::models::{Lead, LEAD_COLLECTION};
use crate::services::create_document;
use crate::startup::AppState;
use axum::{extract::State, Json};
use metrics::counter;
use serde::Serialize;
use service_core::error::AppError;
use service_core::extract::AppJson;
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct CreateLeadResponse {
    pub status: String,
    pub id: String,
}

#[tracing::instrument(skip(state, lead))]
pub async fn create_lead(
    State(state): State<AppState>,
    AppJson(lead): AppJson<Lead>,
) -> Result<Json<CreateLeadResponse>, AppError> {
    lead.validate()?;

    let store = state.store.as_deref().ok_or_else(|| {
        counter!("lead_insert_failures_total").increment(1);
        AppError::StoreUnavailable
    })?;

    let id = create_document(store, LEAD_COLLECTION, &lead)
        .await
        .map_err(|e| {
            counter!("lead_insert_failures_total").increment(1);
            tracing::error!(error = %e, "Failed to store lead");
            e
        })?;

    counter!("leads_created_total").increment(1);
    tracing::info!(lead_id = %id, "Lead stored");

    Ok(Json(CreateLeadResponse {
        status: "ok".to_string(),
        id,
    }))
}
