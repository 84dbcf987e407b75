use crate::startup::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use metrics::{counter, histogram};
use service_core::error::AppError;

pub const ARCHIVE_FILENAME: &str = "backend.tar.gz";

pub async fn download_backend(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let archive = state.exporter.export_blocking().await?;

    counter!("archive_exports_total").increment(1);
    histogram!("archive_export_bytes").record(archive.bytes.len() as f64);
    tracing::info!(
        entries = archive.entries,
        skipped = archive.skipped,
        size = archive.bytes.len(),
        "Backend archive exported"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/gzip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", ARCHIVE_FILENAME),
            ),
        ],
        archive.bytes,
    ))
}
