//! Statement upload and extraction lookup

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info};

use crate::{AppError, AppState, ExtractionRecord, ExtractionStatus};
use mutasi_core::{detect_format, run_extraction, ExtractionResult};

/// Body of `POST /api/upload`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub id: String,
    pub status: ExtractionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ExtractionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The `file` part of an upload form
struct UploadedFile {
    file_name: String,
    mime: Option<String>,
    data: Vec<u8>,
}

fn too_large(state: &AppState) -> AppError {
    AppError::bad_request(&format!(
        "File too large. Maximum size is {} MB",
        state.config.max_upload_mb()
    ))
}

async fn read_upload(state: &AppState, multipart: &mut Multipart) -> Result<UploadedFile, AppError> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            too_large(state)
        } else {
            AppError::bad_request(&format!("Failed to read form field: {}", e))
        }
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("").to_string();
        let mime = field
            .content_type()
            .map(|m| m.to_string())
            .filter(|m| !m.is_empty());

        let bytes = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                too_large(state)
            } else {
                AppError::bad_request("Failed to read file data")
            }
        })?;

        if bytes.len() > state.config.max_upload_bytes {
            return Err(too_large(state));
        }

        upload = Some(UploadedFile {
            file_name,
            mime,
            data: bytes.to_vec(),
        });
    }

    upload.ok_or_else(|| AppError::bad_request("No file uploaded"))
}

/// POST /api/upload - extract transactions from one statement file
///
/// Request validation (missing file, size, type) happens before a record is
/// created; only accepted uploads get an id.
pub async fn upload_statement(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = read_upload(&state, &mut multipart).await?;

    detect_format(&upload.file_name, upload.mime.as_deref())
        .map_err(|e| AppError::bad_request(&e.to_string()))?;

    let ai = state
        .ai
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("AI backend not configured"))?;

    let id = state.store.begin(&upload.file_name).await;
    info!(
        id = %id,
        file_name = %upload.file_name,
        mime = upload.mime.as_deref().unwrap_or("unknown"),
        size = upload.data.len(),
        "Processing upload"
    );

    let started = Instant::now();
    let outcome = run_extraction(
        ai,
        &upload.data,
        &upload.file_name,
        upload.mime.as_deref(),
    )
    .await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(result) => {
            info!(
                id = %id,
                transactions = result.summary.total_transactions,
                elapsed_ms,
                "Extraction completed"
            );
            state.store.complete(&id, result.clone(), elapsed_ms).await;

            Ok(Json(UploadResponse {
                id,
                status: ExtractionStatus::Completed,
                processing_time_ms: Some(elapsed_ms),
                result: Some(result),
                error: None,
            })
            .into_response())
        }
        Err(e) => {
            let message = e.to_string();
            error!(id = %id, error = %message, elapsed_ms, "Extraction failed");
            state.store.fail(&id, message.clone(), elapsed_ms).await;

            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            let body = UploadResponse {
                id,
                status: ExtractionStatus::Failed,
                processing_time_ms: None,
                result: None,
                error: Some(message),
            };
            Ok((status, Json(body)).into_response())
        }
    }
}

/// GET /api/extraction/:id - fetch a stored extraction record
pub async fn get_extraction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ExtractionRecord>, AppError> {
    state
        .store
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("Extraction not found"))
}
