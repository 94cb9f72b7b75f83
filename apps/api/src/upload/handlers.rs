//! Axum route handler for resume uploads.

use axum::extract::Multipart;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::upload::read_upload;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub content: Option<String>,
    pub file_name: Option<String>,
    pub message: Option<String>,
}

/// POST /api/v1/upload
///
/// Multipart body with a `file` field. Unreadable files answer 200 with
/// `success: false`; a malformed request is a validation error.
pub async fn handle_upload(mut multipart: Multipart) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        let response = match read_upload(file_name.clone(), bytes.to_vec()).await {
            Ok(content) => {
                info!("Extracted {} chars from '{}'", content.chars().count(), file_name);
                UploadResponse {
                    success: true,
                    content: Some(content),
                    file_name: Some(file_name),
                    message: None,
                }
            }
            Err(e) => {
                warn!("Upload of '{}' failed: {}", file_name, e);
                UploadResponse {
                    success: false,
                    content: None,
                    file_name: Some(file_name),
                    message: Some(e.to_string()),
                }
            }
        };
        return Ok(Json(response));
    }

    Err(AppError::Validation(
        "Multipart body has no 'file' field".to_string(),
    ))
}
