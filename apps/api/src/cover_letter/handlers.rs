//! Axum route handlers for the Cover Letter API.

use axum::{extract::State, Json};

use crate::cover_letter::{generate_cover_letter, CoverLetterRequest, CoverLetterResponse};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let cover_letter =
        generate_cover_letter(state.llm.as_ref(), &request, state.config.request_deadline).await?;
    Ok(Json(CoverLetterResponse { cover_letter }))
}
