//! Axum route handlers for the Formatting API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::formatting::formatter::{Document, FormatOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FormatRequest {
    pub document: Document,
    /// Reprocess even if the document is already formatted.
    #[serde(default)]
    pub force: bool,
}

/// POST /api/v1/format
///
/// Always answers 200; on failure the original content comes back with a warning.
pub async fn handle_format(
    State(state): State<AppState>,
    Json(request): Json<FormatRequest>,
) -> Json<FormatOutcome> {
    let document = if request.force {
        request.document.into_raw()
    } else {
        request.document
    };
    Json(state.formatter.format(document).await)
}
