pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::cover_letter::handlers as cover_letter;
use crate::errors::AppError;
use crate::formatting::handlers as formatting;
use crate::keywords::handlers as keywords;
use crate::state::AppState;
use crate::upload::handlers as upload;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Keywords API
        .route("/api/v1/keywords", post(keywords::handle_extract_keywords))
        .route(
            "/api/v1/keywords/status",
            get(keywords::handle_keyword_status),
        )
        .route(
            "/api/v1/keywords/match",
            post(keywords::handle_match_keywords),
        )
        // Formatting API
        .route("/api/v1/format", post(formatting::handle_format))
        // Cover letter API
        .route(
            "/api/v1/cover-letter",
            post(cover_letter::handle_cover_letter),
        )
        // Upload API
        .route("/api/v1/upload", post(upload::handle_upload))
        .fallback(not_found)
        .with_state(state)
}
