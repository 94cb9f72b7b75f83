//! Axum route handlers for the Keywords API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::keywords::extractor::KeywordExtraction;
use crate::keywords::matching::{match_keywords, KeywordMatchReport};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractKeywordsRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct KeywordStatusResponse {
    pub api_validated: bool,
    pub api_key_configured: bool,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct MatchKeywordsRequest {
    pub resume_text: String,
    pub keywords: Option<Vec<String>>,
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchKeywordsResponse {
    pub report: KeywordMatchReport,
    /// Present when keywords were extracted from `job_description` for this call.
    pub extraction: Option<KeywordExtraction>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/keywords
///
/// Always answers 200: failures upstream come back as a fallback extraction
/// carrying a warning.
pub async fn handle_extract_keywords(
    State(state): State<AppState>,
    Json(request): Json<ExtractKeywordsRequest>,
) -> Json<KeywordExtraction> {
    Json(state.extractor.extract(&request.text).await)
}

/// GET /api/v1/keywords/status
pub async fn handle_keyword_status(State(state): State<AppState>) -> Json<KeywordStatusResponse> {
    Json(KeywordStatusResponse {
        api_validated: state.extractor.context().api_validated().await,
        api_key_configured: state.config.openai_api_key.is_some(),
        model: state.config.model.clone(),
    })
}

/// POST /api/v1/keywords/match
///
/// Scores a resume against explicit keywords, or against keywords extracted
/// from `job_description` when none are given.
pub async fn handle_match_keywords(
    State(state): State<AppState>,
    Json(request): Json<MatchKeywordsRequest>,
) -> Result<Json<MatchKeywordsResponse>, AppError> {
    let (keywords, extraction) = match (request.keywords, request.job_description) {
        (Some(keywords), _) => (keywords, None),
        (None, Some(job_description)) => {
            let extraction = state.extractor.extract(&job_description).await;
            (extraction.keywords.clone(), Some(extraction))
        }
        (None, None) => {
            return Err(AppError::Validation(
                "Either keywords or job_description must be provided".to_string(),
            ))
        }
    };

    let report = match_keywords(&keywords, &request.resume_text);

    Ok(Json(MatchKeywordsResponse { report, extraction }))
}
