use std::sync::Arc;

use crate::config::Config;
use crate::formatting::formatter::ResumeFormatter;
use crate::keywords::extractor::KeywordExtractor;
use crate::llm_client::ChatTransport;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Transport for one-shot calls such as cover letters. In production this
    /// is the same `LlmClient` the orchestrators hold.
    pub llm: Arc<dyn ChatTransport>,
    /// Owns the keyword cache, in-flight map and API validation record.
    pub extractor: Arc<KeywordExtractor>,
    pub formatter: Arc<ResumeFormatter>,
}
