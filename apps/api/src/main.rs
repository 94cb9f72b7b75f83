mod config;
mod cover_letter;
mod errors;
mod formatting;
mod keywords;
mod llm_client;
mod routes;
mod state;
mod upload;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::formatting::formatter::{FormatterSettings, ResumeFormatter};
use crate::keywords::enrichment::TermDictionary;
use crate::keywords::extractor::{ExtractionContext, ExtractorSettings, KeywordExtractor};
use crate::llm_client::{ChatTransport, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let client = LlmClient::new(config.openai_api_key.clone(), config.llm_defaults());
    if !client.has_api_key() {
        warn!("OPENAI_API_KEY is not set; keyword extraction and formatting will use local fallbacks");
    }
    info!("LLM client initialized (model: {})", client.model());
    let llm: Arc<dyn ChatTransport> = Arc::new(client);

    let dictionary = TermDictionary::default();
    info!("Keyword dictionary loaded ({} terms)", dictionary.term_count());

    let extractor = KeywordExtractor::new(
        llm.clone(),
        Arc::new(ExtractionContext::new()),
        dictionary,
        ExtractorSettings {
            cache_ttl: config.keyword_cache_ttl,
            deadline: config.request_deadline,
        },
    );

    let formatter = ResumeFormatter::new(
        llm.clone(),
        FormatterSettings {
            max_chars: config.format_max_chars,
            deadline: config.request_deadline,
        },
    );

    let state = AppState {
        config: config.clone(),
        llm,
        extractor: Arc::new(extractor),
        formatter: Arc::new(formatter),
    };

    // The desktop shell talks to us over loopback only.
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
