//! Keyword extraction orchestrator: the façade the UI calls.
//!
//! Flow: empty check → cache → probe memo → single-flight upstream call →
//!       parse → enrich → cache.
//!
//! Never fails: any upstream problem degrades to the local heuristic with a
//! warning the UI can show inline.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, OnceCell};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::keywords::enrichment::TermDictionary;
use crate::keywords::fallback::extract_keywords_locally;
use crate::keywords::parser::parse_keyword_response;
use crate::keywords::prompts::{
    KEYWORD_EXTRACTION_MAX_TOKENS, KEYWORD_EXTRACTION_PROMPT_TEMPLATE,
    KEYWORD_EXTRACTION_SYSTEM, KEYWORD_EXTRACTION_TEMPERATURE,
};
use crate::llm_client::{complete_within, ChatRequest, ChatTransport, LlmError};

/// Normalized characters kept in a fingerprint.
const FINGERPRINT_PREFIX_CHARS: usize = 50;

/// Queries this short are treated as API validation probes.
const PROBE_MAX_WORDS: usize = 4;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Cache and de-duplication key: normalized prefix plus normalized length.
///
/// Not collision-free. Two long postings sharing their first 50 normalized
/// characters and their length map to the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(text: &str) -> Self {
        let normalized = text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let prefix: String = normalized.chars().take(FINGERPRINT_PREFIX_CHARS).collect();
        Self(format!("{}:{}", prefix, normalized.chars().count()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where the returned keywords came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordSource {
    Model,
    Cache,
    Fallback,
    Empty,
}

/// Result handed to the keyword-match UI.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordExtraction {
    pub keywords: Vec<String>,
    pub source: KeywordSource,
    /// Inline, non-blocking message shown when results are degraded.
    pub warning: Option<String>,
}

impl KeywordExtraction {
    fn from_model(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            source: KeywordSource::Model,
            warning: None,
        }
    }

    fn from_cache(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            source: KeywordSource::Cache,
            warning: None,
        }
    }

    fn empty() -> Self {
        Self {
            keywords: Vec::new(),
            source: KeywordSource::Empty,
            warning: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractorSettings {
    /// Measured from creation; reads never refresh an entry.
    pub cache_ttl: Duration,
    /// Bound on one upstream call including its retries.
    pub deadline: Duration,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            deadline: Duration::from_secs(95),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared state
// ────────────────────────────────────────────────────────────────────────────

struct CacheEntry {
    keywords: Vec<String>,
    created_at: Instant,
}

/// Keywords and where the flight got them.
type FlightResult = Result<(Vec<String>, KeywordSource), String>;

/// One upstream call shared by every concurrent caller of a fingerprint.
/// `Err` carries the failure description.
type Flight = Arc<OnceCell<FlightResult>>;

#[derive(Default)]
struct Validation {
    api_validated: bool,
    probe: Option<(Fingerprint, Vec<String>)>,
}

/// Cache, in-flight calls and API validation for one extractor.
///
/// Constructed explicitly and owned by whoever builds the extractor, so tests
/// get a fresh one or call `reset()`.
#[derive(Default)]
pub struct ExtractionContext {
    cache: Mutex<HashMap<Fingerprint, CacheEntry>>,
    in_flight: Mutex<HashMap<Fingerprint, Flight>>,
    validation: Mutex<Validation>,
}

impl ExtractionContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn reset(&self) {
        self.cache.lock().await.clear();
        self.in_flight.lock().await.clear();
        *self.validation.lock().await = Validation::default();
    }

    /// True once any upstream call has succeeded in this process.
    pub async fn api_validated(&self) -> bool {
        self.validation.lock().await.api_validated
    }

    #[cfg(test)]
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    /// Fresh entry for `fingerprint`; a stale one is evicted and treated as absent.
    async fn cached(&self, fingerprint: &Fingerprint, ttl: Duration) -> Option<Vec<String>> {
        let mut cache = self.cache.lock().await;
        match cache.get(fingerprint) {
            Some(entry) if entry.created_at.elapsed() < ttl => Some(entry.keywords.clone()),
            Some(_) => {
                cache.remove(fingerprint);
                None
            }
            None => None,
        }
    }

    /// Inserts an entry and drops every expired one.
    async fn store(&self, fingerprint: Fingerprint, keywords: Vec<String>, ttl: Duration) {
        let mut cache = self.cache.lock().await;
        cache.retain(|_, entry| entry.created_at.elapsed() < ttl);
        cache.insert(
            fingerprint,
            CacheEntry {
                keywords,
                created_at: Instant::now(),
            },
        );
    }

    async fn join_flight(&self, fingerprint: &Fingerprint) -> Flight {
        self.in_flight
            .lock()
            .await
            .entry(fingerprint.clone())
            .or_default()
            .clone()
    }

    /// Removes the flight if it is still the registered one for `fingerprint`.
    async fn leave_flight(&self, fingerprint: &Fingerprint, flight: &Flight) {
        let mut in_flight = self.in_flight.lock().await;
        if in_flight
            .get(fingerprint)
            .is_some_and(|current| Arc::ptr_eq(current, flight))
        {
            in_flight.remove(fingerprint);
        }
    }

    async fn probe_answer(&self, fingerprint: &Fingerprint) -> Option<Vec<String>> {
        let validation = self.validation.lock().await;
        validation
            .probe
            .as_ref()
            .filter(|(fp, _)| fp == fingerprint)
            .map(|(_, keywords)| keywords.clone())
    }

    async fn record_success(&self, fingerprint: &Fingerprint, keywords: &[String], is_probe: bool) {
        let mut validation = self.validation.lock().await;
        if !validation.api_validated {
            info!("LLM API validated by first successful extraction");
        }
        validation.api_validated = true;
        if is_probe && validation.probe.is_none() {
            validation.probe = Some((fingerprint.clone(), keywords.to_vec()));
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub struct KeywordExtractor {
    transport: Arc<dyn ChatTransport>,
    context: Arc<ExtractionContext>,
    dictionary: TermDictionary,
    settings: ExtractorSettings,
}

impl KeywordExtractor {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        context: Arc<ExtractionContext>,
        dictionary: TermDictionary,
        settings: ExtractorSettings,
    ) -> Self {
        Self {
            transport,
            context,
            dictionary,
            settings,
        }
    }

    pub fn context(&self) -> &ExtractionContext {
        &self.context
    }

    /// Extracts keywords from a job description. Never fails.
    pub async fn extract(&self, text: &str) -> KeywordExtraction {
        if text.trim().is_empty() {
            return KeywordExtraction::empty();
        }

        let fingerprint = Fingerprint::of(text);

        if let Some(keywords) = self
            .context
            .cached(&fingerprint, self.settings.cache_ttl)
            .await
        {
            debug!("Keyword cache hit for {}", fingerprint.as_str());
            return KeywordExtraction::from_cache(keywords);
        }

        let is_probe = is_probe_query(text);
        if is_probe {
            if let Some(keywords) = self.context.probe_answer(&fingerprint).await {
                debug!("Answering repeated probe query from validation record");
                return KeywordExtraction::from_cache(keywords);
            }
        }

        match self.shared_fetch(text, &fingerprint, is_probe).await {
            Ok((keywords, KeywordSource::Model)) => {
                self.context
                    .record_success(&fingerprint, &keywords, is_probe)
                    .await;
                KeywordExtraction::from_model(keywords)
            }
            Ok((keywords, _)) => KeywordExtraction::from_cache(keywords),
            Err(reason) => {
                let keywords = extract_keywords_locally(text);
                warn!(
                    "Keyword extraction fell back to local heuristic ({} keywords): {}",
                    keywords.len(),
                    reason
                );
                KeywordExtraction {
                    keywords,
                    source: KeywordSource::Fallback,
                    warning: Some(format!(
                        "AI keyword extraction is unavailable ({reason}). Showing basic keywords instead."
                    )),
                }
            }
        }
    }

    /// Joins (or starts) the flight for `fingerprint` and awaits its result.
    ///
    /// The flight's leader re-reads the cache first: a caller that missed the
    /// cache just before an earlier leader stored its entry and left must not
    /// go upstream again.
    async fn shared_fetch(
        &self,
        text: &str,
        fingerprint: &Fingerprint,
        is_probe: bool,
    ) -> FlightResult {
        let flight = self.context.join_flight(fingerprint).await;
        let outcome = flight
            .get_or_init(|| async {
                if let Some(keywords) = self
                    .context
                    .cached(fingerprint, self.settings.cache_ttl)
                    .await
                {
                    return Ok((keywords, KeywordSource::Cache));
                }
                self.fetch(text, fingerprint, is_probe)
                    .await
                    .map(|keywords| (keywords, KeywordSource::Model))
            })
            .await
            .clone();
        self.context.leave_flight(fingerprint, &flight).await;
        outcome
    }

    /// The one upstream call behind a flight. Caches on success.
    ///
    /// Probe queries get no retries so a dead API is detected quickly.
    async fn fetch(
        &self,
        text: &str,
        fingerprint: &Fingerprint,
        is_probe: bool,
    ) -> Result<Vec<String>, String> {
        let prompt = KEYWORD_EXTRACTION_PROMPT_TEMPLATE.replace("{job_description}", text);
        let mut request = ChatRequest::new(KEYWORD_EXTRACTION_SYSTEM, prompt)
            .max_tokens(KEYWORD_EXTRACTION_MAX_TOKENS)
            .temperature(KEYWORD_EXTRACTION_TEMPERATURE);
        if is_probe {
            request = request.retries(0);
        }

        let raw = complete_within(self.transport.as_ref(), &request, self.settings.deadline)
            .await
            .map_err(|e| e.to_string())?;

        if raw.trim().is_empty() {
            return Err(LlmError::EmptyContent.to_string());
        }

        let parsed = parse_keyword_response(&raw);
        let parsed_count = parsed.len();
        let keywords = self.dictionary.enrich(parsed, text, &raw);
        info!(
            "Extracted {} keywords ({} parsed, {} from enrichment)",
            keywords.len(),
            parsed_count,
            keywords.len().saturating_sub(parsed_count)
        );

        self.context
            .store(fingerprint.clone(), keywords.clone(), self.settings.cache_ttl)
            .await;
        Ok(keywords)
    }
}

/// Short, generic queries double as API connectivity probes.
fn is_probe_query(text: &str) -> bool {
    text.split_whitespace().count() <= PROBE_MAX_WORDS
}
