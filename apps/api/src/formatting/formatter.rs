//! Resume formatting orchestrator.
//!
//! Flow: status check → cap input → pick HTML or text prompt → LLM →
//!       cleanup → append the untouched remainder.
//!
//! Formatting is best-effort. Every failure returns the original body marked
//! as formatted, so the editor is never blocked and never loops on retries.
//! Processing state lives in `Document::status`, never inside the body.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::formatting::cleanup::clean_formatted_response;
use crate::formatting::prompts::{
    FORMAT_HTML_PROMPT_TEMPLATE, FORMAT_MAX_TOKENS, FORMAT_SYSTEM, FORMAT_TEMPERATURE,
    FORMAT_TEXT_PROMPT_TEMPLATE,
};
use crate::llm_client::prompts::{NO_COMMENTARY_INSTRUCTION, PRESERVE_FACTS_INSTRUCTION};
use crate::llm_client::{complete_within, ChatRequest, ChatTransport};

static RE_HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][A-Za-z0-9]*(?:\s[^<>]*)?/?>").expect("valid tag regex"));

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Raw,
    Formatted,
}

/// Editor content plus its processing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub status: DocumentStatus,
    pub body: String,
}

impl Document {
    pub fn raw(body: impl Into<String>) -> Self {
        Self {
            status: DocumentStatus::Raw,
            body: body.into(),
        }
    }

    pub fn formatted(body: impl Into<String>) -> Self {
        Self {
            status: DocumentStatus::Formatted,
            body: body.into(),
        }
    }

    pub fn is_formatted(&self) -> bool {
        self.status == DocumentStatus::Formatted
    }

    /// Clears the formatted status so the next `format` call reprocesses.
    pub fn into_raw(self) -> Self {
        Self::raw(self.body)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormatOutcome {
    pub document: Document,
    /// Inline, non-blocking message for the editor.
    pub warning: Option<String>,
    /// True when part of the input was beyond the cap and not seen by the model.
    pub truncated: bool,
}

impl FormatOutcome {
    fn unchanged(document: Document) -> Self {
        Self {
            document,
            warning: None,
            truncated: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormatterSettings {
    /// Characters sent upstream; the rest is appended back verbatim.
    pub max_chars: usize,
    pub deadline: Duration,
}

impl Default for FormatterSettings {
    fn default() -> Self {
        Self {
            max_chars: 12_000,
            deadline: Duration::from_secs(95),
        }
    }
}

/// One formatting call's view of the input.
#[derive(Debug)]
struct FormattingJob<'a> {
    truncated: &'a str,
    remainder: &'a str,
    is_html: bool,
}

impl<'a> FormattingJob<'a> {
    fn new(body: &'a str, max_chars: usize) -> Self {
        let split = body
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(body.len());
        let (truncated, remainder) = body.split_at(split);
        Self {
            truncated,
            remainder,
            is_html: is_html(body),
        }
    }

    fn is_truncated(&self) -> bool {
        !self.remainder.is_empty()
    }

    fn request(&self) -> ChatRequest {
        let template = if self.is_html {
            FORMAT_HTML_PROMPT_TEMPLATE
        } else {
            FORMAT_TEXT_PROMPT_TEMPLATE
        };
        let prompt = template
            .replace("{preserve_facts}", PRESERVE_FACTS_INSTRUCTION)
            .replace("{no_commentary}", NO_COMMENTARY_INSTRUCTION)
            .replace("{content}", self.truncated);

        ChatRequest::new(FORMAT_SYSTEM, prompt)
            .max_tokens(FORMAT_MAX_TOKENS)
            .temperature(FORMAT_TEMPERATURE)
    }
}

/// True when the text contains at least one HTML tag.
pub fn is_html(text: &str) -> bool {
    RE_HTML_TAG.is_match(text)
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub struct ResumeFormatter {
    transport: Arc<dyn ChatTransport>,
    settings: FormatterSettings,
}

impl ResumeFormatter {
    pub fn new(transport: Arc<dyn ChatTransport>, settings: FormatterSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Formats a raw document. Never fails; see module docs.
    pub async fn format(&self, document: Document) -> FormatOutcome {
        if document.is_formatted() {
            debug!("Document already formatted; skipping");
            return FormatOutcome::unchanged(document);
        }
        if document.body.trim().is_empty() {
            return FormatOutcome::unchanged(Document::formatted(document.body));
        }

        let job = FormattingJob::new(&document.body, self.settings.max_chars);
        let truncated = job.is_truncated();
        if truncated {
            warn!(
                "Resume exceeds {} characters; {} trailing characters will not be reformatted",
                self.settings.max_chars,
                job.remainder.chars().count()
            );
        }

        let raw = match complete_within(
            self.transport.as_ref(),
            &job.request(),
            self.settings.deadline,
        )
        .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Formatting failed, returning original content: {}", e);
                return FormatOutcome {
                    document: Document::formatted(document.body.clone()),
                    warning: Some(format!(
                        "AI formatting is unavailable ({e}). Your original content was kept."
                    )),
                    truncated,
                };
            }
        };

        let cleaned = clean_formatted_response(&raw, job.is_html);
        if cleaned.is_empty() {
            warn!("Formatting response was empty after cleanup; returning original content");
            return FormatOutcome {
                document: Document::formatted(document.body.clone()),
                warning: Some(
                    "The AI returned no usable content. Your original content was kept."
                        .to_string(),
                ),
                truncated,
            };
        }

        info!(
            "Formatted resume ({} mode): {} -> {} characters",
            if job.is_html { "html" } else { "text" },
            job.truncated.chars().count(),
            cleaned.chars().count()
        );

        let warning = truncated.then(|| {
            format!(
                "Only the first {} characters were reformatted; the rest was kept as-is.",
                self.settings.max_chars
            )
        });

        FormatOutcome {
            document: Document::formatted(format!("{cleaned}{}", job.remainder)),
            warning,
            truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingTransport {
        reply: Result<&'static str, ()>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl RecordingTransport {
        fn replying(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_prompt(&self) -> String {
            self.requests
                .lock()
                .unwrap()
                .last()
                .map(|r| r.user_prompt.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(()) => Err(LlmError::Timeout { attempts: 3 }),
            }
        }
    }

    fn formatter(transport: Arc<RecordingTransport>, max_chars: usize) -> ResumeFormatter {
        ResumeFormatter::new(
            transport,
            FormatterSettings {
                max_chars,
                deadline: Duration::from_secs(90),
            },
        )
    }

    const RESUME: &str = "Jane Doe\nEXPERIENCE\nAcme Corp 2020-2023\n• Built billing";

    #[tokio::test]
    async fn test_plain_text_is_formatted_with_markdown_prompt() {
        let transport = RecordingTransport::replying(
            "```markdown\n# Jane Doe\n\n## Experience\n**Acme Corp** | 2020-2023\n• Built billing\n```\nChanges Made:\n- headings",
        );
        let outcome = formatter(transport.clone(), 12_000)
            .format(Document::raw(RESUME))
            .await;

        assert_eq!(outcome.document.status, DocumentStatus::Formatted);
        assert_eq!(
            outcome.document.body,
            "# Jane Doe\n\n## Experience\n### Acme Corp | 2020-2023\n- Built billing"
        );
        assert!(outcome.warning.is_none());
        assert!(transport.last_prompt().contains("clean Markdown"));
        assert!(transport.last_prompt().contains(RESUME));
    }

    #[tokio::test]
    async fn test_html_input_uses_html_prompt() {
        let transport = RecordingTransport::replying("<h1>Jane Doe</h1><ul><li>• Built billing</li></ul>");
        let outcome = formatter(transport.clone(), 12_000)
            .format(Document::raw("<p>Jane Doe</p><p>• Built billing</p>"))
            .await;

        assert!(transport.last_prompt().contains("It is HTML"));
        assert_eq!(
            outcome.document.body,
            "<h1>Jane Doe</h1><ul><li>Built billing</li></ul>"
        );
    }

    #[tokio::test]
    async fn test_formatted_document_is_returned_untouched() {
        let transport = RecordingTransport::replying("# Something else");
        let document = Document::formatted("# Jane Doe\n\n- already done  \n");

        let outcome = formatter(transport.clone(), 12_000).format(document.clone()).await;

        assert_eq!(outcome.document, document);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_formatting_twice_is_a_no_op() {
        let transport = RecordingTransport::replying("# Jane Doe");
        let formatter = formatter(transport.clone(), 12_000);

        let first = formatter.format(Document::raw(RESUME)).await;
        let second = formatter.format(first.document.clone()).await;

        assert_eq!(first.document.body.as_bytes(), second.document.body.as_bytes());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_into_raw_forces_reprocessing() {
        let transport = RecordingTransport::replying("# Jane Doe");
        let formatter = formatter(transport.clone(), 12_000);

        let first = formatter.format(Document::raw(RESUME)).await;
        formatter.format(first.document.into_raw()).await;

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_returns_original_marked_formatted() {
        let transport = RecordingTransport::failing();
        let outcome = formatter(transport, 12_000).format(Document::raw(RESUME)).await;

        assert_eq!(outcome.document, Document::formatted(RESUME));
        assert!(outcome.warning.unwrap().contains("original content was kept"));
    }

    #[tokio::test]
    async fn test_empty_cleanup_returns_original() {
        let transport = RecordingTransport::replying("```\n```\n");
        let outcome = formatter(transport, 12_000).format(Document::raw(RESUME)).await;

        assert_eq!(outcome.document, Document::formatted(RESUME));
        assert!(outcome.warning.is_some());
    }

    #[tokio::test]
    async fn test_leading_lead_in_falls_back_to_original() {
        let transport = RecordingTransport::replying(
            "Sure! Here's the formatted resume:\n\n# Jane Doe\n\n## Experience\n- Built billing",
        );
        let outcome = formatter(transport, 12_000).format(Document::raw(RESUME)).await;

        assert_eq!(outcome.document, Document::formatted(RESUME));
        assert!(outcome.warning.is_some());
    }

    #[tokio::test]
    async fn test_blank_document_is_not_sent() {
        let transport = RecordingTransport::replying("# Jane Doe");
        let outcome = formatter(transport.clone(), 12_000)
            .format(Document::raw("  \n "))
            .await;

        assert_eq!(transport.calls(), 0);
        assert!(outcome.document.is_formatted());
        assert_eq!(outcome.document.body, "  \n ");
    }

    #[tokio::test]
    async fn test_truncated_remainder_is_merged_back() {
        let reply = "# Jane Doe\n\n- Built billing";
        let transport = RecordingTransport::replying(reply);
        let cap = 20;
        let body = format!("Jane Doe résumé — {}", "x".repeat(80));
        let original_len = body.chars().count();

        let outcome = formatter(transport.clone(), cap)
            .format(Document::raw(body.clone()))
            .await;

        let cleaned_len = clean_formatted_response(reply, false).chars().count();
        assert!(outcome.truncated);
        assert!(outcome.warning.is_some());
        assert_eq!(
            outcome.document.body.chars().count(),
            cleaned_len + (original_len - cap)
        );
        let sent: String = body.chars().take(cap).collect();
        let remainder: String = body.chars().skip(cap).collect();
        assert!(transport.last_prompt().contains(&sent));
        assert!(!transport.last_prompt().contains(&remainder));
        assert!(outcome.document.body.ends_with(&remainder));
    }

    #[test]
    fn test_html_detection() {
        assert!(is_html("<p>Hello</p>"));
        assert!(is_html("Intro <strong>bold</strong>"));
        assert!(is_html("line<br/>break"));
        assert!(!is_html("Reduced latency by <50ms and >2x throughput"));
        assert!(!is_html("Plain resume text"));
    }

    #[test]
    fn test_document_status_serde() {
        let doc: Document = serde_json::from_str(r#"{"body": "x"}"#).unwrap();
        assert_eq!(doc.status, DocumentStatus::Raw);
        let doc: Document = serde_json::from_str(r#"{"status": "formatted", "body": "x"}"#).unwrap();
        assert!(doc.is_formatted());
    }
}
