//! Cover letter generation: one transport call with its own prompt.
//!
//! Unlike extraction and formatting this is an explicit user action, so
//! failures surface as errors instead of degrading silently.

pub mod handlers;
pub mod prompts;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cover_letter::prompts::{
    COVER_LETTER_MAX_TOKENS, COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM,
    COVER_LETTER_TEMPERATURE,
};
use crate::errors::AppError;
use crate::formatting::cleanup::{remove_code_fences, truncate_at_commentary};
use crate::llm_client::prompts::NO_COMMENTARY_INSTRUCTION;
use crate::llm_client::{complete_within, ChatRequest, ChatTransport};

#[derive(Debug, Clone, Deserialize)]
pub struct CoverLetterRequest {
    pub resume_text: String,
    pub job_description: String,
    pub company: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

/// Generates a cover letter for `request`, bounded by `deadline`.
pub async fn generate_cover_letter(
    transport: &dyn ChatTransport,
    request: &CoverLetterRequest,
    deadline: Duration,
) -> Result<String, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let prompt = COVER_LETTER_PROMPT_TEMPLATE
        .replace("{target}", &describe_target(request))
        .replace("{no_commentary}", NO_COMMENTARY_INSTRUCTION)
        .replace("{resume}", request.resume_text.trim())
        .replace("{job_description}", request.job_description.trim());

    let chat = ChatRequest::new(COVER_LETTER_SYSTEM, prompt)
        .max_tokens(COVER_LETTER_MAX_TOKENS)
        .temperature(COVER_LETTER_TEMPERATURE);

    let raw = complete_within(transport, &chat, deadline)
        .await
        .map_err(|e| AppError::Llm(format!("Cover letter generation failed: {e}")))?;

    let fenceless = remove_code_fences(&raw);
    let letter = truncate_at_commentary(&fenceless).trim().to_string();
    if letter.is_empty() {
        return Err(AppError::Llm(
            "Cover letter generation returned no content".to_string(),
        ));
    }

    info!("Generated cover letter ({} words)", letter.split_whitespace().count());
    Ok(letter)
}

fn describe_target(request: &CoverLetterRequest) -> String {
    let role = request.role.as_deref().map(str::trim).filter(|r| !r.is_empty());
    let company = request
        .company
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    match (role, company) {
        (Some(role), Some(company)) => format!(" ({role} at {company})"),
        (Some(role), None) => format!(" ({role})"),
        (None, Some(company)) => format!(" (at {company})"),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubTransport {
        reply: Result<&'static str, ()>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatTransport for StubTransport {
        async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(request.user_prompt.clone());
            self.reply
                .map(str::to_string)
                .map_err(|_| LlmError::MissingApiKey)
        }
    }

    fn stub(reply: Result<&'static str, ()>) -> StubTransport {
        StubTransport {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn request() -> CoverLetterRequest {
        CoverLetterRequest {
            resume_text: "Jane Doe. Rust engineer, 6 years.".to_string(),
            job_description: "Senior Rust Engineer at Acme".to_string(),
            company: Some("Acme".to_string()),
            role: Some("Senior Rust Engineer".to_string()),
        }
    }

    #[tokio::test]
    async fn test_generates_and_strips_commentary() {
        let transport = stub(Ok("```\nDear Acme team,\n\nI build Rust services.\n```\nNote: Here's the formatted letter"));
        let letter = generate_cover_letter(&transport, &request(), Duration::from_secs(90))
            .await
            .unwrap();

        assert_eq!(letter, "Dear Acme team,\n\nI build Rust services.");
        let prompts = transport.prompts.lock().unwrap();
        assert!(prompts[0].contains("(Senior Rust Engineer at Acme)"));
        assert!(prompts[0].contains("Jane Doe. Rust engineer, 6 years."));
    }

    #[tokio::test]
    async fn test_trailing_note_line_is_removed() {
        let transport = stub(Ok("Dear Acme team,\n\nI ship Rust daily.\n\nNote: I've formatted this as plain text."));
        let letter = generate_cover_letter(&transport, &request(), Duration::from_secs(90))
            .await
            .unwrap();

        assert_eq!(letter, "Dear Acme team,\n\nI ship Rust daily.");
    }

    #[tokio::test]
    async fn test_empty_inputs_are_rejected_before_calling() {
        let transport = stub(Ok("letter"));
        let mut req = request();
        req.job_description = "   ".to_string();

        let result = generate_cover_letter(&transport, &req, Duration::from_secs(90)).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(transport.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_llm_error() {
        let transport = stub(Err(()));
        let result = generate_cover_letter(&transport, &request(), Duration::from_secs(90)).await;
        match result {
            Err(AppError::Llm(message)) => assert!(message.contains("OPENAI_API_KEY")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_describe_target_variants() {
        let mut req = request();
        assert_eq!(describe_target(&req), " (Senior Rust Engineer at Acme)");
        req.company = None;
        assert_eq!(describe_target(&req), " (Senior Rust Engineer)");
        req.role = Some("  ".to_string());
        assert_eq!(describe_target(&req), "");
    }
}
