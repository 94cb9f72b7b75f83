//! Keyword match report: which job keywords the resume already covers.
//!
//! Uses the same whole-term matcher as enrichment, so "Java" is not counted
//! as present in a resume that only mentions "JavaScript".

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::keywords::enrichment::{dedup_ignore_case, TermMatcher};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordMatchReport {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    /// matched / total, 0.0 when there are no keywords.
    pub match_ratio: f32,
}

/// Splits `keywords` into those present in `resume_text` and those missing.
pub fn match_keywords(keywords: &[String], resume_text: &str) -> KeywordMatchReport {
    let keywords = dedup_ignore_case(keywords.to_vec());
    let mut matched = Vec::new();
    let mut missing = Vec::new();

    for keyword in keywords {
        let present = match TermMatcher::new(&keyword) {
            Ok(matcher) => matcher.is_match(resume_text),
            Err(e) => {
                warn!("Keyword '{}' could not be compiled ({}); using substring match", keyword, e);
                resume_text
                    .to_lowercase()
                    .contains(&keyword.to_lowercase())
            }
        };
        if present {
            matched.push(keyword);
        } else {
            missing.push(keyword);
        }
    }

    let total = matched.len() + missing.len();
    let match_ratio = if total > 0 {
        matched.len() as f32 / total as f32
    } else {
        0.0
    };

    KeywordMatchReport {
        matched,
        missing,
        match_ratio,
    }
}
