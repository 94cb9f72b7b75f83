//! Keyword response parser: turns free-form model output into a keyword list.
//!
//! The model is asked for a JSON array, but answers arrive wrapped in prose,
//! code fences, or as plain lists. Strategies are tried in order and the first
//! one that yields a non-empty list of strings wins:
//!
//! 1. direct JSON array (after fence stripping)
//! 2. first bracketed `[...]` substring parsed as JSON
//! 3. comma-separated list
//! 4. quoted substrings
//! 5. whitespace tokens minus stopwords, capped
//!
//! Parsing never fails; if every strategy comes up empty the result is empty.

use std::sync::LazyLock;

use regex::Regex;

use crate::keywords::fallback::is_stopword;

/// Cap on the number of terms the whitespace strategy may return.
pub const MAX_TOKEN_KEYWORDS: usize = 20;

static RE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z]*").expect("valid fence regex"));

static RE_BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\[\]]*\]").expect("valid bracket regex"));

static RE_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"\n]+)"|'([^'\n]+)'"#).expect("valid quoted-term regex")
});

/// Parses a raw model response into an ordered list of keyword strings.
pub fn parse_keyword_response(raw: &str) -> Vec<String> {
    let text = strip_code_fences(raw);
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let strategies: [fn(&str) -> Option<Vec<String>>; 5] = [
        parse_json_array,
        parse_bracketed_array,
        parse_comma_list,
        parse_quoted_terms,
        parse_tokens,
    ];

    strategies
        .iter()
        .find_map(|strategy| strategy(text))
        .unwrap_or_default()
}

/// Removes every code-fence marker (```json, ```, ...) from the text.
pub fn strip_code_fences(text: &str) -> String {
    RE_FENCE.replace_all(text, "").into_owned()
}

fn non_empty(terms: Vec<String>) -> Option<Vec<String>> {
    let terms: Vec<String> = terms
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    (!terms.is_empty()).then_some(terms)
}

fn parse_json_array(text: &str) -> Option<Vec<String>> {
    serde_json::from_str::<Vec<String>>(text)
        .ok()
        .and_then(non_empty)
}

fn parse_bracketed_array(text: &str) -> Option<Vec<String>> {
    let candidate = RE_BRACKETED.find(text)?;
    parse_json_array(candidate.as_str())
}

fn parse_comma_list(text: &str) -> Option<Vec<String>> {
    if !text.contains(',') {
        return None;
    }
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '"' | '\''))
        .collect();
    non_empty(stripped.split(',').map(str::to_string).collect())
}

fn parse_quoted_terms(text: &str) -> Option<Vec<String>> {
    let terms = RE_QUOTED
        .captures_iter(text)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .collect();
    non_empty(terms)
}

fn parse_tokens(text: &str) -> Option<Vec<String>> {
    let mut terms: Vec<String> = Vec::new();
    for token in text.split_whitespace() {
        let token = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '+' && c != '#');
        if token.chars().count() <= 2 || is_stopword(&token.to_lowercase()) {
            continue;
        }
        if terms.iter().any(|t| t.eq_ignore_ascii_case(token)) {
            continue;
        }
        terms.push(token.to_string());
        if terms.len() == MAX_TOKEN_KEYWORDS {
            break;
        }
    }
    non_empty(terms)
}
