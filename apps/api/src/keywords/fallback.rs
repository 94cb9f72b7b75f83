//! Local keyword heuristic used whenever the model cannot be reached.
//!
//! Deterministic and cheap: lowercase, tokenize, drop stopwords and short
//! tokens, keep first-seen order, cap at `MAX_FALLBACK_KEYWORDS`.

pub const MAX_FALLBACK_KEYWORDS: usize = 20;

/// Words that carry no signal in a job posting.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "your", "our", "with", "this", "that",
    "from", "have", "has", "had", "will", "would", "should", "could", "can", "may", "must",
    "about", "into", "over", "such", "than", "then", "them", "they", "their", "there", "these",
    "those", "what", "when", "where", "which", "while", "who", "whom", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "only", "own", "same", "very",
    "just", "also", "been", "being", "were", "was", "its", "his", "her", "she", "him", "out",
    "off", "too", "per", "via", "etc", "able", "well", "work", "working", "including", "join",
    "team", "role", "position", "job", "company", "looking", "experience", "years", "year",
    "required", "preferred", "plus", "strong", "ability", "skills", "knowledge", "responsibilities",
    "requirements", "qualifications", "ideal", "new", "like", "using", "use",
];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Extracts up to `MAX_FALLBACK_KEYWORDS` lowercase keywords from `text`.
pub fn extract_keywords_locally(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    for token in lowered.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.'))) {
        let token = token.trim_matches('.');
        if token.chars().count() < 3 || is_stopword(token) {
            continue;
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if keywords.iter().any(|k| k == token) {
            continue;
        }
        keywords.push(token.to_string());
        if keywords.len() == MAX_FALLBACK_KEYWORDS {
            break;
        }
    }

    keywords
}
