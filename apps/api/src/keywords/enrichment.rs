//! Keyword enrichment: deterministic correction of the model's keyword list.
//!
//! The model sometimes drops well-known terms or mangles them ("C++" -> "C").
//! Every dictionary term that appears in the source text or the raw model
//! response but is missing from the parsed list is re-injected in its
//! canonical spelling. The result is de-duplicated case-insensitively.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Built-in table: (alias as it appears in text, canonical spelling).
const BUILTIN_TERMS: &[(&str, &str)] = &[
    // Languages
    ("python", "Python"),
    ("java", "Java"),
    ("javascript", "JavaScript"),
    ("typescript", "TypeScript"),
    ("c++", "C++"),
    ("c#", "C#"),
    ("golang", "Go"),
    ("rust", "Rust"),
    ("ruby", "Ruby"),
    ("php", "PHP"),
    ("swift", "Swift"),
    ("kotlin", "Kotlin"),
    ("scala", "Scala"),
    ("sql", "SQL"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("bash", "Bash"),
    // Frameworks and runtimes
    ("react", "React"),
    ("angular", "Angular"),
    ("vue", "Vue"),
    ("node.js", "Node.js"),
    ("nodejs", "Node.js"),
    ("express", "Express"),
    ("django", "Django"),
    ("flask", "Flask"),
    ("spring", "Spring"),
    (".net", ".NET"),
    ("pytorch", "PyTorch"),
    ("tensorflow", "TensorFlow"),
    ("pandas", "pandas"),
    ("graphql", "GraphQL"),
    // Data stores
    ("postgresql", "PostgreSQL"),
    ("postgres", "PostgreSQL"),
    ("mysql", "MySQL"),
    ("mongodb", "MongoDB"),
    ("redis", "Redis"),
    ("kafka", "Kafka"),
    ("elasticsearch", "Elasticsearch"),
    // Cloud and tooling
    ("aws", "AWS"),
    ("azure", "Azure"),
    ("gcp", "GCP"),
    ("docker", "Docker"),
    ("kubernetes", "Kubernetes"),
    ("k8s", "Kubernetes"),
    ("terraform", "Terraform"),
    ("jenkins", "Jenkins"),
    ("git", "Git"),
    ("linux", "Linux"),
    ("ci/cd", "CI/CD"),
    // Abbreviations
    ("api", "API"),
    ("rest", "REST"),
    ("ml", "ML"),
    ("ai", "AI"),
    ("nlp", "NLP"),
    ("llm", "LLM"),
    ("saas", "SaaS"),
    ("agile", "Agile"),
    ("scrum", "Scrum"),
];

/// High-value terms checked by plain substring as a second net.
const DIRECT_CHECKS: &[(&str, &str)] = &[("c++", "C++"), ("c#", "C#"), (".net", ".NET")];

static BUILTIN_DICTIONARY: LazyLock<TermDictionary> = LazyLock::new(|| {
    TermDictionary::new(
        BUILTIN_TERMS
            .iter()
            .map(|(alias, canonical)| (alias.to_string(), canonical.to_string())),
    )
    .expect("built-in terms are valid patterns")
});

/// Case-insensitive whole-term matcher.
///
/// `\b` does not work for terms ending in symbols ("C++", "C#"), so the
/// boundaries are explicit character classes. A trailing `+` or `#` is not a
/// boundary, so "C" does not match inside "C++".
#[derive(Debug, Clone)]
pub struct TermMatcher {
    regex: Regex,
}

impl TermMatcher {
    pub fn new(term: &str) -> Result<Self, regex::Error> {
        let pattern = format!(
            r"(?i)(?:^|[^A-Za-z0-9_]){}(?:[^A-Za-z0-9_+#]|$)",
            regex::escape(term.trim())
        );
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

#[derive(Debug, Clone)]
struct DictionaryEntry {
    matcher: TermMatcher,
    canonical: String,
}

/// Known-term table used for enrichment.
#[derive(Debug, Clone)]
pub struct TermDictionary {
    entries: Vec<DictionaryEntry>,
}

impl Default for TermDictionary {
    fn default() -> Self {
        BUILTIN_DICTIONARY.clone()
    }
}

impl TermDictionary {
    /// Builds a dictionary from `(alias, canonical)` pairs.
    pub fn new<I>(terms: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let entries = terms
            .into_iter()
            .map(|(alias, canonical)| {
                Ok(DictionaryEntry {
                    matcher: TermMatcher::new(&alias)?,
                    canonical,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { entries })
    }

    pub fn term_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns `keywords` with missing known terms appended and duplicates removed.
    ///
    /// A term is appended when it is absent from the list (case-insensitive)
    /// and matches either `source_text` or `raw_response`.
    pub fn enrich(&self, keywords: Vec<String>, source_text: &str, raw_response: &str) -> Vec<String> {
        let mut enriched = keywords;

        for entry in &self.entries {
            if contains_ignore_case(&enriched, &entry.canonical) {
                continue;
            }
            if entry.matcher.is_match(source_text) || entry.matcher.is_match(raw_response) {
                enriched.push(entry.canonical.clone());
            }
        }

        let source_lower = source_text.to_lowercase();
        for (needle, canonical) in DIRECT_CHECKS {
            if source_lower.contains(needle) && !contains_ignore_case(&enriched, canonical) {
                enriched.push(canonical.to_string());
            }
        }

        dedup_ignore_case(enriched)
    }
}

fn contains_ignore_case(keywords: &[String], term: &str) -> bool {
    let term = term.to_lowercase();
    keywords.iter().any(|k| k.trim().to_lowercase() == term)
}

/// Trims, drops empties, and removes case-insensitive duplicates keeping the
/// first spelling seen.
pub fn dedup_ignore_case(keywords: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && seen.insert(k.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::parser::parse_keyword_response;

    #[test]
    fn test_recovers_term_the_model_dropped() {
        let source = "Experience with Python and C++ required";
        let raw = r#"Sure! Here's the list: ["Python"]"#;
        let parsed = parse_keyword_response(raw);

        let enriched = TermDictionary::default().enrich(parsed, source, raw);

        assert!(enriched.contains(&"Python".to_string()));
        assert!(enriched.contains(&"C++".to_string()));
    }

    #[test]
    fn test_does_not_duplicate_existing_terms_in_other_case() {
        let enriched = TermDictionary::default().enrich(
            vec!["python".to_string(), "docker".to_string()],
            "Python and Docker",
            "",
        );
        assert_eq!(enriched, vec!["python", "docker"]);
    }

    #[test]
    fn test_terms_found_only_in_raw_response_are_added() {
        let enriched = TermDictionary::default().enrich(
            vec![],
            "Backend role",
            "The model mentioned Kubernetes but failed to list it",
        );
        assert_eq!(enriched, vec!["Kubernetes"]);
    }

    #[test]
    fn test_alias_maps_to_canonical_spelling() {
        let enriched = TermDictionary::default().enrich(vec![], "Deploy on k8s with postgres", "");
        assert!(enriched.contains(&"Kubernetes".to_string()));
        assert!(enriched.contains(&"PostgreSQL".to_string()));
        assert_eq!(
            enriched.iter().filter(|k| *k == "PostgreSQL").count(),
            1,
            "postgres and postgresql share one canonical entry"
        );
    }

    #[test]
    fn test_word_boundaries_are_respected() {
        let enriched = TermDictionary::default().enrich(vec![], "JavaScript developer", "");
        assert!(enriched.contains(&"JavaScript".to_string()));
        assert!(!enriched.contains(&"Java".to_string()));
    }

    #[test]
    fn test_mangled_c_does_not_block_cpp() {
        let enriched = TermDictionary::default().enrich(vec!["C".to_string()], "Modern C++17", "");
        assert!(enriched.contains(&"C++".to_string()));
    }

    #[test]
    fn test_output_has_no_case_insensitive_duplicates() {
        let input = vec![
            "Rust".to_string(),
            "RUST".to_string(),
            " rust ".to_string(),
            "".to_string(),
            "Go".to_string(),
            "go".to_string(),
        ];
        let enriched = TermDictionary::default().enrich(input, "rust and Rust and golang", "RUST");
        let mut lowered: Vec<String> = enriched.iter().map(|k| k.to_lowercase()).collect();
        let total = lowered.len();
        lowered.sort();
        lowered.dedup();
        assert_eq!(lowered.len(), total);
        assert!(enriched.iter().all(|k| !k.is_empty()));
        assert_eq!(enriched, vec!["Rust", "Go"]);
    }

    #[test]
    fn test_custom_dictionary() {
        let dictionary = TermDictionary::new(vec![
            ("phlebotomy".to_string(), "Phlebotomy".to_string()),
            ("icu".to_string(), "ICU".to_string()),
        ])
        .unwrap();
        assert_eq!(dictionary.term_count(), 2);
        let enriched = dictionary.enrich(vec![], "Registered nurse, ICU rotation", "");
        assert_eq!(enriched, vec!["ICU"]);
    }

    #[test]
    fn test_matcher_handles_symbol_terms() {
        let cpp = TermMatcher::new("c++").unwrap();
        assert!(cpp.is_match("C++ developer"));
        assert!(cpp.is_match("We use c++."));
        assert!(!cpp.is_match("C developer"));

        let net = TermMatcher::new(".net").unwrap();
        assert!(net.is_match("Experience with .NET Core"));
    }
}
