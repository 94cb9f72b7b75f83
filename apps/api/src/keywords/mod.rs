// Keyword pipeline: model extraction with parsing, enrichment, caching,
// single-flight de-duplication and a local fallback, plus resume matching.

pub mod enrichment;
pub mod extractor;
pub mod fallback;
pub mod handlers;
pub mod matching;
pub mod parser;
pub mod prompts;
