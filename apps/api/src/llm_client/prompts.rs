// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to prompts whose answer is inserted straight into the editor.
pub const NO_COMMENTARY_INSTRUCTION: &str = "\
    Return ONLY the requested content. \
    Do NOT add introductions, explanations, notes, or a summary of changes. \
    Do NOT wrap the answer in code fences.";

/// Guards against the model inventing experience the candidate does not have.
pub const PRESERVE_FACTS_INSTRUCTION: &str = "\
    CRITICAL: Preserve every fact exactly as written. \
    Do NOT invent employers, dates, titles, metrics, or skills. \
    Do NOT remove any content.";
