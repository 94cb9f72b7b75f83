// Resume formatting: best-effort LLM restructuring with deterministic cleanup.

pub mod cleanup;
pub mod formatter;
pub mod handlers;
pub mod prompts;
