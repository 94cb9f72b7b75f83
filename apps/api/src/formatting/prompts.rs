// All LLM prompt constants for resume formatting.
// Reuses cross-cutting fragments from llm_client::prompts.

pub const FORMAT_SYSTEM: &str = "You are an expert resume editor. \
    You restructure resumes so they are clean, consistent, and easy to scan, \
    without changing their content.";

/// HTML input. Replace: {no_commentary}, {preserve_facts}, {content}
pub const FORMAT_HTML_PROMPT_TEMPLATE: &str = r#"Reformat the resume below. It is HTML produced by a rich-text editor.

{preserve_facts}

Rules:
- Keep valid HTML using only <h1>, <h2>, <h3>, <p>, <ul>, <li>, <strong>, <em>, <a>
- One <h1> for the candidate name, <h2> for section titles, <h3> for each role, project, or degree
- Use <ul><li> for bullet points; do NOT put bullet characters inside <li>
- Keep links and contact details unchanged

{no_commentary}

RESUME:
{content}"#;

/// Plain-text input. Replace: {no_commentary}, {preserve_facts}, {content}
pub const FORMAT_TEXT_PROMPT_TEMPLATE: &str = r#"Reformat the resume below into clean Markdown. It was extracted from a PDF or DOCX file, so line breaks and bullets may be broken.

{preserve_facts}

Structure:
- `#` for the candidate name (first line)
- `##` for section titles (Summary, Experience, Projects, Education, Skills, ...)
- `###` for each job, project, or degree, followed by company/organization and dates on the same line
- `- ` for every bullet point; convert any other bullet character (•, ●, ▪, *, –) to `- `
- Each bullet on its own line; merge bullets that were split across lines
- Group skills as `**Category**: item, item`

{no_commentary}

RESUME:
{content}"#;

pub const FORMAT_MAX_TOKENS: u32 = 4000;

pub const FORMAT_TEMPERATURE: f32 = 0.2;
