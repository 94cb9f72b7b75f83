// All LLM prompt constants for keyword extraction.

/// System prompt for keyword extraction that asks for a bare JSON array.
pub const KEYWORD_EXTRACTION_SYSTEM: &str = "You are an expert technical recruiter and ATS \
    (applicant tracking system) analyst. You extract the keywords a resume must contain \
    to match a job description. \
    You MUST respond with a JSON array of strings only. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences.";

/// Keyword extraction prompt template. Replace `{job_description}` before sending.
pub const KEYWORD_EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract the most important keywords from the job description below.

Include:
- Programming languages, frameworks, libraries, and tools (keep exact spelling, e.g. "C++", "C#", "Node.js")
- Technical concepts and methodologies (e.g. "microservices", "CI/CD", "Agile")
- Certifications and degrees
- Domain-specific hard skills

Exclude:
- Generic soft skills ("team player", "communication") unless explicitly emphasized
- Company names, locations, benefits, and salary information

Return between 10 and 30 keywords ordered by importance, as a JSON array:
["keyword one", "keyword two"]

JOB DESCRIPTION:
{job_description}"#;

/// Token budget for an extraction answer; keyword lists are short.
pub const KEYWORD_EXTRACTION_MAX_TOKENS: u32 = 500;

pub const KEYWORD_EXTRACTION_TEMPERATURE: f32 = 0.1;
