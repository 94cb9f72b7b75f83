// All LLM prompt constants for cover letter generation.

pub const COVER_LETTER_SYSTEM: &str = "You are an expert career coach who writes concise, \
    specific, professional cover letters grounded strictly in the candidate's resume.";

/// Replace: {resume}, {job_description}, {target}, {no_commentary}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a cover letter for the job below{target}.

Requirements:
- 250 to 350 words, plain text, 3 to 4 paragraphs
- Open with a specific hook tied to the role, not a generic greeting line about "applying"
- Highlight 3 or 4 strengths from the resume that match the job description
- Use ONLY experience, skills, and achievements present in the resume
- Confident but humble tone; no clichés
- End with a short call to action; sign with the candidate's name if it appears in the resume

{no_commentary}

RESUME:
{resume}

JOB DESCRIPTION:
{job_description}"#;

pub const COVER_LETTER_MAX_TOKENS: u32 = 1000;

pub const COVER_LETTER_TEMPERATURE: f32 = 0.7;
