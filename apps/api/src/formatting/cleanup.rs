//! Cleanup of a model's reformatted resume.
//!
//! Steps, each idempotent:
//! 1. remove code-fence delimiters
//! 2. cut everything from the first commentary marker on
//! 3. normalize bullet glyphs to "- "
//! 4. plain text only: section touch-ups in Projects / Experience / Education
//! 5. collapse runs of blank lines and trim
//!
//! The result may be empty; the formatter decides what to do with that.

use std::sync::LazyLock;

use regex::Regex;

/// Phrases that start the model's own commentary rather than resume content.
const COMMENTARY_MARKERS: &[&str] = &[
    "Changes Made:",
    "Changes made:",
    "Key Changes:",
    "Key changes:",
    "Here's the formatted",
    "Here is the formatted",
    "Here's your formatted",
    "Here is your formatted",
    "I've formatted",
    "I have formatted",
    "Summary of changes",
    "Explanation of changes",
];

const BULLET_GLYPHS: &[char] = &[
    '•', '●', '◦', '○', '▪', '▫', '■', '□', '◆', '►', '▶', '➢', '➤', '‣', '⁃', '∙', '·',
];

/// Sections whose entries get subsection headings and line-start bullets.
const TRACKED_SECTIONS: &[&str] = &[
    "projects",
    "personal projects",
    "experience",
    "work experience",
    "professional experience",
    "employment history",
    "education",
];

const OTHER_SECTIONS: &[&str] = &[
    "summary",
    "professional summary",
    "profile",
    "objective",
    "skills",
    "technical skills",
    "certifications",
    "awards",
    "publications",
    "languages",
    "interests",
    "volunteer",
    "volunteering",
    "contact",
    "references",
];

static RE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)```(?:html|markdown|md|text|plaintext)?[ \t]*\r?\n?")
        .expect("valid fence regex")
});

static RE_COMMENTARY: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = COMMENTARY_MARKERS
        .iter()
        .map(|m| regex::escape(m))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&alternatives).expect("valid commentary regex")
});

static RE_INLINE_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[•●▪■►➢‣◦]\s+").expect("valid inline bullet regex"));

static RE_LI_GLYPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(<li[^>]*>)\s*[•●◦▪■►➢‣·]\s*").expect("valid li regex"));

static RE_BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("valid blank-run regex"));

/// Full cleanup pipeline for a formatting response.
pub fn clean_formatted_response(raw: &str, is_html: bool) -> String {
    let text = remove_code_fences(raw);
    let text = truncate_at_commentary(&text);
    let text = if is_html {
        RE_LI_GLYPH.replace_all(text, "$1").into_owned()
    } else {
        let normalized = normalize_bullets(text);
        touch_up_sections(&normalized)
    };
    RE_BLANK_RUNS
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}

pub fn remove_code_fences(text: &str) -> String {
    RE_FENCE.replace_all(text, "").into_owned()
}

/// Keeps only the lines before the one holding the first commentary marker.
///
/// A lead-in on the marker's line ("Sure! Here's the formatted...") goes
/// with it.
pub fn truncate_at_commentary(text: &str) -> &str {
    match RE_COMMENTARY.find(text) {
        Some(m) => {
            let line_start = text[..m.start()].rfind('\n').map_or(0, |i| i + 1);
            &text[..line_start]
        }
        None => text,
    }
}

/// Rewrites every bullet-like line prefix to "- ", collapsing doubled markers.
pub fn normalize_bullets(text: &str) -> String {
    text.lines()
        .map(normalize_bullet_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_bullet_line(line: &str) -> String {
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];

    let mut rest = body;
    let mut is_bullet = false;
    while let Some(stripped) = strip_bullet_marker(rest) {
        is_bullet = true;
        rest = stripped;
    }

    if is_bullet {
        format!("{indent}- {rest}")
    } else {
        line.to_string()
    }
}

fn strip_bullet_marker(text: &str) -> Option<&str> {
    let mut chars = text.chars();
    let first = chars.next()?;
    let after = chars.as_str();

    if BULLET_GLYPHS.contains(&first) {
        return Some(after.trim_start());
    }
    // ASCII and dash markers only count when followed by whitespace, so
    // "**bold**" and "-5%" stay untouched.
    if matches!(first, '-' | '*' | '–' | '—') && after.starts_with(char::is_whitespace) {
        return Some(after.trim_start());
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Tracked,
    Other,
}

fn heading_name(line: &str) -> String {
    line.trim()
        .trim_start_matches('#')
        .trim()
        .trim_matches('*')
        .trim()
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
}

fn is_bold_line(line: &str) -> bool {
    let line = line.trim().trim_end_matches(':');
    line.len() > 4
        && line.starts_with("**")
        && line.ends_with("**")
        && !line[2..line.len() - 2].contains("**")
}

fn is_caps_line(line: &str) -> bool {
    let line = line.trim();
    line.chars().any(|c| c.is_alphabetic())
        && line
            .chars()
            .all(|c| c.is_uppercase() || c.is_whitespace() || matches!(c, '&' | ':' | '/'))
}

/// Classifies a line as a section heading, if it is one.
fn section_kind(line: &str) -> Option<SectionKind> {
    let trimmed = line.trim();
    let is_hash = trimmed.starts_with('#');
    if !(is_hash || is_bold_line(trimmed) || is_caps_line(trimmed)) {
        return None;
    }

    let name = heading_name(trimmed);
    if TRACKED_SECTIONS.contains(&name.as_str()) {
        return Some(SectionKind::Tracked);
    }
    if OTHER_SECTIONS.contains(&name.as_str()) {
        return Some(SectionKind::Other);
    }
    // Unknown level-1/2 headings end a section; ### are its subsections.
    if is_hash && !trimmed.starts_with("###") {
        return Some(SectionKind::Other);
    }
    None
}

/// Inside Projects / Experience / Education: bold line leaders become
/// `###` subsection headings and every bullet starts at the line start.
pub fn touch_up_sections(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_tracked = false;

    for line in text.lines() {
        if let Some(kind) = section_kind(line) {
            in_tracked = kind == SectionKind::Tracked;
            out.push(line.to_string());
            continue;
        }
        if !in_tracked {
            out.push(line.to_string());
            continue;
        }

        let parts: Vec<&str> = RE_INLINE_BULLET.split(line.trim_start()).collect();
        let Some((head, tail)) = parts.split_first() else {
            out.push(line.to_string());
            continue;
        };

        if head.starts_with("- ") {
            out.push(head.to_string());
        } else if let Some(promoted) = promote_bold_leader(head) {
            out.push(promoted);
        } else if tail.is_empty() {
            out.push(line.to_string());
        } else {
            out.push(head.to_string());
        }

        for part in tail.iter().filter(|p| !p.trim().is_empty()) {
            out.push(format!("- {}", part.trim()));
        }
    }

    out.join("\n")
}

fn promote_bold_leader(line: &str) -> Option<String> {
    let inner = line.strip_prefix("**")?;
    let end = inner.find("**")?;
    let leader = inner[..end].trim();
    if leader.is_empty() {
        return None;
    }
    let rest = inner[end + 2..].trim_end();
    Some(format!("### {leader}{rest}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_known_fences() {
        let raw = "```markdown\n# Jane Doe\n```";
        assert_eq!(clean_formatted_response(raw, false), "# Jane Doe");

        let raw = "```html\n<h1>Jane</h1>\n```";
        assert_eq!(clean_formatted_response(raw, true), "<h1>Jane</h1>");
    }

    #[test]
    fn test_truncates_at_commentary() {
        let raw = "# Jane Doe\n\n## Skills\n- Rust\n\nChanges Made:\n- Reordered sections";
        assert_eq!(
            clean_formatted_response(raw, false),
            "# Jane Doe\n\n## Skills\n- Rust"
        );
    }

    #[test]
    fn test_leading_commentary_empties_the_result() {
        let raw = "Here's the formatted resume:\n\n# Jane Doe";
        assert_eq!(clean_formatted_response(raw, false), "");
    }

    #[test]
    fn test_lead_in_before_marker_is_dropped_with_its_line() {
        let raw = "Sure! Here's the formatted resume:\n\n# Jane Doe\n- Rust";
        assert_eq!(clean_formatted_response(raw, false), "");

        let raw = "# Jane Doe\n- Rust\n\nNote: Here's the formatted version";
        assert_eq!(clean_formatted_response(raw, false), "# Jane Doe\n- Rust");
    }

    #[test]
    fn test_normalizes_bullet_glyphs() {
        let text = "• One\n● Two\n* Three\n– Four\n- • Five\n▪▪ Six\n**Bold** stays\n-5% stays";
        assert_eq!(
            normalize_bullets(text),
            "- One\n- Two\n- Three\n- Four\n- Five\n- Six\n**Bold** stays\n-5% stays"
        );
    }

    #[test]
    fn test_promotes_bold_leaders_in_experience() {
        let text = "## Experience\n**Acme Corp** | 2020 - 2023\n   - Built the billing service\n## Skills\n**Languages**: Rust";
        assert_eq!(
            touch_up_sections(text),
            "## Experience\n### Acme Corp | 2020 - 2023\n- Built the billing service\n## Skills\n**Languages**: Rust"
        );
    }

    #[test]
    fn test_splits_inline_bullets_in_projects() {
        let text = "PROJECTS\n**Tailor** • Rust CLI • Shipped to 3 teams";
        assert_eq!(
            touch_up_sections(text),
            "PROJECTS\n### Tailor\n- Rust CLI\n- Shipped to 3 teams"
        );
    }

    #[test]
    fn test_inline_bullets_after_plain_text_are_split_once() {
        let text = "## Education\nB.S. Computer Science • GPA 3.9";
        assert_eq!(
            touch_up_sections(text),
            "## Education\nB.S. Computer Science\n- GPA 3.9"
        );
    }

    #[test]
    fn test_other_sections_are_untouched() {
        let text = "## Summary\n**Senior engineer** with 10 years\n   - indented bullet";
        assert_eq!(touch_up_sections(text), text);
    }

    #[test]
    fn test_bold_section_heading_is_recognized() {
        let text = "**Education**\n**State University** B.S. Computer Science";
        assert_eq!(
            touch_up_sections(text),
            "**Education**\n### State University B.S. Computer Science"
        );
    }

    #[test]
    fn test_html_li_glyphs_are_removed() {
        let raw = "<ul><li>• Built APIs</li><li class=\"x\">▪ Led team</li></ul>";
        assert_eq!(
            clean_formatted_response(raw, true),
            "<ul><li>Built APIs</li><li class=\"x\">Led team</li></ul>"
        );
    }

    #[test]
    fn test_collapses_blank_runs() {
        let raw = "# A\n\n\n\n## B\n \n\t\n- c";
        assert_eq!(clean_formatted_response(raw, false), "# A\n\n## B\n\n- c");
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let raw = "```md\n# Jane Doe\n\n## Experience\n**Acme** | 2021\n  • Did a thing • Did another\n\n\n## Skills\n● Rust\n```\nHere is the formatted version.";
        let once = clean_formatted_response(raw, false);
        let twice = clean_formatted_response(&once, false);
        assert_eq!(once, twice);
        assert!(once.contains("### Acme | 2021"));
        assert!(once.contains("\n- Did a thing\n- Did another"));
        assert!(!once.contains("Here is the formatted"));
    }
}
