//! Skills extractor. Explicit Skills sections are tokenized on commas,
//! semicolons, bullets, and line breaks; a whole-document gazetteer scan
//! catches skills mentioned inline elsewhere. Which of the two wins on a
//! collision is decided purely by the configured confidences.

use crate::config::EngineConfig;
use crate::models::{FieldValue, Section, SectionKind, Span};

const MAX_SKILL_LEN: usize = 48;

pub fn extract(sections: &[Section], config: &EngineConfig) -> Vec<FieldValue<String>> {
    let mut skills = Vec::new();

    for section in sections.iter().filter(|s| s.kind == SectionKind::Skills) {
        let base = section.body_start();
        let mut pos = 0;
        for line in section.body().split_inclusive('\n') {
            let content = line.strip_suffix('\n').unwrap_or(line);
            tokenize_line(content, base + pos, section.kind, config, &mut skills);
            pos += line.len();
        }
    }

    if let Some(matcher) = config.gazetteer_matcher() {
        for section in sections.iter().filter(|s| s.kind != SectionKind::Skills) {
            for m in matcher.regex.find_iter(&section.text) {
                let display = matcher
                    .display
                    .get(&m.as_str().to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| m.as_str().to_string());
                skills.push(FieldValue::new(
                    display,
                    config.confidence.skills_gazetteer,
                    section.kind,
                    Span::new(section.start + m.start(), section.start + m.end()),
                ));
            }
        }
    }

    skills
}

/// Splits one Skills-section line into tokens. A leading "Category:" or
/// "Category - " label is unwrapped first.
fn tokenize_line(
    content: &str,
    line_off: usize,
    kind: SectionKind,
    config: &EngineConfig,
    out: &mut Vec<FieldValue<String>>,
) {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = content.len() - content.trim_start().len();
    let mut off = line_off + lead;
    let mut rest = trimmed.strip_prefix("- ").unwrap_or(trimmed);
    off += trimmed.len() - rest.len();

    if let Some(items_off) = label_prefix(rest) {
        off += items_off;
        rest = &rest[items_off..];
    }

    let mut token_start = 0;
    for piece in rest.split_inclusive([',', ';']) {
        let token = piece.trim_end_matches([',', ';']);
        let lead = token.len() - token.trim_start().len();
        let token = token.trim();
        if is_skill_token(token) {
            let start = off + token_start + lead;
            out.push(FieldValue::new(
                token.to_string(),
                config.confidence.skills_section,
                kind,
                Span::new(start, start + token.len()),
            ));
        }
        token_start += piece.len();
    }
}

/// Detects a short category label ("Languages: ..." or "Databases - ...")
/// and returns the byte offset where the items begin.
fn label_prefix(line: &str) -> Option<usize> {
    for sep in [": ", " - "] {
        if let Some(idx) = line.find(sep) {
            let label = &line[..idx];
            let word_count = label.split_whitespace().count();
            if (1..=3).contains(&word_count) && !label.contains(',') {
                return Some(idx + sep.len());
            }
        }
    }
    None
}

fn is_skill_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_SKILL_LEN
        && token.chars().any(|c| c.is_alphanumeric())
}
