//! Certifications extractor: line-based over Certifications sections,
//! stripping a trailing date or issuer clause from the title. The
//! fallback pass picks up "Certified ..." lines elsewhere.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EngineConfig;
use crate::extract::dates;
use crate::models::{FieldValue, Section, SectionKind, Span};

static CERT_HINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:certified|certificate|certification)\b").expect("valid cert regex")
});

pub fn extract(sections: &[Section], config: &EngineConfig) -> Vec<FieldValue<String>> {
    let mut certs = Vec::new();

    for section in sections {
        match section.kind {
            SectionKind::Certifications => {
                collect_lines(section, 0.85, &mut certs, |_| true);
            }
            SectionKind::Other => {
                let confidence = 0.85 * config.confidence.fallback_scale;
                collect_lines(section, confidence, &mut certs, |line| {
                    CERT_HINT_RE.is_match(line)
                });
            }
            _ => {}
        }
    }

    certs
}

fn collect_lines(
    section: &Section,
    confidence: f32,
    out: &mut Vec<FieldValue<String>>,
    accept: impl Fn(&str) -> bool,
) {
    let base = section.body_start();
    let mut pos = 0;
    for line in section.body().split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        let trimmed = content.trim();
        if !trimmed.is_empty() && accept(trimmed) {
            if let Some(title) = clean_title(trimmed) {
                let lead = content.len() - content.trim_start().len();
                let start = base + pos + lead;
                out.push(FieldValue::new(
                    title,
                    confidence,
                    section.kind,
                    Span::new(start, start + trimmed.len()),
                ));
            }
        }
        pos += line.len();
    }
}

/// Strips the bullet marker and any trailing date, then trims separator
/// punctuation. The issuer stays attached when it is part of the title.
fn clean_title(line: &str) -> Option<String> {
    let mut title = line.strip_prefix("- ").unwrap_or(line).to_string();
    if let Some((_, span)) = dates::find_range(&title) {
        title.replace_range(span.start..span.end, "");
    }
    let title = title
        .trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, ',' | ';' | '|' | '-' | '\u{2013}' | '\u{2014}' | '(' | ')' | '.')
        })
        .to_string();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}
