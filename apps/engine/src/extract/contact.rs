//! Contact/name extractor. Email and phone patterns run over the whole
//! document, since contact details usually sit in an unlabeled header.
//! The name is inferred from the first non-empty line when it looks like
//! a personal name.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EngineConfig;
use crate::extract::ContactFindings;
use crate::models::{FieldValue, Section, Span};
use crate::segment::heading_kind;

pub(crate) static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

pub(crate) static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}")
        .expect("valid phone regex")
});

pub fn extract(sections: &[Section], config: &EngineConfig) -> ContactFindings {
    let mut findings = ContactFindings::default();

    if let Some(first) = sections.first() {
        let mut pos = first.start;
        for line in first.text.split_inclusive('\n') {
            let content = line.strip_suffix('\n').unwrap_or(line);
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                if let Some((value, confidence)) = name_candidate(trimmed, config) {
                    let lead = content.len() - content.trim_start().len();
                    let start = pos + lead;
                    findings.names.push(FieldValue::new(
                        value,
                        confidence,
                        first.kind,
                        Span::new(start, start + trimmed.len()),
                    ));
                }
                break; // only the first non-empty line is a name candidate
            }
            pos += line.len();
        }
    }

    for section in sections {
        for m in EMAIL_RE.find_iter(&section.text) {
            findings.emails.push(FieldValue::new(
                m.as_str().to_string(),
                config.confidence.email,
                section.kind,
                Span::new(section.start + m.start(), section.start + m.end()),
            ));
        }
        for m in PHONE_RE.find_iter(&section.text) {
            findings.phones.push(FieldValue::new(
                m.as_str().trim().to_string(),
                config.confidence.phone,
                section.kind,
                Span::new(section.start + m.start(), section.start + m.end()),
            ));
        }
    }

    findings
}

/// Decides whether a header line reads as a personal name, and at what
/// confidence. Ambiguity (all-caps, company-style suffixes) lowers the
/// confidence instead of rejecting outright.
fn name_candidate(line: &str, config: &EngineConfig) -> Option<(String, f32)> {
    if line.len() > 60
        || line.chars().any(|c| c.is_ascii_digit())
        || line.contains('@')
        || line.to_lowercase().contains("http")
    {
        return None;
    }
    if heading_kind(line, config).is_some() {
        return None;
    }

    let tokens: Vec<&str> = line
        .split_whitespace()
        .map(|t| t.trim_matches(','))
        .filter(|t| !t.is_empty())
        .collect();
    if !(2..=4).contains(&tokens.len()) {
        return None;
    }
    for token in &tokens {
        let mut chars = token.chars();
        let first = chars.next()?;
        if !first.is_uppercase() || !first.is_alphabetic() {
            return None;
        }
        if !chars.all(|c| c.is_alphabetic() || matches!(c, '.' | '-' | '\'')) {
            return None;
        }
    }

    let company_like = tokens.iter().any(|t| {
        let lowered = t.to_lowercase();
        config.company_suffixes.contains(&lowered)
            || config.company_suffixes.contains(&lowered.trim_end_matches('.').to_string())
    });
    let all_caps = line
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(|c| c.is_uppercase());

    if all_caps {
        // "JANE DOE" style headers: accept, title-cased, at reduced
        // confidence since all-caps headers are also how companies and
        // section titles render.
        Some((title_case(&tokens), config.confidence.name_ambiguous))
    } else if company_like {
        Some((line.to_string(), config.confidence.name_ambiguous))
    } else {
        Some((line.to_string(), config.confidence.name_header))
    }
}

fn title_case(tokens: &[&str]) -> String {
    tokens
        .iter()
        .map(|t| {
            let mut chars = t.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionKind;

    fn section(text: &str) -> Section {
        Section {
            kind: SectionKind::Other,
            start: 0,
            end: text.len(),
            text: text.to_string(),
            has_heading: false,
        }
    }

    #[test]
    fn test_name_from_first_line() {
        let sections = vec![section("Jane Doe\njane@example.com\n")];
        let f = extract(&sections, &EngineConfig::default());
        assert_eq!(f.names.len(), 1);
        assert_eq!(f.names[0].value, "Jane Doe");
        assert!(f.names[0].confidence > 0.8);
    }

    #[test]
    fn test_all_caps_name_is_title_cased_with_lower_confidence() {
        let sections = vec![section("JANE DOE\n")];
        let config = EngineConfig::default();
        let f = extract(&sections, &config);
        assert_eq!(f.names[0].value, "Jane Doe");
        assert!((f.names[0].confidence - config.confidence.name_ambiguous).abs() < f32::EPSILON);
    }

    #[test]
    fn test_company_suffix_reduces_confidence() {
        let sections = vec![section("Acme Technologies\n")];
        let config = EngineConfig::default();
        let f = extract(&sections, &config);
        assert_eq!(f.names.len(), 1);
        assert!((f.names[0].confidence - config.confidence.name_ambiguous).abs() < f32::EPSILON);
    }

    #[test]
    fn test_heading_line_is_not_a_name() {
        let sections = vec![section("Work Experience\nAcme Corp\n")];
        let f = extract(&sections, &EngineConfig::default());
        assert!(f.names.is_empty());
    }

    #[test]
    fn test_line_with_digits_is_not_a_name() {
        let sections = vec![section("Jane Doe 42\n")];
        let f = extract(&sections, &EngineConfig::default());
        assert!(f.names.is_empty());
    }

    #[test]
    fn test_single_token_is_not_a_name() {
        let sections = vec![section("Resume\n")];
        let f = extract(&sections, &EngineConfig::default());
        assert!(f.names.is_empty());
    }

    #[test]
    fn test_finds_emails_and_phones_everywhere() {
        let text = "Jane Doe\nReach me at jane.doe@example.com or (555) 123-4567\n";
        let sections = vec![section(text)];
        let f = extract(&sections, &EngineConfig::default());
        assert_eq!(f.emails.len(), 1);
        assert_eq!(f.emails[0].value, "jane.doe@example.com");
        assert_eq!(f.phones.len(), 1);
        assert_eq!(f.phones[0].value, "(555) 123-4567");
        // spans point into the document
        let span = f.emails[0].span;
        assert_eq!(&text[span.start..span.end], "jane.doe@example.com");
    }

    #[test]
    fn test_international_phone() {
        let sections = vec![section("+1 415 555 2671\n")];
        let f = extract(&sections, &EngineConfig::default());
        assert_eq!(f.phones.len(), 1);
    }

    #[test]
    fn test_year_range_is_not_a_phone() {
        let sections = vec![section("Acme Corp 2019-2021\n")];
        let f = extract(&sections, &EngineConfig::default());
        assert!(f.phones.is_empty());
    }
}
