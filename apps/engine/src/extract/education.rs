//! Education extractor: degree, institution, date range, and GPA per
//! entry block. Scoped to Education sections, with a reduced-confidence
//! fallback pass over Other sections.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EngineConfig;
use crate::extract::{contains_keyword, dates, split_blocks, Block};
use crate::models::{EducationEntry, FieldValue, Section, SectionKind, Span};

static GPA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:CGPA|GPA|Score)\s*[:\-]?\s*([0-9]+(?:\.[0-9]+)?)").expect("valid GPA regex")
});

pub fn extract(sections: &[Section], config: &EngineConfig) -> Vec<EducationEntry> {
    let mut entries = Vec::new();
    for section in sections {
        let fallback = match section.kind {
            SectionKind::Education => false,
            SectionKind::Other => true,
            _ => continue,
        };
        let scale = if fallback {
            config.confidence.fallback_scale
        } else {
            1.0
        };
        for block in split_blocks(section) {
            // The fallback pass only trusts blocks that mention a degree.
            if fallback && !block_mentions_degree(&block, config) {
                continue;
            }
            if let Some(entry) = parse_block(&block, section.kind, scale, config) {
                entries.push(entry);
            }
        }
    }
    entries
}

fn block_mentions_degree(block: &Block<'_>, config: &EngineConfig) -> bool {
    block.lines.iter().any(|&(_, line)| {
        config
            .degree_keywords
            .iter()
            .any(|kw| contains_keyword(line, kw))
    })
}

fn parse_block(
    block: &Block<'_>,
    kind: SectionKind,
    scale: f32,
    config: &EngineConfig,
) -> Option<EducationEntry> {
    let mut entry = EducationEntry::default();

    for &(off, line) in &block.lines {
        if let Some((range, span)) = dates::find_range(line) {
            entry.dates = Some(FieldValue::new(
                range,
                0.8 * scale,
                kind,
                Span::new(off + span.start, off + span.end),
            ));
            break;
        }
    }

    for &(off, line) in &block.lines {
        if let Some(caps) = GPA_RE.captures(line) {
            if let Some(m) = caps.get(1) {
                entry.gpa = Some(FieldValue::new(
                    m.as_str().to_string(),
                    0.9 * scale,
                    kind,
                    Span::new(off + m.start(), off + m.end()),
                ));
                break;
            }
        }
    }

    let mut degree_idx = None;
    for (i, &(off, line)) in block.lines.iter().enumerate() {
        if config
            .degree_keywords
            .iter()
            .any(|kw| contains_keyword(line, kw))
        {
            let cleaned = strip_noise(line);
            if !cleaned.is_empty() {
                entry.degree = Some(FieldValue::new(
                    cleaned,
                    0.85 * scale,
                    kind,
                    Span::new(off, off + line.len()),
                ));
                degree_idx = Some(i);
            }
            break;
        }
    }

    entry.institution = find_institution(block, degree_idx, kind, scale, config);

    if entry.is_empty() {
        None
    } else {
        Some(entry)
    }
}

/// Institution heuristic: prefer a line carrying an institution keyword;
/// if that keyword sits on the degree line, take the comma-separated part
/// holding it; otherwise fall back to the first org-shaped line.
fn find_institution(
    block: &Block<'_>,
    degree_idx: Option<usize>,
    kind: SectionKind,
    scale: f32,
    config: &EngineConfig,
) -> Option<FieldValue<String>> {
    for (i, &(off, line)) in block.lines.iter().enumerate() {
        let has_keyword = config
            .institution_keywords
            .iter()
            .any(|kw| contains_keyword(line, kw));
        if !has_keyword {
            continue;
        }
        if degree_idx == Some(i) {
            // Degree and institution share a line; split on commas and
            // keep the part naming the institution.
            for part in line.split(',') {
                let part = part.trim();
                if config
                    .institution_keywords
                    .iter()
                    .any(|kw| contains_keyword(part, kw))
                {
                    let cleaned = strip_noise(part);
                    if !cleaned.is_empty() {
                        return Some(FieldValue::new(
                            cleaned,
                            0.75 * scale,
                            kind,
                            Span::new(off, off + line.len()),
                        ));
                    }
                }
            }
            continue;
        }
        let cleaned = strip_noise(line);
        if !cleaned.is_empty() {
            return Some(FieldValue::new(
                cleaned,
                0.85 * scale,
                kind,
                Span::new(off, off + line.len()),
            ));
        }
    }

    for (i, &(off, line)) in block.lines.iter().enumerate() {
        if degree_idx == Some(i) {
            continue;
        }
        if looks_like_org(line) {
            let cleaned = strip_noise(line);
            if !cleaned.is_empty() {
                return Some(FieldValue::new(
                    cleaned,
                    0.65 * scale,
                    kind,
                    Span::new(off, off + line.len()),
                ));
            }
        }
    }
    None
}

/// Removes any embedded date range and GPA clause, then trims separators.
fn strip_noise(line: &str) -> String {
    let mut s = line.to_string();
    if let Some((_, span)) = dates::find_range(&s) {
        s.replace_range(span.start..span.end, "");
    }
    if let Some(m) = GPA_RE.find(&s) {
        let range = m.range();
        s.replace_range(range, "");
    }
    s.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '|' | '-' | '\u{2013}' | '\u{2014}' | '(' | ')'))
        .to_string()
}

pub(crate) fn looks_like_org(line: &str) -> bool {
    if line.len() > 80 || line.contains('@') || line.starts_with("- ") {
        return false;
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() || tokens.len() > 8 {
        return false;
    }
    let capitalized = tokens
        .iter()
        .filter(|t| t.chars().next().is_some_and(|c| c.is_uppercase()))
        .count();
    capitalized * 2 >= tokens.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateEnd;
    use crate::models::PartialDate;

    fn education_section(body: &str) -> Section {
        let text = format!("Education\n{body}");
        Section {
            kind: SectionKind::Education,
            start: 0,
            end: text.len(),
            text,
            has_heading: true,
        }
    }

    #[test]
    fn test_extracts_full_entry() {
        let sections = vec![education_section(
            "Massachusetts Institute of Technology\nBachelor of Science in CS, 2015-2019\nGPA: 3.8\n",
        )];
        let entries = extract(&sections, &EngineConfig::default());
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(
            e.institution.as_ref().unwrap().value,
            "Massachusetts Institute of Technology"
        );
        assert_eq!(e.degree.as_ref().unwrap().value, "Bachelor of Science in CS");
        let range = e.dates.as_ref().unwrap().value;
        assert_eq!(range.start, Some(PartialDate::year(2015)));
        assert_eq!(range.end, DateEnd::Known(PartialDate::year(2019)));
        assert_eq!(e.gpa.as_ref().unwrap().value, "3.8");
    }

    #[test]
    fn test_blank_lines_split_entries() {
        let sections = vec![education_section(
            "Stanford University\nMSc, 2019-2021\n\nState College\nBSc, 2015-2019\n",
        )];
        let entries = extract(&sections, &EngineConfig::default());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].institution.as_ref().unwrap().value, "Stanford University");
        assert_eq!(entries[1].institution.as_ref().unwrap().value, "State College");
    }

    #[test]
    fn test_degree_and_institution_on_one_line() {
        let sections = vec![education_section("B.Tech, Pune University, 2012-2016\n")];
        let entries = extract(&sections, &EngineConfig::default());
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.institution.as_ref().unwrap().value, "Pune University");
        assert!(e.degree.is_some());
    }

    #[test]
    fn test_fallback_pass_requires_degree_keyword() {
        let other = Section {
            kind: SectionKind::Other,
            start: 0,
            end: 0,
            text: "Some Company\n2019-2021\n\nMaster of Arts, Oxford University\n".to_string(),
            has_heading: false,
        };
        let entries = extract(&[other], &EngineConfig::default());
        // Only the degree-bearing block survives the fallback filter.
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].institution.as_ref().unwrap().value, "Oxford University");
        let config = EngineConfig::default();
        assert!(entries[0].confidence() <= config.confidence.fallback_scale);
    }

    #[test]
    fn test_open_ended_dates() {
        let sections = vec![education_section("PhD, Carnegie Mellon University\nSep 2021 - Present\n")];
        let entries = extract(&sections, &EngineConfig::default());
        let range = entries[0].dates.as_ref().unwrap().value;
        assert_eq!(range.start, Some(PartialDate::month(2021, 9)));
        assert_eq!(range.end, DateEnd::Open);
    }

    #[test]
    fn test_empty_sections_extract_nothing() {
        let sections = vec![education_section("\n")];
        assert!(extract(&sections, &EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_skips_foreign_sections() {
        let skills = Section {
            kind: SectionKind::Skills,
            start: 0,
            end: 0,
            text: "Skills\nBachelor-level Python\n".to_string(),
            has_heading: true,
        };
        assert!(extract(&[skills], &EngineConfig::default()).is_empty());
    }
}
