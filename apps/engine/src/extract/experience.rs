//! Experience extractor: organization, title, date range, and free-text
//! description per entry block. Scoped to Experience sections; the
//! fallback pass over Other sections only trusts blocks with a parsed
//! date range.

use crate::config::EngineConfig;
use crate::extract::education::looks_like_org;
use crate::extract::{contains_keyword, dates, split_blocks, Block};
use crate::models::{ExperienceEntry, FieldValue, Section, SectionKind, Span};

pub fn extract(sections: &[Section], config: &EngineConfig) -> Vec<ExperienceEntry> {
    let mut entries = Vec::new();
    for section in sections {
        let fallback = match section.kind {
            SectionKind::Experience => false,
            SectionKind::Other => true,
            _ => continue,
        };
        let scale = if fallback {
            config.confidence.fallback_scale
        } else {
            1.0
        };
        for block in split_blocks(section) {
            let entry = parse_block(&block, section.kind, scale, config);
            if let Some(entry) = entry {
                if fallback && entry.dates.is_none() {
                    continue;
                }
                entries.push(entry);
            }
        }
    }
    entries
}

fn parse_block(
    block: &Block<'_>,
    kind: SectionKind,
    scale: f32,
    config: &EngineConfig,
) -> Option<ExperienceEntry> {
    let mut entry = ExperienceEntry::default();
    let mut date_line_idx = None;

    for (i, &(off, line)) in block.lines.iter().enumerate() {
        if let Some((range, span)) = dates::find_range(line) {
            entry.dates = Some(FieldValue::new(
                range,
                0.85 * scale,
                kind,
                Span::new(off + span.start, off + span.end),
            ));
            date_line_idx = Some(i);
            break;
        }
    }

    let &(header_off, header) = block.lines.first()?;
    let header = match (date_line_idx, dates::find_range(header)) {
        (Some(0), Some((_, span))) => {
            let mut h = header.to_string();
            h.replace_range(span.start..span.end, "");
            h
        }
        _ => header.to_string(),
    };
    let header = header
        .trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, ',' | ';' | '|' | '-' | '\u{2013}' | '\u{2014}' | '(' | ')')
        })
        .to_string();

    if !header.is_empty() {
        let (organization, title) = split_header(&header, config);
        let header_span = Span::new(header_off, header_off + block.lines[0].1.len());
        if let Some(org) = organization {
            entry.organization = Some(FieldValue::new(org, 0.8 * scale, kind, header_span));
        }
        if let Some(title) = title {
            entry.title = Some(FieldValue::new(title, 0.75 * scale, kind, header_span));
        }
    }

    let description: Vec<&str> = block
        .lines
        .iter()
        .enumerate()
        .skip(1)
        .filter(|&(i, _)| Some(i) != date_line_idx || !is_date_only(block.lines[i].1))
        .map(|(_, &(_, line))| line.strip_prefix("- ").unwrap_or(line))
        .collect();
    if !description.is_empty() {
        let first_off = block.lines[1].0;
        let last = block.lines.last()?;
        entry.description = Some(FieldValue::new(
            description.join("\n"),
            0.7 * scale,
            kind,
            Span::new(first_off, last.0 + last.1.len()),
        ));
    }

    if entry.is_empty() {
        None
    } else {
        Some(entry)
    }
}

fn is_date_only(line: &str) -> bool {
    match dates::find_range(line) {
        Some((_, span)) => {
            let mut rest = line.to_string();
            rest.replace_range(span.start..span.end, "");
            rest.trim_matches(|c: char| !c.is_alphanumeric()).is_empty()
        }
        None => false,
    }
}

/// Splits an entry header into organization and title. "Org - Title" and
/// "Title at Org" are both common; a title-keyword check corrects the
/// orientation when the dash form is reversed.
fn split_header(header: &str, config: &EngineConfig) -> (Option<String>, Option<String>) {
    let clean = |s: &str| {
        let t = s
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '|'))
            .to_string();
        if t.is_empty() {
            None
        } else {
            Some(t)
        }
    };

    if let Some(idx) = find_at_separator(header) {
        let title = clean(&header[..idx]);
        let organization = clean(&header[idx + 4..]);
        return (organization, title);
    }

    for sep in [" \u{2014} ", " \u{2013} ", " - ", " | "] {
        if let Some(idx) = header.find(sep) {
            let left = clean(&header[..idx]);
            let right = clean(&header[idx + sep.len()..]);
            let left_titled = left
                .as_deref()
                .is_some_and(|l| config.title_keywords.iter().any(|k| contains_keyword(l, k)));
            let right_titled = right
                .as_deref()
                .is_some_and(|r| config.title_keywords.iter().any(|k| contains_keyword(r, k)));
            return if left_titled && !right_titled {
                (right, left)
            } else {
                (left, right)
            };
        }
    }

    // No separator: decide by whether the header reads as a job title.
    if config
        .title_keywords
        .iter()
        .any(|k| contains_keyword(header, k))
    {
        (None, clean(header))
    } else {
        (clean(header), None)
    }
}

/// Case-insensitive " at " with non-empty text on both sides. Byte scan
/// on the space boundaries, so the index is always a char boundary.
fn find_at_separator(header: &str) -> Option<usize> {
    let bytes = header.as_bytes();
    (1..bytes.len().saturating_sub(4)).find(|&i| {
        bytes[i] == b' '
            && bytes[i + 1].eq_ignore_ascii_case(&b'a')
            && bytes[i + 2].eq_ignore_ascii_case(&b't')
            && bytes[i + 3] == b' '
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateEnd, PartialDate};

    fn experience_section(body: &str) -> Section {
        let text = format!("Experience\n{body}");
        Section {
            kind: SectionKind::Experience,
            start: 0,
            end: text.len(),
            text,
            has_heading: true,
        }
    }

    #[test]
    fn test_org_dash_title_with_dates() {
        let sections = vec![experience_section("Acme Corp \u{2014} Engineer, 2020\u{2013}2022\n")];
        let entries = extract(&sections, &EngineConfig::default());
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.organization.as_ref().unwrap().value, "Acme Corp");
        assert_eq!(e.title.as_ref().unwrap().value, "Engineer");
        let range = e.dates.as_ref().unwrap().value;
        assert_eq!(range.start, Some(PartialDate::year(2020)));
        assert_eq!(range.end, DateEnd::Known(PartialDate::year(2022)));
    }

    #[test]
    fn test_title_at_org_form() {
        let sections = vec![experience_section("Senior Engineer at Globex\nJan 2019 - Dec 2020\n")];
        let entries = extract(&sections, &EngineConfig::default());
        let e = &entries[0];
        assert_eq!(e.organization.as_ref().unwrap().value, "Globex");
        assert_eq!(e.title.as_ref().unwrap().value, "Senior Engineer");
    }

    #[test]
    fn test_reversed_dash_form_is_corrected() {
        let sections = vec![experience_section("Engineer - Acme Corp\n2018-2019\n")];
        let entries = extract(&sections, &EngineConfig::default());
        let e = &entries[0];
        assert_eq!(e.organization.as_ref().unwrap().value, "Acme Corp");
        assert_eq!(e.title.as_ref().unwrap().value, "Engineer");
    }

    #[test]
    fn test_description_collects_body_lines() {
        let sections = vec![experience_section(
            "Acme Corp \u{2014} Engineer\n2020-2022\n- Built the billing pipeline\n- Led a team of 4\n",
        )];
        let entries = extract(&sections, &EngineConfig::default());
        let desc = entries[0].description.as_ref().unwrap();
        assert_eq!(desc.value, "Built the billing pipeline\nLed a team of 4");
    }

    #[test]
    fn test_date_only_line_is_not_description() {
        let sections = vec![experience_section("Acme Corp \u{2014} Engineer\n2020-2022\n")];
        let entries = extract(&sections, &EngineConfig::default());
        assert!(entries[0].description.is_none());
    }

    #[test]
    fn test_multiple_blocks_yield_multiple_entries() {
        let sections = vec![experience_section(
            "Acme Corp \u{2014} Engineer, 2020-2022\n\nGlobex \u{2014} Analyst, 2018-2020\n",
        )];
        let entries = extract(&sections, &EngineConfig::default());
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_fallback_requires_dates() {
        let other = Section {
            kind: SectionKind::Other,
            start: 0,
            end: 0,
            text: "Acme Corp \u{2014} Engineer, 2020-2022\n\nHobbies \u{2014} chess and hiking\n".to_string(),
            has_heading: false,
        };
        let entries = extract(&[other], &EngineConfig::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].organization.as_ref().unwrap().value, "Acme Corp");
    }

    #[test]
    fn test_empty_section_extracts_nothing() {
        let sections = vec![experience_section("")];
        assert!(extract(&sections, &EngineConfig::default()).is_empty());
    }
}
