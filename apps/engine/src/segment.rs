//! Section segmenter: partitions normalized text into labeled sections
//! by scanning for heading lines against the configured synonym table.
//! Guarantees an ordered, gap-free, non-overlapping partition.

use crate::config::EngineConfig;
use crate::extract::contact::{EMAIL_RE, PHONE_RE};
use crate::models::{Section, SectionKind};

/// Headings are short lines; anything longer is body text.
const MAX_HEADING_LEN: usize = 48;

/// Matches a line against the synonym table. The longest matched phrase
/// wins; equal lengths fall back to declaration order in the table.
pub(crate) fn heading_kind(line: &str, config: &EngineConfig) -> Option<SectionKind> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_HEADING_LEN || trimmed.starts_with("- ") {
        return None;
    }
    let lower = trimmed.to_lowercase();

    let mut best: Option<(usize, SectionKind)> = None;
    for entry in &config.synonyms {
        for phrase in &entry.phrases {
            let phrase = phrase.to_lowercase();
            if !lower.starts_with(&phrase) {
                continue;
            }
            let residue = &lower[phrase.len()..];
            // Whole-word match: "experienced" is not a heading.
            if residue.chars().next().is_some_and(|c| c.is_alphanumeric()) {
                continue;
            }
            // Only a trailing colon may follow the phrase.
            let residue = residue.trim();
            if !residue.is_empty() && residue != ":" {
                continue;
            }
            let keep = match best {
                Some((len, _)) => phrase.len() > len,
                None => true,
            };
            if keep {
                best = Some((phrase.len(), entry.kind));
            }
        }
    }
    best.map(|(_, kind)| kind)
}

/// Splits normalized text into sections. Text before the first heading is
/// Contact when it carries an email or phone, Other otherwise; a document
/// with no detected headings becomes a single Other section.
pub fn segment(text: &str, config: &EngineConfig) -> Vec<Section> {
    let mut headings: Vec<(usize, SectionKind)> = Vec::new();
    let mut pos = 0;
    for line in text.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        if let Some(kind) = heading_kind(content, config) {
            headings.push((pos, kind));
        }
        pos += line.len();
    }

    let mut sections = Vec::new();
    if headings.is_empty() {
        tracing::debug!("no headings detected; whole document becomes one section");
        sections.push(make_section(SectionKind::Other, 0, text.len(), text, false));
        return sections;
    }

    let first_start = headings[0].0;
    if first_start > 0 {
        let preamble = &text[..first_start];
        let kind = if EMAIL_RE.is_match(preamble) || PHONE_RE.is_match(preamble) {
            SectionKind::Contact
        } else {
            SectionKind::Other
        };
        sections.push(make_section(kind, 0, first_start, text, false));
    }
    for (i, &(start, kind)) in headings.iter().enumerate() {
        let end = headings.get(i + 1).map(|&(s, _)| s).unwrap_or(text.len());
        sections.push(make_section(kind, start, end, text, true));
    }
    sections
}

fn make_section(
    kind: SectionKind,
    start: usize,
    end: usize,
    text: &str,
    has_heading: bool,
) -> Section {
    Section {
        kind,
        start,
        end,
        text: text[start..end].to_string(),
        has_heading,
    }
}
