//! Entity extractors: one family per field group, modeled as a fixed set
//! of tagged variants sharing a single extract capability. Each family is
//! a pure function over the section slice and can be tested in isolation.
//! Extractors never fail; a family that finds nothing returns an empty
//! result.

pub mod certifications;
pub mod contact;
pub mod dates;
pub mod education;
pub mod experience;
pub mod links;
pub mod skills;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::models::{EducationEntry, ExperienceEntry, FieldValue, LinkValue, Section};

/// The six field families the engine extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFamily {
    Contact,
    Education,
    Experience,
    Skills,
    Certifications,
    Links,
}

impl FieldFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldFamily::Contact => "contact",
            FieldFamily::Education => "education",
            FieldFamily::Experience => "experience",
            FieldFamily::Skills => "skills",
            FieldFamily::Certifications => "certifications",
            FieldFamily::Links => "links",
        }
    }
}

/// Raw contact findings before conflict resolution. Multiple candidates
/// per field are expected; the assembler picks the winners.
#[derive(Debug, Clone, Default)]
pub struct ContactFindings {
    pub names: Vec<FieldValue<String>>,
    pub emails: Vec<FieldValue<String>>,
    pub phones: Vec<FieldValue<String>>,
}

impl ContactFindings {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.emails.is_empty() && self.phones.is_empty()
    }
}

/// Output of one extractor family.
#[derive(Debug, Clone)]
pub enum Extraction {
    Contact(ContactFindings),
    Education(Vec<EducationEntry>),
    Experience(Vec<ExperienceEntry>),
    Skills(Vec<FieldValue<String>>),
    Certifications(Vec<FieldValue<String>>),
    Links(Vec<FieldValue<LinkValue>>),
}

impl Extraction {
    pub fn family(&self) -> FieldFamily {
        match self {
            Extraction::Contact(_) => FieldFamily::Contact,
            Extraction::Education(_) => FieldFamily::Education,
            Extraction::Experience(_) => FieldFamily::Experience,
            Extraction::Skills(_) => FieldFamily::Skills,
            Extraction::Certifications(_) => FieldFamily::Certifications,
            Extraction::Links(_) => FieldFamily::Links,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Extraction::Contact(c) => c.is_empty(),
            Extraction::Education(v) => v.is_empty(),
            Extraction::Experience(v) => v.is_empty(),
            Extraction::Skills(v) => v.is_empty(),
            Extraction::Certifications(v) => v.is_empty(),
            Extraction::Links(v) => v.is_empty(),
        }
    }
}

/// Tagged extractor variants. Dispatch is a match, not a vtable: the set
/// of families is closed and the assembler composes them by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    Contact,
    Education,
    Experience,
    Skills,
    Certifications,
    Links,
}

impl Extractor {
    pub const ALL: [Extractor; 6] = [
        Extractor::Contact,
        Extractor::Education,
        Extractor::Experience,
        Extractor::Skills,
        Extractor::Certifications,
        Extractor::Links,
    ];

    pub fn family(self) -> FieldFamily {
        match self {
            Extractor::Contact => FieldFamily::Contact,
            Extractor::Education => FieldFamily::Education,
            Extractor::Experience => FieldFamily::Experience,
            Extractor::Skills => FieldFamily::Skills,
            Extractor::Certifications => FieldFamily::Certifications,
            Extractor::Links => FieldFamily::Links,
        }
    }

    pub fn extract(self, sections: &[Section], config: &EngineConfig) -> Extraction {
        match self {
            Extractor::Contact => Extraction::Contact(contact::extract(sections, config)),
            Extractor::Education => Extraction::Education(education::extract(sections, config)),
            Extractor::Experience => Extraction::Experience(experience::extract(sections, config)),
            Extractor::Skills => Extraction::Skills(skills::extract(sections, config)),
            Extractor::Certifications => {
                Extraction::Certifications(certifications::extract(sections, config))
            }
            Extractor::Links => Extraction::Links(links::extract(sections, config)),
        }
    }

    /// The result a family contributes when it was skipped or timed out.
    pub fn empty(self) -> Extraction {
        match self {
            Extractor::Contact => Extraction::Contact(ContactFindings::default()),
            Extractor::Education => Extraction::Education(Vec::new()),
            Extractor::Experience => Extraction::Experience(Vec::new()),
            Extractor::Skills => Extraction::Skills(Vec::new()),
            Extractor::Certifications => Extraction::Certifications(Vec::new()),
            Extractor::Links => Extraction::Links(Vec::new()),
        }
    }
}

/// A group of consecutive non-blank lines within a section body, with
/// absolute offsets into the normalized document. Education and
/// experience entries are block-shaped.
#[derive(Debug)]
pub(crate) struct Block<'a> {
    pub lines: Vec<(usize, &'a str)>,
}

pub(crate) fn split_blocks(section: &Section) -> Vec<Block<'_>> {
    let body = section.body();
    let base = section.body_start();
    let mut blocks = Vec::new();
    let mut current: Vec<(usize, &str)> = Vec::new();
    let mut pos = 0;
    for line in body.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        let trimmed = content.trim();
        if trimmed.is_empty() {
            if !current.is_empty() {
                blocks.push(Block {
                    lines: std::mem::take(&mut current),
                });
            }
        } else {
            let lead = content.len() - content.trim_start().len();
            current.push((base + pos + lead, trimmed));
        }
        pos += line.len();
    }
    if !current.is_empty() {
        blocks.push(Block { lines: current });
    }
    blocks
}

/// Case-insensitive whole-word containment, tolerant of keywords that
/// carry dots ("b.tech").
pub(crate) fn contains_keyword(line: &str, keyword: &str) -> bool {
    let lower = line.to_lowercase();
    let keyword = keyword.to_lowercase();
    for (idx, _) in lower.match_indices(&keyword) {
        let before_ok = idx == 0
            || !lower[..idx]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let after = idx + keyword.len();
        let after_ok = after >= lower.len()
            || !lower[after..].chars().next().is_some_and(|c| c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionKind;

    fn make_section(text: &str, has_heading: bool) -> Section {
        Section {
            kind: SectionKind::Education,
            start: 0,
            end: text.len(),
            text: text.to_string(),
            has_heading,
        }
    }

    #[test]
    fn test_split_blocks_on_blank_lines() {
        let s = make_section("Education\nMIT\nBSc CS\n\nStanford\nMSc CS\n", true);
        let blocks = split_blocks(&s);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].lines.len(), 2);
        assert_eq!(blocks[0].lines[0].1, "MIT");
        assert_eq!(blocks[1].lines[0].1, "Stanford");
    }

    #[test]
    fn test_block_offsets_are_absolute() {
        let s = make_section("Education\nMIT\n", true);
        let blocks = split_blocks(&s);
        // "MIT" starts right after "Education\n".
        assert_eq!(blocks[0].lines[0].0, 10);
    }

    #[test]
    fn test_contains_keyword_respects_word_boundaries() {
        assert!(contains_keyword("Master of Science", "master"));
        assert!(contains_keyword("B.Tech in CS", "b.tech"));
        assert!(!contains_keyword("Mastering Go", "master"));
    }

    #[test]
    fn test_extractor_families_are_distinct_and_complete() {
        let families: Vec<FieldFamily> = Extractor::ALL.iter().map(|e| e.family()).collect();
        assert_eq!(families.len(), 6);
        for e in Extractor::ALL {
            assert!(e.empty().is_empty());
            assert_eq!(e.empty().family(), e.family());
        }
    }
}
