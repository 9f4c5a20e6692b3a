//! Record assembler: merges extractor outputs into one StructuredResume.
//! Single-valued fields keep the highest-confidence candidate (earliest
//! offset on ties); multi-valued fields are threshold-filtered and
//! deduplicated by normalized equality, then ordered.

use std::collections::{HashMap, HashSet};

use crate::config::EngineConfig;
use crate::extract::{Extraction, FieldFamily};
use crate::models::{
    EducationEntry, ExperienceEntry, FieldValue, LinkValue, PartialDate, StructuredResume,
};

/// Folds all family extractions into the final record. Returns the
/// record plus the families that produced nothing (the partial-extraction
/// warning payload).
pub fn assemble(
    extractions: Vec<Extraction>,
    config: &EngineConfig,
) -> (StructuredResume, Vec<FieldFamily>) {
    let mut resume = StructuredResume::default();
    let mut empty_families = Vec::new();
    let min = config.min_confidence;

    for extraction in extractions {
        if extraction.is_empty() {
            empty_families.push(extraction.family());
        }
        match extraction {
            Extraction::Contact(c) => {
                resume.name = pick_best(c.names, min);
                resume.email = pick_best(c.emails, min);
                resume.phone = pick_best(c.phones, min);
            }
            Extraction::Education(entries) => {
                let mut entries = dedup_entries(entries, min, education_key);
                order_entries(&mut entries, EducationEntry::start_date, EducationEntry::offset);
                resume.education = entries;
            }
            Extraction::Experience(entries) => {
                let mut entries = dedup_entries(entries, min, experience_key);
                order_entries(&mut entries, ExperienceEntry::start_date, ExperienceEntry::offset);
                resume.experience = entries;
            }
            Extraction::Skills(values) => {
                resume.skills = dedup_values(values, min, |v| normalize_key(v));
            }
            Extraction::Certifications(values) => {
                resume.certifications = dedup_values(values, min, |v| normalize_key(v));
            }
            Extraction::Links(values) => {
                resume.links = dedup_values(values, min, |v: &LinkValue| v.url.to_lowercase());
            }
        }
    }

    if !empty_families.is_empty() {
        tracing::debug!(
            families = ?empty_families.iter().map(|f| f.as_str()).collect::<Vec<_>>(),
            "some field families produced no findings"
        );
    }

    (resume, empty_families)
}

/// Case-insensitive, whitespace-collapsed equality key.
pub(crate) fn normalize_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_lowercase()
}

/// Highest confidence wins; equal confidence falls back to the earliest
/// document offset.
fn pick_best<T>(candidates: Vec<FieldValue<T>>, min: f32) -> Option<FieldValue<T>> {
    candidates
        .into_iter()
        .filter(|c| c.confidence >= min)
        .fold(None, |best: Option<FieldValue<T>>, c| match best {
            None => Some(c),
            Some(b) => {
                let wins = c.confidence > b.confidence
                    || (c.confidence == b.confidence && c.span.start < b.span.start);
                Some(if wins { c } else { b })
            }
        })
}

/// Threshold-filters and deduplicates, keeping first-seen order. A later
/// duplicate with higher confidence replaces the kept value in place, so
/// the configured confidence policy (not arrival order) decides between
/// competing sources.
fn dedup_values<T>(
    values: Vec<FieldValue<T>>,
    min: f32,
    key: impl Fn(&T) -> String,
) -> Vec<FieldValue<T>> {
    let mut kept: Vec<FieldValue<T>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for value in values.into_iter().filter(|v| v.confidence >= min) {
        let k = key(&value.value);
        match index.get(&k) {
            Some(&i) => {
                let existing = &kept[i];
                if value.confidence > existing.confidence
                    || (value.confidence == existing.confidence
                        && value.span.start < existing.span.start)
                {
                    kept[i] = value;
                }
            }
            None => {
                index.insert(k, kept.len());
                kept.push(value);
            }
        }
    }
    kept
}

fn education_key(e: &EducationEntry) -> String {
    format!(
        "{}|{}|{}",
        e.institution
            .as_ref()
            .map(|f| normalize_key(&f.value))
            .unwrap_or_default(),
        e.degree
            .as_ref()
            .map(|f| normalize_key(&f.value))
            .unwrap_or_default(),
        e.start_date().map(|d| d.display()).unwrap_or_default(),
    )
}

fn experience_key(e: &ExperienceEntry) -> String {
    format!(
        "{}|{}|{}",
        e.organization
            .as_ref()
            .map(|f| normalize_key(&f.value))
            .unwrap_or_default(),
        e.title
            .as_ref()
            .map(|f| normalize_key(&f.value))
            .unwrap_or_default(),
        e.start_date().map(|d| d.display()).unwrap_or_default(),
    )
}

fn dedup_entries<E>(entries: Vec<E>, min: f32, key: impl Fn(&E) -> String) -> Vec<E>
where
    E: EntryConfidence,
{
    let mut kept: Vec<E> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for entry in entries {
        if entry.confidence() < min {
            continue;
        }
        if seen.insert(key(&entry)) {
            kept.push(entry);
        }
    }
    kept
}

/// Start date descending when any entry is dated, with undated entries
/// at the tail; document order otherwise.
fn order_entries<E>(
    entries: &mut [E],
    start: impl Fn(&E) -> Option<PartialDate>,
    offset: impl Fn(&E) -> usize,
) {
    if entries.iter().any(|e| start(e).is_some()) {
        entries.sort_by(|a, b| start(b).cmp(&start(a)).then_with(|| offset(a).cmp(&offset(b))));
    } else {
        entries.sort_by_key(|e| offset(e));
    }
}

/// Minimal capability shared by entry types for threshold filtering.
pub(crate) trait EntryConfidence {
    fn confidence(&self) -> f32;
}

impl EntryConfidence for EducationEntry {
    fn confidence(&self) -> f32 {
        EducationEntry::confidence(self)
    }
}

impl EntryConfidence for ExperienceEntry {
    fn confidence(&self) -> f32 {
        ExperienceEntry::confidence(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ContactFindings;
    use crate::models::{DateEnd, DateRange, SectionKind, Span};

    fn fv(value: &str, confidence: f32, start: usize) -> FieldValue<String> {
        FieldValue::new(
            value.to_string(),
            confidence,
            SectionKind::Other,
            Span::new(start, start + value.len()),
        )
    }

    fn dated_experience(org: &str, year: i32, offset: usize) -> ExperienceEntry {
        ExperienceEntry {
            organization: Some(fv(org, 0.8, offset)),
            title: None,
            dates: Some(FieldValue::new(
                DateRange {
                    start: Some(PartialDate::year(year)),
                    end: DateEnd::Unknown,
                },
                0.8,
                SectionKind::Experience,
                Span::new(offset, offset + 4),
            )),
            description: None,
        }
    }

    #[test]
    fn test_single_valued_field_keeps_highest_confidence() {
        let contact = ContactFindings {
            names: vec![fv("Header Name", 0.9, 0), fv("Signature Name", 0.55, 900)],
            emails: vec![],
            phones: vec![],
        };
        let (resume, _) = assemble(
            vec![Extraction::Contact(contact)],
            &EngineConfig::default(),
        );
        assert_eq!(resume.name.unwrap().value, "Header Name");
    }

    #[test]
    fn test_confidence_tie_breaks_by_earliest_offset() {
        let contact = ContactFindings {
            names: vec![],
            emails: vec![fv("late@example.com", 0.95, 500), fv("early@example.com", 0.95, 10)],
            phones: vec![],
        };
        let (resume, _) = assemble(
            vec![Extraction::Contact(contact)],
            &EngineConfig::default(),
        );
        assert_eq!(resume.email.unwrap().value, "early@example.com");
    }

    #[test]
    fn test_skills_dedup_is_case_insensitive() {
        let skills = vec![fv("Python", 0.9, 0), fv("python", 0.9, 20), fv("PYTHON", 0.9, 40)];
        let (resume, _) = assemble(
            vec![Extraction::Skills(skills)],
            &EngineConfig::default(),
        );
        assert_eq!(resume.skills.len(), 1);
        assert_eq!(resume.skills[0].value, "Python");
    }

    #[test]
    fn test_higher_confidence_duplicate_replaces_kept_value() {
        // Gazetteer hit first, explicit section match later: the policy
        // confidences decide, not arrival order.
        let skills = vec![fv("python", 0.6, 300), fv("Python", 0.9, 700)];
        let (resume, _) = assemble(
            vec![Extraction::Skills(skills)],
            &EngineConfig::default(),
        );
        assert_eq!(resume.skills.len(), 1);
        assert_eq!(resume.skills[0].value, "Python");
        assert!((resume.skills[0].confidence - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_below_threshold_values_are_omitted() {
        let skills = vec![fv("Python", 0.9, 0), fv("guesswork", 0.1, 10)];
        let (resume, _) = assemble(
            vec![Extraction::Skills(skills)],
            &EngineConfig::default(),
        );
        assert_eq!(resume.skills.len(), 1);
    }

    #[test]
    fn test_experience_ordered_by_start_date_descending() {
        let entries = vec![
            dated_experience("Old Corp", 2015, 0),
            dated_experience("New Corp", 2021, 100),
            dated_experience("Mid Corp", 2018, 200),
        ];
        let (resume, _) = assemble(
            vec![Extraction::Experience(entries)],
            &EngineConfig::default(),
        );
        let orgs: Vec<&str> = resume
            .experience
            .iter()
            .map(|e| e.organization.as_ref().unwrap().value.as_str())
            .collect();
        assert_eq!(orgs, vec!["New Corp", "Mid Corp", "Old Corp"]);
    }

    #[test]
    fn test_undated_entries_keep_document_order() {
        let a = ExperienceEntry {
            organization: Some(fv("First Corp", 0.8, 0)),
            ..Default::default()
        };
        let b = ExperienceEntry {
            organization: Some(fv("Second Corp", 0.8, 50)),
            ..Default::default()
        };
        let (resume, _) = assemble(
            vec![Extraction::Experience(vec![a, b])],
            &EngineConfig::default(),
        );
        let orgs: Vec<&str> = resume
            .experience
            .iter()
            .map(|e| e.organization.as_ref().unwrap().value.as_str())
            .collect();
        assert_eq!(orgs, vec!["First Corp", "Second Corp"]);
    }

    #[test]
    fn test_duplicate_entries_collapse() {
        let entries = vec![
            dated_experience("Acme Corp", 2020, 0),
            dated_experience("ACME CORP", 2020, 300),
        ];
        let (resume, _) = assemble(
            vec![Extraction::Experience(entries)],
            &EngineConfig::default(),
        );
        assert_eq!(resume.experience.len(), 1);
    }

    #[test]
    fn test_empty_families_are_reported() {
        let (resume, empty) = assemble(
            vec![
                Extraction::Skills(vec![fv("Python", 0.9, 0)]),
                Extraction::Links(vec![]),
                Extraction::Certifications(vec![]),
            ],
            &EngineConfig::default(),
        );
        assert_eq!(resume.skills.len(), 1);
        assert_eq!(empty, vec![FieldFamily::Links, FieldFamily::Certifications]);
    }
}
