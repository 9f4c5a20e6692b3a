use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extract::FieldFamily;
use crate::models::document::SourceFormat;
use crate::models::section::SectionKind;
use crate::normalize::OffsetMap;

/// Byte range in the normalized document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// An extracted value with its confidence and provenance. Every field of
/// the assembled record is wrapped in one of these so conflict resolution
/// can stay generic over the value type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue<T> {
    pub value: T,
    /// In [0, 1]. Values below the configured minimum are dropped by the
    /// assembler rather than guessed at.
    pub confidence: f32,
    pub section: SectionKind,
    pub span: Span,
}

impl<T> FieldValue<T> {
    pub fn new(value: T, confidence: f32, section: SectionKind, span: Span) -> Self {
        Self {
            value,
            confidence: confidence.clamp(0.0, 1.0),
            section,
            span,
        }
    }
}

/// A possibly incomplete calendar date. Resume date ranges rarely carry
/// days, and often not even months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartialDate {
    pub year: i32,
    /// 1-12 when known.
    pub month: Option<u32>,
}

impl PartialDate {
    pub fn year(year: i32) -> Self {
        Self { year, month: None }
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
        }
    }

    /// Display form used across JSON and CSV output: `2020` or `2020-03`.
    pub fn display(&self) -> String {
        match self.month {
            Some(m) => format!("{}-{:02}", self.year, m),
            None => self.year.to_string(),
        }
    }
}

/// Right end of a date range. `Open` covers "Present"/"Current" spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateEnd {
    Known(PartialDate),
    Open,
    Unknown,
}

/// A date range where either end may be missing. A malformed range keeps
/// whichever end parsed instead of being discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<PartialDate>,
    pub end: DateEnd,
}

impl DateRange {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && matches!(self.end, DateEnd::Unknown)
    }

    /// End rendered for output: `Some("present")` for an open range.
    pub fn end_display(&self) -> Option<String> {
        match self.end {
            DateEnd::Known(d) => Some(d.display()),
            DateEnd::Open => Some("present".to_string()),
            DateEnd::Unknown => None,
        }
    }
}

/// One education record. Fields are individually optional; a block that
/// produced none of them is never emitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: Option<FieldValue<String>>,
    pub degree: Option<FieldValue<String>>,
    pub dates: Option<FieldValue<DateRange>>,
    pub gpa: Option<FieldValue<String>>,
}

impl EducationEntry {
    pub fn is_empty(&self) -> bool {
        self.institution.is_none() && self.degree.is_none() && self.dates.is_none()
    }

    /// Best confidence among populated fields; used for threshold filtering.
    pub fn confidence(&self) -> f32 {
        [
            self.institution.as_ref().map(|f| f.confidence),
            self.degree.as_ref().map(|f| f.confidence),
            self.dates.as_ref().map(|f| f.confidence),
            self.gpa.as_ref().map(|f| f.confidence),
        ]
        .into_iter()
        .flatten()
        .fold(0.0, f32::max)
    }

    pub fn start_date(&self) -> Option<PartialDate> {
        self.dates.as_ref().and_then(|d| d.value.start)
    }

    /// Earliest source offset among populated fields, for document ordering.
    pub fn offset(&self) -> usize {
        [
            self.institution.as_ref().map(|f| f.span.start),
            self.degree.as_ref().map(|f| f.span.start),
            self.dates.as_ref().map(|f| f.span.start),
        ]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(usize::MAX)
    }
}

/// One work experience record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub organization: Option<FieldValue<String>>,
    pub title: Option<FieldValue<String>>,
    pub dates: Option<FieldValue<DateRange>>,
    pub description: Option<FieldValue<String>>,
}

impl ExperienceEntry {
    pub fn is_empty(&self) -> bool {
        self.organization.is_none() && self.title.is_none() && self.dates.is_none()
    }

    pub fn confidence(&self) -> f32 {
        [
            self.organization.as_ref().map(|f| f.confidence),
            self.title.as_ref().map(|f| f.confidence),
            self.dates.as_ref().map(|f| f.confidence),
            self.description.as_ref().map(|f| f.confidence),
        ]
        .into_iter()
        .flatten()
        .fold(0.0, f32::max)
    }

    pub fn start_date(&self) -> Option<PartialDate> {
        self.dates.as_ref().and_then(|d| d.value.start)
    }

    pub fn offset(&self) -> usize {
        [
            self.organization.as_ref().map(|f| f.span.start),
            self.title.as_ref().map(|f| f.span.start),
            self.dates.as_ref().map(|f| f.span.start),
        ]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(usize::MAX)
    }
}

/// Platform classification of an extracted URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    LinkedIn,
    GitHub,
    Portfolio,
    Other,
}

/// A canonicalized URL plus its platform classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkValue {
    pub url: String,
    pub kind: LinkKind,
}

/// The final assembled record. Single-valued fields hold the winner of
/// conflict resolution; multi-valued fields are deduplicated and ordered
/// by the assembler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredResume {
    pub name: Option<FieldValue<String>>,
    pub email: Option<FieldValue<String>>,
    pub phone: Option<FieldValue<String>>,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<FieldValue<String>>,
    pub certifications: Vec<FieldValue<String>>,
    pub links: Vec<FieldValue<LinkValue>>,
}

/// Everything a parse request produces: the record plus degradation flags.
/// Partial extraction and timeouts are reported here, never as errors.
#[derive(Debug, Clone)]
pub struct ParseReport {
    pub document_id: Uuid,
    pub format: SourceFormat,
    pub resume: StructuredResume,
    /// The normalizer replaced or dropped malformed input.
    pub lossy: bool,
    /// The extraction time budget expired before every family finished.
    pub truncated: bool,
    /// Families that found nothing (the partial-extraction warning payload).
    pub empty_families: Vec<FieldFamily>,
    pub offset_map: OffsetMap,
    pub elapsed_ms: u64,
    pub parsed_at: DateTime<Utc>,
}
