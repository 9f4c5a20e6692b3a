use serde::{Deserialize, Serialize};

/// Label for a contiguous span of the document. `Other` absorbs anything
/// the segmenter could not classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Contact,
    Education,
    Experience,
    Skills,
    Certifications,
    Links,
    Other,
}

/// A labeled span of normalized text. The segmenter guarantees that the
/// sections of a document are ordered, non-overlapping, and cover the
/// whole text with no gaps.
#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    /// Byte offsets into the normalized document text.
    pub start: usize,
    pub end: usize,
    pub text: String,
    /// True when the section was opened by a detected heading line
    /// (the heading is the first line of `text`).
    pub has_heading: bool,
}

impl Section {
    /// Section text without the heading line, for extractors that should
    /// not treat the heading itself as content.
    pub fn body(&self) -> &str {
        if self.has_heading {
            match self.text.find('\n') {
                Some(i) => &self.text[i + 1..],
                None => "",
            }
        } else {
            &self.text
        }
    }

    /// Byte offset of `body()` within the normalized document.
    pub fn body_start(&self) -> usize {
        self.start + (self.text.len() - self.body().len())
    }
}
