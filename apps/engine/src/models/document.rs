use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::normalize::OffsetMap;

/// Tag describing which decoder produced the raw text. The engine never
/// sees the binary payload; the tag is carried through for reporting only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Pdf,
    Docx,
    PlainText,
    #[default]
    Unknown,
}

/// One ingested resume document, immutable for the lifetime of a parse
/// request. Holds the normalized text; the offset map translates spans
/// back to positions in the original upload.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub format: SourceFormat,
    pub text: String,
    pub offset_map: OffsetMap,
    /// Set when the normalizer had to drop or replace malformed input.
    pub lossy: bool,
}

impl Document {
    /// True when the normalized text has no content worth extracting.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
