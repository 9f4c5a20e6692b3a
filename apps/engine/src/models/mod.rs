pub mod document;
pub mod record;
pub mod section;

pub use document::{Document, SourceFormat};
pub use record::{
    DateEnd, DateRange, EducationEntry, ExperienceEntry, FieldValue, LinkKind, LinkValue,
    ParseReport, PartialDate, Span, StructuredResume,
};
pub use section::{Section, SectionKind};
