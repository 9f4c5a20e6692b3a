//! Resume extraction engine.
//!
//! Takes decoded, unstructured resume text and produces a typed,
//! confidence-scored record: name, contact info, education, experience,
//! skills, certifications, and profile links. The pipeline runs
//! normalize -> segment -> extract -> assemble -> serialize; it degrades
//! to partial results with warning flags instead of failing, and holds
//! no state across requests beyond an immutable config snapshot.
//!
//! Upload handling, document-format decoding, persistence, and rendering
//! all live upstream or downstream of this crate.

pub mod assemble;
pub mod config;
pub mod errors;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod segment;
pub mod serialize;

pub use config::{ConfigHandle, EngineConfig};
pub use errors::EngineError;
pub use models::{ParseReport, SourceFormat, StructuredResume};
pub use pipeline::{Engine, ParseInput};
pub use serialize::{render, OutputFormat};
