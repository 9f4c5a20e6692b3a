//! Parse pipeline: normalize, segment, extract (concurrently, under a
//! deadline), assemble, report. The engine is stateless across requests;
//! the only shared state is the immutable config snapshot.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assemble;
use crate::config::{ConfigHandle, EngineConfig};
use crate::errors::EngineError;
use crate::extract::{Extraction, Extractor};
use crate::models::{Document, ParseReport, Section, SourceFormat};
use crate::normalize;
use crate::segment;

/// One parse request: decoded text plus the upstream format tag.
#[derive(Debug, Clone)]
pub struct ParseInput {
    pub text: String,
    pub format: SourceFormat,
}

impl ParseInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: SourceFormat::Unknown,
        }
    }

    pub fn with_format(text: impl Into<String>, format: SourceFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }
}

/// The extraction engine. Cheap to share behind an `Arc`; every call to
/// `parse` takes its own config snapshot, so a concurrent `reload` never
/// tears a request.
pub struct Engine {
    config: ConfigHandle,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: ConfigHandle::new(config),
        }
    }

    pub fn config(&self) -> Arc<EngineConfig> {
        self.config.snapshot()
    }

    /// Atomically replaces the configuration for subsequent requests.
    pub fn reload(&self, config: EngineConfig) {
        self.config.swap(config);
        info!("engine configuration reloaded");
    }

    pub async fn parse(&self, input: ParseInput) -> Result<ParseReport, EngineError> {
        let config = self.config.snapshot();
        let started = Instant::now();
        let document_id = Uuid::new_v4();

        let normalized = normalize::normalize(&input.text);
        let document = Document {
            id: document_id,
            format: input.format,
            text: normalized.text,
            offset_map: normalized.map,
            lossy: normalized.lossy,
        };
        if document.is_empty() {
            return Err(EngineError::EmptyDocument);
        }

        let sections = segment::segment(&document.text, &config);
        debug!(
            document_id = %document_id,
            sections = sections.len(),
            bytes = document.text.len(),
            lossy = document.lossy,
            "document segmented"
        );

        let deadline = started + Duration::from_millis(config.timeout_ms);
        let sections = Arc::new(sections);
        let mut truncated = false;

        let extractions = if config.parallel {
            run_parallel(&sections, &config, deadline, &mut truncated).await
        } else {
            run_sequential(&sections, &config, deadline, &mut truncated).await
        };

        let (resume, empty_families) = assemble::assemble(extractions, &config);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            document_id = %document_id,
            elapsed_ms,
            truncated,
            empty_families = empty_families.len(),
            "parse complete"
        );

        Ok(ParseReport {
            document_id: document.id,
            format: document.format,
            resume,
            lossy: document.lossy,
            truncated,
            empty_families,
            offset_map: document.offset_map,
            elapsed_ms,
            parsed_at: Utc::now(),
        })
    }
}

/// All families as spawned tasks, each joined under the shared deadline.
/// A family that misses it is aborted and contributes nothing. Results
/// are collected in family order, so output matches the sequential path.
async fn run_parallel(
    sections: &Arc<Vec<Section>>,
    config: &Arc<EngineConfig>,
    deadline: Instant,
    truncated: &mut bool,
) -> Vec<Extraction> {
    let mut handles = Vec::with_capacity(Extractor::ALL.len());
    for extractor in Extractor::ALL {
        let sections = Arc::clone(sections);
        let config = Arc::clone(config);
        let handle = tokio::spawn(async move {
            if config.stall_ms > 0 {
                tokio::time::sleep(Duration::from_millis(config.stall_ms)).await;
            }
            extractor.extract(&sections, &config)
        });
        handles.push((extractor, handle));
    }

    let mut extractions = Vec::with_capacity(handles.len());
    for (extractor, handle) in handles {
        let abort = handle.abort_handle();
        match tokio::time::timeout_at(deadline, handle).await {
            Ok(Ok(extraction)) => extractions.push(extraction),
            Ok(Err(join_error)) => {
                // Extractors never fail the pipeline; a panicked family
                // just contributes nothing.
                warn!(family = extractor.family().as_str(), %join_error, "extractor task failed");
                extractions.push(extractor.empty());
            }
            Err(_) => {
                abort.abort();
                warn!(family = extractor.family().as_str(), "extractor missed the deadline");
                *truncated = true;
                extractions.push(extractor.empty());
            }
        }
    }
    extractions
}

/// Same semantics without task spawning. Families that start after the
/// deadline are skipped.
async fn run_sequential(
    sections: &Arc<Vec<Section>>,
    config: &Arc<EngineConfig>,
    deadline: Instant,
    truncated: &mut bool,
) -> Vec<Extraction> {
    let mut extractions = Vec::with_capacity(Extractor::ALL.len());
    for extractor in Extractor::ALL {
        if Instant::now() >= deadline {
            warn!(family = extractor.family().as_str(), "extractor skipped: deadline passed");
            *truncated = true;
            extractions.push(extractor.empty());
            continue;
        }
        if config.stall_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.stall_ms)).await;
        }
        extractions.push(extractor.extract(sections, config));
    }
    extractions
}
