//! Per-payload extraction pipeline: triple stream → buffer/classifier →
//! field extractor → store gateway.
//!
//! One pipeline invocation handles exactly one broker message with its own
//! triple buffer, so back-to-back deliveries can be mid-parse concurrently
//! without sharing state.

use crate::core::{TrafficEvent, TRAFFIC_EVENTS_SOURCE};
use crate::extract::{extract_event, ClassificationOutcome, TripleBuffer};
use crate::parsing::{spawn_parser, ParserEvent};
use crate::store::EventStore;

/// Options shared by every pipeline invocation.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Object IRI that classifies a message as a traffic-jam observation.
    pub marker_iri: String,
    /// Echo each extracted event as a JSON line.
    pub debug: bool,
    /// Run extraction but skip the store write.
    pub dry_run: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { marker_iri: TRAFFIC_EVENTS_SOURCE.to_string(), debug: true, dry_run: false }
    }
}

/// Result of running one message through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// A traffic-jam event was extracted and written to the store.
    Stored(TrafficEvent),
    /// A traffic-jam event was extracted but the store write was skipped
    /// (dry run).
    Extracted(TrafficEvent),
    /// The message is not a traffic-jam observation; nothing was written.
    Unmatched,
}

/// Error types for one message's pipeline run
#[derive(Debug)]
pub enum PipelineError {
    ParseError(String),
    StoreError(String),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            PipelineError::StoreError(msg) => write!(f, "Store error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}

/// Runs one raw message payload through parsing, classification,
/// extraction and persistence.
///
/// Errors are per-message; the caller logs them and keeps consuming.
pub async fn process_payload(
    payload: String,
    store: &dyn EventStore,
    options: &PipelineOptions,
) -> Result<PipelineOutcome, PipelineError> {
    let mut receiver = spawn_parser(payload);
    let mut buffer = TripleBuffer::new(&options.marker_iri);
    let mut outcome = ClassificationOutcome::Unmatched;

    while let Some(event) = receiver.recv().await {
        match event {
            ParserEvent::Triple(triple) => buffer.push(triple),
            ParserEvent::End { error } => {
                outcome = buffer.complete(error);
                break;
            }
        }
    }

    let triples = match outcome {
        ClassificationOutcome::TrafficJam(triples) => triples,
        ClassificationOutcome::Unmatched => return Ok(PipelineOutcome::Unmatched),
        ClassificationOutcome::ParseFailed(reason) => {
            return Err(PipelineError::ParseError(reason));
        }
    };

    let Some(event) = extract_event(&triples, &options.marker_iri) else {
        return Ok(PipelineOutcome::Unmatched);
    };

    if options.debug {
        match serde_json::to_string(&event) {
            Ok(json) => println!("pipeline: extracted event: {}", json),
            Err(e) => eprintln!("pipeline: event serialization failed: {}", e),
        }
    }

    if options.dry_run {
        return Ok(PipelineOutcome::Extracted(event));
    }

    store
        .upsert(&event)
        .await
        .map_err(|e| PipelineError::StoreError(e.to_string()))?;

    Ok(PipelineOutcome::Stored(event))
}
