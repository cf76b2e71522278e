//! Triple buffer and classifier: one instance per in-flight message.
//!
//! Triples are accumulated in delivery order while the parser runs.
//! Classification is resolved only at stream completion, because the marker
//! triple may appear anywhere in the sequence; the traffic-jam flag is
//! monotonic and never cleared once set.

use crate::core::Triple;

/// Result of completing a message's triple stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationOutcome {
    /// The message describes a traffic jam; the finalized triple sequence
    /// is handed on for field extraction.
    TrafficJam(Vec<Triple>),
    /// No triple matched the marker IRI; the sequence is discarded.
    Unmatched,
    /// The parser signalled an error, invalidating every buffered triple.
    ParseFailed(String),
}

/// Ordered triple accumulator for a single broker message.
#[derive(Debug)]
pub struct TripleBuffer {
    marker_iri: String,
    triples: Vec<Triple>,
    traffic_jam: bool,
}

impl TripleBuffer {
    /// Creates an empty buffer classifying against `marker_iri`.
    pub fn new(marker_iri: &str) -> Self {
        Self { marker_iri: marker_iri.to_string(), triples: Vec::new(), traffic_jam: false }
    }

    /// Appends one parsed triple, raising the traffic-jam flag when its
    /// object equals the marker IRI.
    pub fn push(&mut self, triple: Triple) {
        if triple.object == self.marker_iri {
            self.traffic_jam = true;
        }
        self.triples.push(triple);
    }

    /// Whether the marker triple has been seen so far.
    pub fn is_traffic_jam(&self) -> bool {
        self.traffic_jam
    }

    /// Number of buffered triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Finalizes the buffer once the parser signalled end-of-stream.
    ///
    /// A parse error drops the whole message, even when the marker triple
    /// was already seen: no triple is valid after an error signal.
    pub fn complete(self, parse_error: Option<String>) -> ClassificationOutcome {
        if let Some(error) = parse_error {
            return ClassificationOutcome::ParseFailed(error);
        }
        if self.traffic_jam {
            ClassificationOutcome::TrafficJam(self.triples)
        } else {
            ClassificationOutcome::Unmatched
        }
    }
}
