//! Core data structures and types for the CityPulse ingestion pipeline

use serde::Serialize;

/// Object IRI that marks a triple set as a traffic-jam observation.
pub const TRAFFIC_EVENTS_SOURCE: &str = "http://purl.oclc.org/NET/UNIS/sao/ec#TrafficJam";

/// Event type written for every persisted traffic-jam document.
pub const TRAFFIC_JAM_EVENT_TYPE: &str = "TrafficJam";

/// One RDF statement in the text form the CityPulse data bus has always
/// carried: IRIs bare, blank nodes as `_:id`, literals quoted with an
/// optional `^^datatype` suffix. Immutable once produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub graph: String,
}

/// Implement methods for Triple struct.
impl Triple {
    pub fn new(subject: &str, predicate: &str, object: &str, graph: &str) -> Self {
        Self {
            subject: subject.to_string(),
            predicate: predicate.to_string(),
            object: object.to_string(),
            graph: graph.to_string(),
        }
    }
}

/// Traffic-jam event extracted from one message's triple set.
///
/// Only `event_id` and `event_type` are guaranteed; every attribute field
/// stays `None` when its predicate never appeared in the message (extraction
/// is sparse matching, not schema validation).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficEvent {
    pub event_id: String,
    pub event_type: String,
    pub level: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub datetime: Option<String>,
}

impl TrafficEvent {
    /// Creates an event carrying only its identity, with all attribute
    /// fields unset.
    pub fn new(event_id: &str) -> Self {
        Self {
            event_id: event_id.to_string(),
            event_type: TRAFFIC_JAM_EVENT_TYPE.to_string(),
            level: None,
            latitude: None,
            longitude: None,
            datetime: None,
        }
    }
}
