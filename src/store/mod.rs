//! Traffic-event document store gateway.
//!
//! The pipeline only needs three operations against the document
//! collection, all keyed by `event_id`: an idempotent partial-update
//! upsert, a lookup, and a delete. They sit behind [`EventStore`] so the
//! consumption loop can be exercised against the in-memory gateway while
//! production runs against MongoDB.

pub mod memory;
pub mod mongo;

pub use memory::MemoryEventStore;
pub use mongo::{MongoEventStore, MongoStoreConfig};

use crate::core::TrafficEvent;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Geographic point of a traffic event. Both members are optional because
/// upserts only ever set the coordinates a message actually carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeoPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
}

/// Persisted shape of one traffic event, one document per `event_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficEventDocument {
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
}

impl TrafficEventDocument {
    /// Creates an empty document for `event_id` with no fields set.
    pub fn new(event_id: &str) -> Self {
        Self {
            event_id: event_id.to_string(),
            event_type: None,
            event_level: None,
            point: None,
            datetime: None,
        }
    }
}

/// Error types for store gateway operations
#[derive(Debug)]
pub enum StoreError {
    ConnectionError(String),
    WriteError(String),
    QueryError(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            StoreError::WriteError(msg) => write!(f, "Write error: {}", msg),
            StoreError::QueryError(msg) => write!(f, "Query error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Create-or-update, lookup and delete operations for traffic-event
/// documents, keyed by `event_id`.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Idempotent create-or-update. Fields that are unset on `event` are
    /// left untouched in an existing document; a previously unknown
    /// `event_id` gets a new document with exactly the supplied fields.
    async fn upsert(&self, event: &TrafficEvent) -> Result<(), StoreError>;

    /// Looks up the document for `event_id` by exact key match.
    async fn find(&self, event_id: &str) -> Result<Option<TrafficEventDocument>, StoreError>;

    /// Deletes the document for `event_id`, reporting how many documents
    /// were removed (0 or 1).
    async fn delete(&self, event_id: &str) -> Result<u64, StoreError>;
}
