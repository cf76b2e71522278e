//! In-memory event store with the same merge semantics as the MongoDB
//! gateway. Used by the pipeline tests and handy for dry runs without a
//! database.

use crate::core::TrafficEvent;
use crate::store::{EventStore, GeoPoint, StoreError, TrafficEventDocument};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Event store backed by a process-local map.
pub struct MemoryEventStore {
    documents: RwLock<HashMap<String, TrafficEventDocument>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self { documents: RwLock::new(HashMap::new()) }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().unwrap().is_empty()
    }
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn upsert(&self, event: &TrafficEvent) -> Result<(), StoreError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| StoreError::WriteError(e.to_string()))?;

        let document = documents
            .entry(event.event_id.clone())
            .or_insert_with(|| TrafficEventDocument::new(&event.event_id));

        document.event_type = Some(event.event_type.clone());
        if let Some(level) = &event.level {
            document.event_level = Some(level.clone());
        }
        if let Some(latitude) = event.latitude {
            document.point.get_or_insert_with(GeoPoint::default).latitude = Some(latitude);
        }
        if let Some(longitude) = event.longitude {
            document.point.get_or_insert_with(GeoPoint::default).longitude = Some(longitude);
        }
        if let Some(datetime) = &event.datetime {
            document.datetime = Some(datetime.clone());
        }

        Ok(())
    }

    async fn find(&self, event_id: &str) -> Result<Option<TrafficEventDocument>, StoreError> {
        let documents = self
            .documents
            .read()
            .map_err(|e| StoreError::QueryError(e.to_string()))?;
        Ok(documents.get(event_id).cloned())
    }

    async fn delete(&self, event_id: &str) -> Result<u64, StoreError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| StoreError::WriteError(e.to_string()))?;
        Ok(u64::from(documents.remove(event_id).is_some()))
    }
}
