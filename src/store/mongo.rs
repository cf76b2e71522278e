//! MongoDB-backed event store gateway.

use crate::core::TrafficEvent;
use crate::store::{EventStore, StoreError, TrafficEventDocument};
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::{Client, Collection};

/// Configuration for the MongoDB event store
#[derive(Debug, Clone)]
pub struct MongoStoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub collection: String,
}

impl Default for MongoStoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 27017,
            database: "dynamic_bus_scheduling".to_string(),
            collection: "TrafficEventDocuments".to_string(),
        }
    }
}

impl MongoStoreConfig {
    /// Connection URL in the form `mongodb://host:port/database`.
    pub fn url(&self) -> String {
        format!("mongodb://{}:{}/{}", self.host, self.port, self.database)
    }
}

/// Event store backed by one MongoDB collection, keyed by `event_id`.
pub struct MongoEventStore {
    collection: Collection<TrafficEventDocument>,
}

impl MongoEventStore {
    /// Connects to the configured database and verifies the connection
    /// with a ping before handing back the gateway.
    pub async fn connect(config: &MongoStoreConfig) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(config.url())
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        let database = client.database(&config.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::ConnectionError(e.to_string()))?;

        Ok(Self { collection: database.collection(&config.collection) })
    }
}

#[async_trait]
impl EventStore for MongoEventStore {
    async fn upsert(&self, event: &TrafficEvent) -> Result<(), StoreError> {
        // $set carries only the resolved fields so an earlier delivery's
        // values survive a later partial one. Coordinates use dotted paths
        // to merge into the point subdocument independently.
        let mut set = doc! { "event_type": event.event_type.as_str() };
        if let Some(level) = &event.level {
            set.insert("event_level", level.as_str());
        }
        if let Some(latitude) = event.latitude {
            set.insert("point.latitude", latitude);
        }
        if let Some(longitude) = event.longitude {
            set.insert("point.longitude", longitude);
        }
        if let Some(datetime) = &event.datetime {
            set.insert("datetime", datetime.as_str());
        }

        self.collection
            .update_one(doc! { "event_id": event.event_id.as_str() }, doc! { "$set": set })
            .upsert(true)
            .await
            .map_err(|e| StoreError::WriteError(e.to_string()))?;

        Ok(())
    }

    async fn find(&self, event_id: &str) -> Result<Option<TrafficEventDocument>, StoreError> {
        self.collection
            .find_one(doc! { "event_id": event_id })
            .await
            .map_err(|e| StoreError::QueryError(e.to_string()))
    }

    async fn delete(&self, event_id: &str) -> Result<u64, StoreError> {
        let result = self
            .collection
            .delete_one(doc! { "event_id": event_id })
            .await
            .map_err(|e| StoreError::WriteError(e.to_string()))?;
        Ok(result.deleted_count)
    }
}
