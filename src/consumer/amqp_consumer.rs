//! AMQP consumer that binds one queue to one exchange and feeds every
//! delivered payload through the extraction pipeline.
//!
//! Deliveries are consumed with broker auto-acknowledgement (`no_ack`), as
//! the CityPulse data bus has always been consumed; a message whose
//! processing fails is not redelivered. A malformed message is logged and
//! dropped, never aborting the loop.

use crate::consumer::pipeline::{process_payload, PipelineOptions, PipelineOutcome};
use crate::shutdown::ShutdownSignal;
use crate::store::EventStore;
use futures_util::StreamExt;
use lapin::options::{BasicConsumeOptions, QueueBindOptions, QueueDeclareOptions};
use lapin::types::{AMQPValue, FieldTable};
use lapin::Connection;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Configuration for the AMQP consumer
#[derive(Debug, Clone)]
pub struct AmqpConsumerConfig {
    pub endpoint: String,
    pub queue: String,
    pub exchange: String,
    pub routing_key: String,
    pub message_ttl_ms: u32,
    pub consumer_tag: String,
}

impl Default for AmqpConsumerConfig {
    fn default() -> Self {
        Self {
            endpoint: "amqp://localhost:8007/%2f".to_string(),
            queue: "dynamic-bus-scheduling".to_string(),
            exchange: "events".to_string(),
            routing_key: "#".to_string(),
            message_ttl_ms: 600_000,
            consumer_tag: "citypulse_ingest".to_string(),
        }
    }
}

/// Error types for the AMQP consumer
#[derive(Debug)]
pub enum ConsumerError {
    ChannelError(String),
    QueueError(String),
    ConsumeError(String),
}

impl std::fmt::Display for ConsumerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsumerError::ChannelError(msg) => write!(f, "Channel error: {}", msg),
            ConsumerError::QueueError(msg) => write!(f, "Queue error: {}", msg),
            ConsumerError::ConsumeError(msg) => write!(f, "Consume error: {}", msg),
        }
    }
}

impl std::error::Error for ConsumerError {}

/// AMQP consumer that drives the extraction pipeline for every delivery.
pub struct AmqpConsumer {
    config: AmqpConsumerConfig,
    options: PipelineOptions,
    store: Arc<dyn EventStore>,
    shutdown: ShutdownSignal,
    events_stored: Arc<AtomicU64>,
    messages_dropped: Arc<AtomicU64>,
}

impl AmqpConsumer {
    /// Creates a new consumer over an already established store gateway.
    pub fn new(
        config: AmqpConsumerConfig,
        options: PipelineOptions,
        store: Arc<dyn EventStore>,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            config,
            options,
            store,
            shutdown,
            events_stored: Arc::new(AtomicU64::new(0)),
            messages_dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Declares and binds the queue on `connection`, then consumes until
    /// the connection dies or [`stop`](Self::stop) is requested.
    ///
    /// Returns `Ok(())` on a graceful stop; an error means the channel
    /// failed and the supervisor should reconnect.
    pub async fn run(&self, connection: &Connection) -> Result<(), ConsumerError> {
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| ConsumerError::ChannelError(e.to_string()))?;

        let mut arguments = FieldTable::default();
        arguments.insert("x-message-ttl".into(), AMQPValue::LongUInt(self.config.message_ttl_ms));

        channel
            .queue_declare(
                &self.config.queue,
                QueueDeclareOptions {
                    durable: false,
                    auto_delete: true,
                    ..QueueDeclareOptions::default()
                },
                arguments,
            )
            .await
            .map_err(|e| ConsumerError::QueueError(e.to_string()))?;

        channel
            .queue_bind(
                &self.config.queue,
                &self.config.exchange,
                &self.config.routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| ConsumerError::QueueError(e.to_string()))?;

        let mut consumer = channel
            .basic_consume(
                &self.config.queue,
                &self.config.consumer_tag,
                BasicConsumeOptions { no_ack: true, ..BasicConsumeOptions::default() },
                FieldTable::default(),
            )
            .await
            .map_err(|e| ConsumerError::ConsumeError(e.to_string()))?;

        println!(
            "amqp_consumer: consuming queue '{}' bound to exchange '{}' with routing key '{}'",
            self.config.queue, self.config.exchange, self.config.routing_key
        );

        loop {
            // The shutdown branch wakes the loop even while the delivery
            // stream is idle.
            let delivery = tokio::select! {
                delivery = consumer.next() => delivery,
                () = self.shutdown.triggered() => {
                    println!("amqp_consumer: stop requested, shutting down");
                    return Ok(());
                }
            };

            let Some(delivery) = delivery else { break };

            let delivery = match delivery {
                Ok(delivery) => delivery,
                Err(e) => return Err(ConsumerError::ConsumeError(e.to_string())),
            };

            let payload = String::from_utf8_lossy(&delivery.data).into_owned();
            let store = Arc::clone(&self.store);
            let options = self.options.clone();
            let events_stored = Arc::clone(&self.events_stored);
            let messages_dropped = Arc::clone(&self.messages_dropped);

            // One task per message: distinct deliveries may be mid-parse
            // concurrently, each with its own triple buffer.
            tokio::spawn(async move {
                match process_payload(payload, store.as_ref(), &options).await {
                    Ok(PipelineOutcome::Stored(event)) => {
                        events_stored.fetch_add(1, Ordering::Relaxed);
                        println!("amqp_consumer: stored traffic event '{}'", event.event_id);
                    }
                    Ok(PipelineOutcome::Extracted(event)) => {
                        println!(
                            "amqp_consumer: extracted traffic event '{}' (dry run, write skipped)",
                            event.event_id
                        );
                    }
                    Ok(PipelineOutcome::Unmatched) => {}
                    Err(e) => {
                        messages_dropped.fetch_add(1, Ordering::Relaxed);
                        eprintln!("amqp_consumer: message dropped: {}", e);
                    }
                }
            });
        }

        if self.shutdown.is_triggered() {
            Ok(())
        } else {
            Err(ConsumerError::ConsumeError("delivery stream ended unexpectedly".to_string()))
        }
    }

    /// Requests a graceful stop; wakes the loop even with no delivery
    /// in flight.
    pub fn stop(&self) {
        self.shutdown.trigger();
    }

    /// Returns (events stored, messages dropped) counters.
    pub fn metrics(&self) -> (u64, u64) {
        (self.events_stored.load(Ordering::Relaxed), self.messages_dropped.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_data_bus_contract() {
        let config = AmqpConsumerConfig::default();
        assert_eq!(config.queue, "dynamic-bus-scheduling");
        assert_eq!(config.exchange, "events");
        assert_eq!(config.routing_key, "#");
        assert_eq!(config.message_ttl_ms, 600_000);
    }
}
