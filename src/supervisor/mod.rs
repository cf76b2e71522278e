//! Connection supervisor: owns the store gateway and the broker
//! connection for the process lifetime.
//!
//! Both connections are established with the same discipline: on failure,
//! wait a fixed backoff and retry indefinitely. An established broker
//! connection that dies unexpectedly is treated exactly like an initial
//! connect failure. Only a requested stop ends the loop.

use crate::consumer::{AmqpConsumer, AmqpConsumerConfig, PipelineOptions};
use crate::shutdown::ShutdownSignal;
use crate::store::{EventStore, MongoEventStore, MongoStoreConfig};
use lapin::{Connection, ConnectionProperties};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for the connection supervisor
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub consumer: AmqpConsumerConfig,
    pub store: MongoStoreConfig,
    pub pipeline: PipelineOptions,
    /// Fixed delay between reconnect attempts.
    pub reconnect_backoff: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            consumer: AmqpConsumerConfig::default(),
            store: MongoStoreConfig::default(),
            pipeline: PipelineOptions::default(),
            reconnect_backoff: Duration::from_secs(1),
        }
    }
}

/// Supervises the broker and store connections and restarts the
/// consumption loop across broker failures.
pub struct ConnectionSupervisor {
    config: SupervisorConfig,
    shutdown: ShutdownSignal,
}

impl ConnectionSupervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self { config, shutdown: ShutdownSignal::new() }
    }

    /// Shared stop signal, for wiring into a signal handler.
    pub fn stop_handle(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Requests a graceful shutdown; wakes the consumer and any pending
    /// backoff sleep.
    pub fn stop(&self) {
        self.shutdown.trigger();
    }

    /// Establishes both connections and runs the consumption loop until a
    /// stop is requested, reconnecting after every failure.
    pub async fn run(&self) -> crate::Result<()> {
        let Some(store) = self.connect_store().await else {
            return Ok(());
        };
        let consumer = AmqpConsumer::new(
            self.config.consumer.clone(),
            self.config.pipeline.clone(),
            store,
            self.shutdown.clone(),
        );

        while !self.shutdown.is_triggered() {
            let connect = Connection::connect(
                &self.config.consumer.endpoint,
                ConnectionProperties::default(),
            );
            let connection = tokio::select! {
                result = connect => match result {
                    Ok(connection) => connection,
                    Err(e) => {
                        eprintln!("supervisor: data bus connection failed: {}", e);
                        self.backoff().await;
                        continue;
                    }
                },
                () = self.shutdown.triggered() => break,
            };

            println!("supervisor: connected to data bus at {}", self.config.consumer.endpoint);

            match consumer.run(&connection).await {
                Ok(()) => {
                    // Graceful stop: close the connection without reconnecting.
                    let _ = connection.close(0, "shutting down").await;
                    break;
                }
                Err(e) => {
                    eprintln!("supervisor: consumption loop failed: {}", e);
                    let _ = connection.close(0, "reconnecting").await;
                    if !self.shutdown.is_triggered() {
                        eprintln!("supervisor: reconnecting to data bus");
                        self.backoff().await;
                    }
                }
            }
        }

        let (stored, dropped) = consumer.metrics();
        println!("supervisor: stopped ({} events stored, {} messages dropped)", stored, dropped);
        Ok(())
    }

    /// Connects to the document store, retrying with the fixed backoff
    /// until it succeeds or a stop is requested.
    async fn connect_store(&self) -> Option<Arc<dyn EventStore>> {
        while !self.shutdown.is_triggered() {
            match MongoEventStore::connect(&self.config.store).await {
                Ok(store) => {
                    println!("supervisor: connected to store at {}", self.config.store.url());
                    return Some(Arc::new(store));
                }
                Err(e) => {
                    eprintln!("supervisor: store connection failed: {}", e);
                    self.backoff().await;
                }
            }
        }
        None
    }

    /// Waits out the reconnect backoff, cut short by a stop request.
    async fn backoff(&self) {
        tokio::select! {
            () = sleep(self.config.reconnect_backoff) => {}
            () = self.shutdown.triggered() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_is_one_second() {
        let config = SupervisorConfig::default();
        assert_eq!(config.reconnect_backoff, Duration::from_secs(1));
    }

    #[test]
    fn test_stop_handle_is_shared() {
        let supervisor = ConnectionSupervisor::new(SupervisorConfig::default());
        let handle = supervisor.stop_handle();
        supervisor.stop();
        assert!(handle.is_triggered());
    }

    #[tokio::test]
    async fn test_stop_ends_run_without_a_connection() {
        let supervisor = ConnectionSupervisor::new(SupervisorConfig::default());
        supervisor.stop();

        // With the stop already requested, run must return promptly instead
        // of waiting on a store or broker connection that will never come.
        tokio::time::timeout(Duration::from_secs(1), supervisor.run())
            .await
            .expect("stopped supervisor should return without connecting")
            .unwrap();
    }

    #[tokio::test]
    async fn test_stop_cuts_backoff_short() {
        let config = SupervisorConfig {
            reconnect_backoff: Duration::from_secs(3600),
            ..SupervisorConfig::default()
        };
        let supervisor = ConnectionSupervisor::new(config);
        supervisor.stop();

        tokio::time::timeout(Duration::from_millis(100), supervisor.backoff())
            .await
            .expect("backoff should end as soon as a stop is requested");
    }
}
