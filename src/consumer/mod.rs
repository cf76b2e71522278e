//! AMQP message consumption loop and the per-payload extraction pipeline.

pub mod amqp_consumer;
pub mod pipeline;

pub use amqp_consumer::{AmqpConsumer, AmqpConsumerConfig, ConsumerError};
pub use pipeline::{process_payload, PipelineError, PipelineOptions, PipelineOutcome};
