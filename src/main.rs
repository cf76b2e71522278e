//! CityPulse Ingest - AMQP ingestion daemon for CityPulse traffic-jam events.
//!
//! Usage:
//!   citypulse-ingest
//!   citypulse-ingest --amqp-url amqp://databus:5672/%2f --exchange annotated_data
//!   citypulse-ingest --routing-key Aarhus.Road.Traffic.195070 --dry-run

use citypulse_ingest::consumer::{AmqpConsumerConfig, PipelineOptions};
use citypulse_ingest::store::MongoStoreConfig;
use citypulse_ingest::supervisor::{ConnectionSupervisor, SupervisorConfig};
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "citypulse-ingest")]
#[command(about = "Consume annotated CityPulse RDF events and persist traffic jams to MongoDB")]
struct Args {
    /// AMQP endpoint of the CityPulse data bus
    #[arg(long, default_value = "amqp://localhost:8007/%2f")]
    amqp_url: String,

    /// Queue to declare and consume from
    #[arg(short, long, default_value = "dynamic-bus-scheduling")]
    queue: String,

    /// Exchange to bind the queue to (e.g. "events" or "annotated_data")
    #[arg(short, long, default_value = "events")]
    exchange: String,

    /// Routing-key pattern for the binding ("#" matches all topics)
    #[arg(short, long, default_value = "#")]
    routing_key: String,

    /// Per-queue message time-to-live in milliseconds
    #[arg(long, default_value = "600000")]
    message_ttl: u32,

    /// MongoDB host
    #[arg(long, default_value = "127.0.0.1")]
    mongodb_host: String,

    /// MongoDB port
    #[arg(long, default_value = "27017")]
    mongodb_port: u16,

    /// MongoDB database name
    #[arg(long, default_value = "dynamic_bus_scheduling")]
    database: String,

    /// Collection for traffic-event documents
    #[arg(long, default_value = "TrafficEventDocuments")]
    collection: String,

    /// Reconnect backoff in seconds
    #[arg(long, default_value = "1")]
    backoff_secs: u64,

    /// Suppress the JSON echo of each extracted event
    #[arg(long)]
    quiet: bool,

    /// Run the full pipeline but skip the store writes
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("CityPulse Ingest");
    println!("================\n");

    let config = SupervisorConfig {
        consumer: AmqpConsumerConfig {
            endpoint: args.amqp_url,
            queue: args.queue,
            exchange: args.exchange,
            routing_key: args.routing_key,
            message_ttl_ms: args.message_ttl,
            ..AmqpConsumerConfig::default()
        },
        store: MongoStoreConfig {
            host: args.mongodb_host,
            port: args.mongodb_port,
            database: args.database,
            collection: args.collection,
        },
        pipeline: PipelineOptions {
            debug: !args.quiet,
            dry_run: args.dry_run,
            ..PipelineOptions::default()
        },
        reconnect_backoff: Duration::from_secs(args.backoff_secs),
    };

    let supervisor = ConnectionSupervisor::new(config);

    let stop_handle = supervisor.stop_handle();
    ctrlc::set_handler(move || {
        println!("\nShutting down...");
        stop_handle.trigger();
    })?;

    supervisor.run().await?;

    Ok(())
}
