//! # CityPulse Ingest
//!
//! CityPulse Ingest is a long-running daemon that consumes annotated RDF
//! event streams from the CityPulse data bus (AMQP), recognizes traffic-jam
//! observations inside each message's triple set, extracts their structured
//! fields and persists one document per event into MongoDB. Repeated
//! deliveries of the same event converge to a single up-to-date record.
//!
//! ## Features
//!
//! - Resilient AMQP consumption with indefinite fixed-backoff reconnection
//! - Per-message triple buffering and traffic-jam classification
//! - Sparse field extraction tolerant of missing or malformed attributes
//! - Idempotent, partial-update persistence keyed by event identifier
//!
//! ## Example
//!
//! ```rust
//! use citypulse_ingest::Result;
//!
//! fn example() -> Result<()> {
//!     println!("CityPulse RDF event ingestion");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)]

/// Core data structures and types
pub mod core;

/// Module for turning raw message payloads into per-message triple streams
pub mod parsing;

/// Module for triple classification and field extraction
pub mod extract;

/// Module for the traffic-event document store gateway
pub mod store;

/// Module for the AMQP message consumption loop
pub mod consumer;

/// Module for the broker/store connection supervisor
pub mod supervisor;

/// Module for graceful shutdown coordination
pub mod shutdown;

pub mod error {
    //! Error types and result definitions

    use std::fmt;

    /// Result type alias for CityPulse Ingest operations
    pub type Result<T> = std::result::Result<T, Error>;

    /// Main error type for CityPulse Ingest
    ///
    /// Per-module error enums convert into it via `From`, so `?` works at
    /// the crate boundary (the binary's main returns [`Result`]).
    #[derive(Debug)]
    pub enum Error {
        /// Broker error
        Broker(String),
        /// Store error
        Store(String),
        /// Payload parse error
        Parse(String),
        /// IO error
        Io(std::io::Error),
        /// Other error
        Other(String),
    }

    impl fmt::Display for Error {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Error::Broker(msg) => write!(f, "Broker error: {}", msg),
                Error::Store(msg) => write!(f, "Store error: {}", msg),
                Error::Parse(msg) => write!(f, "Parse error: {}", msg),
                Error::Io(err) => write!(f, "IO error: {}", err),
                Error::Other(msg) => write!(f, "Error: {}", msg),
            }
        }
    }

    impl std::error::Error for Error {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                Error::Io(err) => Some(err),
                _ => None,
            }
        }
    }

    impl From<std::io::Error> for Error {
        fn from(err: std::io::Error) -> Self {
            Error::Io(err)
        }
    }

    impl From<crate::store::StoreError> for Error {
        fn from(err: crate::store::StoreError) -> Self {
            Error::Store(err.to_string())
        }
    }

    impl From<crate::consumer::ConsumerError> for Error {
        fn from(err: crate::consumer::ConsumerError) -> Self {
            Error::Broker(err.to_string())
        }
    }

    impl From<crate::consumer::PipelineError> for Error {
        fn from(err: crate::consumer::PipelineError) -> Self {
            match err {
                crate::consumer::PipelineError::ParseError(msg) => Error::Parse(msg),
                crate::consumer::PipelineError::StoreError(msg) => Error::Store(msg),
            }
        }
    }
}

// Re-export commonly used types
pub use error::{Error, Result};
