//! Payload parsing: one asynchronous triple stream per broker message.

pub mod triple_stream;

pub use triple_stream::{spawn_parser, ParserEvent};
