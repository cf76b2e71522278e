//! Triple classification and field extraction for traffic-jam events.

pub mod classifier;
pub mod fields;

pub use classifier::{ClassificationOutcome, TripleBuffer};
pub use fields::extract_event;
