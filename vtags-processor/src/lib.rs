//! vtags Processor
//!
//! The collaborator boundary of the tag cache: host-facing configuration,
//! processor lifecycle (construct, start, stop) and the per-sample
//! enrichment call. One processor serves exactly one remote endpoint.

pub mod config;
pub mod processor;

pub use config::{ProcessorConfig, SAMPLE_CONFIG};
pub use processor::TagProcessor;
