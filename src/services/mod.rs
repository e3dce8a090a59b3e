//! Service layer for the ingestion pipeline.
//!
//! Domain logic separated from CLI concerns.

pub mod ingest;

pub use ingest::{IngestError, IngestOutcome, IngestPipeline};
