//! Data models for transient ingestion.

mod transient;

pub use transient::{
    ArtifactFlags, ArtifactSlot, TransientMetadata, TransientRecord, TransientStatus,
    METADATA_CELL_COUNT,
};
