//! Fetching and parsing of transient report pages.
//!
//! A report is a two-level frame document: the top page names a metadata
//! frame and a variable number of image frames. Parsing is split into small
//! pure functions so the extraction and classification rules are testable
//! against synthetic fixtures.

mod frames;
mod http;
mod images;
mod metadata;

pub use frames::{resolve_frames, FrameSet};
pub use http::{FetchError, HttpClient};
pub use images::{
    apply_subtraction_correction, classify, extract_image_urls, ClassifiedImage,
    SUBTRACTION_SLOT_INDEX,
};
pub use metadata::extract_metadata;

use thiserror::Error;

/// Errors raised while parsing report documents.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("report page has no metadata frame")]
    MissingMetadataFrame,

    #[error("metadata frame has no processing-id anchor cell")]
    MissingAnchor,

    #[error("metadata table shape mismatch: expected {expected} cells after the anchor, found {found}")]
    SchemaMismatch { expected: usize, found: usize },
}
