//! Storage helpers for downloaded artifacts on disk.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{ArtifactSlot, TransientMetadata};

/// Errors raised while laying out the artifact directory.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("metadata datetime {0:?} has no parseable date portion")]
    InvalidDatetime(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sidecar write failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Construct the artifact directory for a transient.
///
/// Pure function of the id and the date portion of the detection datetime:
/// `{root}/{year}/{month}/{day}/{id}`.
pub fn artifact_dir(root: &Path, id: &str, datetime: &str) -> Result<PathBuf, StorageError> {
    let date_part = datetime
        .split_whitespace()
        .next()
        .unwrap_or_default();
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| StorageError::InvalidDatetime(datetime.to_string()))?;

    Ok(root
        .join(format!("{}", date.format("%Y")))
        .join(format!("{}", date.format("%m")))
        .join(format!("{}", date.format("%d")))
        .join(id))
}

/// Create the artifact directory, parents included.
pub fn prepare_dir(dir: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Write the `{id}.csv` metadata sidecar: one header row, one value row.
pub fn write_sidecar(dir: &Path, metadata: &TransientMetadata) -> Result<(), StorageError> {
    let path = dir.join(format!("{}.csv", metadata.id));
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(TransientMetadata::sidecar_header())?;
    writer.write_record(metadata.sidecar_row())?;
    writer.flush()?;
    Ok(())
}

/// Path of one downloaded artifact, `{dir}/{id}.{suffix}`.
pub fn artifact_path(dir: &Path, id: &str, slot: ArtifactSlot) -> PathBuf {
    dir.join(format!("{}.{}", id, slot.file_suffix()))
}
