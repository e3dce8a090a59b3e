//! Sequential ingestion pipeline for one transient report URL.
//!
//! Order matters: the store is consulted once, before any network fetch, so
//! an already-complete transient costs no downloads. Frame and metadata
//! failures abort the run; a failed image download only leaves its flag
//! false and the run continues.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::config::{ConfigError, Settings};
use crate::models::{ArtifactFlags, ArtifactSlot, TransientRecord, TransientStatus};
use crate::repository::{StoreError, TransientRepository};
use crate::scrape::{
    apply_subtraction_correction, classify, extract_image_urls, extract_metadata, resolve_frames,
    FetchError, HttpClient, ParseError,
};
use crate::storage::{self, StorageError};

/// Errors that abort an ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid report URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("report URL {0} has no id query parameter")]
    MissingTransientId(String),

    #[error("report URL {0} has no host")]
    MissingHost(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What a run did, for the caller's final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The transient was already complete; nothing fetched, nothing written.
    AlreadyComplete,
    /// A new row was inserted.
    Inserted,
    /// Artifact columns of an existing row were overwritten.
    Updated,
}

/// The ingestion pipeline: fetch, resolve, extract, classify, persist.
pub struct IngestPipeline<R: TransientRepository> {
    repo: R,
    client: HttpClient,
    settings: Settings,
}

impl<R: TransientRepository> IngestPipeline<R> {
    /// Create a pipeline over a repository and HTTP client.
    pub fn new(repo: R, client: HttpClient, settings: Settings) -> Self {
        Self {
            repo,
            client,
            settings,
        }
    }

    /// Ingest one transient report.
    pub async fn run(&self, report_url: &str) -> Result<IngestOutcome, IngestError> {
        let url = Url::parse(report_url)?;
        let id = transient_id(&url)?;

        // Gate before any fetch.
        let status = self.repo.status(&id)?;
        if status == TransientStatus::Complete {
            info!("transient {} already ingested with its files downloaded", id);
            return Ok(IngestOutcome::AlreadyComplete);
        }

        let base = report_base(&url)?;
        let report_html = self.client.get_text(report_url).await?;
        let frames = resolve_frames(&report_html);
        let metadata_frame = frames.metadata.ok_or(ParseError::MissingMetadataFrame)?;

        let metadata_url = base.join(&metadata_frame)?;
        let metadata_html = self.client.get_text(metadata_url.as_str()).await?;
        let metadata = extract_metadata(&metadata_html, &id)?;

        let dir = storage::artifact_dir(&self.settings.storage.image_root, &id, &metadata.datetime)?;
        storage::prepare_dir(&dir)?;
        storage::write_sidecar(&dir, &metadata)?;

        let obs_id = self.settings.observatory_for(&url)?;

        let mut image_urls = Vec::new();
        for frame in &frames.images {
            let frame_url = base.join(frame)?;
            match self.client.get_text(frame_url.as_str()).await {
                Ok(html) => image_urls.extend(extract_image_urls(&html, &base)),
                Err(e) => warn!("image frame {} fetch failed: {}", frame, e),
            }
        }
        apply_subtraction_correction(&mut image_urls);

        let mut flags = ArtifactFlags::default();
        for image in classify(&image_urls) {
            match image.url {
                // Placeholder for a missing image: evaluated, never fetched.
                None => flags.set(image.slot, false),
                Some(image_url) => {
                    let downloaded = self
                        .download_artifact(&dir, &id, image.slot, &image_url)
                        .await;
                    flags.set(image.slot, downloaded);
                }
            }
        }

        let record = TransientRecord {
            metadata,
            obs_id,
            path: dir.to_string_lossy().into_owned(),
            flags,
        };

        Ok(persist(&self.repo, status, &record)?)
    }

    /// Download one classified artifact; failure only costs its flag.
    async fn download_artifact(
        &self,
        dir: &Path,
        id: &str,
        slot: ArtifactSlot,
        url: &str,
    ) -> bool {
        let target = storage::artifact_path(dir, id, slot);
        match self.client.get_bytes(url).await {
            Ok(bytes) => match fs::write(&target, bytes) {
                Ok(()) => true,
                Err(e) => {
                    warn!("writing {} failed: {}", target.display(), e);
                    false
                }
            },
            Err(e) => {
                warn!("download of {} failed: {}", url, e);
                false
            }
        }
    }
}

/// Route the completed record by the pre-fetch status.
fn persist<R: TransientRepository>(
    repo: &R,
    status: TransientStatus,
    record: &TransientRecord,
) -> Result<IngestOutcome, StoreError> {
    match status {
        TransientStatus::Complete => Ok(IngestOutcome::AlreadyComplete),
        TransientStatus::Partial => {
            repo.update_artifacts(record)?;
            Ok(IngestOutcome::Updated)
        }
        TransientStatus::Absent => {
            repo.insert(record)?;
            Ok(IngestOutcome::Inserted)
        }
    }
}

/// Transient id from the report URL's `id` query parameter.
fn transient_id(url: &Url) -> Result<String, IngestError> {
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| IngestError::MissingTransientId(url.to_string()))
}

/// Base URL the frame sources resolve against:
/// scheme, host and the report path's first segment.
fn report_base(url: &Url) -> Result<Url, IngestError> {
    let host = url
        .host_str()
        .ok_or_else(|| IngestError::MissingHost(url.to_string()))?;
    let first_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .unwrap_or_default();
    Ok(Url::parse(&format!(
        "{}://{}/{}/",
        url.scheme(),
        host,
        first_segment
    ))?)
}
