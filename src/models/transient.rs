//! Transient record model and artifact classification slots.

use serde::{Deserialize, Serialize};

use crate::scrape::ParseError;

/// Number of sibling cells read after the datetime anchor in the metadata table.
pub const METADATA_CELL_COUNT: usize = 20;

/// CSV header for the metadata sidecar, in schema order.
const SIDECAR_HEADER: [&str; 21] = [
    "id", "datetime", "coord2000", "mag", "Band", "Limit", "flux", "s/n", "xc", "yc", "fwhm", "a",
    "b", "PA", "N", "C", "Gal", "d_ra", "ddec", "dmag", "User",
];

/// Observational parameters parsed from the metadata frame.
///
/// All values are carried verbatim as text; the store holds them as text
/// columns and no numeric interpretation happens during ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransientMetadata {
    pub id: String,
    pub datetime: String,
    pub coord2000: String,
    pub mag: String,
    pub band: String,
    pub limit: String,
    pub flux: String,
    pub s_n: String,
    pub xc: String,
    pub yc: String,
    pub fwhm: String,
    pub a: String,
    pub b: String,
    pub pa: String,
    pub n: String,
    pub c: String,
    pub gal: String,
    pub d_ra: String,
    pub ddec: String,
    pub dmag: String,
    pub user: String,
}

impl TransientMetadata {
    /// Build metadata from the anchored datetime cell and the 20 cells that
    /// follow it in document order.
    ///
    /// The instrument cell is read for positional alignment but never kept.
    /// A short cell list means the source table no longer matches the fixed
    /// schema and is rejected rather than silently misassigned.
    pub fn from_cells(
        id: String,
        datetime: String,
        cells: Vec<String>,
    ) -> Result<Self, ParseError> {
        let cells: [String; METADATA_CELL_COUNT] =
            cells.try_into().map_err(|cells: Vec<String>| {
                ParseError::SchemaMismatch {
                    expected: METADATA_CELL_COUNT,
                    found: cells.len(),
                }
            })?;
        let [coord2000, mag, band, limit, flux, s_n, xc, yc, fwhm, a, b, pa, n, c, gal, d_ra, ddec, dmag, _instrum, user] =
            cells;

        Ok(Self {
            id,
            datetime,
            coord2000,
            mag,
            band,
            limit,
            flux,
            s_n,
            xc,
            yc,
            fwhm,
            a,
            b,
            pa,
            n,
            c,
            gal,
            d_ra,
            ddec,
            dmag,
            user,
        })
    }

    /// Header row for the CSV sidecar.
    pub fn sidecar_header() -> [&'static str; 21] {
        SIDECAR_HEADER
    }

    /// Value row for the CSV sidecar, aligned with [`Self::sidecar_header`].
    pub fn sidecar_row(&self) -> [&str; 21] {
        [
            &self.id,
            &self.datetime,
            &self.coord2000,
            &self.mag,
            &self.band,
            &self.limit,
            &self.flux,
            &self.s_n,
            &self.xc,
            &self.yc,
            &self.fwhm,
            &self.a,
            &self.b,
            &self.pa,
            &self.n,
            &self.c,
            &self.gal,
            &self.d_ra,
            &self.ddec,
            &self.dmag,
            &self.user,
        ]
    }
}

/// The eight named image categories a report page can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSlot {
    /// Primary transient image.
    Transient,
    /// DSS archive search image.
    Dss,
    /// Subtraction image.
    Sub,
    /// SDSS cross-match image.
    Sdss,
    /// Second-lap variant of the primary image.
    SecondLap,
    /// Max-limit variant of the primary image.
    MaxLimit,
    /// Log-scaled image.
    Log,
    /// Early-epoch image (also the classification fallback bucket).
    Early,
}

impl ArtifactSlot {
    /// File name suffix for the downloaded artifact, `{id}.{suffix}`.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            ArtifactSlot::Transient => "tr.jpeg",
            ArtifactSlot::Dss => "dss_search.gif",
            ArtifactSlot::Sub => "sub.jpeg",
            ArtifactSlot::Sdss => "sdss.jpeg",
            ArtifactSlot::SecondLap => "second_lap.jpeg",
            ArtifactSlot::MaxLimit => "max_limit.jpeg",
            ArtifactSlot::Log => "log.jpeg",
            ArtifactSlot::Early => "early.jpeg",
        }
    }
}

/// Download outcome per artifact slot.
///
/// A fixed struct of named booleans: every slot is always present, false
/// until a download for that slot succeeds. Absent images stay false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFlags {
    pub tr: bool,
    pub dss: bool,
    pub sub: bool,
    pub sdss: bool,
    pub second_lap: bool,
    pub max_limit: bool,
    pub log: bool,
    pub early: bool,
}

impl ArtifactFlags {
    /// Record the download outcome for one slot.
    pub fn set(&mut self, slot: ArtifactSlot, downloaded: bool) {
        match slot {
            ArtifactSlot::Transient => self.tr = downloaded,
            ArtifactSlot::Dss => self.dss = downloaded,
            ArtifactSlot::Sub => self.sub = downloaded,
            ArtifactSlot::Sdss => self.sdss = downloaded,
            ArtifactSlot::SecondLap => self.second_lap = downloaded,
            ArtifactSlot::MaxLimit => self.max_limit = downloaded,
            ArtifactSlot::Log => self.log = downloaded,
            ArtifactSlot::Early => self.early = downloaded,
        }
    }

    /// Read the outcome for one slot.
    pub fn get(&self, slot: ArtifactSlot) -> bool {
        match slot {
            ArtifactSlot::Transient => self.tr,
            ArtifactSlot::Dss => self.dss,
            ArtifactSlot::Sub => self.sub,
            ArtifactSlot::Sdss => self.sdss,
            ArtifactSlot::SecondLap => self.second_lap,
            ArtifactSlot::MaxLimit => self.max_limit,
            ArtifactSlot::Log => self.log,
            ArtifactSlot::Early => self.early,
        }
    }
}

/// The complete unit of persistence for one transient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientRecord {
    pub metadata: TransientMetadata,
    /// Observatory identifier resolved from the report URL's host.
    pub obs_id: String,
    /// Filesystem directory holding the downloaded artifacts.
    pub path: String,
    pub flags: ArtifactFlags,
}

/// Persistence state of a transient id, as reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientStatus {
    /// Row exists with `tr = true`; the run is a no-op.
    Complete,
    /// Row exists but the primary image was never downloaded; artifact
    /// columns get overwritten.
    Partial,
    /// No row; a full record gets inserted.
    Absent,
}
