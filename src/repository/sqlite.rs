//! SQLite-backed transient repository.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::{StoreError, TransientRepository};
use crate::models::{TransientRecord, TransientStatus};

/// SQLite repository over the `transients` table.
///
/// A connection is opened, used for one statement and dropped per
/// operation; the existence check and the later write are independent,
/// non-atomic operations (single-process, one invocation per report URL).
pub struct SqliteTransientRepository {
    db_path: PathBuf,
}

impl SqliteTransientRepository {
    /// Open the repository, creating the schema if needed.
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        Ok(Connection::open(&self.db_path)?)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS transients (
                id TEXT PRIMARY KEY,
                datetime TEXT NOT NULL,
                coord2000 TEXT NOT NULL,
                mag TEXT NOT NULL,
                band TEXT NOT NULL,
                "limit" TEXT NOT NULL,
                flux TEXT NOT NULL,
                s_n TEXT NOT NULL,
                xc TEXT NOT NULL,
                yc TEXT NOT NULL,
                fwhm TEXT NOT NULL,
                a TEXT NOT NULL,
                b TEXT NOT NULL,
                pa TEXT NOT NULL,
                n TEXT NOT NULL,
                c TEXT NOT NULL,
                gal TEXT NOT NULL,
                d_ra TEXT NOT NULL,
                ddec TEXT NOT NULL,
                dmag TEXT NOT NULL,
                user TEXT NOT NULL,
                obs_id TEXT NOT NULL,
                path TEXT NOT NULL,
                tr INTEGER NOT NULL,
                dss INTEGER NOT NULL,
                sub INTEGER NOT NULL,
                sdss INTEGER NOT NULL,
                second_lap INTEGER NOT NULL,
                max_limit INTEGER NOT NULL,
                log INTEGER NOT NULL,
                early INTEGER NOT NULL
            );
        "#,
        )?;
        Ok(())
    }
}

impl TransientRepository for SqliteTransientRepository {
    fn status(&self, id: &str) -> Result<TransientStatus, StoreError> {
        let conn = self.connect()?;
        let tr: Option<Option<bool>> = conn
            .query_row(
                "SELECT tr FROM transients WHERE id = ?",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(match tr {
            Some(Some(true)) => TransientStatus::Complete,
            Some(_) => TransientStatus::Partial,
            None => TransientStatus::Absent,
        })
    }

    fn insert(&self, record: &TransientRecord) -> Result<(), StoreError> {
        let conn = self.connect()?;
        let m = &record.metadata;
        let f = &record.flags;
        conn.execute(
            r#"
            INSERT INTO transients
                (id, datetime, coord2000, mag, band, "limit", flux, s_n, xc, yc,
                 fwhm, a, b, pa, n, c, gal, d_ra, ddec, dmag, user,
                 obs_id, path, tr, dss, sub, sdss, second_lap, max_limit, log, early)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                    ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21,
                    ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31)
            "#,
            params![
                m.id, m.datetime, m.coord2000, m.mag, m.band, m.limit, m.flux, m.s_n, m.xc,
                m.yc, m.fwhm, m.a, m.b, m.pa, m.n, m.c, m.gal, m.d_ra, m.ddec, m.dmag,
                m.user, record.obs_id, record.path, f.tr, f.dss, f.sub, f.sdss,
                f.second_lap, f.max_limit, f.log, f.early,
            ],
        )?;
        info!("inserted transient {}", m.id);
        Ok(())
    }

    fn update_artifacts(&self, record: &TransientRecord) -> Result<(), StoreError> {
        let conn = self.connect()?;
        let f = &record.flags;
        conn.execute(
            r#"
            UPDATE transients SET
                path = ?1, tr = ?2, dss = ?3, sub = ?4, sdss = ?5,
                second_lap = ?6, max_limit = ?7, log = ?8, early = ?9
            WHERE id = ?10
            "#,
            params![
                record.path,
                f.tr,
                f.dss,
                f.sub,
                f.sdss,
                f.second_lap,
                f.max_limit,
                f.log,
                f.early,
                record.metadata.id,
            ],
        )?;
        info!("updated artifact columns for transient {}", record.metadata.id);
        Ok(())
    }
}
