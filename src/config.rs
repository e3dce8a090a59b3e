//! Settings loaded from the TOML configuration file.
//!
//! Server credentials, image root, database path and the observatory
//! mapping are all explicit structures handed to components at
//! construction. Nothing is read from global state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Errors raised while loading or consulting the settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("no observatory configured for host {0:?}")]
    UnknownObservatory(String),
}

/// Top-level settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub observatories: Vec<ObservatorySettings>,
}

/// Observatory web server access.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// HTTPS username for the 401 retry. Both credentials must be present
    /// for the retry to happen.
    pub username: Option<String>,
    /// HTTPS password for the 401 retry.
    pub password: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Filesystem layout for downloaded artifacts.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Root directory for the `{year}/{month}/{day}/{id}` artifact tree.
    pub image_root: PathBuf,
}

/// Relational store location.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

/// One observatory entry, matched against report URLs by DNS name prefix.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservatorySettings {
    /// DNS name of the observatory's server, e.g. `tavrida.example.org`.
    pub dns_name: String,
    /// Identifier persisted with each record from this server.
    pub obs_id: String,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Resolve the observatory id for a report URL.
    ///
    /// The URL host's first dotted label is compared with each configured
    /// `dns_name` first label. An unknown host is an explicit error rather
    /// than a missing column later.
    pub fn observatory_for(&self, url: &Url) -> Result<String, ConfigError> {
        let host = url.host_str().unwrap_or_default();
        let prefix = host.split('.').next().unwrap_or_default();

        self.observatories
            .iter()
            .find(|obs| obs.dns_name.split('.').next() == Some(prefix))
            .map(|obs| obs.obs_id.clone())
            .ok_or_else(|| ConfigError::UnknownObservatory(host.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        toml::from_str(
            r#"
            [server]
            username = "uname"
            password = "pswd"

            [storage]
            image_root = "/trview/imdata"

            [database]
            path = "/trview/trview.db"

            [[observatories]]
            dns_name = "tavrida.example.org"
            obs_id = "T1"

            [[observatories]]
            dns_name = "iac.example.org"
            obs_id = "I1"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_observatory_lookup_by_host_prefix() {
        let s = settings();
        let url = Url::parse("https://tavrida.example.org/tr/index.php?id=1").unwrap();
        assert_eq!(s.observatory_for(&url).unwrap(), "T1");

        let url = Url::parse("https://iac.other-domain.net/tr/index.php?id=1").unwrap();
        assert_eq!(s.observatory_for(&url).unwrap(), "I1");
    }

    #[test]
    fn test_unknown_observatory_is_an_error() {
        let s = settings();
        let url = Url::parse("https://unknown.example.org/tr/index.php?id=1").unwrap();
        assert!(matches!(
            s.observatory_for(&url),
            Err(ConfigError::UnknownObservatory(_))
        ));
    }

    #[test]
    fn test_timeout_defaults() {
        let s: Settings = toml::from_str(
            r#"
            [server]

            [storage]
            image_root = "/data"

            [database]
            path = "/data/db.sqlite"
            "#,
        )
        .unwrap();
        assert_eq!(s.server.timeout_secs, 30);
        assert!(s.server.username.is_none());
        assert!(s.observatories.is_empty());
    }
}
