//! Where the API key and list ID come from at request time: either straight
//! from configuration, or from the record persisted when the service was
//! activated.

use std::io::ErrorKind;
use std::path::PathBuf;

use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde::Serialize;

use crate::utils::error_chain_fmt;

/// Credentials as found; either may be missing. Use `api_key`/`list_id` to
/// read them, which also treat blank values as missing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListSettings {
    pub api_key: Option<Secret<String>>,
    pub list_id: Option<String>,
}

impl ListSettings {
    pub fn api_key(&self) -> Option<&Secret<String>> {
        self.api_key
            .as_ref()
            .filter(|k| !k.expose_secret().trim().is_empty())
    }

    pub fn list_id(&self) -> Option<&str> {
        self.list_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }

    pub fn is_complete(&self) -> bool { self.api_key().is_some() && self.list_id().is_some() }
}

// `Secret<String>` deliberately does not implement `Serialize`, so the record
// gets its own shape
#[derive(Serialize)]
struct StoredSettings<'a> {
    api_key: Option<&'a str>,
    list_id: Option<&'a str>,
}

#[derive(thiserror::Error)]
pub enum SettingsError {
    #[error("could not access settings record at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings record at {} is malformed", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl std::fmt::Debug for SettingsError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

pub trait SettingsProvider: Send + Sync {
    fn load(&self) -> Result<ListSettings, SettingsError>;
}

/// Credentials fixed at startup
pub struct ConstantSettings(ListSettings);

impl ConstantSettings {
    pub fn new(settings: ListSettings) -> Self { Self(settings) }
}

impl SettingsProvider for ConstantSettings {
    fn load(&self) -> Result<ListSettings, SettingsError> { Ok(self.0.clone()) }
}

/// A JSON file holding the credentials. A missing file reads as empty
/// settings (i.e. "not activated"), not as an error.
#[derive(Clone, Debug)]
pub struct SettingsRecord {
    path: PathBuf,
}

impl SettingsRecord {
    pub fn new(path: PathBuf) -> Self { Self { path } }

    fn io_error(
        &self,
        source: std::io::Error,
    ) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            source,
        }
    }

    #[tracing::instrument(name = "Persisting settings record", skip(self, settings), fields(path = %self.path.display()))]
    pub fn save(
        &self,
        settings: &ListSettings,
    ) -> Result<(), SettingsError> {
        let stored = StoredSettings {
            api_key: settings.api_key().map(|k| k.expose_secret().as_str()),
            list_id: settings.list_id(),
        };
        let json = serde_json::to_string_pretty(&stored).map_err(|source| SettingsError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    /// Removing a record that does not exist is not an error
    #[tracing::instrument(name = "Removing settings record", skip(self), fields(path = %self.path.display()))]
    pub fn remove(&self) -> Result<(), SettingsError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(self.io_error(e)),
            _ => Ok(()),
        }
    }
}

impl SettingsProvider for SettingsRecord {
    fn load(&self) -> Result<ListSettings, SettingsError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ListSettings::default()),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&json).map_err(|source| SettingsError::Malformed {
            path: self.path.clone(),
            source,
        })
    }
}
