//! Access token storage
//!
//! A single global slot holding the opaque token forwarded with every request.
//! The value is never validated; `None` and `Some("")` are distinct states.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Well-known key the token is stored under
pub const TOKEN_KEY: &str = "token";

/// Shown in place of the token when none has been stored
pub const UNDEFINED_TOKEN: &str = "Undefined";

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Credential store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Credential store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Credential store is not a JSON object: {0}")]
    NotAnObject(PathBuf),
}

/// Holder of the single access token
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<String>;

    /// Overwrite the stored token, including with an empty string
    fn set(&self, token: &str) -> Result<(), CredentialError>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<T> {
    fn get(&self) -> Option<String> {
        (**self).get()
    }

    fn set(&self, token: &str) -> Result<(), CredentialError> {
        (**self).set(token)
    }
}

/// Token display string for the credential overlay
pub fn display_token(token: Option<&str>) -> String {
    token.unwrap_or(UNDEFINED_TOKEN).to_string()
}

// ============================================================================
// File-backed store
// ============================================================================

/// Keyed JSON file, surviving restarts. Other keys in the file are preserved.
pub struct FileCredentialStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, CredentialError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Err(CredentialError::NotAnObject(self.path.clone())),
        }
    }

    fn save(&self, map: &Map<String, Value>) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<String> {
        match self.load() {
            Ok(map) => map.get(TOKEN_KEY).and_then(Value::as_str).map(str::to_string),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read token, treating as absent");
                None
            }
        }
    }

    fn set(&self, token: &str) -> Result<(), CredentialError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.load()?;
        map.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.save(&map)?;
        tracing::info!(path = %self.path.display(), "Stored access token");
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-lifetime store
#[cfg(test)]
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

#[cfg(test)]
impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

#[cfg(test)]
impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set(&self, token: &str) -> Result<(), CredentialError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }
}
