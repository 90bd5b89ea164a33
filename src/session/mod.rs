//! Client-side session persistence.
//!
//! A flat JSON object of opaque string pairs. The client only ever stores
//! the bearer token and the dark-mode flag here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

pub const TOKEN_KEY: &str = "token";
pub const DARK_MODE_KEY: &str = "dark_mode";

/// Errors from reading or writing the session file.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse session file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Key/value session store, optionally backed by a file.
#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    values: RwLock<BTreeMap<String, String>>,
}

impl SessionStore {
    /// Store that lives only for this process.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: RwLock::new(BTreeMap::new()),
        }
    }

    /// Open a file-backed store. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| SessionError::Parse {
                    path: path.clone(),
                    message: e.to_string(),
                })?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: Some(path),
            values: RwLock::new(values),
        })
    }

    /// `$XDG_CONFIG_HOME/servereye/session.json`, falling back to
    /// `$HOME/.config/servereye/session.json`.
    pub fn default_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
        Some(base.join("servereye").join("session.json"))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), SessionError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.into());
        self.persist(&values)
    }

    /// Remove `key`. Returns whether it was present.
    pub fn remove(&self, key: &str) -> Result<bool, SessionError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        if values.remove(key).is_none() {
            return Ok(false);
        }
        self.persist(&values)?;
        Ok(true)
    }

    pub fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn set_token(&self, token: &str) -> Result<(), SessionError> {
        self.set(TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> Result<bool, SessionError> {
        self.remove(TOKEN_KEY)
    }

    pub fn dark_mode(&self) -> bool {
        self.get(DARK_MODE_KEY).as_deref() == Some("true")
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), SessionError> {
        self.set(DARK_MODE_KEY, enabled.to_string())
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(values).map_err(|e| SessionError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("session.json")).unwrap();
        assert_eq!(store.token(), None);
        assert!(!store.dark_mode());
    }

    #[test]
    fn test_token_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::open(&path).unwrap();
        store.set_token("abc.def.ghi").unwrap();
        store.set_dark_mode(true).unwrap();

        let reopened = SessionStore::open(&path).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("abc.def.ghi"));
        assert!(reopened.dark_mode());
    }

    #[test]
    fn test_clear_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::open(&path).unwrap();
        store.set_token("t").unwrap();
        assert!(store.clear_token().unwrap());
        assert!(!store.clear_token().unwrap());

        let reopened = SessionStore::open(&path).unwrap();
        assert_eq!(reopened.token(), None);
    }

    #[test]
    fn test_opaque_keys_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"token":"x","someOtherKey":"kept"}"#).unwrap();

        let store = SessionStore::open(&path).unwrap();
        store.clear_token().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("someOtherKey"));
        assert!(!content.contains("\"token\""));
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            SessionStore::open(&path),
            Err(SessionError::Parse { .. })
        ));
    }

    #[test]
    fn test_in_memory_store() {
        let store = SessionStore::in_memory();
        store.set_token("mem").unwrap();
        assert_eq!(store.token().as_deref(), Some("mem"));
        assert!(store.path().is_none());
    }
}
