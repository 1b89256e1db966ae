use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted storefront session.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub saved_at_utc: DateTime<Utc>,
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("token", &"<REDACTED>")
            .field("saved_at_utc", &self.saved_at_utc)
            .finish()
    }
}

/// JSON file holding the last issued session token.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no session has been persisted yet.
    pub fn load(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read session file: {}", self.path.display()))?;
        let stored: StoredSession = serde_json::from_str(&raw)
            .with_context(|| format!("parse session file: {}", self.path.display()))?;
        if stored.token.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(stored))
    }

    pub fn save(&self, token: &str) -> Result<StoredSession> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("create session dir: {}", dir.display()))?;
        }
        let stored = StoredSession {
            token: token.to_string(),
            saved_at_utc: Utc::now(),
        };
        let body = serde_json::to_string_pretty(&stored).context("serialize session")?;
        fs::write(&self.path, body)
            .with_context(|| format!("write session file: {}", self.path.display()))?;
        Ok(stored)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("remove session file: {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("session.json"));
        assert!(store.load().unwrap().is_none());

        store.save("tok-1").unwrap();
        let got = store.load().unwrap().unwrap();
        assert_eq!(got.token, "tok-1");
        assert!(!format!("{got:?}").contains("tok-1"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        let err = SessionStore::new(&path).load().unwrap_err();
        assert!(format!("{err:#}").contains("parse session file"));
    }
}
