//! Session storage and retrieval.
//!
//! Persists the authenticated session in `<base>/session.json` with
//! restricted permissions (0600). Tokens are never logged or displayed in
//! full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// The authenticated identity for the current user.
///
/// Produced by a successful login exchange; persisted by [`SessionStore`].
/// A session is valid iff its token is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token returned by the login endpoint.
    pub token: String,
    /// Whether this account is the property owner.
    pub is_owner: bool,
    /// Numeric user id.
    pub user_id: i64,
    /// Display name.
    pub user_name: String,
    /// Tenant identifier; absent for owner accounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl Session {
    /// Returns true if this session carries a usable token.
    pub fn is_valid(&self) -> bool {
        !self.token.is_empty()
    }
}

/// File-backed store for the current session.
///
/// The store owns the persisted session for the process lifetime; callers
/// save after login and clear on logout or when the server reports the token
/// as no longer valid.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
        }
    }

    /// Creates a store backed by the standard session path under RMX_HOME.
    pub fn open_default() -> Self {
        Self::new(paths::session_path())
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Loads the persisted session.
    ///
    /// Returns `None` if no session file exists or the stored token is empty.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {}", self.path.display()))?;

        let session: Session = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", self.path.display()))?;

        Ok(session.is_valid().then_some(session))
    }

    /// Persists the session with restricted permissions (0600).
    ///
    /// The write is atomic (temp file + rename): a reader never observes a
    /// half-written session.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;

        let tmp_path = self.path.with_extension("json.tmp");

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&tmp_path)
                .with_context(|| format!("Failed to open {} for writing", tmp_path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&tmp_path, contents)
                .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
        }

        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    /// Erases the persisted session.
    ///
    /// Returns true if a session file was removed.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }

        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        Ok(true)
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 {
        return "***".to_string();
    }
    format!("{}...", &token[..12])
}
