//! File-backed access token store.
//!
//! The token lives in `~/.config/notion-cli/token.json` and is readable only by
//! the owner. Its layout matches what earlier OAuth logins wrote, so existing
//! files keep working.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Token as persisted on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl StoredToken {
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            ..Self::default()
        }
    }

    /// Expiry time, ignoring the zero timestamps older clients wrote
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expires_at.filter(|t| t.timestamp() > 0)
    }

    pub fn is_expired(&self) -> bool {
        self.expiry().is_some_and(|t| t <= Utc::now())
    }

    /// Usable for requests: present and not expired
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }
}

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<StoredToken>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read token file: {}", self.path.display()))?;

        let token: StoredToken = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse token file: {}", self.path.display()))?;

        Ok(Some(token))
    }

    /// Write the token, keeping any `client_id` already on disk.
    pub fn save(&self, token: &StoredToken) -> Result<()> {
        let dir = self
            .path
            .parent()
            .context("Token path has no parent directory")?;
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let existing_client_id = self.load().ok().flatten().and_then(|t| t.client_id);
        let stored = StoredToken {
            saved_at: Some(Utc::now()),
            client_id: token.client_id.clone().or(existing_client_id),
            ..token.clone()
        };
        let content =
            serde_json::to_string_pretty(&stored).context("Failed to serialize token to JSON")?;

        let mut file = tempfile::NamedTempFile::new_in(dir)
            .context("Failed to create temporary token file")?;
        restrict_permissions(file.path())?;
        file.write_all(content.as_bytes())
            .context("Failed to write token file")?;
        file.persist(&self.path)
            .with_context(|| format!("Failed to write token file: {}", self.path.display()))?;

        Ok(())
    }

    /// Delete the token file. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove token file: {}", self.path.display())),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .context("Failed to set token file permissions")
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
