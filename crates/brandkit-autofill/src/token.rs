//! File-backed OAuth token cache for the autofill vendor.
//!
//! Readers holding a still-valid token never touch the refresh lock. The
//! lock serialises refreshes so at most one refresh request is in flight per
//! process, and the file is re-read under it so a refresh that raced ours is
//! reused instead of repeated.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use brandkit_core::truncated_body;
use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::error::AutofillError;
use crate::types::{TokenResponse, TokenSet};

pub struct TokenCache {
    http: Client,
    path: PathBuf,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_buffer_secs: i64,
    refresh_lock: Mutex<()>,
}

impl TokenCache {
    /// # Errors
    ///
    /// Returns [`AutofillError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        path: impl Into<PathBuf>,
        base_url: &str,
        client_id: &str,
        client_secret: &str,
        refresh_buffer_secs: u64,
    ) -> Result<Self, AutofillError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            path: path.into(),
            token_url: format!("{}/oauth/token", base_url.trim_end_matches('/')),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            refresh_buffer_secs: i64::try_from(refresh_buffer_secs).unwrap_or(i64::MAX),
            refresh_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current access token, refreshing first if it has expired.
    ///
    /// # Errors
    ///
    /// Token file errors, or any error from [`TokenCache::refresh`].
    pub async fn access_token(&self) -> Result<String, AutofillError> {
        let tokens = self.load().await?;
        if tokens.expires_in > Utc::now().timestamp() {
            return Ok(tokens.access_token);
        }
        self.refresh().await
    }

    /// Refresh unless the cached token outlives the safety buffer.
    ///
    /// # Errors
    ///
    /// Token file errors, a non-2xx from the token endpoint, or a malformed
    /// token response.
    pub async fn refresh(&self) -> Result<String, AutofillError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.load().await?;
        let now = Utc::now().timestamp();
        if current.expires_in > now.saturating_add(self.refresh_buffer_secs) {
            return Ok(current.access_token);
        }

        tracing::info!(path = %self.path.display(), "refreshing autofill access token");
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", current.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AutofillError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.token_url.clone(),
                body: truncated_body(&body),
            });
        }
        let fresh: TokenResponse =
            serde_json::from_str(&body).map_err(|source| AutofillError::Deserialize {
                context: "oauth/token".to_string(),
                source,
            })?;

        let updated = TokenSet {
            access_token: fresh.access_token,
            refresh_token: fresh.refresh_token.unwrap_or(current.refresh_token),
            expires_in: Utc::now().timestamp().saturating_add(fresh.expires_in),
            token_type: fresh.token_type.unwrap_or(current.token_type),
        };
        self.save(&updated).await?;
        tracing::info!(expires_at = updated.expires_in, "autofill access token refreshed");
        Ok(updated.access_token)
    }

    async fn load(&self) -> Result<TokenSet, AutofillError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| AutofillError::TokenFileIo {
                path: self.path.display().to_string(),
                source,
            })?;
        serde_json::from_str(&raw).map_err(|source| AutofillError::TokenFileFormat {
            path: self.path.display().to_string(),
            source,
        })
    }

    async fn save(&self, tokens: &TokenSet) -> Result<(), AutofillError> {
        let io_err = |source| AutofillError::TokenFileIo {
            path: self.path.display().to_string(),
            source,
        };
        let raw = serde_json::to_vec_pretty(tokens).map_err(|source| {
            AutofillError::TokenFileFormat {
                path: self.path.display().to_string(),
                source,
            }
        })?;
        // Readers never take the refresh lock, so the file is swapped in
        // whole with a rename rather than rewritten in place.
        let staging = staging_path(&self.path);
        tokio::fs::write(&staging, raw).await.map_err(io_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&staging, std::fs::Permissions::from_mode(0o644))
                .await
                .map_err(io_err)?;
        }
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(io_err)?;
        Ok(())
    }
}

/// Sibling of `path` used to stage a rewrite, e.g. `tokens.json.tmp`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
