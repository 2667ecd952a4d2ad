//! Configuration loading for the Gmail OAuth client
//!
//! Supports loading OAuth credentials from (in order of priority):
//! 1. Runtime environment variables (`GOOGLE_CLIENT_ID`, ...)
//! 2. JSON file in the config directory (Google Cloud Console format)
//!
//! The refresh token is always read from `GMAIL_REFRESH_TOKEN`.
//! Values are not validated here; [`crate::GmailAuth::new`] rejects
//! incomplete credentials.

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Credentials filename in the Triage config directory
const CREDENTIALS_FILE: &str = "google-credentials.json";

pub const CLIENT_ID_VAR: &str = "GOOGLE_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "GOOGLE_CLIENT_SECRET";
pub const REDIRECT_URI_VAR: &str = "GOOGLE_REDIRECT_URI";
pub const REFRESH_TOKEN_VAR: &str = "GMAIL_REFRESH_TOKEN";

/// OAuth credentials for Gmail API access
#[derive(Debug, Clone, Default)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub refresh_token: Option<String>,
}

/// Google Cloud Console credential file format
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<ClientSection>,
    web: Option<ClientSection>,
}

#[derive(Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl GmailCredentials {
    /// Load credentials from the environment, falling back to the
    /// credentials file when `GOOGLE_CLIENT_ID` is not set
    pub fn load() -> Result<Self> {
        if config::env_var(CLIENT_ID_VAR).is_some() || !config::config_exists(CREDENTIALS_FILE) {
            return Ok(Self::from_env());
        }

        info!("Loading OAuth client from {}", CREDENTIALS_FILE);
        let creds: GoogleCredentialFile = config::load_json(CREDENTIALS_FILE)?;
        let mut loaded = Self::from_credential_file(creds)?;
        loaded.refresh_token = config::env_var(REFRESH_TOKEN_VAR);
        if let Some(redirect_uri) = config::env_var(REDIRECT_URI_VAR) {
            loaded.redirect_uri = redirect_uri;
        }
        Ok(loaded)
    }

    /// Load credentials from environment variables
    ///
    /// Unset or blank variables become empty strings.
    pub fn from_env() -> Self {
        Self {
            client_id: config::env_var(CLIENT_ID_VAR).unwrap_or_default(),
            client_secret: config::env_var(CLIENT_SECRET_VAR).unwrap_or_default(),
            redirect_uri: config::env_var(REDIRECT_URI_VAR).unwrap_or_default(),
            refresh_token: config::env_var(REFRESH_TOKEN_VAR),
        }
    }

    /// Load credentials from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let creds: GoogleCredentialFile = config::load_json_file(path)?;
        Self::from_credential_file(creds)
    }

    /// Parse credentials from JSON string (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(creds)
    }

    fn from_credential_file(creds: GoogleCredentialFile) -> Result<Self> {
        // Support both "web" (server) and "installed" (desktop) credential types
        let section = creds
            .web
            .or(creds.installed)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: section.client_id,
            client_secret: section.client_secret,
            redirect_uri: section.redirect_uris.into_iter().next().unwrap_or_default(),
            refresh_token: None,
        })
    }

    /// Get the default credentials file path (~/.config/triage/google-credentials.json)
    pub fn default_credentials_path() -> Option<PathBuf> {
        config::config_path(CREDENTIALS_FILE)
    }
}
