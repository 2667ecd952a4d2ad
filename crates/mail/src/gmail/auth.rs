//! Gmail OAuth2 authentication
//!
//! Implements the server-side OAuth2 authorization code flow for Gmail:
//! building the consent URL, exchanging the callback code for tokens, and
//! minting access tokens from a configured refresh token.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use serde::Deserialize;
use std::sync::Mutex;

use super::GmailClient;
use crate::config::GmailCredentials;

/// Scopes requested on the consent screen
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.modify",
];

/// OAuth client configuration is incomplete
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing Google OAuth env vars ({})", missing.join("/"))]
pub struct ConfigError {
    /// Names of the missing environment variables
    pub missing: Vec<&'static str>,
}

/// Token response from Google
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
}

/// Access token held in memory until shortly before it expires
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// OAuth2 client for Gmail
///
/// Holds the application credentials and, when configured, the refresh token
/// used to obtain access tokens transparently. Without a refresh token the
/// client can only build consent URLs and exchange authorization codes.
pub struct GmailAuth {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    refresh_token: Option<String>,
    cached: Mutex<Option<CachedToken>>,
}

impl GmailAuth {
    /// Gmail API OAuth2 endpoints
    const AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Seconds before expiry at which a cached access token is considered stale
    const EXPIRY_BUFFER_SECS: i64 = 300;

    /// Create a new GmailAuth instance
    ///
    /// Fails before any network activity if the client id, client secret or
    /// redirect URI is missing or blank.
    pub fn new(credentials: &GmailCredentials) -> Result<Self, ConfigError> {
        let required = [
            ("GOOGLE_CLIENT_ID", &credentials.client_id),
            ("GOOGLE_CLIENT_SECRET", &credentials.client_secret),
            ("GOOGLE_REDIRECT_URI", &credentials.redirect_uri),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError { missing });
        }

        Ok(Self {
            client_id: credentials.client_id.trim().to_string(),
            client_secret: credentials.client_secret.trim().to_string(),
            redirect_uri: credentials.redirect_uri.trim().to_string(),
            refresh_token: credentials
                .refresh_token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            cached: Mutex::new(None),
        })
    }

    /// Whether a refresh token is attached, i.e. API calls can be authorized
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Build the consent URL for first-time setup
    ///
    /// Requests offline access and forces the consent prompt so Google
    /// issues a refresh token even on repeat authorization.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            Self::AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&SCOPES.join(" ")),
        )
    }

    /// Exchange an authorization code from the OAuth callback for tokens
    pub fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        info!("Exchanging authorization code for tokens");
        let mut response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .context("Failed to exchange authorization code")?;

        let token: TokenResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse token response")?;

        Ok(token)
    }

    /// Get a valid access token, refreshing it when missing or near expiry
    pub fn get_access_token(&self) -> Result<String> {
        let refresh_token = self.refresh_token.as_deref().ok_or_else(|| {
            anyhow!("No refresh token configured; authorize via /auth/url and set GMAIL_REFRESH_TOKEN")
        })?;

        let mut cached = self
            .cached
            .lock()
            .map_err(|_| anyhow!("Access token cache lock poisoned"))?;

        let now = chrono::Utc::now().timestamp();
        if let Some(token) = cached.as_ref()
            && token.expires_at > now + Self::EXPIRY_BUFFER_SECS
        {
            return Ok(token.access_token.clone());
        }

        debug!("Refreshing Gmail access token");
        let token = self.refresh_access_token(refresh_token)?;
        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: now + token.expires_in.unwrap_or(3600) as i64,
        });

        Ok(access_token)
    }

    /// Refresh an access token using a refresh token
    fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .context("Failed to refresh access token")?;

        let token: TokenResponse = response
            .into_body()
            .read_json()
            .context("Failed to parse refresh token response")?;

        Ok(token)
    }
}

/// Build an OAuth client from configured credentials
pub fn create_oauth_client(credentials: &GmailCredentials) -> Result<GmailAuth, ConfigError> {
    GmailAuth::new(credentials)
}

/// Return an authorized Gmail client
///
/// A direct pass-through to [`create_oauth_client`]; token refresh is
/// handled inside the client itself.
pub fn authorize(credentials: &GmailCredentials) -> Result<GmailClient, ConfigError> {
    Ok(GmailClient::new(create_oauth_client(credentials)?))
}
