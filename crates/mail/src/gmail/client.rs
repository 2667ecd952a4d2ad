//! Gmail API HTTP client
//!
//! Provides methods for searching, reading and trashing messages.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result};

use super::api::{GmailMessage, ListMessagesResponse};
use super::{GmailAuth, MailApi};
use crate::models::MessageId;

/// Gmail API client for the authenticated user's mailbox
pub struct GmailClient {
    auth: GmailAuth,
}

impl GmailClient {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Create a new Gmail client
    pub fn new(auth: GmailAuth) -> Self {
        Self { auth }
    }

    /// The OAuth client backing this Gmail client
    pub fn auth(&self) -> &GmailAuth {
        &self.auth
    }

    fn bearer(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.auth.get_access_token()?))
    }
}

impl MailApi for GmailClient {
    fn list_messages(
        &self,
        query: &str,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<ListMessagesResponse> {
        let url = format!("{}/users/me/messages", Self::BASE_URL);

        let mut request = ureq::get(&url)
            .header("Authorization", &self.bearer()?)
            .query("q", query)
            .query("maxResults", max_results.to_string());

        if let Some(token) = page_token {
            request = request.query("pageToken", token);
        }

        let mut response = request
            .call()
            .context("Failed to send list messages request")?;

        let list: ListMessagesResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse list messages response")?;

        Ok(list)
    }

    fn get_message_metadata(&self, id: &MessageId, headers: &[&str]) -> Result<GmailMessage> {
        let url = format!(
            "{}/users/me/messages/{}",
            Self::BASE_URL,
            urlencoding::encode(id.as_str())
        );

        let mut request = ureq::get(&url)
            .header("Authorization", &self.bearer()?)
            .query("format", "metadata");

        for header in headers {
            request = request.query("metadataHeaders", header);
        }

        let mut response = request
            .call()
            .with_context(|| format!("Failed to send get message request for {}", id))?;

        let message: GmailMessage = response
            .body_mut()
            .read_json()
            .context("Failed to parse message response")?;

        Ok(message)
    }

    fn trash_message(&self, id: &MessageId) -> Result<()> {
        let url = format!(
            "{}/users/me/messages/{}/trash",
            Self::BASE_URL,
            urlencoding::encode(id.as_str())
        );

        ureq::post(&url)
            .header("Authorization", &self.bearer()?)
            .send_empty()
            .with_context(|| format!("Failed to trash message {}", id))?;

        Ok(())
    }
}
