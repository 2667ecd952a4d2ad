//! Gmail API integration
//!
//! This module provides:
//! - OAuth2 client construction, consent URL and code exchange
//! - Gmail API client for listing, reading and trashing messages
//! - Response normalization to domain models

mod auth;
mod client;
#[cfg(any(test, feature = "test-support"))]
mod memory;
mod normalize;
mod traits;

pub use auth::{ConfigError, GmailAuth, SCOPES, TokenResponse, authorize, create_oauth_client};
pub use client::GmailClient;
#[cfg(any(test, feature = "test-support"))]
pub use memory::InMemoryMailApi;
pub use normalize::{METADATA_HEADERS, normalize_message};
pub use traits::MailApi;

/// Gmail API response types
pub mod api {
    use serde::{Deserialize, Serialize};

    /// Response from listing messages
    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListMessagesResponse {
        pub messages: Option<Vec<MessageRef>>,
        pub next_page_token: Option<String>,
        pub result_size_estimate: Option<u32>,
    }

    /// Reference to a message (just ID and thread ID)
    #[derive(Debug, Clone, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageRef {
        pub id: String,
        pub thread_id: Option<String>,
    }

    /// Message from Gmail API, as returned by `format=metadata`
    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GmailMessage {
        pub id: Option<String>,
        pub thread_id: Option<String>,
        pub snippet: Option<String>,
        pub internal_date: Option<String>,
        pub payload: Option<MessagePayload>,
    }

    /// Message payload; only headers are requested
    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessagePayload {
        pub headers: Option<Vec<Header>>,
        pub mime_type: Option<String>,
    }

    /// Email header (name-value pair)
    #[derive(Debug, Clone, Deserialize, Serialize)]
    pub struct Header {
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub value: String,
    }
}
