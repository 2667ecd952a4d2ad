//! Gmail API response normalization
//!
//! Converts Gmail metadata responses to [`NormalizedMessage`].

use anyhow::{Context, Result};

use super::api::{GmailMessage, MessagePayload};
use crate::models::{MessageId, NormalizedMessage, ThreadId};

/// Headers requested when fetching message metadata
pub const METADATA_HEADERS: &[&str] = &["From", "To", "Subject", "Date"];

/// Normalize a Gmail API message
///
/// Fails if the response carries no message or thread id.
pub fn normalize_message(gmail_msg: GmailMessage) -> Result<NormalizedMessage> {
    let id = gmail_msg
        .id
        .filter(|id| !id.is_empty())
        .context("Message response has no id")?;
    let thread_id = gmail_msg
        .thread_id
        .filter(|id| !id.is_empty())
        .with_context(|| format!("Message {} has no threadId", id))?;

    let payload = gmail_msg.payload.as_ref();
    let header = |name: &str| payload.and_then(|p| extract_header(p, name));

    Ok(NormalizedMessage::builder(MessageId::new(id), ThreadId::new(thread_id))
        .snippet(gmail_msg.snippet.clone().unwrap_or_default())
        .internal_date(gmail_msg.internal_date.clone())
        .from(header("From"))
        .to(header("To"))
        .subject(header("Subject"))
        .date(header("Date"))
        .build())
}

/// Extract a header value by name
///
/// Names compare case-insensitively; the first match in provider order wins.
fn extract_header(payload: &MessagePayload, name: &str) -> Option<String> {
    payload.headers.as_ref()?.iter().find_map(|h| {
        if h.name.eq_ignore_ascii_case(name) {
            Some(h.value.clone())
        } else {
            None
        }
    })
}
