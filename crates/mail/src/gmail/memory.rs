//! In-memory provider implementation
//!
//! Used for testing the fetcher, the trash action and the HTTP layer
//! without network access. Counts every call it receives.

use anyhow::{Result, anyhow, bail};
use std::collections::HashSet;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::MailApi;
use super::api::{GmailMessage, Header, ListMessagesResponse, MessagePayload, MessageRef};
use crate::models::MessageId;

/// In-memory implementation of MailApi
///
/// Messages are kept in insertion order, which is the order listing
/// returns them in. A query matches a message when every plain term occurs
/// in its subject or snippet (case-insensitive); `operator:value` terms
/// are ignored.
pub struct InMemoryMailApi {
    messages: RwLock<Vec<GmailMessage>>,
    page_size: usize,
    failing_ids: RwLock<HashSet<String>>,
    fail_listing: AtomicBool,
    trashed: RwLock<Vec<String>>,
    list_calls: AtomicUsize,
    metadata_calls: AtomicUsize,
    trash_calls: AtomicUsize,
}

impl Default for InMemoryMailApi {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMailApi {
    /// Create an empty mailbox with an unbounded page size
    pub fn new() -> Self {
        Self::with_page_size(usize::MAX)
    }

    /// Create an empty mailbox that returns at most `page_size` ids per page
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
            page_size: page_size.max(1),
            failing_ids: RwLock::new(HashSet::new()),
            fail_listing: AtomicBool::new(false),
            trashed: RwLock::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            metadata_calls: AtomicUsize::new(0),
            trash_calls: AtomicUsize::new(0),
        }
    }

    /// Append a message with the given subject and snippet
    pub fn add_message(&self, id: &str, thread_id: &str, subject: &str, snippet: &str) {
        self.insert(GmailMessage {
            id: Some(id.to_string()),
            thread_id: Some(thread_id.to_string()),
            snippet: Some(snippet.to_string()),
            internal_date: Some("1700000000000".to_string()),
            payload: Some(MessagePayload {
                headers: Some(vec![
                    Header {
                        name: "From".to_string(),
                        value: "sender@example.com".to_string(),
                    },
                    Header {
                        name: "Subject".to_string(),
                        value: subject.to_string(),
                    },
                ]),
                mime_type: Some("text/plain".to_string()),
            }),
        });
    }

    /// Append a raw provider message
    pub fn insert(&self, message: GmailMessage) {
        self.messages.write().unwrap().push(message);
    }

    /// Make metadata and trash calls for `id` fail
    pub fn fail_on(&self, id: &str) {
        self.failing_ids.write().unwrap().insert(id.to_string());
    }

    /// Make every list call fail
    pub fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    /// Ids moved to trash so far, in call order
    pub fn trashed(&self) -> Vec<String> {
        self.trashed.read().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn trash_calls(&self) -> usize {
        self.trash_calls.load(Ordering::SeqCst)
    }

    fn matches(message: &GmailMessage, query: &str) -> bool {
        let subject = message
            .payload
            .as_ref()
            .and_then(|p| p.headers.as_ref())
            .and_then(|hs| hs.iter().find(|h| h.name.eq_ignore_ascii_case("Subject")))
            .map(|h| h.value.to_lowercase())
            .unwrap_or_default();
        let snippet = message.snippet.as_deref().unwrap_or_default().to_lowercase();

        query
            .split_whitespace()
            .filter(|term| !term.contains(':'))
            .all(|term| {
                let term = term.to_lowercase();
                subject.contains(&term) || snippet.contains(&term)
            })
    }

    fn is_failing(&self, id: &MessageId) -> bool {
        self.failing_ids.read().unwrap().contains(id.as_str())
    }
}

impl MailApi for InMemoryMailApi {
    fn list_messages(
        &self,
        query: &str,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<ListMessagesResponse> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            bail!("Rate limit exceeded");
        }

        let trashed = self.trashed.read().unwrap();
        let matching: Vec<MessageRef> = self
            .messages
            .read()
            .unwrap()
            .iter()
            .filter(|m| !trashed.iter().any(|t| Some(t) == m.id.as_ref()))
            .filter(|m| Self::matches(m, query))
            .filter_map(|m| {
                Some(MessageRef {
                    id: m.id.clone()?,
                    thread_id: m.thread_id.clone(),
                })
            })
            .collect();

        let offset: usize = match page_token {
            Some(token) => token.parse().map_err(|_| anyhow!("Invalid page token"))?,
            None => 0,
        };
        let page_size = max_results.min(self.page_size);
        let end = offset.saturating_add(page_size).min(matching.len());
        let page: Vec<MessageRef> = matching.get(offset..end).unwrap_or_default().to_vec();

        Ok(ListMessagesResponse {
            messages: if page.is_empty() { None } else { Some(page) },
            next_page_token: (end < matching.len()).then(|| end.to_string()),
            result_size_estimate: Some(matching.len() as u32),
        })
    }

    fn get_message_metadata(&self, id: &MessageId, _headers: &[&str]) -> Result<GmailMessage> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_failing(id) {
            bail!("Backend error fetching {}", id);
        }

        let messages = self.messages.read().unwrap();
        let message = messages
            .iter()
            .find(|m| m.id.as_deref() == Some(id.as_str()))
            .ok_or_else(|| anyhow!("Requested entity was not found: {}", id))?;

        Ok(GmailMessage {
            id: message.id.clone(),
            thread_id: message.thread_id.clone(),
            snippet: message.snippet.clone(),
            internal_date: message.internal_date.clone(),
            payload: message.payload.as_ref().map(|p| MessagePayload {
                headers: p.headers.clone(),
                mime_type: p.mime_type.clone(),
            }),
        })
    }

    fn trash_message(&self, id: &MessageId) -> Result<()> {
        self.trash_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_failing(id) {
            bail!("Backend error trashing {}", id);
        }
        self.trashed.write().unwrap().push(id.as_str().to_string());
        Ok(())
    }
}
