//! Query-driven message fetching
//!
//! Enumerates message ids page by page and hydrates each one into a
//! [`NormalizedMessage`]. All provider calls are sequential: one list or
//! metadata request is in flight at a time.

use anyhow::{Context, Result};
use log::debug;
use std::collections::VecDeque;

use crate::gmail::{METADATA_HEADERS, MailApi, normalize_message};
use crate::models::{MessageId, NormalizedMessage};

/// Page size requested from the list endpoint (the provider's maximum)
pub const LIST_PAGE_SIZE: usize = 500;

/// Lazy iterator over the ids matching a query, in provider order
///
/// A list request is issued only once the ids of the previous page have
/// been consumed. Iteration ends after the last page or after the first
/// error, which is yielded once.
pub struct MessageIds<'a> {
    api: &'a dyn MailApi,
    query: &'a str,
    buffer: VecDeque<MessageId>,
    page_token: Option<String>,
    pages_fetched: usize,
    exhausted: bool,
}

impl<'a> MessageIds<'a> {
    pub fn new(api: &'a dyn MailApi, query: &'a str) -> Self {
        Self {
            api,
            query,
            buffer: VecDeque::new(),
            page_token: None,
            pages_fetched: 0,
            exhausted: false,
        }
    }

    /// Number of list requests issued so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn fetch_page(&mut self) -> Result<()> {
        let page = self
            .api
            .list_messages(self.query, LIST_PAGE_SIZE, self.page_token.as_deref())
            .with_context(|| format!("Failed to list messages for query {:?}", self.query))?;
        self.pages_fetched += 1;

        let refs = page.messages.unwrap_or_default();
        debug!(
            "Listed page {} for {:?}: {} ids (estimate {:?})",
            self.pages_fetched,
            self.query,
            refs.len(),
            page.result_size_estimate
        );
        self.buffer
            .extend(refs.into_iter().map(|r| MessageId::new(r.id)));

        self.page_token = page.next_page_token.filter(|t| !t.is_empty());
        if self.page_token.is_none() {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl Iterator for MessageIds<'_> {
    type Item = Result<MessageId>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.buffer.pop_front() {
                return Some(Ok(id));
            }
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
    }
}

/// Fetch and normalize the metadata of a single message
pub fn fetch_message(api: &dyn MailApi, id: &MessageId) -> Result<NormalizedMessage> {
    let gmail_msg = api
        .get_message_metadata(id, METADATA_HEADERS)
        .with_context(|| format!("Failed to fetch message {}", id))?;
    normalize_message(gmail_msg)
}

/// Fetch every message matching `query`, in enumeration order
///
/// Any provider failure aborts the whole fetch; no partial list is returned.
/// A query with no matches issues list requests only.
pub fn fetch_messages(api: &dyn MailApi, query: &str) -> Result<Vec<NormalizedMessage>> {
    let messages = MessageIds::new(api, query)
        .map(|id| id.and_then(|id| fetch_message(api, &id)))
        .collect::<Result<Vec<_>>>()?;

    debug!("Fetched {} messages for {:?}", messages.len(), query);
    Ok(messages)
}
