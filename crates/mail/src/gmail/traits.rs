//! Provider trait definitions

use anyhow::Result;

use super::api::{GmailMessage, ListMessagesResponse};
use crate::models::MessageId;

/// Trait for the mail provider operations the service relies on
///
/// Abstracts over the live Gmail client so the fetcher, the trash action
/// and the HTTP layer can be exercised against an in-memory provider.
/// Every call is blocking and issued one at a time by its callers.
pub trait MailApi: Send + Sync {
    /// List one page of message references matching a search query
    ///
    /// # Arguments
    /// * `query` - Gmail search expression (same syntax as the web search box)
    /// * `max_results` - Page size cap
    /// * `page_token` - Continuation token from the previous page, if any
    fn list_messages(
        &self,
        query: &str,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<ListMessagesResponse>;

    /// Fetch message metadata restricted to the given headers
    fn get_message_metadata(&self, id: &MessageId, headers: &[&str]) -> Result<GmailMessage>;

    /// Move a message to the trash
    fn trash_message(&self, id: &MessageId) -> Result<()>;
}
