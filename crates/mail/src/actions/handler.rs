//! Action handler for email operations
//!
//! Applies mutations to the provider mailbox.

use log::{error, info};
use serde::Serialize;
use std::sync::Arc;

use crate::gmail::MailApi;
use crate::models::MessageId;

/// Result of a bulk trash request
///
/// Only aggregate counts are reported; ids that failed are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrashOutcome {
    /// Number of messages successfully moved to trash
    pub deleted: usize,
    /// Number of ids requested
    pub total: usize,
}

/// Handler for email actions
pub struct ActionHandler {
    gmail: Arc<dyn MailApi>,
}

impl ActionHandler {
    /// Create a new action handler
    pub fn new(gmail: Arc<dyn MailApi>) -> Self {
        Self { gmail }
    }

    /// Move each message to the trash, one request at a time
    ///
    /// A failure for one id does not stop the batch: it is logged and the
    /// id is left out of the `deleted` count. This operation never fails.
    pub fn trash_messages(&self, ids: &[MessageId]) -> TrashOutcome {
        info!("Trashing {} messages", ids.len());

        let mut deleted = 0;
        for id in ids {
            match self.gmail.trash_message(id) {
                Ok(()) => deleted += 1,
                Err(e) => error!("Failed to delete email {}: {:#}", id, e),
            }
        }

        info!("Trashed {}/{} messages", deleted, ids.len());
        TrashOutcome {
            deleted,
            total: ids.len(),
        }
    }
}
