//! Mail crate - Business logic for the Triage Gmail service
//!
//! This crate provides:
//! - Domain model (NormalizedMessage)
//! - Gmail API client and OAuth authentication
//! - Query-driven message fetching with pagination
//! - Bulk trash action
//! - JSON backup files
//!
//! All provider I/O is blocking (ureq); async callers should run it on a
//! blocking thread pool.

pub mod actions;
pub mod config;
pub mod gmail;
pub mod models;
pub mod search;
pub mod storage;

pub use actions::{ActionHandler, TrashOutcome};
pub use crate::config::GmailCredentials;
pub use gmail::{
    ConfigError, GmailAuth, GmailClient, MailApi, TokenResponse, authorize, create_oauth_client,
};
#[cfg(any(test, feature = "test-support"))]
pub use gmail::InMemoryMailApi;
pub use models::{MessageId, NormalizedMessage, ThreadId};
pub use search::{UNFORTUNATELY_LAST_24H_QUERY, UNFORTUNATELY_QUERY, fetch_messages};
pub use storage::{BackupFile, BackupStore};
