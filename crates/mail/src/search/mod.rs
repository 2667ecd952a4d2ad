//! Gmail search: run a query and return normalized messages
//!
//! Queries use Gmail's own search syntax (e.g. `unfortunately newer_than:24h`)
//! and are passed to the provider verbatim; nothing is indexed locally.

mod messages;

pub use messages::{LIST_PAGE_SIZE, MessageIds, fetch_message, fetch_messages};

/// Fixed query behind the `unfortunately` endpoints
pub const UNFORTUNATELY_QUERY: &str = "unfortunately";

/// Fixed query behind the last-24-hours endpoint
pub const UNFORTUNATELY_LAST_24H_QUERY: &str = "unfortunately newer_than:24h";
