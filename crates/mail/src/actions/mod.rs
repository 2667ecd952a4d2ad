//! Email actions module
//!
//! Provides high-level action handlers for mailbox mutations.

mod handler;

pub use handler::{ActionHandler, TrashOutcome};
