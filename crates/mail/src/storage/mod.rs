//! Local persistence
//!
//! Backups are the only state this crate writes to disk.

mod backup;

pub use backup::{BackupFile, BackupStore};
