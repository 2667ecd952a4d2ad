//! JSON backup files for normalized messages
//!
//! Directory structure:
//! ```text
//! backups/
//!   unfortunately-2024-05-01T09-30-12-345Z.json
//!   selected-emails-2024-05-01T09-31-02-001Z.json
//!   selected-emails-2024-05-01T09-31-02-001Z-1.json   # same-millisecond collision
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::models::NormalizedMessage;

/// Contents of a backup file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackupFile<T = NormalizedMessage> {
    pub count: usize,
    pub messages: Vec<T>,
}

#[derive(Serialize)]
struct BackupRef<'a, T> {
    count: usize,
    messages: &'a [T],
}

/// Writes timestamped backup files under a root directory
///
/// Files are never overwritten or removed.
pub struct BackupStore {
    root: PathBuf,
}

impl BackupStore {
    /// Upper bound on collision suffixes tried for one timestamp
    const MAX_SUFFIX: u32 = 1000;

    /// Create a backup store rooted at `root`; the directory is created lazily
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The directory backups are written to
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `messages` to a new `{label}-{timestamp}.json` file
    ///
    /// Each message is serialized as given, so client-supplied JSON values
    /// are kept verbatim. Creates the backup directory if needed and returns
    /// the path written.
    pub fn save<T: Serialize>(&self, messages: &[T], label: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).with_context(|| {
            format!("Failed to create backup directory: {}", self.root.display())
        })?;

        let stem = backup_stem(label, Utc::now());
        let (path, file) = self.create_unique(&stem)?;

        let mut writer = BufWriter::new(file);
        let backup = BackupRef {
            count: messages.len(),
            messages,
        };
        serde_json::to_writer_pretty(&mut writer, &backup)
            .with_context(|| format!("Failed to write backup file: {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to write backup file: {}", path.display()))?;

        info!("Saved {} messages to {}", messages.len(), path.display());
        Ok(path)
    }

    /// Read a backup file of normalized messages back
    pub fn load(path: &Path) -> Result<BackupFile> {
        Self::load_as(path)
    }

    /// Read a backup file back with arbitrary message entries
    pub fn load_as<T: DeserializeOwned>(path: &Path) -> Result<BackupFile<T>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read backup file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse backup file: {}", path.display()))
    }

    /// Create `{stem}.json`, or `{stem}-{n}.json` if that name is taken
    fn create_unique(&self, stem: &str) -> Result<(PathBuf, fs::File)> {
        for n in 0..Self::MAX_SUFFIX {
            let name = if n == 0 {
                format!("{}.json", stem)
            } else {
                format!("{}-{}.json", stem, n)
            };
            let path = self.root.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to create backup file: {}", path.display())
                    });
                }
            }
        }
        anyhow::bail!("Too many backups named {} in {}", stem, self.root.display())
    }
}

/// `{label}-{ISO-8601 UTC timestamp}` with `:` and `.` replaced by `-`
fn backup_stem(label: &str, now: DateTime<Utc>) -> String {
    let timestamp = now
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
        .replace([':', '.'], "-");
    format!("{}-{}", label, timestamp)
}
