//! Backup use-case service.
//!
//! # Responsibility
//! - Serialize the whole store to a portable JSON document and restore it.
//! - Run the evolution check across imports so a bulk restore still
//!   reports its stage transition.
//!
//! # Invariants
//! - Import replaces the whole store; it never merges.
//! - The document `format_version` gates import; unsupported versions are
//!   rejected before any write.

use crate::evolution::{self, EvolutionReport};
use crate::model::entry::EntryCollection;
use crate::model::profile::UserProfile;
use crate::repo::backup_repo::{BackupRepoError, BackupRepository};
use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Version tag written into every exported document.
pub const BACKUP_FORMAT_VERSION: u32 = 1;

/// Service error for backup use-cases.
#[derive(Debug)]
pub enum BackupError {
    /// Document version this build cannot restore.
    UnsupportedFormatVersion { found: u32, supported: u32 },
    /// Document (de)serialization failure.
    Serialization(serde_json::Error),
    /// Persistence-layer failure.
    Repo(BackupRepoError),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormatVersion { found, supported } => write!(
                f,
                "unsupported backup format version {found}, this build supports {supported}"
            ),
            Self::Serialization(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnsupportedFormatVersion { .. } => None,
            Self::Serialization(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<BackupRepoError> for BackupError {
    fn from(value: BackupRepoError) -> Self {
        Self::Repo(value)
    }
}

/// Portable whole-store document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupDocument {
    /// Document schema version; see [`BACKUP_FORMAT_VERSION`].
    pub format_version: u32,
    /// Export wall-clock stamp, epoch milliseconds.
    pub exported_at: i64,
    /// Profile at export time.
    pub profile: UserProfile,
    /// All entries keyed by date.
    pub entries: EntryCollection,
}

/// Outcome of one full-store import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Number of entries in the store after the restore.
    pub restored_entries: u32,
    /// Stage comparison between pre-import and post-import counts.
    pub evolution: EvolutionReport,
}

/// Backup service facade over repository implementations.
pub struct BackupService<R: BackupRepository> {
    repo: R,
}

impl<R: BackupRepository> BackupService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Exports the whole store as a pretty-printed JSON document.
    pub fn export_json(&self) -> Result<String, BackupError> {
        let snapshot = self.repo.snapshot()?;
        let document = BackupDocument {
            format_version: BACKUP_FORMAT_VERSION,
            exported_at: Utc::now().timestamp_millis(),
            profile: snapshot.profile,
            entries: snapshot.entries,
        };
        let json = serde_json::to_string_pretty(&document)?;

        info!(
            "event=backup_exported module=backup status=ok entries={}",
            document.entries.len()
        );
        Ok(json)
    }

    /// Replaces the whole store with the given document.
    ///
    /// # Contract
    /// - The version gate runs before any write.
    /// - The evolution check compares entry counts before and after the
    ///   restore; a jump across several stage boundaries yields a single
    ///   report naming only the landed stage.
    pub fn import_json(&mut self, json: &str) -> Result<ImportOutcome, BackupError> {
        let document: BackupDocument = serde_json::from_str(json)?;
        if document.format_version != BACKUP_FORMAT_VERSION {
            return Err(BackupError::UnsupportedFormatVersion {
                found: document.format_version,
                supported: BACKUP_FORMAT_VERSION,
            });
        }

        let previous_count = self.repo.snapshot()?.entries.len() as u32;
        self.repo.restore(&document.profile, &document.entries)?;

        let restored_entries = self.repo.snapshot()?.entries.len() as u32;
        let evolution = evolution::check_evolution(previous_count, restored_entries);

        info!(
            "event=backup_imported module=backup status=ok entries={restored_entries} evolved={}",
            evolution.evolved
        );
        Ok(ImportOutcome {
            restored_entries,
            evolution,
        })
    }

    /// Wipes entries and profile together, returning removed entry count.
    pub fn clear_all(&mut self) -> Result<u32, BackupError> {
        let removed = self.repo.clear()?;

        info!("event=data_cleared module=backup status=ok entries_removed={removed}");
        Ok(removed)
    }
}
