//! Whole-store backup repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide atomic snapshot/restore/clear over diary entries and profile
//!   together.
//! - Own replace-everything semantics so export/import stays consistent.
//!
//! # Invariants
//! - `restore` replaces the whole store in a single transaction; partial
//!   imports never become visible.
//! - `clear` wipes entries and profile together or not at all.

use crate::db::DbError;
use crate::model::entry::EntryCollection;
use crate::model::profile::UserProfile;
use crate::repo::entry_repo::{EntryRepository, RepoError, SqliteEntryRepository};
use crate::repo::profile_repo::{ProfileRepoError, ProfileRepository, SqliteProfileRepository};
use rusqlite::{Connection, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by backup repository operations.
pub type BackupRepoResult<T> = Result<T, BackupRepoError>;

/// Errors from backup repository operations.
#[derive(Debug)]
pub enum BackupRepoError {
    /// Entry-side persistence failure.
    Entries(RepoError),
    /// Profile-side persistence failure.
    Profile(ProfileRepoError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
}

impl Display for BackupRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entries(err) => write!(f, "{err}"),
            Self::Profile(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BackupRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Entries(err) => Some(err),
            Self::Profile(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<RepoError> for BackupRepoError {
    fn from(value: RepoError) -> Self {
        Self::Entries(value)
    }
}

impl From<ProfileRepoError> for BackupRepoError {
    fn from(value: ProfileRepoError) -> Self {
        Self::Profile(value)
    }
}

impl From<rusqlite::Error> for BackupRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Consistent view of everything the store holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// User/plant profile, defaults when never saved.
    pub profile: UserProfile,
    /// All diary entries keyed by date.
    pub entries: EntryCollection,
}

/// Repository interface for whole-store backup operations.
pub trait BackupRepository {
    /// Reads profile and entries as one consistent snapshot.
    fn snapshot(&self) -> BackupRepoResult<StoreSnapshot>;
    /// Replaces the whole store with the given state in one transaction.
    fn restore(&mut self, profile: &UserProfile, entries: &EntryCollection)
        -> BackupRepoResult<()>;
    /// Wipes entries and profile atomically, returning removed entry count.
    fn clear(&mut self) -> BackupRepoResult<u32>;
}

/// SQLite-backed whole-store backup repository.
pub struct SqliteBackupRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteBackupRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> BackupRepoResult<Self> {
        let _ = SqliteEntryRepository::try_new(conn)?;
        let _ = SqliteProfileRepository::try_new(conn)?;
        Ok(Self { conn })
    }
}

impl BackupRepository for SqliteBackupRepository<'_> {
    fn snapshot(&self) -> BackupRepoResult<StoreSnapshot> {
        let entries = SqliteEntryRepository::try_new(self.conn)?.list_entries()?;
        let profile = SqliteProfileRepository::try_new(self.conn)?.load_profile()?;
        Ok(StoreSnapshot { profile, entries })
    }

    fn restore(
        &mut self,
        profile: &UserProfile,
        entries: &EntryCollection,
    ) -> BackupRepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        {
            let entry_repo = SqliteEntryRepository::try_new(&tx)?;
            entry_repo.clear_entries()?;
            for entry in entries.entries() {
                entry_repo.save_entry(entry)?;
            }

            let profile_repo = SqliteProfileRepository::try_new(&tx)?;
            profile_repo.save_profile(profile)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn clear(&mut self) -> BackupRepoResult<u32> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let removed = {
            let entry_repo = SqliteEntryRepository::try_new(&tx)?;
            entry_repo.clear_entries()?
        };
        tx.execute("DELETE FROM user_profile;", [])?;

        tx.commit()?;
        Ok(removed)
    }
}
