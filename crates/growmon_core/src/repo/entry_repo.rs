//! Diary entry repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `diary_entries` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - One row per calendar date; `save_entry` replaces the row on conflict.
//! - Write paths must call `DiaryEntry::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::entry::{
    DiaryEntry, EntryCollection, EntryContent, EntryValidationError, PhotoRef,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ENTRY_SELECT_SQL: &str = "SELECT
    date,
    photo,
    observation,
    weather,
    temperature,
    created_at
FROM diary_entries";

/// Storage format of the `diary_entries.date` column.
pub const ENTRY_DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for diary persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EntryValidationError),
    Db(DbError),
    NotFound(NaiveDate),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(date) => write!(f, "diary entry not found: {date}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "diary repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "diary repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "diary repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted diary data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<EntryValidationError> for RepoError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for diary entry CRUD operations.
pub trait EntryRepository {
    /// Inserts or replaces the entry stored under `entry.date`.
    fn save_entry(&self, entry: &DiaryEntry) -> RepoResult<()>;
    /// Gets one entry by calendar date.
    fn get_entry(&self, date: NaiveDate) -> RepoResult<Option<DiaryEntry>>;
    /// Deletes one entry by calendar date.
    fn delete_entry(&self, date: NaiveDate) -> RepoResult<()>;
    /// Loads the full date-keyed entry snapshot.
    fn list_entries(&self) -> RepoResult<EntryCollection>;
    /// Counts stored entries.
    fn entry_count(&self) -> RepoResult<u32>;
    /// Lists entries of one calendar month, date ascending.
    fn entries_for_month(&self, year: i32, month: u32) -> RepoResult<Vec<DiaryEntry>>;
    /// Lists entries newest-first for timeline use-cases.
    fn list_recent_first(&self, limit: Option<u32>) -> RepoResult<Vec<DiaryEntry>>;
    /// Deletes all entries and returns the number removed.
    fn clear_entries(&self) -> RepoResult<u32>;
}

/// SQLite-backed diary entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_entry_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn save_entry(&self, entry: &DiaryEntry) -> RepoResult<()> {
        entry.validate()?;

        self.conn.execute(
            "INSERT INTO diary_entries (
                date,
                photo,
                observation,
                weather,
                temperature,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(date) DO UPDATE SET
                photo = excluded.photo,
                observation = excluded.observation,
                weather = excluded.weather,
                temperature = excluded.temperature,
                created_at = excluded.created_at;",
            params![
                date_to_db(entry.date),
                entry.photo.as_str(),
                entry.content.observation.as_str(),
                entry.content.weather.as_deref(),
                entry.content.temperature.as_deref(),
                entry.created_at,
            ],
        )?;

        Ok(())
    }

    fn get_entry(&self, date: NaiveDate) -> RepoResult<Option<DiaryEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} WHERE date = ?1;"))?;

        let mut rows = stmt.query([date_to_db(date)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }

        Ok(None)
    }

    fn delete_entry(&self, date: NaiveDate) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM diary_entries WHERE date = ?1;",
            [date_to_db(date)],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(date));
        }

        Ok(())
    }

    fn list_entries(&self) -> RepoResult<EntryCollection> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} ORDER BY date ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut entries = EntryCollection::new();
        while let Some(row) = rows.next()? {
            entries.insert(parse_entry_row(row)?);
        }

        Ok(entries)
    }

    fn entry_count(&self) -> RepoResult<u32> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM diary_entries;", [], |row| row.get(0))?;
        u32::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("invalid entry count `{count}`")))
    }

    fn entries_for_month(&self, year: i32, month: u32) -> RepoResult<Vec<DiaryEntry>> {
        // Date text is ISO `YYYY-MM-DD`, so one month is one LIKE prefix.
        let prefix = format!("{year:04}-{month:02}-%");
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL}
             WHERE date LIKE ?1
             ORDER BY date ASC;"
        ))?;

        let mut rows = stmt.query([prefix.as_str()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }

    fn list_recent_first(&self, limit: Option<u32>) -> RepoResult<Vec<DiaryEntry>> {
        let mut sql = format!("{ENTRY_SELECT_SQL} ORDER BY created_at DESC, date DESC");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }

    fn clear_entries(&self) -> RepoResult<u32> {
        let removed = self.conn.execute("DELETE FROM diary_entries;", [])?;
        u32::try_from(removed)
            .map_err(|_| RepoError::InvalidData(format!("invalid removed-row count `{removed}`")))
    }
}

/// Formats a calendar date for the `diary_entries.date` column.
pub fn date_to_db(date: NaiveDate) -> String {
    date.format(ENTRY_DATE_FORMAT).to_string()
}

/// Parses a `diary_entries.date` column value.
pub fn parse_entry_date(value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, ENTRY_DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date value `{value}` in diary_entries.date"))
    })
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<DiaryEntry> {
    let date_text: String = row.get("date")?;
    let date = parse_entry_date(&date_text)?;

    let photo_text: String = row.get("photo")?;
    let entry = DiaryEntry::with_created_at(
        date,
        PhotoRef::from(photo_text),
        EntryContent {
            observation: row.get("observation")?,
            weather: row.get("weather")?,
            temperature: row.get("temperature")?,
        },
        row.get("created_at")?,
    );
    entry.validate()?;
    Ok(entry)
}

fn ensure_entry_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "diary_entries")? {
        return Err(RepoError::MissingRequiredTable("diary_entries"));
    }

    for column in [
        "date",
        "photo",
        "observation",
        "weather",
        "temperature",
        "created_at",
    ] {
        if !table_has_column(conn, "diary_entries", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "diary_entries",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
