//! User profile repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for the single-row user/plant profile.
//! - Keep SQL details and default-materialization inside the repository
//!   boundary.
//!
//! # Invariants
//! - The profile table holds at most one row, pinned to `id = 1`.
//! - An absent row is a valid state and loads as `UserProfile::default()`.
//! - Write paths must call `UserProfile::validate()` before SQL mutations.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::entry::PhotoRef;
use crate::model::profile::{ProfileValidationError, UserProfile};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PROFILE_DATE_FORMAT: &str = "%Y-%m-%d";
const PROFILE_TIME_FORMAT: &str = "%H:%M";

/// Result type used by profile repository operations.
pub type ProfileRepoResult<T> = Result<T, ProfileRepoError>;

/// Errors from profile repository operations.
#[derive(Debug)]
pub enum ProfileRepoError {
    /// Profile model failed shape validation.
    Validation(ProfileValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
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
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for ProfileRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "profile repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "profile repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "profile repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted profile data: {message}"),
        }
    }
}

impl Error for ProfileRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ProfileValidationError> for ProfileRepoError {
    fn from(value: ProfileValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for ProfileRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ProfileRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for user profile operations.
pub trait ProfileRepository {
    /// Loads the profile, falling back to defaults when no row exists.
    fn load_profile(&self) -> ProfileRepoResult<UserProfile>;
    /// Inserts or replaces the single profile row.
    fn save_profile(&self, profile: &UserProfile) -> ProfileRepoResult<()>;
    /// Updates only the journey start date, materializing defaults first
    /// when no profile row exists yet.
    fn set_start_date(&self, start_date: Option<NaiveDate>) -> ProfileRepoResult<()>;
}

/// SQLite-backed user profile repository.
pub struct SqliteProfileRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> ProfileRepoResult<Self> {
        ensure_profile_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProfileRepository for SqliteProfileRepository<'_> {
    fn load_profile(&self) -> ProfileRepoResult<UserProfile> {
        let mut stmt = self.conn.prepare(
            "SELECT
                name,
                avatar,
                grade,
                plant_name,
                plant_type,
                start_date,
                notification_time,
                notification_enabled
             FROM user_profile
             WHERE id = 1;",
        )?;

        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            return parse_profile_row(row);
        }

        Ok(UserProfile::default())
    }

    fn save_profile(&self, profile: &UserProfile) -> ProfileRepoResult<()> {
        profile.validate()?;

        self.conn.execute(
            "INSERT INTO user_profile (
                id,
                name,
                avatar,
                grade,
                plant_name,
                plant_type,
                start_date,
                notification_time,
                notification_enabled
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                avatar = excluded.avatar,
                grade = excluded.grade,
                plant_name = excluded.plant_name,
                plant_type = excluded.plant_type,
                start_date = excluded.start_date,
                notification_time = excluded.notification_time,
                notification_enabled = excluded.notification_enabled;",
            params![
                profile.name.as_str(),
                profile.avatar.as_ref().map(PhotoRef::as_str),
                profile.grade.as_deref(),
                profile.plant_name.as_str(),
                profile.plant_type.as_str(),
                profile.start_date.map(date_to_db),
                time_to_db(profile.notification_time),
                bool_to_int(profile.notification_enabled),
            ],
        )?;

        Ok(())
    }

    fn set_start_date(&self, start_date: Option<NaiveDate>) -> ProfileRepoResult<()> {
        let mut profile = self.load_profile()?;
        profile.start_date = start_date;
        self.save_profile(&profile)
    }
}

fn parse_profile_row(row: &Row<'_>) -> ProfileRepoResult<UserProfile> {
    let avatar = row.get::<_, Option<String>>("avatar")?.map(PhotoRef::from);

    let start_date = match row.get::<_, Option<String>>("start_date")? {
        Some(value) => Some(parse_profile_date(&value)?),
        None => None,
    };

    let time_text: String = row.get("notification_time")?;
    let notification_time = parse_profile_time(&time_text)?;

    let notification_enabled = match row.get::<_, i64>("notification_enabled")? {
        0 => false,
        1 => true,
        other => {
            return Err(ProfileRepoError::InvalidData(format!(
                "invalid notification_enabled value `{other}` in user_profile"
            )));
        }
    };

    let profile = UserProfile {
        name: row.get("name")?,
        avatar,
        grade: row.get("grade")?,
        plant_name: row.get("plant_name")?,
        plant_type: row.get("plant_type")?,
        start_date,
        notification_time,
        notification_enabled,
    };
    profile.validate()?;
    Ok(profile)
}

fn date_to_db(date: NaiveDate) -> String {
    date.format(PROFILE_DATE_FORMAT).to_string()
}

fn time_to_db(time: NaiveTime) -> String {
    time.format(PROFILE_TIME_FORMAT).to_string()
}

fn parse_profile_date(value: &str) -> ProfileRepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, PROFILE_DATE_FORMAT).map_err(|_| {
        ProfileRepoError::InvalidData(format!(
            "invalid date value `{value}` in user_profile.start_date"
        ))
    })
}

fn parse_profile_time(value: &str) -> ProfileRepoResult<NaiveTime> {
    NaiveTime::parse_from_str(value, PROFILE_TIME_FORMAT).map_err(|_| {
        ProfileRepoError::InvalidData(format!(
            "invalid time value `{value}` in user_profile.notification_time"
        ))
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_profile_connection_ready(conn: &Connection) -> ProfileRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(ProfileRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "user_profile")? {
        return Err(ProfileRepoError::MissingRequiredTable("user_profile"));
    }

    for column in [
        "id",
        "name",
        "avatar",
        "grade",
        "plant_name",
        "plant_type",
        "start_date",
        "notification_time",
        "notification_enabled",
    ] {
        if !table_has_column(conn, "user_profile", column)? {
            return Err(ProfileRepoError::MissingRequiredColumn {
                table: "user_profile",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> ProfileRepoResult<bool> {
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

fn table_has_column(conn: &Connection, table: &str, column: &str) -> ProfileRepoResult<bool> {
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
