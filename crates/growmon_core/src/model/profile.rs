//! User profile domain model.
//!
//! # Responsibility
//! - Define the single-row profile record: author identity, plant metadata,
//!   journey start date and reminder preferences.
//!
//! # Invariants
//! - Exactly one profile exists per database; absence means defaults.
//! - `start_date` is the only profile field the statistics engine reads.

use crate::model::entry::{PhotoRef, PhotoRefValidationError};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Profile record for the diary's single author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name. Empty until the user fills it in.
    pub name: String,
    /// Optional avatar image reference, same opaque shape as entry photos.
    pub avatar: Option<PhotoRef>,
    /// School grade label, free text.
    pub grade: Option<String>,
    /// Name the user gave their plant.
    pub plant_name: String,
    /// Species or kind of the plant, free text.
    pub plant_type: String,
    /// First day of the 90-day journey. `None` means not yet started.
    pub start_date: Option<NaiveDate>,
    /// Time of day for the daily reminder.
    pub notification_time: NaiveTime,
    /// Whether the daily reminder is active.
    pub notification_enabled: bool,
}

impl UserProfile {
    /// Validates profile shape.
    ///
    /// # Errors
    /// - An avatar reference that is blank or a malformed inline data URL.
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        if let Some(avatar) = &self.avatar {
            avatar
                .validate()
                .map_err(ProfileValidationError::InvalidAvatar)?;
        }
        Ok(())
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            avatar: None,
            grade: None,
            plant_name: String::new(),
            plant_type: String::new(),
            start_date: None,
            notification_time: default_notification_time(),
            notification_enabled: false,
        }
    }
}

/// Default daily-reminder time: 20:00.
pub fn default_notification_time() -> NaiveTime {
    NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Validation failures for the profile record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileValidationError {
    /// Avatar reference failed photo shape validation.
    InvalidAvatar(PhotoRefValidationError),
}

impl Display for ProfileValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAvatar(err) => write!(f, "invalid avatar: {err}"),
        }
    }
}

impl Error for ProfileValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidAvatar(err) => Some(err),
        }
    }
}
