//! Diary entry domain model.
//!
//! # Responsibility
//! - Define the canonical daily-entry record and its date-keyed collection.
//! - Validate entry shape before writes and after reads.
//! - Tolerate older persisted shapes (plain-string content, `timestamp`
//!   field name) on deserialization.
//!
//! # Invariants
//! - One entry per calendar date; re-saving a date replaces the whole record.
//! - `photo` is opaque to every consumer except shape validation.
//! - The collection is always keyed by `entry.date`, even when imported
//!   from external JSON.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Character cap enforced by the entry form on observation text.
pub const MAX_OBSERVATION_CHARS: usize = 500;

const INLINE_PHOTO_PREFIX: &str = "data:image";

static DATA_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/[A-Za-z0-9.+-]+;base64,[A-Za-z0-9+/]+={0,2}$")
        .expect("valid data-url regex")
});

/// Opaque reference to an entry photo.
///
/// Either the image bytes inlined as a base64 data URL, or a pointer into
/// external object storage (URL or path). Engines never inspect the value;
/// the split exists only so shape validation knows which rule applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PhotoRef {
    /// Inline-encoded image payload (`data:image/...;base64,...`).
    Inline(String),
    /// Pointer produced by the external storage collaborator.
    External(String),
}

impl PhotoRef {
    /// Returns the raw reference text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inline(raw) | Self::External(raw) => raw,
        }
    }

    /// Returns whether this reference carries inline image bytes.
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline(_))
    }

    /// Checks that the reference is non-blank and, for inline payloads,
    /// a well-formed base64 data URL.
    pub fn validate(&self) -> Result<(), PhotoRefValidationError> {
        if self.as_str().trim().is_empty() {
            return Err(PhotoRefValidationError::Blank);
        }
        if let Self::Inline(raw) = self {
            if !DATA_URL_RE.is_match(raw) {
                return Err(PhotoRefValidationError::MalformedInline);
            }
        }
        Ok(())
    }
}

impl From<String> for PhotoRef {
    fn from(value: String) -> Self {
        if value.starts_with(INLINE_PHOTO_PREFIX) {
            Self::Inline(value)
        } else {
            Self::External(value)
        }
    }
}

impl From<&str> for PhotoRef {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<PhotoRef> for String {
    fn from(value: PhotoRef) -> Self {
        match value {
            PhotoRef::Inline(raw) | PhotoRef::External(raw) => raw,
        }
    }
}

/// Shape violations in a photo reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoRefValidationError {
    /// The reference text is empty or whitespace.
    Blank,
    /// An inline reference is not a valid base64 image data URL.
    MalformedInline,
}

impl Display for PhotoRefValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank => write!(f, "photo reference cannot be blank"),
            Self::MalformedInline => {
                write!(f, "inline photo reference is not a valid image data URL")
            }
        }
    }
}

impl Error for PhotoRefValidationError {}

/// Free-form observation text plus optional structured extras.
///
/// Older records stored the content as a bare string; those deserialize
/// into `observation` with empty extras.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EntryContentWire")]
pub struct EntryContent {
    /// Required observation text, at most [`MAX_OBSERVATION_CHARS`] chars.
    pub observation: String,
    /// Weather noted by the author, free text.
    pub weather: Option<String>,
    /// Temperature noted by the author, free text.
    pub temperature: Option<String>,
}

impl EntryContent {
    /// Creates content with observation text only.
    pub fn new(observation: impl Into<String>) -> Self {
        Self {
            observation: observation.into(),
            weather: None,
            temperature: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntryContentWire {
    Structured {
        observation: String,
        #[serde(default)]
        weather: Option<String>,
        #[serde(default)]
        temperature: Option<String>,
    },
    Plain(String),
}

impl From<EntryContentWire> for EntryContent {
    fn from(value: EntryContentWire) -> Self {
        match value {
            EntryContentWire::Structured {
                observation,
                weather,
                temperature,
            } => Self {
                observation,
                weather,
                temperature,
            },
            EntryContentWire::Plain(observation) => Self::new(observation),
        }
    }
}

/// Validation failures for one diary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    /// Observation text is empty or whitespace.
    BlankObservation,
    /// Observation text exceeds the form's character cap.
    ObservationTooLong { length: usize, max: usize },
    /// Photo reference failed shape validation.
    Photo(PhotoRefValidationError),
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankObservation => write!(f, "observation text cannot be blank"),
            Self::ObservationTooLong { length, max } => {
                write!(f, "observation text has {length} chars, max is {max}")
            }
            Self::Photo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EntryValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Photo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PhotoRefValidationError> for EntryValidationError {
    fn from(value: PhotoRefValidationError) -> Self {
        Self::Photo(value)
    }
}

/// One observation record for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    /// Calendar date this entry belongs to; unique key in the collection.
    pub date: NaiveDate,
    /// Opaque photo reference.
    pub photo: PhotoRef,
    /// Observation text and structured extras.
    pub content: EntryContent,
    /// Unix epoch milliseconds of the last save. Recency marker only;
    /// older exports called this field `timestamp`.
    #[serde(alias = "timestamp")]
    pub created_at: i64,
}

impl DiaryEntry {
    /// Creates an entry stamped with the current wall-clock time.
    pub fn new(date: NaiveDate, photo: PhotoRef, content: EntryContent) -> Self {
        Self::with_created_at(date, photo, content, chrono::Utc::now().timestamp_millis())
    }

    /// Creates an entry with a caller-provided creation stamp.
    ///
    /// Used by import paths where the stamp already exists externally.
    pub fn with_created_at(
        date: NaiveDate,
        photo: PhotoRef,
        content: EntryContent,
        created_at: i64,
    ) -> Self {
        Self {
            date,
            photo,
            content,
            created_at,
        }
    }

    /// Validates entry shape.
    ///
    /// Runs before every repository write and after every read-back.
    ///
    /// # Errors
    /// - Blank or over-long observation text.
    /// - Blank photo reference, or a malformed inline data URL.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.content.observation.trim().is_empty() {
            return Err(EntryValidationError::BlankObservation);
        }

        let length = self.content.observation.chars().count();
        if length > MAX_OBSERVATION_CHARS {
            return Err(EntryValidationError::ObservationTooLong {
                length,
                max: MAX_OBSERVATION_CHARS,
            });
        }

        self.photo.validate()?;
        Ok(())
    }
}

/// All entries of one user, keyed by calendar date.
///
/// Ascending date order falls out of the key type; consumers that need a
/// different order impose it themselves. Snapshot value: the engines read
/// it and never mutate it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<NaiveDate, DiaryEntry>")]
pub struct EntryCollection(BTreeMap<NaiveDate, DiaryEntry>);

impl EntryCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry` under its own date, returning any replaced entry.
    pub fn insert(&mut self, entry: DiaryEntry) -> Option<DiaryEntry> {
        self.0.insert(entry.date, entry)
    }

    /// Returns the entry for `date`, when present.
    pub fn get(&self, date: NaiveDate) -> Option<&DiaryEntry> {
        self.0.get(&date)
    }

    /// Removes and returns the entry for `date`.
    pub fn remove(&mut self, date: NaiveDate) -> Option<DiaryEntry> {
        self.0.remove(&date)
    }

    /// Returns whether an entry exists for the exact calendar date.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.0.contains_key(&date)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the collection holds no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entry dates in ascending calendar order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.keys().copied()
    }

    /// Iterates entries in ascending date order.
    pub fn entries(&self) -> impl Iterator<Item = &DiaryEntry> {
        self.0.values()
    }

    /// Consumes the collection, yielding entries in ascending date order.
    pub fn into_entries(self) -> impl Iterator<Item = DiaryEntry> {
        self.0.into_values()
    }
}

impl FromIterator<DiaryEntry> for EntryCollection {
    fn from_iter<I: IntoIterator<Item = DiaryEntry>>(iter: I) -> Self {
        let mut collection = Self::new();
        for entry in iter {
            collection.insert(entry);
        }
        collection
    }
}

impl From<BTreeMap<NaiveDate, DiaryEntry>> for EntryCollection {
    fn from(value: BTreeMap<NaiveDate, DiaryEntry>) -> Self {
        // Re-key by entry.date so imported JSON cannot smuggle in a key
        // that disagrees with the entry it maps to.
        value.into_values().collect()
    }
}
