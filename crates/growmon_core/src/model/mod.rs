//! Domain model for the plant diary.
//!
//! # Responsibility
//! - Define the canonical data structures shared by engines, repositories
//!   and services.
//! - Keep one date-keyed entry shape for every consumer.
//!
//! # Invariants
//! - Entries are identified by calendar date, never by synthetic ids.
//! - Deleting an entry is a hard delete of that day's record.

pub mod entry;
pub mod profile;
