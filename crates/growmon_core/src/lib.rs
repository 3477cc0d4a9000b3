//! Core domain logic for the 90-day plant observation diary.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod evolution;
pub mod journey;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod statistics;

pub use evolution::{
    check_evolution, experience_percent, next_stage_info, stage_for_count, stage_milestones,
    EvolutionReport, EvolutionStage, NextStageInfo, STAGES, STAGE_COUNT,
};
pub use journey::HORIZON_DAYS;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{DiaryEntry, EntryCollection, EntryContent, EntryValidationError, PhotoRef};
pub use model::profile::UserProfile;
pub use repo::backup_repo::{BackupRepository, SqliteBackupRepository};
pub use repo::entry_repo::{EntryRepository, RepoError, RepoResult, SqliteEntryRepository};
pub use repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
pub use service::backup_service::{BackupDocument, BackupService, ImportOutcome};
pub use service::diary_service::{DiaryService, EntryDraft, ProgressSnapshot, SaveOutcome};
pub use service::profile_service::ProfileService;
pub use statistics::DiaryStatistics;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
