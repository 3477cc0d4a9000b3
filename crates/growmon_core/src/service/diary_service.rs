//! Diary use-case service.
//!
//! # Responsibility
//! - Orchestrate entry writes and wrap each one in the evolution check.
//! - Expose dashboard read models: progress snapshot, statistics, timeline,
//!   stage milestones.
//!
//! # Invariants
//! - Every save runs `check_evolution` exactly once, comparing the entry
//!   count before and after the write.
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Observation text never appears in log output.

use crate::evolution::{self, EvolutionReport, EvolutionStage, NextStageInfo, STAGE_COUNT};
use crate::model::entry::{DiaryEntry, EntryCollection, EntryContent, PhotoRef};
use crate::repo::entry_repo::{EntryRepository, RepoError, RepoResult};
use crate::statistics::{self, DiaryStatistics};
use chrono::{Local, NaiveDate};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for diary use-cases.
#[derive(Debug)]
pub enum DiaryServiceError {
    /// Target entry does not exist.
    EntryNotFound(NaiveDate),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for DiaryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntryNotFound(date) => write!(f, "diary entry not found: {date}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent diary state: {details}"),
        }
    }
}

impl Error for DiaryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DiaryServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(date) => Self::EntryNotFound(date),
            other => Self::Repo(other),
        }
    }
}

/// Input for saving one day's entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    /// Calendar date the entry belongs to.
    pub date: NaiveDate,
    /// Opaque photo reference.
    pub photo: PhotoRef,
    /// Observation text.
    pub observation: String,
    /// Weather noted by the author.
    pub weather: Option<String>,
    /// Temperature noted by the author.
    pub temperature: Option<String>,
}

/// Result of one entry save, including the stage comparison it triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// The entry as persisted, read back after the write.
    pub entry: DiaryEntry,
    /// Stage comparison between pre-write and post-write counts.
    pub evolution: EvolutionReport,
}

/// Dashboard read model: where the plant stands right now.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Total stored entries.
    pub entry_count: u32,
    /// Stage selected by the current count.
    pub stage: &'static EvolutionStage,
    /// Experience progress in `[0.0, 100.0]`, unrounded.
    pub experience_percent: f64,
    /// Distance to the next stage.
    pub next_stage: NextStageInfo,
    /// Elapsed journey days, start date counted as day 1. Zero before the
    /// journey has started.
    pub days_since_start: u32,
}

/// Diary service facade over repository implementations.
pub struct DiaryService<R: EntryRepository> {
    repo: R,
}

impl<R: EntryRepository> DiaryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Saves one day's entry and reports any stage transition it caused.
    ///
    /// # Contract
    /// - Upsert semantics: a second save on the same date replaces the
    ///   record without changing the count.
    /// - The evolution check compares entry counts before and after the
    ///   write, so an overwrite never reports a transition.
    pub fn save_entry(&self, draft: EntryDraft) -> Result<SaveOutcome, DiaryServiceError> {
        let previous_count = self.repo.entry_count()?;

        let entry = DiaryEntry::new(
            draft.date,
            draft.photo,
            EntryContent {
                observation: draft.observation,
                weather: draft.weather,
                temperature: draft.temperature,
            },
        );
        self.repo.save_entry(&entry)?;

        let new_count = self.repo.entry_count()?;
        let evolution = evolution::check_evolution(previous_count, new_count);

        let entry =
            self.repo
                .get_entry(draft.date)?
                .ok_or(DiaryServiceError::InconsistentState(
                    "saved entry not found in read-back",
                ))?;

        info!(
            "event=entry_saved module=diary status=ok date={} entry_count={new_count} evolved={}",
            entry.date, evolution.evolved
        );

        Ok(SaveOutcome { entry, evolution })
    }

    /// Deletes the entry for `date`.
    ///
    /// Lowering the count never reports a downward stage event; the next
    /// snapshot simply shows the lower stage.
    pub fn delete_entry(&self, date: NaiveDate) -> Result<(), DiaryServiceError> {
        self.repo.delete_entry(date)?;
        let remaining = self.repo.entry_count()?;

        info!("event=entry_deleted module=diary status=ok date={date} entry_count={remaining}");
        Ok(())
    }

    /// Gets one entry by calendar date.
    pub fn get_entry(&self, date: NaiveDate) -> RepoResult<Option<DiaryEntry>> {
        self.repo.get_entry(date)
    }

    /// Loads the full date-keyed entry snapshot.
    pub fn entries(&self) -> RepoResult<EntryCollection> {
        self.repo.list_entries()
    }

    /// Counts stored entries.
    pub fn entry_count(&self) -> RepoResult<u32> {
        self.repo.entry_count()
    }

    /// Lists entries of one calendar month, date ascending.
    pub fn entries_for_month(&self, year: i32, month: u32) -> RepoResult<Vec<DiaryEntry>> {
        self.repo.entries_for_month(year, month)
    }

    /// Lists entries newest-first for the timeline view.
    pub fn timeline(&self, limit: Option<u32>) -> RepoResult<Vec<DiaryEntry>> {
        self.repo.list_recent_first(limit)
    }

    /// Builds the dashboard read model for `today`.
    pub fn progress_snapshot(
        &self,
        start_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> RepoResult<ProgressSnapshot> {
        let entry_count = self.repo.entry_count()?;
        Ok(ProgressSnapshot {
            entry_count,
            stage: evolution::stage_for_count(entry_count),
            experience_percent: evolution::experience_percent(entry_count),
            next_stage: evolution::next_stage_info(entry_count),
            days_since_start: statistics::days_since_start(start_date, today),
        })
    }

    /// [`Self::progress_snapshot`] anchored at the local calendar date.
    pub fn progress_snapshot_now(
        &self,
        start_date: Option<NaiveDate>,
    ) -> RepoResult<ProgressSnapshot> {
        self.progress_snapshot(start_date, Local::now().date_naive())
    }

    /// Computes the full statistics panel for `today`.
    pub fn statistics(
        &self,
        start_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> RepoResult<DiaryStatistics> {
        let entries = self.repo.list_entries()?;
        Ok(DiaryStatistics::collect(&entries, start_date, today))
    }

    /// [`Self::statistics`] anchored at the local calendar date.
    pub fn statistics_now(&self, start_date: Option<NaiveDate>) -> RepoResult<DiaryStatistics> {
        self.statistics(start_date, Local::now().date_naive())
    }

    /// Returns the calendar date each stage was reached, by stage level.
    pub fn stage_milestones(&self) -> RepoResult<[Option<NaiveDate>; STAGE_COUNT]> {
        let entries = self.repo.list_entries()?;
        Ok(evolution::stage_milestones(&entries))
    }
}
