//! Profile use-case service.
//!
//! # Responsibility
//! - Provide profile read/write entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - The journey start date is the single anchor for D+day counting.

use crate::model::profile::UserProfile;
use crate::repo::profile_repo::{ProfileRepoResult, ProfileRepository};
use crate::statistics;
use chrono::{Local, NaiveDate};
use log::info;

/// Profile service facade over repository implementations.
pub struct ProfileService<R: ProfileRepository> {
    repo: R,
}

impl<R: ProfileRepository> ProfileService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Loads the profile, defaults when never saved.
    pub fn profile(&self) -> ProfileRepoResult<UserProfile> {
        self.repo.load_profile()
    }

    /// Saves the whole profile.
    pub fn save_profile(&self, profile: &UserProfile) -> ProfileRepoResult<()> {
        self.repo.save_profile(profile)?;

        info!(
            "event=profile_saved module=profile status=ok has_start_date={}",
            profile.start_date.is_some()
        );
        Ok(())
    }

    /// Sets or clears the journey start date.
    pub fn set_start_date(&self, start_date: Option<NaiveDate>) -> ProfileRepoResult<()> {
        self.repo.set_start_date(start_date)?;

        match start_date {
            Some(date) => info!("event=start_date_set module=profile status=ok date={date}"),
            None => info!("event=start_date_set module=profile status=ok date=none"),
        }
        Ok(())
    }

    /// Elapsed journey days for `today`, start date counted as day 1.
    pub fn days_since_start(&self, today: NaiveDate) -> ProfileRepoResult<u32> {
        let profile = self.repo.load_profile()?;
        Ok(statistics::days_since_start(profile.start_date, today))
    }

    /// [`Self::days_since_start`] anchored at the local calendar date.
    pub fn days_since_start_now(&self) -> ProfileRepoResult<u32> {
        self.days_since_start(Local::now().date_naive())
    }
}
