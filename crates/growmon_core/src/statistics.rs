//! Statistics engine: behavioral metrics over the entry collection.
//!
//! # Responsibility
//! - Derive streak, weekday-habit, trend and progress metrics from a
//!   date-keyed entry snapshot and an optional journey start date.
//!
//! # Invariants
//! - Every function is pure and total: degenerate input produces a zero,
//!   `None` or clamped value, never an error.
//! - "Today"-anchored functions take the reference date explicitly; clock
//!   access belongs to service-level wrappers.
//! - Date keys are calendar dates, not instants; no timezone math happens
//!   here.

use crate::journey;
use crate::model::entry::EntryCollection;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

/// Number of buckets in the weekly trend.
pub const WEEKLY_TREND_WEEKS: u64 = 4;

/// Number of buckets in the monthly trend.
pub const MONTHLY_TREND_MONTHS: u32 = 3;

/// One labeled count in a trend sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendBucket {
    /// Human-readable bucket label ("2 weeks ago", "Mar", ...).
    pub label: String,
    /// Entries falling inside the bucket's window.
    pub count: u32,
}

/// Counts consecutive recorded days ending at `today`.
///
/// Walks backward one calendar day at a time, stopping at the first date
/// with no entry. The streak is anchored to `today`: an unbroken run that
/// does not include today contributes zero. Bounded by the journey
/// horizon, so the result never exceeds 90.
pub fn current_streak(entries: &EntryCollection, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut check_date = today;

    for _ in 0..journey::HORIZON_DAYS {
        if !entries.contains_date(check_date) {
            break;
        }
        streak += 1;
        check_date = match check_date.pred_opt() {
            Some(previous) => previous,
            None => break,
        };
    }

    streak
}

/// Buckets every entry by the weekday its date falls on.
///
/// Index 0 is Sunday, index 6 is Saturday.
pub fn day_of_week_counts(entries: &EntryCollection) -> [u32; 7] {
    let mut counts = [0u32; 7];
    for date in entries.dates() {
        counts[date.weekday().num_days_from_sunday() as usize] += 1;
    }
    counts
}

/// Returns the weekday holding the strictly highest entry count.
///
/// Buckets are scanned Sunday-first and only a strictly greater count
/// replaces the running maximum, so ties resolve to the earliest weekday.
/// Returns `None` when no entries exist at all.
pub fn most_active_weekday(entries: &EntryCollection) -> Option<Weekday> {
    let counts = day_of_week_counts(entries);
    let mut best: Option<(usize, u32)> = None;

    for (index, &count) in counts.iter().enumerate() {
        if count > best.map_or(0, |(_, max)| max) {
            best = Some((index, count));
        }
    }

    best.map(|(index, _)| weekday_from_sunday_index(index))
}

/// Display label for a weekday.
pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Entry counts for the last four 7-day windows, oldest bucket first.
///
/// Bucket *n* covers the half-open range `[today - 7n, today - 7(n - 1))`,
/// so a date sitting exactly on a boundary belongs to the more recent
/// bucket and today's own entry is in no bucket. Always exactly four
/// buckets, zero-filled when sparse.
pub fn weekly_trend(entries: &EntryCollection, today: NaiveDate) -> Vec<TrendBucket> {
    let mut buckets = Vec::with_capacity(WEEKLY_TREND_WEEKS as usize);

    for weeks_back in (1..=WEEKLY_TREND_WEEKS).rev() {
        let window_start = today
            .checked_sub_days(Days::new(7 * weeks_back))
            .unwrap_or(NaiveDate::MIN);
        let window_end = today
            .checked_sub_days(Days::new(7 * (weeks_back - 1)))
            .unwrap_or(NaiveDate::MIN);

        let count = entries
            .dates()
            .filter(|date| *date >= window_start && *date < window_end)
            .count() as u32;

        buckets.push(TrendBucket {
            label: week_label(weeks_back),
            count,
        });
    }

    buckets
}

/// Entry counts for the last three calendar months, oldest bucket first.
///
/// The newest bucket is the month `today` falls in; counting is by
/// calendar year and month, so year boundaries are respected. Always
/// exactly three buckets, zero-filled when sparse.
pub fn monthly_trend(entries: &EntryCollection, today: NaiveDate) -> Vec<TrendBucket> {
    let mut buckets = Vec::with_capacity(MONTHLY_TREND_MONTHS as usize);

    for months_back in (0..MONTHLY_TREND_MONTHS).rev() {
        let (year, month) = shift_month(today.year(), today.month(), months_back);
        let count = entries
            .dates()
            .filter(|date| date.year() == year && date.month() == month)
            .count() as u32;

        buckets.push(TrendBucket {
            label: month_label(year, month),
            count,
        });
    }

    buckets
}

/// Returns overall progress as a rounded integer percent in `0..=100`.
///
/// Same saturation as the experience percent; the rounding is the only
/// difference between the two views.
pub fn overall_progress(entry_count: u32) -> u8 {
    (journey::completion_fraction(entry_count) * 100.0).round() as u8
}

/// Number of elapsed journey days, counting the start date as day 1.
///
/// `None` means the journey has not started and yields 0. A start date in
/// the future also clamps to 0.
pub fn days_since_start(start_date: Option<NaiveDate>, today: NaiveDate) -> u32 {
    let start = match start_date {
        Some(date) => date,
        None => return 0,
    };

    let elapsed = (today - start).num_days() + 1;
    elapsed.max(0) as u32
}

/// Average entries per elapsed calendar week, rounded to one decimal.
///
/// The denominator is elapsed weeks rounded up, never less than one: a
/// user on day 3 still divides by a full week. Returns 0.0 before the
/// journey has started.
pub fn average_weekly_entries(
    entries: &EntryCollection,
    start_date: Option<NaiveDate>,
    today: NaiveDate,
) -> f64 {
    let days = days_since_start(start_date, today);
    if days == 0 {
        return 0.0;
    }

    let weeks = days.div_ceil(7).max(1);
    let average = entries.len() as f64 / f64::from(weeks);
    (average * 10.0).round() / 10.0
}

/// Aggregate read model for the profile statistics panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiaryStatistics {
    /// Total number of entries.
    pub total_entries: u32,
    /// Consecutive recorded days ending today.
    pub current_streak: u32,
    /// Label of the most active weekday, `None` when no entries exist.
    pub most_active_day: Option<&'static str>,
    /// Rounded overall progress percent.
    pub overall_progress: u8,
    /// Elapsed journey days, start date counted as day 1.
    pub days_since_start: u32,
    /// Average entries per elapsed week, one decimal digit.
    pub average_weekly_entries: f64,
    /// Last four weeks, oldest bucket first.
    pub weekly_trend: Vec<TrendBucket>,
    /// Last three calendar months, oldest bucket first.
    pub monthly_trend: Vec<TrendBucket>,
}

impl DiaryStatistics {
    /// Computes every metric from one snapshot.
    pub fn collect(
        entries: &EntryCollection,
        start_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        Self {
            total_entries: entries.len() as u32,
            current_streak: current_streak(entries, today),
            most_active_day: most_active_weekday(entries).map(weekday_label),
            overall_progress: overall_progress(entries.len() as u32),
            days_since_start: days_since_start(start_date, today),
            average_weekly_entries: average_weekly_entries(entries, start_date, today),
            weekly_trend: weekly_trend(entries, today),
            monthly_trend: monthly_trend(entries, today),
        }
    }
}

fn weekday_from_sunday_index(index: usize) -> Weekday {
    match index {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

fn week_label(weeks_back: u64) -> String {
    if weeks_back == 1 {
        "1 week ago".to_string()
    } else {
        format!("{weeks_back} weeks ago")
    }
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|month_start| month_start.format("%b").to_string())
        .unwrap_or_default()
}

fn shift_month(year: i32, month: u32, months_back: u32) -> (i32, u32) {
    let zero_based = year * 12 + month as i32 - 1 - months_back as i32;
    (zero_based.div_euclid(12), (zero_based.rem_euclid(12) + 1) as u32)
}
