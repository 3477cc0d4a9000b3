//! Evolution engine: entry count to creature stage mapping.
//!
//! # Responsibility
//! - Map a cumulative diary-entry count to one of six life-cycle stages.
//! - Project forward-looking progress (experience percent, next-stage info).
//! - Detect forward stage transitions between two counts.
//!
//! # Invariants
//! - Stage ranges are contiguous, non-overlapping and strictly increasing.
//! - Stage 1 starts at zero entries, so lookup always resolves to a stage.
//! - Counts are clamped to the journey horizon before lookup; the catalog is
//!   process-wide constant data and is never mutated.
//! - Only forward transitions are reported. Deleting entries lowers what
//!   `stage_for_count` returns, but no downward event exists.

use crate::journey;
use crate::model::entry::EntryCollection;
use chrono::NaiveDate;
use serde::Serialize;

/// Number of stages in the catalog. Stage levels run `1..=STAGE_COUNT`.
pub const STAGE_COUNT: usize = 6;

const MAX_LEVEL: u8 = STAGE_COUNT as u8;

/// One immutable record of the stage catalog.
///
/// `min_entries..=max_entries` is the count range that selects this stage,
/// with the final stage's upper bound enforced by horizon clamping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvolutionStage {
    /// Ordinal level, `1..=6`, strictly increasing through the catalog.
    pub level: u8,
    /// Display name of the stage.
    pub name: &'static str,
    /// Smallest entry count that selects this stage.
    pub min_entries: u32,
    /// Largest entry count inside this stage's range.
    pub max_entries: u32,
    /// Symbolic icon shown next to the creature.
    pub emoji: &'static str,
    /// Short encouragement line for the stage card.
    pub message: &'static str,
    /// Theme color as a hex string.
    pub color: &'static str,
}

/// Ordered stage catalog, lowest level first.
pub const STAGES: &[EvolutionStage] = &[
    EvolutionStage {
        level: 1,
        name: "Egg",
        min_entries: 0,
        max_entries: 0,
        emoji: "\u{1F95A}",
        message: "The journey begins! Write your first diary entry.",
        color: "#E0E0E0",
    },
    EvolutionStage {
        level: 2,
        name: "Sprout",
        min_entries: 1,
        max_entries: 15,
        emoji: "\u{1F331}",
        message: "A tiny sprout has appeared! Keep observing.",
        color: "#A5D6A7",
    },
    EvolutionStage {
        level: 3,
        name: "Stem & Leaves",
        min_entries: 16,
        max_entries: 35,
        emoji: "\u{1F33F}",
        message: "Sturdy stems and leaves are growing!",
        color: "#66BB6A",
    },
    EvolutionStage {
        level: 4,
        name: "Flower",
        min_entries: 36,
        max_entries: 60,
        emoji: "\u{1F338}",
        message: "A beautiful flower has bloomed! Already past the halfway mark.",
        color: "#F48FB1",
    },
    EvolutionStage {
        level: 5,
        name: "Fruit",
        min_entries: 61,
        max_entries: 85,
        emoji: "\u{1F34E}",
        message: "Plump fruit has ripened! Almost there.",
        color: "#EF5350",
    },
    EvolutionStage {
        level: 6,
        name: "Fairy",
        min_entries: 86,
        max_entries: 90,
        emoji: "\u{1F9DA}",
        message: "Congratulations, final evolution complete! You are a true plant master!",
        color: "#AB47BC",
    },
];

/// Forward-looking projection toward the next stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NextStageInfo {
    /// `true` only once the final stage is reached at the full horizon.
    pub is_max_level: bool,
    /// Entries still needed to reach `next_stage`. Zero when there is none.
    pub remaining: u32,
    /// The stage one level above the current one, when it exists.
    pub next_stage: Option<&'static EvolutionStage>,
}

/// Outcome of comparing the stage before and after a count change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvolutionReport {
    /// `true` when `new_stage` is a strictly higher level than `previous_stage`.
    pub evolved: bool,
    /// Stage selected by the count before the change.
    pub previous_stage: &'static EvolutionStage,
    /// Stage selected by the count after the change.
    pub new_stage: &'static EvolutionStage,
}

/// Returns the stage selected by `entry_count`.
///
/// The count is clamped to the journey horizon first, then the catalog is
/// scanned from the highest level down for the first stage whose
/// `min_entries` fits. Stage 1 is the structural fallback, so every
/// non-negative count resolves to exactly one stage.
pub fn stage_for_count(entry_count: u32) -> &'static EvolutionStage {
    let clamped = entry_count.min(journey::HORIZON_DAYS);
    STAGES
        .iter()
        .rev()
        .find(|stage| clamped >= stage.min_entries)
        .unwrap_or(&STAGES[0])
}

/// Returns experience progress in `[0.0, 100.0]`, unrounded.
///
/// Saturates at 100 once the count reaches the horizon.
pub fn experience_percent(entry_count: u32) -> f64 {
    journey::completion_fraction(entry_count) * 100.0
}

/// Projects distance to the next stage for `entry_count`.
///
/// # Contract
/// - Terminal state (`is_max_level = true`) requires both the final stage
///   and a count at or past the horizon.
/// - Inside the final stage but below the horizon there is no next stage:
///   `remaining = 0`, `next_stage = None`, `is_max_level = false`.
pub fn next_stage_info(entry_count: u32) -> NextStageInfo {
    let current = stage_for_count(entry_count);

    if current.level == MAX_LEVEL && entry_count >= journey::HORIZON_DAYS {
        return NextStageInfo {
            is_max_level: true,
            remaining: 0,
            next_stage: None,
        };
    }

    let next = STAGES.iter().find(|stage| stage.level == current.level + 1);
    NextStageInfo {
        is_max_level: false,
        remaining: next.map_or(0, |stage| stage.min_entries.saturating_sub(entry_count)),
        next_stage: next,
    }
}

/// Compares the stages selected by two counts and reports a forward
/// transition.
///
/// # Contract
/// - Callers invoke this exactly once per write, with the count before and
///   after the write.
/// - A jump across several stage boundaries in one write (bulk restore)
///   yields a single report naming only the landed stage; intermediate
///   stages are not enumerated.
pub fn check_evolution(previous_count: u32, new_count: u32) -> EvolutionReport {
    let previous_stage = stage_for_count(previous_count);
    let new_stage = stage_for_count(new_count);

    EvolutionReport {
        evolved: new_stage.level > previous_stage.level,
        previous_stage,
        new_stage,
    }
}

/// Returns the calendar date on which each stage was reached.
///
/// Index `i` holds the milestone for stage level `i + 1`: the date of the
/// `min_entries`-th entry in ascending date order, or `None` while that
/// stage is still locked. Stages 1 and 2 both unlock with the first entry.
pub fn stage_milestones(entries: &EntryCollection) -> [Option<NaiveDate>; STAGE_COUNT] {
    let dates: Vec<NaiveDate> = entries.dates().collect();
    let mut milestones = [None; STAGE_COUNT];

    for (slot, stage) in STAGES.iter().enumerate() {
        let threshold = stage.min_entries.max(1) as usize;
        if dates.len() >= threshold {
            milestones[slot] = Some(dates[threshold - 1]);
        }
    }

    milestones
}
