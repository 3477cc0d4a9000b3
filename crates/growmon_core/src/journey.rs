//! Shared 90-day journey horizon.
//!
//! # Responsibility
//! - Own the single constant defining the journey length.
//! - Provide the one completion ratio that every percent view derives from.
//!
//! # Invariants
//! - `HORIZON_DAYS` is the only place the 90-day target is written down.
//! - `completion_fraction` is monotonically non-decreasing and saturates at 1.0.

/// Fixed journey length in days. Doubles as the entry-count ceiling for
/// stage lookup: entries beyond the horizon never advance progress.
pub const HORIZON_DAYS: u32 = 90;

/// Fraction of the journey completed by `entry_count`, in `[0.0, 1.0]`.
///
/// Both the unrounded experience percent and the rounded overall-progress
/// percent are presentation wrappers over this single ratio.
pub fn completion_fraction(entry_count: u32) -> f64 {
    (f64::from(entry_count) / f64::from(HORIZON_DAYS)).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::{completion_fraction, HORIZON_DAYS};

    #[test]
    fn fraction_is_zero_at_start_and_half_at_midpoint() {
        assert_eq!(completion_fraction(0), 0.0);
        assert_eq!(completion_fraction(HORIZON_DAYS / 2), 0.5);
    }

    #[test]
    fn fraction_saturates_at_one_past_the_horizon() {
        assert_eq!(completion_fraction(HORIZON_DAYS), 1.0);
        assert_eq!(completion_fraction(HORIZON_DAYS + 45), 1.0);
        assert_eq!(completion_fraction(u32::MAX), 1.0);
    }
}
