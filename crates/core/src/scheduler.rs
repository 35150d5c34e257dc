//! Review scheduling: how far out a card goes after a rating.
//!
//! Intervals are whole days derived from the latest difficulty and the review
//! count alone; no per-card ease factor is accumulated between reviews.
//!
//! | difficulty | interval (days), `n` = review count after the rating |
//! |------------|-------------------------------------------------------|
//! | any, `n <= 1` | 1                                                  |
//! | Easy       | `min(30, floor(2.5^n))`                               |
//! | Medium     | `min(14, floor(2^n))`                                 |
//! | Hard       | `max(1, floor(n * 0.5))`                              |
//! | other      | 1                                                     |

use chrono::{DateTime, Utc};

use crate::model::Difficulty;
use crate::time::add_days;

/// Interval applied to a card's very first rating, whatever the rating was.
pub const FIRST_REVIEW_INTERVAL_DAYS: u32 = 1;
/// No rating ever schedules a card sooner than this.
pub const MIN_INTERVAL_DAYS: u32 = 1;

pub const EASY_GROWTH: f64 = 2.5;
pub const EASY_MAX_INTERVAL_DAYS: u32 = 30;
pub const MEDIUM_GROWTH: f64 = 2.0;
pub const MEDIUM_MAX_INTERVAL_DAYS: u32 = 14;

/// Number of whole days until the next review.
///
/// `review_count` is the count *including* the rating being applied, so a
/// card rated for the first time passes `1`. A count of `0` is treated the
/// same way.
///
/// ```
/// # use studydeck_core::model::Difficulty;
/// # use studydeck_core::scheduler::interval_days;
/// assert_eq!(interval_days(Difficulty::MEDIUM, 1), 1);
/// assert_eq!(interval_days(Difficulty::EASY, 3), 15);
/// assert_eq!(interval_days(Difficulty::HARD, 6), 3);
/// ```
#[must_use]
pub fn interval_days(difficulty: Difficulty, review_count: u32) -> u32 {
    if review_count <= 1 {
        return FIRST_REVIEW_INTERVAL_DAYS;
    }

    let days = match difficulty {
        Difficulty::EASY => capped_growth(EASY_GROWTH, review_count, EASY_MAX_INTERVAL_DAYS),
        Difficulty::MEDIUM => capped_growth(MEDIUM_GROWTH, review_count, MEDIUM_MAX_INTERVAL_DAYS),
        // floor(n * 0.5)
        Difficulty::HARD => review_count / 2,
        _ => MIN_INTERVAL_DAYS,
    };

    days.max(MIN_INTERVAL_DAYS)
}

/// Next eligible review instant: `now` plus [`interval_days`] whole days.
///
/// Always at least one day after `now`, except when `now` plus the interval
/// would pass the latest representable instant: the result is then that
/// instant, which can be `now` itself.
#[must_use]
pub fn compute_next_review(
    difficulty: Difficulty,
    review_count: u32,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    add_days(now, interval_days(difficulty, review_count))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn capped_growth(base: f64, exponent: u32, cap: u32) -> u32 {
    let raw = base.powi(i32::try_from(exponent).unwrap_or(i32::MAX));
    if raw >= f64::from(cap) {
        cap
    } else {
        raw.floor() as u32
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
