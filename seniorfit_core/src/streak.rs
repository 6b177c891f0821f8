//! Daily activity streak tracking.
//!
//! Transitions are keyed by calendar days since the last completed exercise:
//! none recorded, same day, consecutive day, or a gap that breaks the streak.

use crate::calendar::days_between;
use crate::User;
use chrono::NaiveDate;
use serde::Serialize;

/// Result of applying today's activity to a user's streak
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakUpdate {
    pub current: u32,
    pub longest: u32,
    pub updated: bool,
    pub broken: bool,
}

impl StreakUpdate {
    /// Snapshot of a streak that was not touched
    pub fn unchanged(user: &User) -> Self {
        Self {
            current: user.daily_streak,
            longest: user.longest_streak,
            updated: false,
            broken: false,
        }
    }
}

/// Apply a completed exercise on `today` to the user's streak
pub fn update_streak(user: &mut User, today: NaiveDate) -> StreakUpdate {
    let mut broken = false;

    match user.last_activity_date {
        None => {
            user.daily_streak = 1;
        }
        Some(last) => match days_between(last, today) {
            0 => return StreakUpdate::unchanged(user),
            1 => {
                user.daily_streak = user.daily_streak.saturating_add(1);
            }
            gap if gap > 1 => {
                broken = user.daily_streak > 0;
                user.daily_streak = 1;
                tracing::info!("Streak broken after {} days without activity", gap);
            }
            _ => {
                // Last activity lies in the future (clock skew); leave it alone
                tracing::warn!(
                    "Last activity {} is after {}, streak left unchanged",
                    last,
                    today
                );
                return StreakUpdate::unchanged(user);
            }
        },
    }

    user.longest_streak = user.longest_streak.max(user.daily_streak);
    user.last_activity_date = Some(today);

    tracing::debug!(
        "Streak now {} (longest {})",
        user.daily_streak,
        user.longest_streak
    );

    StreakUpdate {
        current: user.daily_streak,
        longest: user.longest_streak,
        updated: true,
        broken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn day(offset_days: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap() + Duration::days(offset_days)
    }

    fn user_with_streak(streak: u32, longest: u32, last: Option<NaiveDate>) -> User {
        let mut user = User::new("Test", None, 5, Utc::now());
        user.daily_streak = streak;
        user.longest_streak = longest;
        user.last_activity_date = last;
        user
    }

    #[test]
    fn test_first_activity_starts_streak() {
        let mut user = user_with_streak(0, 0, None);
        let update = update_streak(&mut user, day(0));

        assert_eq!(update.current, 1);
        assert_eq!(update.longest, 1);
        assert!(update.updated);
        assert!(!update.broken);
        assert_eq!(user.last_activity_date, Some(day(0)));
    }

    #[test]
    fn test_consecutive_day_increments() {
        let mut user = user_with_streak(3, 3, Some(day(-1)));
        let update = update_streak(&mut user, day(0));

        assert_eq!(user.daily_streak, 4);
        assert_eq!(user.longest_streak, 4);
        assert!(!update.broken);
    }

    #[test]
    fn test_gap_breaks_streak() {
        let mut user = user_with_streak(6, 9, Some(day(-5)));
        let update = update_streak(&mut user, day(0));

        assert_eq!(user.daily_streak, 1);
        assert_eq!(user.longest_streak, 9);
        assert!(update.broken);
        assert!(update.updated);
        assert_eq!(user.last_activity_date, Some(day(0)));
    }

    #[test]
    fn test_gap_from_zero_is_not_reported_broken() {
        let mut user = user_with_streak(0, 4, Some(day(-3)));
        let update = update_streak(&mut user, day(0));

        assert_eq!(user.daily_streak, 1);
        assert!(!update.broken);
    }

    #[test]
    fn test_same_day_twice_is_unchanged() {
        let mut user = user_with_streak(2, 2, Some(day(-1)));
        let first = update_streak(&mut user, day(0));
        let second = update_streak(&mut user, day(0));

        assert!(first.updated);
        assert!(!second.updated);
        assert_eq!(second.current, 3);
        assert_eq!(user.daily_streak, 3);
    }

    #[test]
    fn test_longest_streak_never_decreases() {
        let mut user = user_with_streak(0, 0, None);
        let schedule = [0, 1, 2, 3, 7, 8, 20, 21, 22, 23, 24, 30];
        let mut previous_longest = 0;

        for offset in schedule {
            update_streak(&mut user, day(offset));
            assert!(user.longest_streak >= previous_longest);
            assert!(user.longest_streak >= user.daily_streak);
            previous_longest = user.longest_streak;
        }

        assert_eq!(user.longest_streak, 5);
    }
}
