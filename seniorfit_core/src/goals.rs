//! Weekly goal and monthly statistics tracking.

use crate::calendar::local_time;
use crate::{MonthlyStats, WeeklyGoal};
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;

/// Length of a weekly goal window
pub const WEEK_LENGTH_DAYS: i64 = 7;

/// Weekly goal snapshot returned to callers
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyGoalStatus {
    pub target: u32,
    pub current: u32,
    pub met: bool,
    pub reset: bool,
}

impl WeeklyGoalStatus {
    pub fn of(goal: &WeeklyGoal, reset: bool) -> Self {
        Self {
            target: goal.exercises_target,
            current: goal.current_progress,
            met: goal.is_met(),
            reset,
        }
    }
}

/// Count one completed exercise towards the weekly goal
///
/// Once more than seven days have passed since the window started, a new
/// window begins at `now` and the triggering exercise is its first.
/// Returns whether the window was reset.
pub fn advance_weekly_goal(goal: &mut WeeklyGoal, now: DateTime<Utc>) -> bool {
    if now - goal.week_start_date > Duration::days(WEEK_LENGTH_DAYS) {
        tracing::info!(
            "Weekly goal window expired (started {}), starting a new week",
            goal.week_start_date
        );
        goal.current_progress = 1;
        goal.week_start_date = now;
        true
    } else {
        goal.current_progress = goal.current_progress.saturating_add(1);
        false
    }
}

/// Add a completion and its points to the current month's counters
pub fn record_monthly(stats: &mut MonthlyStats, points: u32, now: DateTime<Utc>) {
    let local = local_time(now);
    if stats.month != local.month() || stats.year != local.year() {
        tracing::debug!(
            "New month {}/{}, resetting monthly stats",
            local.month(),
            local.year()
        );
        *stats = MonthlyStats::new(now);
    }

    stats.exercises_completed = stats.exercises_completed.saturating_add(1);
    stats.points_earned = stats.points_earned.saturating_add(points);
}
