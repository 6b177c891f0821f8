//! Perfect-day bonus: every tracked muscle group trained on one calendar day.

use crate::{MuscleGroup, User, PERFECT_DAY_GROUPS};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

pub const PERFECT_DAY_BONUS: u32 = 50;

/// Perfect-day result returned to callers
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfectDayStatus {
    pub awarded: bool,
    pub bonus_points: u32,
    pub trained_groups: Vec<MuscleGroup>,
    pub missing_groups: Vec<MuscleGroup>,
    pub perfect_days_count: u32,
}

/// Groups from the perfect-day list not present in `trained`
pub fn missing_groups(trained: &BTreeSet<MuscleGroup>) -> Vec<MuscleGroup> {
    PERFECT_DAY_GROUPS
        .iter()
        .filter(|g| !trained.contains(g))
        .copied()
        .collect()
}

/// Award the bonus if today's trained groups cover the perfect-day list
///
/// The bonus is added to the user's points. A user gets at most one award
/// per calendar day.
pub fn award_if_earned(
    user: &mut User,
    trained_today: &BTreeSet<MuscleGroup>,
    today: NaiveDate,
) -> PerfectDayStatus {
    let missing = missing_groups(trained_today);
    let already_awarded = user.last_perfect_day_date == Some(today);
    let awarded = missing.is_empty() && !already_awarded;

    if awarded {
        user.add_points(PERFECT_DAY_BONUS);
        user.perfect_days_count = user.perfect_days_count.saturating_add(1);
        user.last_perfect_day_date = Some(today);
        tracing::info!(
            "Perfect day for user {} ({} total)",
            user.id,
            user.perfect_days_count
        );
    }

    PerfectDayStatus {
        awarded,
        bonus_points: if awarded { PERFECT_DAY_BONUS } else { 0 },
        trained_groups: trained_today.iter().copied().collect(),
        missing_groups: missing,
        perfect_days_count: user.perfect_days_count,
    }
}
