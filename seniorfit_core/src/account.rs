//! User account lifecycle: creation, status, reset and deletion.

use crate::points::{points_to_next_level, POINTS_PER_LEVEL};
use crate::store::{require_user, Store};
use crate::{Error, MonthlyStats, Result, User, WeeklyGoal};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// Create and persist a new user
pub fn create_user<S: Store + ?Sized>(
    store: &mut S,
    name: &str,
    email: Option<String>,
    weekly_target: u32,
    now: DateTime<Utc>,
) -> Result<User> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("name is required".into()));
    }
    if weekly_target == 0 {
        return Err(Error::Validation("weekly target must be at least 1".into()));
    }
    let email = email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());

    let user = User::new(name, email, weekly_target, now);
    store.save_user(&user)?;
    tracing::info!("Created user {} ({})", user.id, user.name);
    Ok(user)
}

/// Snapshot of a user's gamification state
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    pub id: Uuid,
    pub name: String,
    pub points: u32,
    pub level: u32,
    pub points_to_next_level: u32,
    /// Percent of the current level already earned
    pub level_progress: u32,
    pub daily_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    pub completed_exercises: usize,
    pub perfect_days_count: u32,
    pub weekly_goal: WeeklyGoal,
    pub monthly_stats: MonthlyStats,
    pub achievements: usize,
}

impl UserStatus {
    pub fn of(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            points: user.points,
            level: user.level,
            points_to_next_level: points_to_next_level(user.points),
            level_progress: (user.points % POINTS_PER_LEVEL) * 100 / POINTS_PER_LEVEL,
            daily_streak: user.daily_streak,
            longest_streak: user.longest_streak,
            last_activity_date: user.last_activity_date,
            completed_exercises: user.completed_exercises.len(),
            perfect_days_count: user.perfect_days_count,
            weekly_goal: user.weekly_goal.clone(),
            monthly_stats: user.monthly_stats.clone(),
            achievements: user.achievements.len(),
        }
    }
}

pub fn user_status<S: Store + ?Sized>(store: &S, user_id: Uuid) -> Result<UserStatus> {
    Ok(UserStatus::of(&require_user(store, user_id)?))
}

/// Delete a user's progress and return the account to its starting state
///
/// Identity fields and the weekly target are kept.
pub fn reset_progress<S: Store + ?Sized>(
    store: &mut S,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<User> {
    let mut user = require_user(store, user_id)?;
    let removed = store.delete_progress(user_id)?;

    user.points = 0;
    user.level = 1;
    user.daily_streak = 0;
    user.longest_streak = 0;
    user.last_activity_date = None;
    user.perfect_days_count = 0;
    user.last_perfect_day_date = None;
    user.completed_exercises = BTreeSet::new();
    user.exercise_frequency = BTreeMap::new();
    user.weekly_goal = WeeklyGoal::new(user.weekly_goal.exercises_target, now);
    user.monthly_stats = MonthlyStats::new(now);
    user.achievements.clear();

    store.save_user(&user)?;
    tracing::info!("Reset user {} ({} progress records removed)", user_id, removed);
    Ok(user)
}

/// Delete a user together with all of their progress
///
/// Returns the number of progress records removed.
pub fn delete_user<S: Store + ?Sized>(store: &mut S, user_id: Uuid) -> Result<usize> {
    require_user(store, user_id)?;
    let removed = store.delete_progress(user_id)?;
    store.delete_user(user_id)?;
    tracing::info!("Deleted user {} and {} progress records", user_id, removed);
    Ok(removed)
}
