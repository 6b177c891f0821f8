//! Progress submission engine.
//!
//! One submission runs as a single sequential unit of work:
//! 1. Validate the request and resolve the exercise
//! 2. Score the session against today's earlier completions
//! 3. Record the progress and update points, level, streak and goals
//! 4. Check the perfect-day bonus
//! 5. Save the user and evaluate achievements

use crate::achievements::{evaluate_achievements, AchievementStatus};
use crate::calendar::local_day;
use crate::feedback::{motivational_quote, streak_message};
use crate::goals::{advance_weekly_goal, record_monthly, WeeklyGoalStatus};
use crate::perfect_day::{award_if_earned, PerfectDayStatus};
use crate::points::{points_for, ScoringInput};
use crate::store::{require_user, Store};
use crate::streak::{update_streak, StreakUpdate};
use crate::{history, Catalog, Error, ProgressRecord, Result, SessionOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A submitted exercise session, as received from the calling layer
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProgress {
    #[serde(default)]
    pub exercise_id: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub aborted: bool,
    #[serde(default)]
    pub watch_duration: f64,
}

/// Streak state plus the message shown to the user
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakInfo {
    #[serde(flatten)]
    pub update: StreakUpdate,
    pub message: String,
}

/// Everything the gamification layer reports for one submission
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gamification {
    pub achievements: Vec<AchievementStatus>,
    pub streak_info: StreakInfo,
    pub weekly_goal: WeeklyGoalStatus,
    pub perfect_day: PerfectDayStatus,
    pub motivational_quote: String,
    pub total_points: u32,
    pub level: u32,
}

/// Result of a progress submission
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub progress: ProgressRecord,
    /// Session points plus any perfect-day bonus
    pub points_earned: u32,
    pub gamification: Gamification,
}

impl SubmitOutcome {
    pub fn newly_unlocked(&self) -> impl Iterator<Item = &AchievementStatus> {
        self.gamification
            .achievements
            .iter()
            .filter(|a| a.newly_unlocked)
    }
}

/// Record a session for `user_id` and apply all gamification rules
pub fn submit_progress<S: Store + ?Sized>(
    store: &mut S,
    catalog: &Catalog,
    user_id: Uuid,
    request: &SubmitProgress,
    now: DateTime<Utc>,
) -> Result<SubmitOutcome> {
    let exercise_id = request
        .exercise_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::Validation("exerciseId is required".into()))?;
    let exercise = catalog
        .exercise(exercise_id)
        .ok_or_else(|| Error::ExerciseNotFound(exercise_id.to_string()))?;
    let mut user = require_user(store, user_id)?;

    let today = local_day(now);
    let outcome = SessionOutcome::from_flags(request.completed, request.aborted);

    // Prior completions only; the new record is stored afterwards
    let earlier_today = history::completed_on_day(store, user_id, today)?;
    let same_group = history::count_muscle_group(&earlier_today, catalog, exercise.muscle_group);

    let session_points = points_for(&ScoringInput::new(
        outcome,
        request.watch_duration,
        exercise,
        same_group,
    ));

    let progress = ProgressRecord::new(
        user_id,
        &exercise.id,
        request.completed,
        request.aborted,
        request.watch_duration,
        session_points,
        now,
    );
    store.create_progress(&progress)?;

    tracing::info!(
        "User {} {:?} {} for {} points",
        user_id,
        outcome,
        exercise.id,
        session_points
    );

    let mut points_earned = session_points;
    user.add_points(session_points);

    let mut streak = StreakUpdate::unchanged(&user);
    let mut week_reset = false;
    let mut perfect_day = None;

    if outcome == SessionOutcome::Completed {
        user.record_completion(&exercise.id);
        week_reset = advance_weekly_goal(&mut user.weekly_goal, now);

        if session_points > 0 {
            streak = update_streak(&mut user, today);
        }

        let completed_today = history::completed_on_day(store, user_id, today)?;
        let trained = history::muscle_groups(&completed_today, catalog);
        let status = award_if_earned(&mut user, &trained, today);
        points_earned += status.bonus_points;
        perfect_day = Some(status);

        record_monthly(&mut user.monthly_stats, points_earned, now);
    }

    let perfect_day = match perfect_day {
        Some(status) => status,
        None => {
            let completed_today = history::completed_on_day(store, user_id, today)?;
            let trained = history::muscle_groups(&completed_today, catalog);
            PerfectDayStatus {
                awarded: false,
                bonus_points: 0,
                trained_groups: trained.iter().copied().collect(),
                missing_groups: crate::perfect_day::missing_groups(&trained),
                perfect_days_count: user.perfect_days_count,
            }
        }
    };

    store.save_user(&user)?;

    let achievements = evaluate_achievements(store, catalog, &mut user, now)?;

    Ok(SubmitOutcome {
        progress,
        points_earned,
        gamification: Gamification {
            achievements,
            streak_info: StreakInfo {
                message: streak_message(&streak),
                update: streak,
            },
            weekly_goal: WeeklyGoalStatus::of(&user.weekly_goal, week_reset),
            perfect_day,
            motivational_quote: motivational_quote(today).to_string(),
            total_points: user.points,
            level: user.level,
        },
    })
}
