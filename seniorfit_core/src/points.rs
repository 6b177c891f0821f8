//! Points and level calculation.
//!
//! Scoring rules per session outcome:
//! - Completed: 10 base + 5 per difficulty step above 1 + same-day muscle
//!   group bonus (+5 for the second exercise of a group, +3 from the third on)
//! - Partially watched: up to 10 points, proportional to the watched share
//! - Aborted: nothing

use crate::{Exercise, SessionOutcome};

pub const BASE_POINTS: u32 = 10;
pub const POINTS_PER_DIFFICULTY_STEP: u32 = 5;
pub const SECOND_IN_GROUP_BONUS: u32 = 5;
pub const FURTHER_IN_GROUP_BONUS: u32 = 3;
pub const MAX_PARTIAL_POINTS: u32 = 10;
pub const POINTS_PER_LEVEL: u32 = 100;

/// Everything the calculator needs about one submission
#[derive(Clone, Copy, Debug)]
pub struct ScoringInput {
    pub outcome: SessionOutcome,
    pub watch_duration: f64,
    pub difficulty: u32,
    pub duration_seconds: u32,
    /// Completions of the same muscle group earlier today, excluding this one
    pub same_muscle_group_count: usize,
}

impl ScoringInput {
    pub fn new(
        outcome: SessionOutcome,
        watch_duration: f64,
        exercise: &Exercise,
        same_muscle_group_count: usize,
    ) -> Self {
        Self {
            outcome,
            watch_duration,
            difficulty: exercise.scoring_difficulty(),
            duration_seconds: exercise.scoring_duration(),
            same_muscle_group_count,
        }
    }
}

/// Points earned for a single session
pub fn points_for(input: &ScoringInput) -> u32 {
    match input.outcome {
        SessionOutcome::Completed => {
            let difficulty_bonus =
                input.difficulty.max(1).saturating_sub(1) * POINTS_PER_DIFFICULTY_STEP;
            BASE_POINTS + difficulty_bonus + muscle_group_bonus(input.same_muscle_group_count)
        }
        SessionOutcome::Partial => partial_points(input.watch_duration, input.duration_seconds),
        SessionOutcome::Aborted => 0,
    }
}

/// Bonus for repeating a muscle group on the same day
pub fn muscle_group_bonus(same_muscle_group_count: usize) -> u32 {
    match same_muscle_group_count {
        0 => 0,
        1 => SECOND_IN_GROUP_BONUS,
        _ => FURTHER_IN_GROUP_BONUS,
    }
}

/// Partial credit: floor(min(100, watched%) / 100 * 10)
pub fn partial_points(watch_duration: f64, duration_seconds: u32) -> u32 {
    let watched = if watch_duration.is_finite() && watch_duration > 0.0 {
        watch_duration
    } else {
        0.0
    };
    let duration = f64::from(duration_seconds.max(1));

    let percent = (watched / duration * 100.0).min(100.0);
    (percent / 100.0 * f64::from(MAX_PARTIAL_POINTS)).floor() as u32
}

/// Level for a points total: floor(points / 100) + 1
pub fn level_for_points(points: u32) -> u32 {
    points / POINTS_PER_LEVEL + 1
}

/// Points still missing until the next level
pub fn points_to_next_level(points: u32) -> u32 {
    level_for_points(points) * POINTS_PER_LEVEL - points
}
