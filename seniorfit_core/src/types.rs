//! Core domain types for SeniorFit.
//!
//! This module defines the fundamental types used throughout the system:
//! - Muscle groups and exercises
//! - Progress records and session outcomes
//! - User gamification state (points, streaks, goals, achievements)
//! - The read-only catalog

use crate::achievements::AchievementDefinition;
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// Muscle group an exercise trains
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MuscleGroup {
    Bauch,
    Po,
    Schulter,
    Brust,
    Nacken,
    #[serde(rename = "Rücken")]
    Ruecken,
    Beine,
    Arme,
    #[serde(rename = "Ganzkörper")]
    Ganzkoerper,
}

impl MuscleGroup {
    pub const ALL: [MuscleGroup; 9] = [
        Self::Bauch,
        Self::Po,
        Self::Schulter,
        Self::Brust,
        Self::Nacken,
        Self::Ruecken,
        Self::Beine,
        Self::Arme,
        Self::Ganzkoerper,
    ];

    /// Name shown to users
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Bauch => "Bauch",
            Self::Po => "Po",
            Self::Schulter => "Schulter",
            Self::Brust => "Brust",
            Self::Nacken => "Nacken",
            Self::Ruecken => "Rücken",
            Self::Beine => "Beine",
            Self::Arme => "Arme",
            Self::Ganzkoerper => "Ganzkörper",
        }
    }
}

impl std::fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for MuscleGroup {
    type Err = crate::Error;

    /// Accepts the display name or its ASCII spelling, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|g| {
                g.display_name().to_lowercase() == wanted
                    || format!("{:?}", g).to_lowercase() == wanted
            })
            .ok_or_else(|| crate::Error::Validation(format!("Unknown muscle group: {}", s)))
    }
}

/// The six groups that make up a perfect day, in recommendation order
pub const PERFECT_DAY_GROUPS: [MuscleGroup; 6] = [
    MuscleGroup::Bauch,
    MuscleGroup::Po,
    MuscleGroup::Schulter,
    MuscleGroup::Brust,
    MuscleGroup::Nacken,
    MuscleGroup::Ruecken,
];

fn default_difficulty() -> u8 {
    1
}

/// An exercise from the catalog (read-only to the engine)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub muscle_group: MuscleGroup,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    pub duration_seconds: Option<u32>,
    pub video_url: Option<String>,
}

impl Exercise {
    /// Difficulty used for scoring; a missing or zero value counts as 1
    pub fn scoring_difficulty(&self) -> u32 {
        u32::from(self.difficulty.max(1))
    }

    /// Video length used for partial credit; absent or zero counts as 1 second
    pub fn scoring_duration(&self) -> u32 {
        match self.duration_seconds {
            Some(d) if d > 0 => d,
            _ => 1,
        }
    }
}

// ============================================================================
// Progress Types
// ============================================================================

/// How a watched session ended
///
/// The wire format carries two independent flags; `completed` wins when both
/// are set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    Completed,
    Partial,
    Aborted,
}

impl SessionOutcome {
    pub fn from_flags(completed: bool, aborted: bool) -> Self {
        if completed {
            SessionOutcome::Completed
        } else if aborted {
            SessionOutcome::Aborted
        } else {
            SessionOutcome::Partial
        }
    }
}

/// A recorded exercise session, immutable once created
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise_id: String,
    pub completed: bool,
    pub aborted: bool,
    pub watch_duration: f64,
    pub points_earned: u32,
    pub date: DateTime<Utc>,
    pub time_of_day: u32,
}

impl ProgressRecord {
    pub fn new(
        user_id: Uuid,
        exercise_id: &str,
        completed: bool,
        aborted: bool,
        watch_duration: f64,
        points_earned: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            exercise_id: exercise_id.to_string(),
            completed,
            aborted,
            watch_duration,
            points_earned,
            date: now,
            time_of_day: crate::calendar::local_time(now).hour(),
        }
    }

    pub fn outcome(&self) -> SessionOutcome {
        SessionOutcome::from_flags(self.completed, self.aborted)
    }

    /// Local calendar day the session was recorded on
    pub fn day(&self) -> NaiveDate {
        crate::calendar::local_day(self.date)
    }
}

// ============================================================================
// User State Types
// ============================================================================

/// Rolling weekly target of completed exercises
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyGoal {
    pub exercises_target: u32,
    pub current_progress: u32,
    pub week_start_date: DateTime<Utc>,
}

impl WeeklyGoal {
    pub fn new(exercises_target: u32, now: DateTime<Utc>) -> Self {
        Self {
            exercises_target,
            current_progress: 0,
            week_start_date: now,
        }
    }

    pub fn is_met(&self) -> bool {
        self.current_progress >= self.exercises_target
    }
}

/// Per-calendar-month counters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub exercises_completed: u32,
    pub points_earned: u32,
    pub month: u32,
    pub year: i32,
}

impl MonthlyStats {
    pub fn new(now: DateTime<Utc>) -> Self {
        let local = crate::calendar::local_time(now);
        Self {
            exercises_completed: 0,
            points_earned: 0,
            month: local.month(),
            year: local.year(),
        }
    }
}

/// Rarity of an achievement badge
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// An achievement held by a user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedAchievement {
    pub achievement_id: String,
    pub unlocked_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub rarity: Rarity,
}

fn default_level() -> u32 {
    1
}

/// A user account and its gamification state
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub points: u32,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub daily_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub last_activity_date: Option<NaiveDate>,
    #[serde(default)]
    pub perfect_days_count: u32,
    #[serde(default)]
    pub last_perfect_day_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_exercises: BTreeSet<String>,
    #[serde(default, deserialize_with = "crate::frequency::deserialize_frequency")]
    pub exercise_frequency: BTreeMap<String, u32>,
    pub weekly_goal: WeeklyGoal,
    pub monthly_stats: MonthlyStats,
    #[serde(default)]
    pub achievements: Vec<UnlockedAchievement>,
}

impl User {
    /// Create a fresh account with no progress
    pub fn new(name: &str, email: Option<String>, weekly_target: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email,
            created_at: now,
            points: 0,
            level: 1,
            daily_streak: 0,
            longest_streak: 0,
            last_activity_date: None,
            perfect_days_count: 0,
            last_perfect_day_date: None,
            completed_exercises: BTreeSet::new(),
            exercise_frequency: BTreeMap::new(),
            weekly_goal: WeeklyGoal::new(weekly_target, now),
            monthly_stats: MonthlyStats::new(now),
            achievements: Vec::new(),
        }
    }

    /// Add points and recompute the level
    pub fn add_points(&mut self, amount: u32) -> u32 {
        self.points = self.points.saturating_add(amount);
        self.level = crate::points::level_for_points(self.points);
        self.points
    }

    /// Mark an exercise completed and bump its frequency counter
    pub fn record_completion(&mut self, exercise_id: &str) {
        if !self.completed_exercises.contains(exercise_id) {
            self.completed_exercises.insert(exercise_id.to_string());
        }
        self.bump_frequency(exercise_id);
    }

    pub fn bump_frequency(&mut self, exercise_id: &str) -> u32 {
        let count = self
            .exercise_frequency
            .entry(exercise_id.to_string())
            .or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn frequency_of(&self, exercise_id: &str) -> u32 {
        self.exercise_frequency.get(exercise_id).copied().unwrap_or(0)
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a.achievement_id == id)
    }
}

// ============================================================================
// Catalog Type
// ============================================================================

/// Exercises and achievement rules known to the system
#[derive(Clone, Debug)]
pub struct Catalog {
    pub exercises: HashMap<String, Exercise>,
    pub achievements: Vec<AchievementDefinition>,
}

impl Catalog {
    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.get(id)
    }

    pub fn muscle_group_of(&self, exercise_id: &str) -> Option<MuscleGroup> {
        self.exercises.get(exercise_id).map(|e| e.muscle_group)
    }
}
