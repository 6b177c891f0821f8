//! Achievement rules and their evaluation.
//!
//! Rules are static catalog data. Each carries one `Requirement` variant,
//! matched exhaustively by the evaluator; new kinds of rules are added as
//! new variants.

use crate::history;
use crate::store::Store;
use crate::{Catalog, MuscleGroup, Rarity, Result, UnlockedAchievement, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Trailing window for the muscle-group rules
pub const MUSCLE_GROUP_WINDOW_DAYS: i64 = 30;
/// Calendar days that must all be active for a perfect week
pub const PERFECT_WEEK_DAYS: u32 = 7;

/// Condition a user must meet to unlock an achievement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    /// At least one completed exercise
    FirstExercise,
    /// At least `value` distinct exercises completed
    ExercisesCount { value: u32 },
    /// Current daily streak of at least `value`
    StreakDays { value: u32 },
    /// Points total of at least `value`
    PointsTotal { value: u32 },
    /// Every group trained within the last 30 days
    MuscleGroups { groups: Vec<MuscleGroup> },
    /// An exercise on every one of the last seven calendar days
    PerfectWeek,
}

/// An achievement rule from the catalog
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AchievementDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub rarity: Rarity,
    pub requirements: Requirement,
}

impl AchievementDefinition {
    fn new(
        id: &str,
        title: &str,
        description: &str,
        icon: &str,
        rarity: Rarity,
        requirements: Requirement,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            icon: icon.into(),
            rarity,
            requirements,
        }
    }

    fn unlock(&self, now: DateTime<Utc>) -> UnlockedAchievement {
        UnlockedAchievement {
            achievement_id: self.id.clone(),
            unlocked_at: now,
            title: self.title.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            rarity: self.rarity,
        }
    }
}

/// Built-in achievement rules
pub fn default_achievements() -> Vec<AchievementDefinition> {
    use MuscleGroup::*;
    use Requirement::*;

    vec![
        AchievementDefinition::new(
            "first_exercise",
            "Erster Schritt",
            "Die erste Übung abgeschlossen",
            "🌱",
            Rarity::Common,
            FirstExercise,
        ),
        AchievementDefinition::new(
            "exercises_5",
            "Fleißig",
            "5 verschiedene Übungen abgeschlossen",
            "💪",
            Rarity::Common,
            ExercisesCount { value: 5 },
        ),
        AchievementDefinition::new(
            "exercises_10",
            "Vielseitig",
            "10 verschiedene Übungen abgeschlossen",
            "🎯",
            Rarity::Rare,
            ExercisesCount { value: 10 },
        ),
        AchievementDefinition::new(
            "streak_3",
            "Dranbleiben",
            "3 Tage in Folge aktiv",
            "🔥",
            Rarity::Common,
            StreakDays { value: 3 },
        ),
        AchievementDefinition::new(
            "streak_7",
            "Eine ganze Woche",
            "7 Tage in Folge aktiv",
            "📅",
            Rarity::Rare,
            StreakDays { value: 7 },
        ),
        AchievementDefinition::new(
            "streak_30",
            "Gewohnheit",
            "30 Tage in Folge aktiv",
            "🏆",
            Rarity::Epic,
            StreakDays { value: 30 },
        ),
        AchievementDefinition::new(
            "points_100",
            "Punktesammler",
            "100 Punkte erreicht",
            "⭐",
            Rarity::Common,
            PointsTotal { value: 100 },
        ),
        AchievementDefinition::new(
            "points_500",
            "Punkteprofi",
            "500 Punkte erreicht",
            "🌟",
            Rarity::Rare,
            PointsTotal { value: 500 },
        ),
        AchievementDefinition::new(
            "points_1000",
            "Punktemeister",
            "1000 Punkte erreicht",
            "👑",
            Rarity::Epic,
            PointsTotal { value: 1000 },
        ),
        AchievementDefinition::new(
            "upper_body",
            "Starker Oberkörper",
            "Schulter, Brust, Nacken und Rücken in 30 Tagen trainiert",
            "🧘",
            Rarity::Rare,
            MuscleGroups {
                groups: vec![Schulter, Brust, Nacken, Ruecken],
            },
        ),
        AchievementDefinition::new(
            "all_muscle_groups",
            "Rundum fit",
            "Alle sechs Muskelgruppen in 30 Tagen trainiert",
            "🤸",
            Rarity::Epic,
            MuscleGroups {
                groups: vec![Bauch, Po, Schulter, Brust, Nacken, Ruecken],
            },
        ),
        AchievementDefinition::new(
            "perfect_week",
            "Perfekte Woche",
            "An sieben Tagen hintereinander trainiert",
            "💎",
            Rarity::Legendary,
            PerfectWeek,
        ),
    ]
}

/// A held achievement, flagged if it was unlocked by this evaluation
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementStatus {
    #[serde(flatten)]
    pub achievement: UnlockedAchievement,
    pub newly_unlocked: bool,
}

/// History facts loaded only when a pending rule needs them
struct HistoryFacts<'a, S: Store + ?Sized> {
    store: &'a S,
    catalog: &'a Catalog,
    user: uuid::Uuid,
    now: DateTime<Utc>,
    recent_groups: Option<BTreeSet<MuscleGroup>>,
    week_active_days: Option<usize>,
}

impl<'a, S: Store + ?Sized> HistoryFacts<'a, S> {
    fn recent_groups(&mut self) -> Result<&BTreeSet<MuscleGroup>> {
        if self.recent_groups.is_none() {
            let records = history::completed_since(
                self.store,
                self.user,
                self.now,
                MUSCLE_GROUP_WINDOW_DAYS,
            )?;
            self.recent_groups = Some(history::muscle_groups(&records, self.catalog));
        }
        Ok(self.recent_groups.get_or_insert_with(BTreeSet::new))
    }

    fn week_active_days(&mut self) -> Result<usize> {
        if let Some(days) = self.week_active_days {
            return Ok(days);
        }
        let today = crate::calendar::local_day(self.now);
        let records =
            history::completed_in_last_days(self.store, self.user, today, PERFECT_WEEK_DAYS)?;
        let days = history::active_days(&records).len();
        self.week_active_days = Some(days);
        Ok(days)
    }
}

fn requirement_met<S: Store + ?Sized>(
    requirement: &Requirement,
    user: &User,
    facts: &mut HistoryFacts<'_, S>,
) -> Result<bool> {
    let met = match requirement {
        Requirement::FirstExercise => !user.completed_exercises.is_empty(),
        Requirement::ExercisesCount { value } => {
            user.completed_exercises.len() >= *value as usize
        }
        Requirement::StreakDays { value } => user.daily_streak >= *value,
        Requirement::PointsTotal { value } => user.points >= *value,
        Requirement::MuscleGroups { groups } => {
            let trained = facts.recent_groups()?;
            groups.iter().all(|g| trained.contains(g))
        }
        Requirement::PerfectWeek => facts.week_active_days()? >= PERFECT_WEEK_DAYS as usize,
    };
    Ok(met)
}

/// Unlock every rule the user now satisfies and does not hold yet
///
/// New unlocks are appended to the user and persisted with a single save.
/// Returns all achievements the user holds afterwards.
pub fn evaluate_achievements<S: Store + ?Sized>(
    store: &mut S,
    catalog: &Catalog,
    user: &mut User,
    now: DateTime<Utc>,
) -> Result<Vec<AchievementStatus>> {
    let mut unlocked: Vec<UnlockedAchievement> = Vec::new();
    {
        let mut facts = HistoryFacts {
            store: &*store,
            catalog,
            user: user.id,
            now,
            recent_groups: None,
            week_active_days: None,
        };

        for rule in &catalog.achievements {
            let held = user.has_achievement(&rule.id)
                || unlocked.iter().any(|u| u.achievement_id == rule.id);
            if held {
                continue;
            }
            if requirement_met(&rule.requirements, user, &mut facts)? {
                tracing::info!("User {} unlocked achievement {}", user.id, rule.id);
                unlocked.push(rule.unlock(now));
            }
        }
    }

    let newly: BTreeSet<String> = unlocked.iter().map(|a| a.achievement_id.clone()).collect();
    if !unlocked.is_empty() {
        user.achievements.extend(unlocked);
        store.save_user(user)?;
    }

    Ok(user
        .achievements
        .iter()
        .map(|a| AchievementStatus {
            achievement: a.clone(),
            newly_unlocked: newly.contains(&a.achievement_id),
        })
        .collect())
}

/// A catalog rule and whether the user holds it
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementOverview {
    #[serde(flatten)]
    pub definition: AchievementDefinition,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// The whole catalog annotated with the user's unlock times
pub fn achievement_overview(catalog: &Catalog, user: &User) -> Vec<AchievementOverview> {
    catalog
        .achievements
        .iter()
        .map(|rule| AchievementOverview {
            definition: rule.clone(),
            unlocked_at: user
                .achievements
                .iter()
                .find(|a| a.achievement_id == rule.id)
                .map(|a| a.unlocked_at),
        })
        .collect()
}
