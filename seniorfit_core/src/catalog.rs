//! Default catalog of exercises and achievement rules.
//!
//! This module provides the built-in exercises and achievements for the
//! system, plus merging of config-supplied entries.

use crate::achievements::{default_achievements, Requirement};
use crate::config::Config;
use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Default catalog extended with the exercises and achievements from `config`
///
/// Custom exercises replace built-in ones with the same id; custom
/// achievements are appended.
pub fn catalog_with_config(config: &Config) -> Catalog {
    let mut catalog = get_default_catalog().clone();

    for exercise in &config.exercises.custom {
        if catalog.exercises.contains_key(&exercise.id) {
            tracing::info!("Custom exercise {} replaces built-in entry", exercise.id);
        }
        catalog.exercises.insert(exercise.id.clone(), exercise.clone());
    }
    catalog
        .achievements
        .extend(config.achievements.custom.iter().cloned());

    catalog
}

fn exercise(
    id: &str,
    title: &str,
    description: &str,
    muscle_group: MuscleGroup,
    difficulty: u8,
    duration_seconds: u32,
) -> Exercise {
    Exercise {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        muscle_group,
        difficulty,
        duration_seconds: Some(duration_seconds),
        video_url: None,
    }
}

/// Builds the default catalog with built-in exercises and achievements
pub fn build_default_catalog() -> Catalog {
    use MuscleGroup::*;

    let exercises = vec![
        // Bauch
        exercise(
            "bauch_atmung",
            "Bauchatmung im Sitzen",
            "Tief in den Bauch atmen und die Bauchdecke sanft anspannen",
            Bauch,
            1,
            180,
        ),
        exercise(
            "bauch_knie_heben",
            "Knieheben im Sitzen",
            "Abwechselnd die Knie zur Brust ziehen",
            Bauch,
            3,
            240,
        ),
        // Po
        exercise(
            "po_heben",
            "Gesäß anspannen",
            "Im Sitzen das Gesäß anspannen und halten",
            Po,
            2,
            180,
        ),
        exercise(
            "po_bruecke",
            "Beckenheben",
            "In Rückenlage das Becken langsam anheben",
            Po,
            3,
            300,
        ),
        // Schulter
        exercise(
            "schulter_kreisen",
            "Schulterkreisen",
            "Die Schultern langsam vor und zurück kreisen",
            Schulter,
            1,
            120,
        ),
        exercise(
            "schulter_heben",
            "Arme seitlich heben",
            "Die Arme bis Schulterhöhe anheben",
            Schulter,
            2,
            180,
        ),
        // Brust
        exercise(
            "brust_oeffnen",
            "Brustöffner",
            "Die Arme nach hinten führen und die Brust weiten",
            Brust,
            1,
            150,
        ),
        exercise(
            "brust_wandliegestuetz",
            "Liegestütz an der Wand",
            "Mit den Händen an der Wand die Arme beugen und strecken",
            Brust,
            3,
            240,
        ),
        // Nacken
        exercise(
            "nacken_rollen",
            "Kopf drehen",
            "Den Kopf langsam von Seite zu Seite drehen",
            Nacken,
            1,
            120,
        ),
        exercise(
            "nacken_dehnen",
            "Nackendehnung",
            "Das Ohr sanft Richtung Schulter neigen",
            Nacken,
            1,
            150,
        ),
        // Rücken
        exercise(
            "ruecken_katzenbuckel",
            "Katzenbuckel im Sitzen",
            "Den Rücken abwechselnd rund machen und strecken",
            Ruecken,
            2,
            180,
        ),
        exercise(
            "ruecken_strecken",
            "Rückenstrecker",
            "Im Stehen die Arme nach oben strecken",
            Ruecken,
            3,
            240,
        ),
        // Weitere
        exercise(
            "beine_fersenheben",
            "Fersenheben",
            "Am Stuhl festhalten und auf die Zehenspitzen gehen",
            Beine,
            2,
            180,
        ),
        exercise(
            "arme_kreisen",
            "Armkreisen",
            "Mit ausgestreckten Armen kleine Kreise ziehen",
            Arme,
            1,
            120,
        ),
        exercise(
            "ganzkoerper_marsch",
            "Marschieren auf der Stelle",
            "Mit Armschwung auf der Stelle gehen",
            Ganzkoerper,
            4,
            420,
        ),
    ];

    Catalog {
        exercises: exercises.into_iter().map(|e| (e.id.clone(), e)).collect(),
        achievements: default_achievements(),
    }
}

impl Catalog {
    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, exercise) in &self.exercises {
            if id.is_empty() || exercise.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if id != &exercise.id {
                errors.push(format!(
                    "Exercise key '{}' doesn't match exercise.id '{}'",
                    id, exercise.id
                ));
            }
            if exercise.title.is_empty() {
                errors.push(format!("Exercise '{}' has empty title", id));
            }
            if !(1..=5).contains(&exercise.difficulty) {
                errors.push(format!(
                    "Exercise '{}': difficulty {} outside 1-5",
                    id, exercise.difficulty
                ));
            }
            if exercise.duration_seconds == Some(0) {
                errors.push(format!("Exercise '{}' has zero duration", id));
            }
        }

        // Every perfect-day group must be reachable
        let groups: HashSet<MuscleGroup> =
            self.exercises.values().map(|e| e.muscle_group).collect();
        for group in PERFECT_DAY_GROUPS {
            if !groups.contains(&group) {
                errors.push(format!("Catalog has no exercises for muscle group {}", group));
            }
        }

        let mut seen = HashSet::new();
        for rule in &self.achievements {
            if rule.id.is_empty() {
                errors.push("Achievement has empty ID".to_string());
            }
            if rule.title.is_empty() {
                errors.push(format!("Achievement '{}' has empty title", rule.id));
            }
            if !seen.insert(rule.id.as_str()) {
                errors.push(format!("Duplicate achievement ID '{}'", rule.id));
            }

            match &rule.requirements {
                Requirement::FirstExercise | Requirement::PerfectWeek => {}
                Requirement::ExercisesCount { value }
                | Requirement::StreakDays { value }
                | Requirement::PointsTotal { value } => {
                    if *value == 0 {
                        errors.push(format!("Achievement '{}' has zero threshold", rule.id));
                    }
                }
                Requirement::MuscleGroups { groups } => {
                    if groups.is_empty() {
                        errors.push(format!(
                            "Achievement '{}' requires an empty muscle group list",
                            rule.id
                        ));
                    }
                }
            }
        }

        errors
    }

    /// Exercises of one muscle group, sorted by id
    pub fn exercises_in_group(&self, group: MuscleGroup) -> Vec<&Exercise> {
        let mut found: Vec<_> = self
            .exercises
            .values()
            .filter(|e| e.muscle_group == group)
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }
}
