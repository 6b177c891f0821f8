//! Recommendation engine for picking the next exercise.
//!
//! Selection works in two steps:
//! - Choose a muscle group: the first perfect-day group not trained today,
//!   or any group when the day is already complete
//! - Within that group, choose the least performed exercise (ties by id)

use crate::calendar::local_day;
use crate::store::{require_user, Store};
use crate::{history, Catalog, Error, Exercise, MuscleGroup, Result, User, PERFECT_DAY_GROUPS};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

/// A recommended exercise and why it was chosen
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub exercise: Exercise,
    /// Times the user was pointed at or completed this exercise, after this pick
    pub frequency: u32,
    /// Whether the pick helps towards today's perfect day
    pub completes_missing_group: bool,
}

/// Recommend the next exercise for `user_id` and record the pick
pub fn recommend_next<S: Store + ?Sized>(
    store: &mut S,
    catalog: &Catalog,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Recommendation> {
    let mut user = require_user(store, user_id)?;

    let today = history::completed_on_day(store, user_id, local_day(now))?;
    let trained = history::muscle_groups(&today, catalog);

    let (exercise, completes_missing_group) = match missing_group(catalog, &trained) {
        Some(group) => {
            tracing::info!("Recommending from untrained group {}", group);
            (least_performed(catalog, &user, |e| e.muscle_group == group)?, true)
        }
        None => (least_performed(catalog, &user, |_| true)?, false),
    };

    let frequency = user.bump_frequency(&exercise.id);
    store.save_user(&user)?;

    Ok(Recommendation {
        exercise,
        frequency,
        completes_missing_group,
    })
}

/// First perfect-day group without training today that the catalog can serve
fn missing_group(catalog: &Catalog, trained: &BTreeSet<MuscleGroup>) -> Option<MuscleGroup> {
    PERFECT_DAY_GROUPS
        .iter()
        .copied()
        .filter(|g| !trained.contains(g))
        .find(|g| !catalog.exercises_in_group(*g).is_empty())
}

fn least_performed(
    catalog: &Catalog,
    user: &User,
    filter: impl Fn(&Exercise) -> bool,
) -> Result<Exercise> {
    catalog
        .exercises
        .values()
        .filter(|e| filter(*e))
        .min_by(|a, b| {
            user.frequency_of(&a.id)
                .cmp(&user.frequency_of(&b.id))
                .then_with(|| a.id.cmp(&b.id))
        })
        .cloned()
        .ok_or_else(|| Error::Recommendation("No exercises available".into()))
}
