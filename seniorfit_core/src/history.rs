//! Progress history queries.
//!
//! Loads a user's completed progress for a calendar day or a trailing
//! window and derives the muscle groups and active days it covers.

use crate::calendar::{day_bounds, start_of_day};
use crate::store::{ProgressQuery, Store};
use crate::{Catalog, MuscleGroup, ProgressRecord, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Completed progress recorded on the given local calendar day
pub fn completed_on_day<S: Store + ?Sized>(
    store: &S,
    user_id: Uuid,
    day: NaiveDate,
) -> Result<Vec<ProgressRecord>> {
    let (from, until) = day_bounds(day);
    let query = ProgressQuery::for_user(user_id)
        .completed_only()
        .between(from, until);
    let records = store.find_progress(&query)?;
    tracing::debug!("Loaded {} completed sessions for {}", records.len(), day);
    Ok(records)
}

/// Completed progress from the last `days` days up to `now`
pub fn completed_since<S: Store + ?Sized>(
    store: &S,
    user_id: Uuid,
    now: DateTime<Utc>,
    days: i64,
) -> Result<Vec<ProgressRecord>> {
    let from = now - Duration::days(days);
    store.find_progress(&ProgressQuery::for_user(user_id).completed_only().since(from))
}

/// Completed progress on the `days` calendar days ending with `today`
pub fn completed_in_last_days<S: Store + ?Sized>(
    store: &S,
    user_id: Uuid,
    today: NaiveDate,
    days: u32,
) -> Result<Vec<ProgressRecord>> {
    let first_day = today - Duration::days(i64::from(days.saturating_sub(1)));
    let (_, until) = day_bounds(today);
    store.find_progress(
        &ProgressQuery::for_user(user_id)
            .completed_only()
            .between(start_of_day(first_day), until),
    )
}

/// Distinct muscle groups of the given records' exercises
///
/// Records pointing at exercises no longer in the catalog are skipped.
pub fn muscle_groups(records: &[ProgressRecord], catalog: &Catalog) -> BTreeSet<MuscleGroup> {
    records
        .iter()
        .filter_map(|r| {
            let group = catalog.muscle_group_of(&r.exercise_id);
            if group.is_none() {
                tracing::warn!("Progress {} references unknown exercise {}", r.id, r.exercise_id);
            }
            group
        })
        .collect()
}

/// How many of the records trained `group`
pub fn count_muscle_group(
    records: &[ProgressRecord],
    catalog: &Catalog,
    group: MuscleGroup,
) -> usize {
    records
        .iter()
        .filter(|r| catalog.muscle_group_of(&r.exercise_id) == Some(group))
        .count()
}

/// Distinct local calendar days on which the records happened
pub fn active_days(records: &[ProgressRecord]) -> BTreeSet<NaiveDate> {
    records.iter().map(ProgressRecord::day).collect()
}
