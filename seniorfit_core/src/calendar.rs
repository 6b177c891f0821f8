//! Calendar-day helpers.
//!
//! Streaks, perfect days and "today" queries all use the server's local
//! midnight as the day boundary.

use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};

/// Granularity for finding the end of a DST gap; real offsets are multiples of it
const GAP_STEP_MINUTES: i64 = 15;

pub fn local_time(ts: DateTime<Utc>) -> DateTime<Local> {
    ts.with_timezone(&Local)
}

/// Local calendar day containing `ts`
pub fn local_day(ts: DateTime<Utc>) -> NaiveDate {
    local_time(ts).date_naive()
}

/// UTC instant of local midnight at the start of `day`
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    first_instant_of_day(day, |t| {
        Local
            .from_local_datetime(t)
            .map(|local| local.with_timezone(&Utc))
    })
}

/// First existing instant of `day` under the zone described by `resolve`
///
/// When a DST jump skips midnight the day starts at the first local time
/// after the gap.
fn first_instant_of_day<F>(day: NaiveDate, resolve: F) -> DateTime<Utc>
where
    F: Fn(&NaiveDateTime) -> LocalResult<DateTime<Utc>>,
{
    let midnight = day.and_time(NaiveTime::MIN);
    let steps = 24 * 60 / GAP_STEP_MINUTES;
    for step in 0..steps {
        let candidate = midnight + Duration::minutes(step * GAP_STEP_MINUTES);
        match resolve(&candidate) {
            LocalResult::Single(t) => return t,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => continue,
        }
    }
    tracing::warn!("No valid local time on {}, using UTC midnight", day);
    Utc.from_utc_datetime(&midnight)
}

/// Half-open UTC range `[start, end)` covering the local calendar day
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = day.succ_opt().unwrap_or(day);
    (start_of_day(day), start_of_day(next))
}

/// Whole calendar days from `earlier` to `later` (negative if reversed)
pub fn days_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (later - earlier).num_days()
}
