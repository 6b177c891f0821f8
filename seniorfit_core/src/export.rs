//! CSV export of a user's progress history.

use crate::store::{require_user, ProgressQuery, Store};
use crate::{Catalog, ProgressRecord, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    id: String,
    date: String,
    exercise_id: &'a str,
    exercise_title: &'a str,
    muscle_group: String,
    completed: bool,
    aborted: bool,
    watch_duration: f64,
    points_earned: u32,
}

impl<'a> CsvRow<'a> {
    fn new(record: &'a ProgressRecord, catalog: &'a Catalog) -> Self {
        let exercise = catalog.exercise(&record.exercise_id);
        CsvRow {
            id: record.id.to_string(),
            date: record.date.to_rfc3339(),
            exercise_id: &record.exercise_id,
            exercise_title: exercise.map(|e| e.title.as_str()).unwrap_or(""),
            muscle_group: exercise
                .map(|e| e.muscle_group.to_string())
                .unwrap_or_default(),
            completed: record.completed,
            aborted: record.aborted,
            watch_duration: record.watch_duration,
            points_earned: record.points_earned,
        }
    }
}

/// Write records as CSV with a header row
///
/// Returns the number of rows written.
pub fn write_progress_csv<W: Write>(
    records: &[ProgressRecord],
    catalog: &Catalog,
    out: W,
) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        writer.serialize(CsvRow::new(record, catalog))?;
    }
    // Header row even when there is nothing to export
    if records.is_empty() {
        writer.write_record([
            "id",
            "date",
            "exercise_id",
            "exercise_title",
            "muscle_group",
            "completed",
            "aborted",
            "watch_duration",
            "points_earned",
        ])?;
    }
    writer.flush()?;
    Ok(records.len())
}

/// Export all of a user's progress to `path`, oldest first
pub fn export_progress<S: Store + ?Sized>(
    store: &S,
    catalog: &Catalog,
    user_id: Uuid,
    path: &Path,
) -> Result<usize> {
    require_user(store, user_id)?;
    let records = store.find_progress(&ProgressQuery::for_user(user_id))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path)?;
    let count = write_progress_csv(&records, catalog, &file)?;
    file.sync_all()?;

    tracing::info!("Exported {} progress records to {:?}", count, path);
    Ok(count)
}
