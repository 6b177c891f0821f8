//! Append-only progress log.
//!
//! Progress records are appended to a JSONL (JSON Lines) file. Appends and
//! bulk rewrites are serialised on a sibling lock file that is never renamed,
//! so an append cannot land in a log inode that a rewrite is replacing.

use crate::{Error, ProgressRecord, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// JSONL-based progress log with file locking
pub struct ProgressLog {
    path: PathBuf,
    lock_path: PathBuf,
}

/// Held lock on the log's lock file, released on drop
struct LogLock {
    file: File,
}

impl Drop for LogLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to release progress log lock: {}", e);
        }
    }
}

impl ProgressLog {
    /// Create a log handle for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = path.with_extension("lock");
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn open_lock_file(&self) -> Result<File> {
        self.ensure_parent_dir()?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&self.lock_path)?;
        Ok(file)
    }

    fn lock_exclusive(&self) -> Result<LogLock> {
        let file = self.open_lock_file()?;
        file.lock_exclusive()?;
        Ok(LogLock { file })
    }

    fn lock_shared(&self) -> Result<LogLock> {
        let file = self.open_lock_file()?;
        file.lock_shared()?;
        Ok(LogLock { file })
    }

    /// Append one record as a JSON line
    pub fn append(&self, record: &ProgressRecord) -> Result<()> {
        let _lock = self.lock_exclusive()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut writer = std::io::BufWriter::new(&file);
        writer.write_all(line.as_bytes())?;
        writer.flush()?;

        tracing::debug!("Appended progress {} to log", record.id);
        Ok(())
    }

    /// Read every readable record; corrupt lines are skipped
    pub fn read_all(&self) -> Result<Vec<ProgressRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let _lock = self.lock_shared()?;
        self.read_locked()
    }

    /// Read the log; the caller holds the lock
    fn read_locked(&self) -> Result<Vec<ProgressRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let reader = BufReader::new(&file);
        let mut records = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<ProgressRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Failed to parse progress at line {}: {}", line_num + 1, e);
                }
            }
        }

        tracing::debug!("Read {} progress records from log", records.len());
        Ok(records)
    }

    /// Keep only records matching `keep`, rewriting the log atomically
    ///
    /// The exclusive lock is held from the read through the rename, so
    /// concurrent appends wait instead of being dropped. Returns the number
    /// of records removed.
    pub fn retain<F>(&self, keep: F) -> Result<usize>
    where
        F: Fn(&ProgressRecord) -> bool,
    {
        if !self.path.exists() {
            return Ok(0);
        }

        let _lock = self.lock_exclusive()?;
        let records = self.read_locked()?;
        let (kept, removed): (Vec<_>, Vec<_>) = records.into_iter().partition(|r| keep(r));

        if removed.is_empty() {
            return Ok(0);
        }

        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Store("progress log path missing parent".into()))?;
        let temp = NamedTempFile::new_in(parent)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            for record in &kept {
                serde_json::to_writer(&mut writer, record)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Removed {} progress records from log", removed.len());
        Ok(removed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn create_test_record(user_id: Uuid) -> ProgressRecord {
        ProgressRecord::new(user_id, "bauch_atmung", true, false, 180.0, 10, Utc::now())
    }

    #[test]
    fn test_append_and_read_single_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = ProgressLog::new(temp_dir.path().join("progress.jsonl"));

        let record = create_test_record(Uuid::new_v4());
        log.append(&record).unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], record);
    }

    #[test]
    fn test_read_missing_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = ProgressLog::new(temp_dir.path().join("nonexistent.jsonl"));

        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("progress.jsonl");
        let log = ProgressLog::new(&path);

        log.append(&create_test_record(Uuid::new_v4())).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{ not json").unwrap();
        drop(file);
        log.append(&create_test_record(Uuid::new_v4())).unwrap();

        assert_eq!(log.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_retain_removes_matching() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = ProgressLog::new(temp_dir.path().join("progress.jsonl"));

        let keep_user = Uuid::new_v4();
        let drop_user = Uuid::new_v4();
        for _ in 0..3 {
            log.append(&create_test_record(drop_user)).unwrap();
        }
        log.append(&create_test_record(keep_user)).unwrap();

        let removed = log.retain(|r| r.user_id != drop_user).unwrap();
        assert_eq!(removed, 3);

        let remaining = log.read_all().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].user_id, keep_user);

        // Only the log and its lock file remain, no stray temp files
        let mut entries: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        entries.sort();
        assert_eq!(entries, vec!["progress.jsonl", "progress.lock"]);
    }

    #[test]
    fn test_retain_keeps_concurrent_appends() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("progress.jsonl");
        let kept_user = Uuid::new_v4();
        let appends = 500;

        let writer = {
            let path = path.clone();
            std::thread::spawn(move || {
                let log = ProgressLog::new(path);
                for _ in 0..appends {
                    log.append(&create_test_record(kept_user)).unwrap();
                }
            })
        };

        let log = ProgressLog::new(&path);
        for _ in 0..100 {
            let dropped_user = Uuid::new_v4();
            log.append(&create_test_record(dropped_user)).unwrap();
            let removed = log.retain(|r| r.user_id != dropped_user).unwrap();
            assert_eq!(removed, 1);
        }
        writer.join().unwrap();

        let remaining = log.read_all().unwrap();
        assert_eq!(remaining.len(), appends);
        assert!(remaining.iter().all(|r| r.user_id == kept_user));
    }
}
