//! File-backed document store.
//!
//! Layout under the data directory:
//! - `users/<id>.json`: one JSON document per user
//! - `progress.jsonl`: append-only progress log
//!
//! User documents are read under a shared lock and written atomically
//! (temp file in the same directory, exclusive lock, fsync, rename).

use crate::progress_log::ProgressLog;
use crate::store::{ProgressQuery, Store};
use crate::{Error, ProgressRecord, Result, User};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

pub struct FileStore {
    users_dir: PathBuf,
    log: ProgressLog,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self> {
        let users_dir = data_dir.join("users");
        std::fs::create_dir_all(&users_dir)?;

        let log = ProgressLog::new(data_dir.join("progress.jsonl"));
        tracing::debug!("Opened file store at {:?} (log {:?})", data_dir, log.path());
        Ok(Self { users_dir, log })
    }

    fn user_path(&self, id: Uuid) -> PathBuf {
        self.users_dir.join(format!("{}.json", id))
    }

    fn read_user_file(path: &Path) -> Result<User> {
        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        serde_json::from_str::<User>(&contents).map_err(|e| {
            tracing::warn!("Failed to parse user document {:?}: {}", path, e);
            Error::Store(format!("corrupt user document {}: {}", path.display(), e))
        })
    }
}

impl Store for FileStore {
    fn load_user(&self, id: Uuid) -> Result<Option<User>> {
        let path = self.user_path(id);
        if !path.exists() {
            tracing::debug!("No user document for {}", id);
            return Ok(None);
        }

        let user = Self::read_user_file(&path)?;
        tracing::debug!("Loaded user {} from {:?}", id, path);
        Ok(Some(user))
    }

    fn save_user(&mut self, user: &User) -> Result<()> {
        let path = self.user_path(user.id);

        let temp = NamedTempFile::new_in(&self.users_dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(user)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved user {} to {:?}", user.id, path);
        Ok(())
    }

    fn delete_user(&mut self, id: Uuid) -> Result<bool> {
        let path = self.user_path(id);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)?;
        tracing::info!("Deleted user document {}", id);
        Ok(true)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let mut users = Vec::new();
        for entry in std::fs::read_dir(&self.users_dir)? {
            let path = entry?.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            match Self::read_user_file(&path) {
                Ok(user) => users.push(user),
                Err(e) => tracing::warn!("Skipping unreadable user document {:?}: {}", path, e),
            }
        }
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    fn create_progress(&mut self, record: &ProgressRecord) -> Result<()> {
        self.log.append(record)
    }

    fn find_progress(&self, query: &ProgressQuery) -> Result<Vec<ProgressRecord>> {
        let mut found: Vec<_> = self
            .log
            .read_all()?
            .into_iter()
            .filter(|r| query.matches(r))
            .collect();
        found.sort_by_key(|r| r.date);
        Ok(found)
    }

    fn delete_progress(&mut self, user_id: Uuid) -> Result<usize> {
        self.log.retain(|r| r.user_id != user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(temp_dir.path()).unwrap();

        let mut user = User::new("Erika", Some("erika@example.org".into()), 4, Utc::now());
        user.add_points(120);
        user.record_completion("nacken_rollen");
        store.save_user(&user).unwrap();

        let loaded = store.load_user(user.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Erika");
        assert_eq!(loaded.points, 120);
        assert_eq!(loaded.level, 2);
        assert!(loaded.completed_exercises.contains("nacken_rollen"));
        assert_eq!(loaded.weekly_goal.exercises_target, 4);
    }

    #[test]
    fn test_load_missing_user() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();

        assert!(store.load_user(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_user_document_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        let id = Uuid::new_v4();
        std::fs::write(store.user_path(id), "{ invalid json }").unwrap();

        assert!(matches!(store.load_user(id), Err(Error::Store(_))));
    }

    #[test]
    fn test_legacy_frequency_normalized_on_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(temp_dir.path()).unwrap();
        let user = User::new("Erika", None, 5, Utc::now());
        store.save_user(&user).unwrap();

        let path = store.user_path(user.id);
        let mut doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        doc["exerciseFrequency"] = serde_json::json!({"po_heben": "3", "kaputt": "x"});
        std::fs::write(&path, doc.to_string()).unwrap();

        let loaded = store.load_user(user.id).unwrap().unwrap();
        assert_eq!(loaded.frequency_of("po_heben"), 3);
        assert_eq!(loaded.exercise_frequency.len(), 1);
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(temp_dir.path()).unwrap();
        let user = User::new("Erika", None, 5, Utc::now());

        store.save_user(&user).unwrap();
        store.save_user(&user).unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path().join("users"))
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_progress_roundtrip_and_delete() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(temp_dir.path()).unwrap();
        let user_id = Uuid::new_v4();

        for _ in 0..2 {
            let record =
                ProgressRecord::new(user_id, "brust_oeffnen", true, false, 200.0, 10, Utc::now());
            store.create_progress(&record).unwrap();
        }

        let query = ProgressQuery::for_user(user_id).completed_only();
        assert_eq!(store.find_progress(&query).unwrap().len(), 2);

        assert_eq!(store.delete_progress(user_id).unwrap(), 2);
        assert!(store.find_progress(&query).unwrap().is_empty());
    }

    #[test]
    fn test_list_and_delete_users() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(temp_dir.path()).unwrap();
        let a = User::new("A", None, 5, Utc::now());
        let b = User::new("B", None, 5, Utc::now());
        store.save_user(&a).unwrap();
        store.save_user(&b).unwrap();

        assert_eq!(store.list_users().unwrap().len(), 2);
        assert!(store.delete_user(a.id).unwrap());
        assert!(!store.delete_user(a.id).unwrap());
        assert_eq!(store.list_users().unwrap().len(), 1);
    }
}
