//! Storage abstraction for user documents and progress records.
//!
//! The engine only needs whole-document load/save for users plus create,
//! filtered find and bulk delete for progress records. Writes are not
//! transactional across calls: two submissions for the same user racing on
//! load-modify-save end with the last writer's document.

use crate::{ProgressRecord, Result, User};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// Filter for progress lookups
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressQuery {
    pub user_id: Uuid,
    /// Only records with this `completed` flag
    pub completed: Option<bool>,
    /// Inclusive lower bound on the record date
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the record date
    pub until: Option<DateTime<Utc>>,
}

impl ProgressQuery {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            completed: None,
            from: None,
            until: None,
        }
    }

    pub fn completed_only(mut self) -> Self {
        self.completed = Some(true);
        self
    }

    pub fn since(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    pub fn between(mut self, from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.until = Some(until);
        self
    }

    pub fn matches(&self, record: &ProgressRecord) -> bool {
        record.user_id == self.user_id
            && self.completed.map_or(true, |c| record.completed == c)
            && self.from.map_or(true, |from| record.date >= from)
            && self.until.map_or(true, |until| record.date < until)
    }
}

/// Document storage used by the engine
pub trait Store {
    fn load_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Write the whole user document, replacing any stored version
    fn save_user(&mut self, user: &User) -> Result<()>;

    /// Returns whether a document was removed
    fn delete_user(&mut self, id: Uuid) -> Result<bool>;

    fn list_users(&self) -> Result<Vec<User>>;

    fn create_progress(&mut self, record: &ProgressRecord) -> Result<()>;

    /// Matching records, oldest first
    fn find_progress(&self, query: &ProgressQuery) -> Result<Vec<ProgressRecord>>;

    /// Remove every progress record of a user, returning how many went
    fn delete_progress(&mut self, user_id: Uuid) -> Result<usize>;
}

/// Load a user or fail with `UserNotFound`
pub fn require_user<S: Store + ?Sized>(store: &S, id: Uuid) -> Result<User> {
    store
        .load_user(id)?
        .ok_or(crate::Error::UserNotFound(id))
}

/// In-process store, used by tests and embedders without persistence
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    users: HashMap<Uuid, User>,
    progress: Vec<ProgressRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.get(&id).cloned())
    }

    fn save_user(&mut self, user: &User) -> Result<()> {
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    fn delete_user(&mut self, id: Uuid) -> Result<bool> {
        Ok(self.users.remove(&id).is_some())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<_> = self.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    fn create_progress(&mut self, record: &ProgressRecord) -> Result<()> {
        self.progress.push(record.clone());
        Ok(())
    }

    fn find_progress(&self, query: &ProgressQuery) -> Result<Vec<ProgressRecord>> {
        let mut found: Vec<_> = self
            .progress
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.date);
        Ok(found)
    }

    fn delete_progress(&mut self, user_id: Uuid) -> Result<usize> {
        let before = self.progress.len();
        self.progress.retain(|r| r.user_id != user_id);
        Ok(before - self.progress.len())
    }
}
