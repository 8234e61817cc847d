//! The [`Store`] handle: typed collection access over a [`KvBackend`].
//!
//! Every persisted collection is one JSON blob under one key, so every
//! logical write is an atomic replace of the whole collection.  Mutations
//! that span both `users` and `groups` (membership changes) must go through
//! [`Store::commit`], the single dual-collection writer path.

use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::backend::{FileBackend, KvBackend, MemoryBackend};
use crate::error::{Result, StoreError};
use crate::keys;
use crate::models::{Group, User};
use crate::types::UserId;

/// UI theme preference.  Not part of the domain core, but persisted
/// alongside it under the [`keys::THEME`] key.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Wrapper around a [`KvBackend`] providing typed load/save helpers.
pub struct Store {
    backend: Box<dyn KvBackend>,
}

impl Store {
    /// Open (or create) the default application store.
    ///
    /// State files are placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/studycircle/`
    /// - macOS:   `~/Library/Application Support/com.studycircle.studycircle/`
    /// - Windows: `{FOLDERID_RoamingAppData}\studycircle\studycircle\data\`
    pub fn open() -> Result<Self> {
        let project_dirs = ProjectDirs::from("com", "studycircle", "studycircle")
            .ok_or(StoreError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        tracing::info!(path = %data_dir.display(), "opening store");

        Self::open_at(data_dir)
    }

    /// Open (or create) a store rooted at an explicit directory.
    ///
    /// This is useful for tests and for embedding the store inside custom
    /// directory layouts.
    pub fn open_at(dir: &std::path::Path) -> Result<Self> {
        Ok(Self {
            backend: Box::new(FileBackend::open(dir)?),
        })
    }

    /// A volatile store over a [`MemoryBackend`].
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryBackend::new()),
        }
    }

    /// Wrap an arbitrary backend.
    pub fn with_backend(backend: Box<dyn KvBackend>) -> Self {
        Self { backend }
    }

    // ------------------------------------------------------------------
    // Generic JSON access
    // ------------------------------------------------------------------

    /// Load and decode the value under `key`, or its default when the key
    /// has never been written.  A missing key reads as an empty collection.
    fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match self.backend.get(key)? {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(T::default()),
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let blob = serde_json::to_string(value)?;
        self.backend.set(key, &blob)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub fn load_users(&self) -> Result<Vec<User>> {
        self.load(keys::USERS)
    }

    pub fn save_users(&self, users: &[User]) -> Result<()> {
        self.save(keys::USERS, &users)
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    pub fn load_groups(&self) -> Result<Vec<Group>> {
        self.load(keys::GROUPS)
    }

    pub fn save_groups(&self, groups: &[Group]) -> Result<()> {
        self.save(keys::GROUPS, &groups)
    }

    // ------------------------------------------------------------------
    // Dual-collection commit
    // ------------------------------------------------------------------

    /// Persist `users` and `groups` as one logical transaction.
    ///
    /// Both collections are serialized before either is written, so a
    /// serialization failure mutates nothing.  If the second write fails
    /// the first is rolled back to its prior value, keeping the membership
    /// relation consistent from the caller's point of view.
    pub fn commit(&self, users: &[User], groups: &[Group]) -> Result<()> {
        let users_blob = serde_json::to_string(&users)?;
        let groups_blob = serde_json::to_string(&groups)?;

        let prior_groups = self.backend.get(keys::GROUPS)?;

        self.backend.set(keys::GROUPS, &groups_blob)?;
        if let Err(e) = self.backend.set(keys::USERS, &users_blob) {
            let rollback = match prior_groups {
                Some(prior) => self.backend.set(keys::GROUPS, &prior),
                // The key did not exist before; an empty collection is the
                // closest restorable state.
                None => self.backend.set(keys::GROUPS, "[]"),
            };
            if let Err(rb) = rollback {
                tracing::error!(error = %rb, "rollback of groups write failed");
            }
            return Err(e);
        }

        tracing::debug!(
            users = users.len(),
            groups = groups.len(),
            "committed collections"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Current user
    // ------------------------------------------------------------------

    pub fn current_user_id(&self) -> Result<Option<UserId>> {
        self.load(keys::CURRENT_USER_ID)
    }

    pub fn set_current_user_id(&self, id: UserId) -> Result<()> {
        self.save(keys::CURRENT_USER_ID, &Some(id))
    }

    pub fn clear_current_user(&self) -> Result<()> {
        self.save(keys::CURRENT_USER_ID, &None::<UserId>)
    }

    // ------------------------------------------------------------------
    // Theme
    // ------------------------------------------------------------------

    pub fn theme(&self) -> Result<Theme> {
        self.load(keys::THEME)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.save(keys::THEME, &theme)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::models::MeetingSchedule;
    use crate::types::{GroupId, Role, Visibility, Weekday};

    fn sample_user(name: &str) -> User {
        User {
            id: UserId::new(),
            username: name.to_string(),
            credential: "deadbeef".to_string(),
            role: Role::Student,
            joined_groups: vec![],
            created_groups: vec![],
        }
    }

    fn sample_group(creator: UserId) -> Group {
        Group {
            id: GroupId::new(),
            creator_id: creator,
            subject: "Mathematics".to_string(),
            course: "MATH 201".to_string(),
            description: "Weekly problem sets".to_string(),
            max_size: 5,
            visibility: Visibility::Public,
            meeting_schedule: MeetingSchedule {
                days_of_week: vec![Weekday::Tuesday],
                start_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                recurrence: "weekly".to_string(),
            },
            members: vec![creator],
            join_requests: vec![],
            announcements: vec![],
            resources: vec![],
            chat_messages: vec![],
        }
    }

    #[test]
    fn missing_keys_read_as_empty() {
        let store = Store::in_memory();
        assert!(store.load_users().unwrap().is_empty());
        assert!(store.load_groups().unwrap().is_empty());
        assert_eq!(store.current_user_id().unwrap(), None);
        assert_eq!(store.theme().unwrap(), Theme::Light);
    }

    #[test]
    fn users_round_trip() {
        let store = Store::in_memory();
        let users = vec![sample_user("alice"), sample_user("bob")];

        store.save_users(&users).unwrap();
        assert_eq!(store.load_users().unwrap(), users);
    }

    #[test]
    fn groups_round_trip_with_schedule() {
        let store = Store::in_memory();
        let groups = vec![sample_group(UserId::new())];

        store.save_groups(&groups).unwrap();
        assert_eq!(store.load_groups().unwrap(), groups);
    }

    #[test]
    fn commit_writes_both_collections() {
        let store = Store::in_memory();
        let user = sample_user("alice");
        let group = sample_group(user.id);

        store
            .commit(std::slice::from_ref(&user), std::slice::from_ref(&group))
            .unwrap();

        assert_eq!(store.load_users().unwrap(), vec![user]);
        assert_eq!(store.load_groups().unwrap(), vec![group]);
    }

    #[test]
    fn current_user_set_and_clear() {
        let store = Store::in_memory();
        let id = UserId::new();

        store.set_current_user_id(id).unwrap();
        assert_eq!(store.current_user_id().unwrap(), Some(id));

        store.clear_current_user().unwrap();
        assert_eq!(store.current_user_id().unwrap(), None);
    }

    #[test]
    fn theme_persists() {
        let store = Store::in_memory();
        store.set_theme(Theme::Dark).unwrap();
        assert_eq!(store.theme().unwrap(), Theme::Dark);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let users = vec![sample_user("carol")];

        {
            let store = Store::open_at(dir.path()).unwrap();
            store.save_users(&users).unwrap();
        }

        let store = Store::open_at(dir.path()).unwrap();
        assert_eq!(store.load_users().unwrap(), users);
    }

    // Backend that refuses writes to one key, to exercise commit rollback.
    struct FailOn {
        inner: MemoryBackend,
        key: &'static str,
    }

    impl KvBackend for FailOn {
        fn get(&self, key: &str) -> crate::error::Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> crate::error::Result<()> {
            if key == self.key {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn commit_rolls_back_groups_when_users_write_fails() {
        let backend = FailOn {
            inner: MemoryBackend::new(),
            key: keys::USERS,
        };
        let store = Store::with_backend(Box::new(backend));

        let creator = UserId::new();
        let prior = vec![sample_group(creator)];
        store.save_groups(&prior).unwrap();

        let mut updated = prior.clone();
        updated[0].members.push(UserId::new());

        let err = store.commit(&[sample_user("alice")], &updated);
        assert!(err.is_err());

        // The groups write was undone; the stale members list never sticks.
        assert_eq!(store.load_groups().unwrap(), prior);
    }
}
