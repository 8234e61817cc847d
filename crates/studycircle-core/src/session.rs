//! The current-user session: a thin pass-through over the store's
//! `current_user_id` key.

use studycircle_store::{Store, User, UserId};
use tracing::info;

use crate::directory::Directory;
use crate::error::{CircleError, Result};

/// Tracks which user is "current".  Stateless: every call reads or writes
/// the store directly, so a restarted process sees the same session.
pub struct Session<'a> {
    store: &'a Store,
}

impl<'a> Session<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Record `user_id` as the current user, replacing any prior session.
    pub fn start(&self, user_id: UserId) -> Result<()> {
        self.store.set_current_user_id(user_id)?;
        info!(%user_id, "session started");
        Ok(())
    }

    /// Clear the current session.
    pub fn end(&self) -> Result<()> {
        self.store.clear_current_user()?;
        info!("session ended");
        Ok(())
    }

    /// Resolve the current user through the identity directory.
    ///
    /// Returns `None` when no id is stored or the stored id no longer
    /// resolves to a user.
    pub fn current(&self) -> Result<Option<User>> {
        let Some(id) = self.store.current_user_id()? else {
            return Ok(None);
        };
        match Directory::new(self.store).find_by_id(id) {
            Ok(user) => Ok(Some(user)),
            Err(CircleError::UserNotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
