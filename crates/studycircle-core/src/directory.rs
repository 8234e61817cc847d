//! The identity directory: owns the set of user records.

use studycircle_store::{Role, Store, User, UserId};
use tracing::{info, warn};

use crate::credential;
use crate::error::{CircleError, Result};

/// Lookup, registration and authentication over the persisted user set.
pub struct Directory<'a> {
    store: &'a Store,
}

impl<'a> Directory<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Register a new account.
    ///
    /// The username is unique case-sensitively across all users.  The raw
    /// secret is derived into an opaque token before anything is persisted.
    pub fn register(&self, username: &str, raw_credential: &str, role: Role) -> Result<User> {
        let username = username.trim();
        if username.is_empty() || raw_credential.is_empty() {
            return Err(CircleError::EmptyRegistrationField);
        }

        let mut users = self.store.load_users()?;
        if users.iter().any(|u| u.username == username) {
            warn!(username, "registration rejected, username taken");
            return Err(CircleError::DuplicateUsername);
        }

        let user = User {
            id: UserId::new(),
            username: username.to_string(),
            credential: credential::derive(raw_credential),
            role,
            joined_groups: vec![],
            created_groups: vec![],
        };

        users.push(user.clone());
        self.store.save_users(&users)?;

        info!(user_id = %user.id, username, ?role, "user registered");
        Ok(user)
    }

    /// Authenticate by username and raw secret.
    ///
    /// Unknown username and wrong credential produce the same error, so a
    /// caller cannot probe which usernames exist.
    pub fn authenticate(&self, username: &str, raw_credential: &str) -> Result<User> {
        let users = self.store.load_users()?;

        let user = users
            .into_iter()
            .find(|u| u.username == username)
            .filter(|u| credential::verify(raw_credential, &u.credential));

        match user {
            Some(user) => {
                info!(user_id = %user.id, username, "user authenticated");
                Ok(user)
            }
            None => {
                warn!(username, "authentication failed");
                Err(CircleError::InvalidCredentials)
            }
        }
    }

    /// Fetch a single user by id.
    pub fn find_by_id(&self, id: UserId) -> Result<User> {
        self.store
            .load_users()?
            .into_iter()
            .find(|u| u.id == id)
            .ok_or(CircleError::UserNotFound)
    }

    /// Exact-match username lookup.
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .store
            .load_users()?
            .into_iter()
            .find(|u| u.username == username))
    }

    /// List all users.
    pub fn list(&self) -> Result<Vec<User>> {
        Ok(self.store.load_users()?)
    }

    /// Persist a mutated user record, replacing the stored one by id.
    ///
    /// The caller is responsible for having preserved the membership
    /// invariants; membership changes should go through the registry.
    pub fn update(&self, user: &User) -> Result<()> {
        let mut users = self.store.load_users()?;
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(CircleError::UserNotFound)?;
        *slot = user.clone();
        Ok(self.store.save_users(&users)?)
    }
}
