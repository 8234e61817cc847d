//! Logical key names used by the persistence layer.
//!
//! One key per persisted collection or single value.  Keys double as file
//! names (`<key>.json`) under the [`FileBackend`](crate::FileBackend).

/// All registered users, as a JSON array of `User` records.
pub const USERS: &str = "users";

/// All groups, as a JSON array of `Group` records (chat history embedded).
pub const GROUPS: &str = "groups";

/// The id of the currently signed-in user, or JSON `null`.
pub const CURRENT_USER_ID: &str = "current_user_id";

/// UI theme preference, `"light"` or `"dark"`.
pub const THEME: &str = "theme";
