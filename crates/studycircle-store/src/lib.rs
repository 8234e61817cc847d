//! # studycircle-store
//!
//! Local persistence for the StudyCircle application.
//!
//! All state lives in a synchronous, string-keyed key-value store with JSON
//! values: one logical key per collection (`users`, `groups`), plus single
//! value keys for the current session and the theme preference.  The crate
//! exposes a [`Store`] handle that wraps a [`KvBackend`] and provides typed
//! load/save helpers for every domain model, along with the dual-collection
//! [`Store::commit`] used for membership changes that touch both `users`
//! and `groups`.
//!
//! The store assumes a single active writer.  Two processes sharing the
//! same backing files are last-writer-wins; there is no versioning or
//! locking, and that is the documented concurrency boundary of the design.

pub mod backend;
pub mod keys;
pub mod models;
pub mod store;
pub mod types;

mod error;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use error::StoreError;
pub use models::*;
pub use store::{Store, Theme};
pub use types::{GroupId, MessageId, Role, UserId, Visibility, Weekday};
