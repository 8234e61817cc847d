//! # studycircle-core
//!
//! Domain core of the StudyCircle study-group coordinator: account
//! registration and authentication, group membership with its join-request
//! state machine, per-group chat, and the current-user session.
//!
//! Every operation is a synchronous, run-to-completion computation over the
//! [`Store`](studycircle_store::Store): load the affected collection(s),
//! mutate, persist.  Expected failures (not-found, duplicates, conflicts,
//! invalid input) are typed [`CircleError`] values, never panics; only
//! storage-level faults surface as the distinct [`CircleError::Store`]
//! category.
//!
//! The membership relation is stored redundantly on both sides
//! (`Group::members` and `User::joined_groups`) and is kept consistent by
//! updating both collections through a single store commit on every
//! membership change.

pub mod chat;
pub mod credential;
pub mod directory;
pub mod registry;
pub mod session;

mod error;

pub use chat::ChatLog;
pub use directory::Directory;
pub use error::CircleError;
pub use registry::{CreateGroupParams, Membership, Registry};
pub use session::Session;

pub use studycircle_store as store;
