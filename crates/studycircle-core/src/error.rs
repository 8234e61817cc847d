use studycircle_store::StoreError;
use thiserror::Error;

/// Errors produced by the domain core.
///
/// Everything except [`CircleError::Store`] is a recoverable, user-facing
/// outcome: the caller picks a message and re-renders.  `Store` wraps
/// persistence faults, the one category the presentation layer can only
/// surface generically.
#[derive(Error, Debug)]
pub enum CircleError {
    /// Persistence failure; the operation did not take effect.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    // -- identity ----------------------------------------------------------

    #[error("Username is already taken")]
    DuplicateUsername,

    /// Covers both unknown username and wrong credential, so a failed login
    /// does not reveal whether the account exists.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username and password must not be empty")]
    EmptyRegistrationField,

    #[error("User not found")]
    UserNotFound,

    // -- groups ------------------------------------------------------------

    #[error("Group not found")]
    GroupNotFound,

    #[error("Invalid group parameters: {0}")]
    InvalidGroupParams(&'static str),

    #[error("User is already a member of this group")]
    AlreadyMember,

    #[error("User is not a member of this group")]
    NotMember,

    #[error("Group has reached its maximum size")]
    GroupFull,

    #[error("The creator cannot leave their own group")]
    CreatorCannotLeave,

    #[error("User is already a member or has a pending request")]
    AlreadyMemberOrRequested,

    #[error("No pending join request for this user")]
    NoSuchRequest,

    // -- chat --------------------------------------------------------------

    #[error("Message text must not be empty")]
    EmptyMessage,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CircleError>;
