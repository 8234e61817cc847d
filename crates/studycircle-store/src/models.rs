//! Domain model structs persisted in the local key-value store.
//!
//! Every struct derives `Serialize` and `Deserialize` so whole collections
//! can be written to (and read from) a single JSON blob per key.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{GroupId, MessageId, Role, UserId, Visibility, Weekday};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered account.
///
/// `joined_groups` and `created_groups` are redundant views over the group
/// collection kept for query convenience: `joined_groups` must equal the set
/// of groups whose `members` contains this user's id, and `created_groups`
/// the set of groups whose `creator_id` equals it.  The registry maintains
/// both sides of the relation in a single commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique user identifier, immutable.
    pub id: UserId,
    /// Unique (case-sensitive) username, immutable after registration.
    pub username: String,
    /// Derived credential token (hex).  Never the raw secret.
    pub credential: String,
    /// Student or teacher, immutable.
    pub role: Role,
    /// Ids of groups this user belongs to.  Order is display order only.
    pub joined_groups: Vec<GroupId>,
    /// Ids of groups this user created.
    pub created_groups: Vec<GroupId>,
}

impl User {
    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// When and how often a group meets.
///
/// `end_time` strictly after `start_time` is validated at creation only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MeetingSchedule {
    /// At least one weekday, in display order.
    pub days_of_week: Vec<Weekday>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Free-text recurrence, `"weekly"` by default.
    #[serde(default = "default_recurrence")]
    pub recurrence: String,
}

fn default_recurrence() -> String {
    "weekly".to_string()
}

/// A study group with its membership, pending join requests and chat history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    /// Unique group identifier.
    pub id: GroupId,
    /// The user who created the group.  Set once, immutable, always a member.
    pub creator_id: UserId,
    pub subject: String,
    pub course: String,
    pub description: String,
    /// Maximum member count, at least 2.
    pub max_size: u32,
    pub visibility: Visibility,
    pub meeting_schedule: MeetingSchedule,
    /// Member user ids, unique.  Contains `creator_id` at all times.
    pub members: Vec<UserId>,
    /// Pending join requests, disjoint from `members` at all times.
    pub join_requests: Vec<UserId>,
    /// Reserved for future use; kept so existing blobs round-trip.
    #[serde(default)]
    pub announcements: Vec<serde_json::Value>,
    /// Reserved for future use.
    #[serde(default)]
    pub resources: Vec<serde_json::Value>,
    /// Append-only chat history, in insertion order.
    #[serde(default)]
    pub chat_messages: Vec<Message>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message inside a group's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// The user who sent the message.  A member of the group at send time;
    /// not re-validated retroactively.
    pub sender_id: UserId,
    /// Message body, non-empty after trimming.
    pub text: String,
    /// Assigned at append time.  Non-decreasing within a group under the
    /// single-writer assumption.
    pub timestamp: DateTime<Utc>,
}
