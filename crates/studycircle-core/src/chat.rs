//! Per-group chat log: an append-only message sequence embedded in each
//! group record.

use chrono::Utc;
use studycircle_store::{GroupId, Message, MessageId, Store, UserId};
use tracing::{info, warn};

use crate::error::{CircleError, Result};

/// Append and read operations over a group's embedded chat history.
///
/// Messages are never edited or deleted; `list` returns them in insertion
/// order, which equals chronological order because timestamps are assigned
/// at append time under the single-writer assumption.
pub struct ChatLog<'a> {
    store: &'a Store,
}

impl<'a> ChatLog<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Append a message to the group's history.
    ///
    /// The text must be non-empty after trimming and the sender must be a
    /// current member of the group; the log validates both itself rather
    /// than trusting the caller.
    pub fn append(&self, group_id: GroupId, sender_id: UserId, text: &str) -> Result<Message> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CircleError::EmptyMessage);
        }

        let mut groups = self.store.load_groups()?;
        let group = groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .ok_or(CircleError::GroupNotFound)?;

        if !group.members.contains(&sender_id) {
            warn!(%group_id, %sender_id, "chat append from non-member");
            return Err(CircleError::NotMember);
        }

        let message = Message {
            id: MessageId::new(),
            sender_id,
            text: text.to_string(),
            timestamp: Utc::now(),
        };
        group.chat_messages.push(message.clone());

        self.store.save_groups(&groups)?;

        info!(%group_id, %sender_id, message_id = %message.id, "message appended");
        Ok(message)
    }

    /// The group's full chat history, in insertion order.
    pub fn list(&self, group_id: GroupId) -> Result<Vec<Message>> {
        Ok(self
            .store
            .load_groups()?
            .into_iter()
            .find(|g| g.id == group_id)
            .ok_or(CircleError::GroupNotFound)?
            .chat_messages)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use studycircle_store::{MeetingSchedule, Role, User, Visibility, Weekday};

    use super::*;
    use crate::directory::Directory;
    use crate::registry::{CreateGroupParams, Registry};

    fn setup(store: &Store) -> (User, User, GroupId) {
        let dir = Directory::new(store);
        let alice = dir.register("alice", "pw", Role::Student).unwrap();
        let bob = dir.register("bob", "pw", Role::Student).unwrap();

        let registry = Registry::new(store);
        let group = registry
            .create_group(
                alice.id,
                CreateGroupParams {
                    subject: "History".to_string(),
                    course: "HIST 210".to_string(),
                    description: "Exam prep".to_string(),
                    max_size: 4,
                    visibility: Visibility::Public,
                    meeting_schedule: MeetingSchedule {
                        days_of_week: vec![Weekday::Wednesday],
                        start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                        end_time: NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
                        recurrence: "weekly".to_string(),
                    },
                },
            )
            .unwrap();
        registry.add_member(group.id, bob.id).unwrap();

        (alice, bob, group.id)
    }

    #[test]
    fn append_then_list_round_trip() {
        let store = Store::in_memory();
        let (_, bob, group_id) = setup(&store);
        let chat = ChatLog::new(&store);

        let before = Utc::now();
        chat.append(group_id, bob.id, "hello").unwrap();

        let messages = chat.list(group_id).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hello");
        assert_eq!(messages[0].sender_id, bob.id);
        assert!(messages[0].timestamp >= before);
    }

    #[test]
    fn empty_text_rejected_and_log_unchanged() {
        let store = Store::in_memory();
        let (_, bob, group_id) = setup(&store);
        let chat = ChatLog::new(&store);

        assert!(matches!(
            chat.append(group_id, bob.id, ""),
            Err(CircleError::EmptyMessage)
        ));
        assert!(matches!(
            chat.append(group_id, bob.id, "   \n"),
            Err(CircleError::EmptyMessage)
        ));
        assert!(chat.list(group_id).unwrap().is_empty());
    }

    #[test]
    fn text_is_trimmed_before_storage() {
        let store = Store::in_memory();
        let (alice, _, group_id) = setup(&store);
        let chat = ChatLog::new(&store);

        chat.append(group_id, alice.id, "  hi there  ").unwrap();
        assert_eq!(chat.list(group_id).unwrap()[0].text, "hi there");
    }

    #[test]
    fn messages_keep_insertion_order_across_senders() {
        let store = Store::in_memory();
        let (alice, bob, group_id) = setup(&store);
        let chat = ChatLog::new(&store);

        chat.append(group_id, alice.id, "first").unwrap();
        chat.append(group_id, bob.id, "second").unwrap();
        chat.append(group_id, alice.id, "third").unwrap();

        let texts: Vec<_> = chat
            .list(group_id)
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);

        // Re-reading yields the identical result.
        assert_eq!(chat.list(group_id).unwrap().len(), 3);
    }

    #[test]
    fn non_member_cannot_append() {
        let store = Store::in_memory();
        let (_, _, group_id) = setup(&store);
        let outsider = Directory::new(&store)
            .register("mallory", "pw", Role::Student)
            .unwrap();
        let chat = ChatLog::new(&store);

        assert!(matches!(
            chat.append(group_id, outsider.id, "let me in"),
            Err(CircleError::NotMember)
        ));
        assert!(chat.list(group_id).unwrap().is_empty());
    }

    #[test]
    fn unknown_group_is_reported() {
        let store = Store::in_memory();
        let chat = ChatLog::new(&store);
        let ghost = GroupId::new();

        assert!(matches!(
            chat.append(ghost, UserId::new(), "hi"),
            Err(CircleError::GroupNotFound)
        ));
        assert!(matches!(
            chat.list(ghost),
            Err(CircleError::GroupNotFound)
        ));
    }
}
