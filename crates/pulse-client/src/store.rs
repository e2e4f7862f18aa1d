// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory stores for the conversation list and the active message log.
//!
//! The stores hold plain data and enforce nothing about ordering or
//! deduplication beyond what their methods state; the reconciler is the
//! single writer and carries the update rules.

use pulse_core::{Conversation, ConversationId, MessageId, MessageRecord, UserId};

/// Ordered list of the session owner's conversations, newest first.
#[derive(Debug, Default)]
pub struct ConversationStore {
    items: Vec<Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Conversation] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Wholesale replace, used after a successful list fetch.
    pub fn replace_all(&mut self, conversations: Vec<Conversation>) {
        self.items = conversations;
    }

    /// Inserts a freshly started conversation at the head of the list.
    pub fn insert_front(&mut self, conversation: Conversation) {
        self.items.insert(0, conversation);
    }

    pub fn by_id(&self, id: &ConversationId) -> Option<&Conversation> {
        self.items.iter().find(|c| c.id == *id)
    }

    pub fn by_id_mut(&mut self, id: &ConversationId) -> Option<&mut Conversation> {
        self.items.iter_mut().find(|c| c.id == *id)
    }

    /// The conversation whose counterpart (relative to `me`) is `other`,
    /// confirmed or placeholder.
    pub fn by_counterpart(&self, me: &UserId, other: &UserId) -> Option<&Conversation> {
        self.items
            .iter()
            .find(|c| c.counterpart(me).is_some_and(|p| p.id == *other))
    }

    /// The unconfirmed conversation for `other`, if one exists.
    pub fn placeholder_for_mut(&mut self, other: &UserId) -> Option<&mut Conversation> {
        let id = ConversationId::placeholder(other);
        self.items.iter_mut().find(|c| c.id == id)
    }

    /// Removes the unconfirmed conversation for `other`, if one exists.
    pub fn remove_placeholder_for(&mut self, other: &UserId) {
        let id = ConversationId::placeholder(other);
        self.items.retain(|c| c.id != id);
    }
}

/// Message log of the active conversation, oldest first.
#[derive(Debug, Default)]
pub struct MessageStore {
    items: Vec<MessageRecord>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[MessageRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Wholesale replace, used after a successful history fetch.
    pub fn replace_all(&mut self, messages: Vec<MessageRecord>) {
        self.items = messages;
    }

    /// Clears the log, used when the active conversation changes.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.items.iter().any(|m| m.id == *id)
    }

    /// Appends without checking identity; the caller dedups first.
    pub fn push(&mut self, message: MessageRecord) {
        self.items.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pulse_core::User;

    fn user(id: &str) -> User {
        User {
            id: UserId(id.into()),
            username: id.into(),
            email: None,
        }
    }

    fn conversation(id: &str, a: &str, b: &str) -> Conversation {
        Conversation {
            id: ConversationId(id.into()),
            participants: vec![user(a), user(b)],
            last_message: None,
        }
    }

    fn message(id: &str) -> MessageRecord {
        MessageRecord {
            id: MessageId(id.into()),
            conversation_id: ConversationId("c1".into()),
            sender: UserId("u1".into()),
            receiver: UserId("u2".into()),
            content: "hi".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn insert_front_puts_new_conversations_first() {
        let mut store = ConversationStore::new();
        store.replace_all(vec![conversation("c1", "me", "u1")]);
        store.insert_front(conversation("c2", "me", "u2"));
        assert_eq!(store.all()[0].id, ConversationId("c2".into()));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn by_counterpart_matches_relative_to_me() {
        let me = UserId("me".into());
        let mut store = ConversationStore::new();
        store.replace_all(vec![
            conversation("c1", "me", "u1"),
            conversation("c2", "me", "u2"),
        ]);
        let found = store.by_counterpart(&me, &UserId("u2".into())).unwrap();
        assert_eq!(found.id, ConversationId("c2".into()));
        assert!(store.by_counterpart(&me, &UserId("u3".into())).is_none());
    }

    #[test]
    fn placeholder_lookup_only_matches_placeholder_ids() {
        let other = UserId("u1".into());
        let mut store = ConversationStore::new();
        store.replace_all(vec![conversation("c1", "me", "u1")]);
        assert!(store.placeholder_for_mut(&other).is_none());

        store.insert_front(Conversation {
            id: ConversationId::placeholder(&other),
            participants: vec![user("me"), user("u1")],
            last_message: None,
        });
        assert!(store.placeholder_for_mut(&other).is_some());
    }

    #[test]
    fn message_store_tracks_identity() {
        let mut store = MessageStore::new();
        store.push(message("m1"));
        assert!(store.contains(&MessageId("m1".into())));
        assert!(!store.contains(&MessageId("m2".into())));
        store.clear();
        assert!(store.is_empty());
    }
}
