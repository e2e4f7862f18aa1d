// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shorthand constructors for core record types.

use chrono::Utc;

use pulse_core::{Conversation, ConversationId, MessageId, MessageRecord, User, UserId};

/// A user with a derived username and no email.
pub fn user(id: &str) -> User {
    User {
        id: UserId(id.into()),
        username: format!("user-{id}"),
        email: None,
    }
}

/// A two-party conversation with no preview yet.
pub fn conversation(id: &str, a: &str, b: &str) -> Conversation {
    Conversation {
        id: ConversationId(id.into()),
        participants: vec![user(a), user(b)],
        last_message: None,
    }
}

/// A message stamped with the current time.
pub fn message(id: &str, conversation: &str, sender: &str, receiver: &str, content: &str) -> MessageRecord {
    MessageRecord {
        id: MessageId(id.into()),
        conversation_id: ConversationId(conversation.into()),
        sender: UserId(sender.into()),
        receiver: UserId(receiver.into()),
        content: content.into(),
        created_at: Utc::now(),
    }
}
