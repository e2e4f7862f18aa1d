// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the API, realtime, and reconciliation layers.
//!
//! Wire-facing structs serialize with camelCase field names to match the
//! server's JSON contract (`{id, conversationId, sender, receiver, content,
//! createdAt}`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Unique identifier for a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier for a conversation.
///
/// A conversation started locally before the server has persisted it carries
/// a placeholder id derived from the counterpart's user id. Placeholder ids
/// are never sent to the server; they exist only so the view layer has a
/// stable identity until the first confirmed message reveals the real one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub String);

impl ConversationId {
    /// Prefix marking a locally-generated, not-yet-persisted conversation.
    pub const PLACEHOLDER_PREFIX: &'static str = "temp-";

    /// Builds the placeholder id for a conversation with `counterpart`.
    ///
    /// Deriving the id from the counterpart makes repeated `start_chat`
    /// calls for the same user converge on the same identity.
    pub fn placeholder(counterpart: &UserId) -> Self {
        Self(format!("{}{}", Self::PLACEHOLDER_PREFIX, counterpart.0))
    }

    /// Returns true if this id was generated locally and is unconfirmed.
    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with(Self::PLACEHOLDER_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A chat user as returned by the auth and search endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A server-confirmed message record.
///
/// Both push events and the history endpoint deliver this full shape; the
/// client never synthesizes one locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender: UserId,
    pub receiver: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A 1:1 conversation between the session owner and one counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: Vec<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<MessageRecord>,
}

impl Conversation {
    /// Returns the participant that is not `me`, if present.
    pub fn counterpart(&self, me: &UserId) -> Option<&User> {
        self.participants.iter().find(|p| p.id != *me)
    }
}

/// States of the realtime channel lifecycle.
///
/// Legal transitions: `Disconnected -> Connecting -> Connected ->
/// (Disconnected | Reconnecting)`; `Reconnecting` loops back to `Connected`
/// or ends in `Disconnected` once attempts are exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// An inbound push event surfaced by the realtime channel.
///
/// The channel performs no deduplication; both kinds funnel into the
/// reconciler, which dedups by message identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A message pushed to this session as the receiving party.
    MessageReceived(MessageRecord),
    /// The server echo of a message this session sent, carrying the
    /// server-assigned identity.
    MessageConfirmed(MessageRecord),
}

impl ChannelEvent {
    /// Returns the message record carried by either event kind.
    pub fn message(&self) -> &MessageRecord {
        match self {
            ChannelEvent::MessageReceived(m) | ChannelEvent::MessageConfirmed(m) => m,
        }
    }

    /// Consumes the event, returning the carried message record.
    pub fn into_message(self) -> MessageRecord {
        match self {
            ChannelEvent::MessageReceived(m) | ChannelEvent::MessageConfirmed(m) => m,
        }
    }
}

/// An outbound send request for the realtime channel.
///
/// `conversation_id` is `None` when the conversation only exists locally;
/// the server creates the conversation on first message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub receiver_id: UserId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
}
