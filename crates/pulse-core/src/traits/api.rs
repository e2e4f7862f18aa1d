// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-side HTTP API seam consumed by the reconciler.

use async_trait::async_trait;

use crate::error::PulseError;
use crate::types::{Conversation, ConversationId, MessageRecord, User};

/// Authorized chat API calls the reconciler depends on.
///
/// Implementations are expected to handle credential renewal transparently;
/// callers only ever see terminal outcomes.
#[async_trait]
pub trait ChatApi {
    /// Fetches the session owner's conversation list.
    async fn conversations(&self) -> Result<Vec<Conversation>, PulseError>;

    /// Fetches the message history of a server-confirmed conversation.
    async fn messages(&self, conversation: &ConversationId)
    -> Result<Vec<MessageRecord>, PulseError>;

    /// Searches users by name for starting a new chat.
    async fn search_users(&self, query: &str) -> Result<Vec<User>, PulseError>;
}
