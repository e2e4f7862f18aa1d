// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock REST backend for deterministic testing.
//!
//! `MockChatApi` implements `ChatApi` over scripted in-memory data,
//! capturing every call for assertion and failing on demand.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use pulse_core::{ChatApi, Conversation, ConversationId, MessageRecord, PulseError, User};

/// One recorded call against the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Conversations,
    Messages(ConversationId),
    SearchUsers(String),
}

/// A scripted `ChatApi` with call capture.
#[derive(Default)]
pub struct MockChatApi {
    conversations: Mutex<Vec<Conversation>>,
    messages: Mutex<HashMap<ConversationId, Vec<MessageRecord>>>,
    users: Mutex<Vec<User>>,
    calls: Mutex<Vec<ApiCall>>,
    fail_conversations: AtomicBool,
    fail_messages: AtomicBool,
}

impl MockChatApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the conversation list returned by `conversations()`.
    pub fn set_conversations(&self, conversations: Vec<Conversation>) {
        *lock(&self.conversations) = conversations;
    }

    /// Script the history returned by `messages()` for one conversation.
    pub fn set_messages(&self, conversation: ConversationId, history: Vec<MessageRecord>) {
        lock(&self.messages).insert(conversation, history);
    }

    /// Script the directory searched by `search_users()`.
    pub fn set_users(&self, users: Vec<User>) {
        *lock(&self.users) = users;
    }

    /// Make the next and all following `conversations()` calls fail.
    pub fn fail_conversations(&self, fail: bool) {
        self.fail_conversations.store(fail, Ordering::SeqCst);
    }

    /// Make the next and all following `messages()` calls fail.
    pub fn fail_messages(&self, fail: bool) {
        self.fail_messages.store(fail, Ordering::SeqCst);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: ApiCall) {
        lock(&self.calls).push(call);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn scripted_failure(what: &str) -> PulseError {
    PulseError::Http {
        status: 500,
        message: format!("scripted {what} failure"),
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn conversations(&self) -> Result<Vec<Conversation>, PulseError> {
        self.record(ApiCall::Conversations);
        if self.fail_conversations.load(Ordering::SeqCst) {
            return Err(scripted_failure("conversations"));
        }
        Ok(lock(&self.conversations).clone())
    }

    async fn messages(
        &self,
        conversation: &ConversationId,
    ) -> Result<Vec<MessageRecord>, PulseError> {
        self.record(ApiCall::Messages(conversation.clone()));
        if self.fail_messages.load(Ordering::SeqCst) {
            return Err(scripted_failure("messages"));
        }
        Ok(lock(&self.messages)
            .get(conversation)
            .cloned()
            .unwrap_or_default())
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>, PulseError> {
        self.record(ApiCall::SearchUsers(query.to_string()));
        Ok(lock(&self.users)
            .iter()
            .filter(|u| u.username.contains(query))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn returns_scripted_data_and_records_calls() {
        let api = MockChatApi::new();
        api.set_conversations(vec![fixtures::conversation("c1", "u1", "u2")]);
        api.set_messages(
            ConversationId("c1".into()),
            vec![fixtures::message("m1", "c1", "u2", "u1", "hey")],
        );

        assert_eq!(api.conversations().await.unwrap().len(), 1);
        assert_eq!(
            api.messages(&ConversationId("c1".into())).await.unwrap()[0].content,
            "hey"
        );
        assert!(
            api.messages(&ConversationId("c2".into()))
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(
            api.calls(),
            vec![
                ApiCall::Conversations,
                ApiCall::Messages(ConversationId("c1".into())),
                ApiCall::Messages(ConversationId("c2".into())),
            ]
        );
    }

    #[tokio::test]
    async fn scripted_failures_surface_as_http_errors() {
        let api = MockChatApi::new();
        api.fail_conversations(true);
        assert!(matches!(
            api.conversations().await,
            Err(PulseError::Http { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn search_filters_by_username_substring() {
        let api = MockChatApi::new();
        api.set_users(vec![fixtures::user("alice"), fixtures::user("bob")]);
        let hits = api.search_users("ali").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "user-alice");
    }
}
