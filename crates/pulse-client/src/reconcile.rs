// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single writer reconciling server state into the local stores.
//!
//! Every mutation of [`ConversationStore`] and [`MessageStore`] funnels
//! through the [`Reconciler`]: list and history fetches, conversation
//! selection, locally started conversations, and inbound push events. The
//! rules it enforces:
//!
//! - fetches replace wholesale; on error the prior value is kept
//! - one conversation per counterpart, placeholder or confirmed, never both
//! - a placeholder is promoted to the server-assigned id exactly once, the
//!   first time a confirmed message reveals it
//! - inbound messages are deduplicated by id and appended to the message
//!   log only when they belong to the active conversation
//!
//! Sending mutates nothing; the authoritative copy of a sent message
//! arrives back as a confirmation event.

use std::sync::Arc;

use tracing::{debug, info, warn};

use pulse_core::{
    ChannelEvent, ChatApi, Conversation, ConversationId, MessagePort, MessageRecord,
    OutboundMessage, PulseError, User, UserId,
};

use crate::store::{ConversationStore, MessageStore};

pub struct Reconciler {
    me: User,
    api: Arc<dyn ChatApi + Send + Sync>,
    port: Arc<dyn MessagePort + Send + Sync>,
    conversations: ConversationStore,
    messages: MessageStore,
    active: Option<ConversationId>,
    loading_conversations: bool,
    loading_messages: bool,
}

impl Reconciler {
    pub fn new(
        me: User,
        api: Arc<dyn ChatApi + Send + Sync>,
        port: Arc<dyn MessagePort + Send + Sync>,
    ) -> Self {
        Self {
            me,
            api,
            port,
            conversations: ConversationStore::new(),
            messages: MessageStore::new(),
            active: None,
            loading_conversations: false,
            loading_messages: false,
        }
    }

    pub fn me(&self) -> &User {
        &self.me
    }

    pub fn conversations(&self) -> &[Conversation] {
        self.conversations.all()
    }

    pub fn messages(&self) -> &[MessageRecord] {
        self.messages.all()
    }

    pub fn active_conversation(&self) -> Option<&ConversationId> {
        self.active.as_ref()
    }

    pub fn is_loading_conversations(&self) -> bool {
        self.loading_conversations
    }

    pub fn is_loading_messages(&self) -> bool {
        self.loading_messages
    }

    /// Replaces the conversation list from the server.
    ///
    /// On error the store keeps its prior value and the loading flag
    /// clears; the error propagates to the caller.
    pub async fn load_conversations(&mut self) -> Result<(), PulseError> {
        self.loading_conversations = true;
        let result = self.api.conversations().await;
        self.loading_conversations = false;
        match result {
            Ok(list) => {
                debug!(count = list.len(), "conversation list replaced");
                self.conversations.replace_all(list);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "conversation fetch failed, keeping prior list");
                Err(e)
            }
        }
    }

    /// Makes `conversation` active and loads its history.
    ///
    /// A placeholder has no server-side history: the message log clears and
    /// no fetch happens. For a confirmed conversation the history replaces
    /// the log wholesale; on error the prior log is kept.
    pub async fn select_conversation(
        &mut self,
        conversation: ConversationId,
    ) -> Result<(), PulseError> {
        if conversation.is_placeholder() {
            self.active = Some(conversation);
            self.messages.clear();
            return Ok(());
        }

        self.active = Some(conversation.clone());
        self.loading_messages = true;
        let result = self.api.messages(&conversation).await;
        self.loading_messages = false;
        match result {
            Ok(history) => {
                self.messages.replace_all(history);
                Ok(())
            }
            Err(e) => {
                warn!(conversation = %conversation, error = %e, "history fetch failed, keeping prior messages");
                Err(e)
            }
        }
    }

    /// Opens a conversation with `counterpart`, reusing an existing one.
    ///
    /// An existing conversation with that counterpart, confirmed or
    /// placeholder, is selected as-is. Otherwise a placeholder goes to the
    /// head of the list and becomes active. Returns the selected id.
    pub async fn start_chat(&mut self, counterpart: User) -> Result<ConversationId, PulseError> {
        if let Some(existing) = self.conversations.by_counterpart(&self.me.id, &counterpart.id) {
            let id = existing.id.clone();
            self.select_conversation(id.clone()).await?;
            return Ok(id);
        }

        let id = ConversationId::placeholder(&counterpart.id);
        info!(conversation = %id, "starting local conversation");
        self.conversations.insert_front(Conversation {
            id: id.clone(),
            participants: vec![self.me.clone(), counterpart],
            last_message: None,
        });
        self.select_conversation(id.clone()).await?;
        Ok(id)
    }

    /// Applies one inbound push event to the stores.
    ///
    /// Received and confirmed messages take the same path: promote a
    /// matching placeholder, update the conversation preview, then append
    /// to the message log when the message belongs to the active
    /// conversation and has not been seen before.
    pub fn apply_event(&mut self, event: ChannelEvent) {
        let message = event.into_message();
        let counterpart = self.counterpart_of(&message).clone();

        self.promote_placeholder(&counterpart, &message.conversation_id);
        self.update_preview(&counterpart, &message);

        if self.active.as_ref() == Some(&message.conversation_id)
            && !self.messages.contains(&message.id)
        {
            self.messages.push(message);
        }
    }

    /// Hands one outbound message to the realtime port.
    ///
    /// Mutates no store; the server's confirmation event carries the
    /// authoritative record. The conversation id is sent only once the
    /// server has assigned one.
    pub async fn send_message(&self, receiver: UserId, content: String) -> Result<(), PulseError> {
        let conversation_id = self.active.clone().filter(|id| !id.is_placeholder());
        self.port
            .send(OutboundMessage {
                receiver_id: receiver,
                content,
                conversation_id,
            })
            .await
    }

    fn counterpart_of<'a>(&self, message: &'a MessageRecord) -> &'a UserId {
        if message.sender == self.me.id {
            &message.receiver
        } else {
            &message.sender
        }
    }

    /// Rewrites the placeholder for `counterpart` to the server-assigned id.
    ///
    /// Runs at most once per conversation: after the rewrite no placeholder
    /// exists to match again. If the confirmed conversation is already
    /// listed (a list reload raced the first message), the stale
    /// placeholder is dropped instead.
    fn promote_placeholder(&mut self, counterpart: &UserId, confirmed: &ConversationId) {
        if confirmed.is_placeholder() {
            return;
        }
        let placeholder = ConversationId::placeholder(counterpart);

        if self.conversations.by_id(confirmed).is_some() {
            self.conversations.remove_placeholder_for(counterpart);
            if self.active.as_ref() == Some(&placeholder) {
                self.active = Some(confirmed.clone());
            }
            return;
        }

        if self.conversations.by_id(&placeholder).is_some() {
            debug!(from = %placeholder, to = %confirmed, "promoting placeholder conversation");
            if let Some(conv) = self.conversations.by_id_mut(&placeholder) {
                conv.id = confirmed.clone();
            }
            if self.active.as_ref() == Some(&placeholder) {
                self.active = Some(confirmed.clone());
            }
        }
    }

    /// Updates the matched conversation's `lastMessage` preview.
    ///
    /// Matches by conversation id first; participant identity is consulted
    /// only for placeholders, whose local id can never equal a server one.
    fn update_preview(&mut self, counterpart: &UserId, message: &MessageRecord) {
        if let Some(conv) = self.conversations.by_id_mut(&message.conversation_id) {
            conv.last_message = Some(message.clone());
        } else if let Some(conv) = self.conversations.placeholder_for_mut(counterpart) {
            conv.last_message = Some(message.clone());
        } else {
            debug!(conversation = %message.conversation_id, "preview for unlisted conversation dropped");
        }
    }
}
