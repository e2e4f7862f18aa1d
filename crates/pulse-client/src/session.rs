// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-login session facade.
//!
//! A [`ChatSession`] ties one authenticated identity to one API client, one
//! realtime channel, and one reconciler, all sharing a single cancellation
//! scope. Logout, forced or voluntary, cancels the scope; a new login builds
//! a fresh session from scratch.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pulse_api::{ApiClient, CredentialStore, LoginRequest, RegisterRequest};
use pulse_config::PulseConfig;
use pulse_core::{
    ChannelEvent, ChannelState, ChatApi, Conversation, ConversationId, MessagePort, MessageRecord,
    PulseError, User, UserId,
};
use pulse_realtime::RealtimeChannel;

use crate::reconcile::Reconciler;

pub struct ChatSession {
    api: Arc<ApiClient>,
    channel: RealtimeChannel,
    reconciler: Reconciler,
    events: mpsc::Receiver<ChannelEvent>,
    scope: CancellationToken,
}

impl ChatSession {
    /// Authenticates with email/password and opens the realtime channel.
    pub async fn login(
        config: &PulseConfig,
        email: &str,
        password: &str,
    ) -> Result<Self, PulseError> {
        let (api, credentials, scope) = Self::fresh_api(config)?;
        let owner = api
            .login(&LoginRequest {
                email: email.into(),
                password: password.into(),
            })
            .await?;
        Self::establish(config, api, credentials, owner, scope)
    }

    /// Creates an account and opens the realtime channel.
    pub async fn register(
        config: &PulseConfig,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, PulseError> {
        let (api, credentials, scope) = Self::fresh_api(config)?;
        let owner = api
            .register(&RegisterRequest {
                username: username.into(),
                email: email.into(),
                password: password.into(),
            })
            .await?;
        Self::establish(config, api, credentials, owner, scope)
    }

    /// Restores a session from the refresh cookie, if one is still valid.
    pub async fn restore(config: &PulseConfig) -> Result<Self, PulseError> {
        let (api, credentials, scope) = Self::fresh_api(config)?;
        let owner = api.restore_session().await?;
        Self::establish(config, api, credentials, owner, scope)
    }

    fn fresh_api(
        config: &PulseConfig,
    ) -> Result<(Arc<ApiClient>, CredentialStore, CancellationToken), PulseError> {
        let scope = CancellationToken::new();
        let credentials = CredentialStore::new();
        let api = Arc::new(ApiClient::new(
            &config.server,
            credentials.clone(),
            scope.clone(),
        )?);
        Ok((api, credentials, scope))
    }

    fn establish(
        config: &PulseConfig,
        api: Arc<ApiClient>,
        credentials: CredentialStore,
        owner: User,
        scope: CancellationToken,
    ) -> Result<Self, PulseError> {
        let (events_tx, events_rx) = mpsc::channel(256);
        let channel = RealtimeChannel::spawn(
            config.realtime.clone(),
            credentials,
            events_tx,
            scope.clone(),
        )?;
        let reconciler = Reconciler::new(
            owner,
            api.clone() as Arc<dyn ChatApi + Send + Sync>,
            Arc::new(channel.clone()) as Arc<dyn MessagePort + Send + Sync>,
        );
        info!(user = %reconciler.me().id, "session established");
        Ok(Self {
            api,
            channel,
            reconciler,
            events: events_rx,
            scope,
        })
    }

    // --- observable state ---

    pub fn owner(&self) -> &User {
        self.reconciler.me()
    }

    pub fn conversations(&self) -> &[Conversation] {
        self.reconciler.conversations()
    }

    pub fn messages(&self) -> &[MessageRecord] {
        self.reconciler.messages()
    }

    pub fn active_conversation(&self) -> Option<&ConversationId> {
        self.reconciler.active_conversation()
    }

    pub fn is_loading_conversations(&self) -> bool {
        self.reconciler.is_loading_conversations()
    }

    pub fn is_loading_messages(&self) -> bool {
        self.reconciler.is_loading_messages()
    }

    pub fn channel_state(&self) -> ChannelState {
        self.channel.state()
    }

    pub fn watch_channel_state(&self) -> watch::Receiver<ChannelState> {
        self.channel.watch_state()
    }

    /// Cancelled when the session ends, including a failed credential
    /// renewal. The auth layer that owns redirection listens on this.
    pub fn forced_logout(&self) -> CancellationToken {
        self.scope.clone()
    }

    // --- operations ---

    pub async fn load_conversations(&mut self) -> Result<(), PulseError> {
        self.reconciler.load_conversations().await
    }

    pub async fn select_conversation(
        &mut self,
        conversation: ConversationId,
    ) -> Result<(), PulseError> {
        self.reconciler.select_conversation(conversation).await
    }

    pub async fn start_chat(&mut self, counterpart: User) -> Result<ConversationId, PulseError> {
        self.reconciler.start_chat(counterpart).await
    }

    pub async fn send_message(
        &mut self,
        receiver: UserId,
        content: String,
    ) -> Result<(), PulseError> {
        self.reconciler.send_message(receiver, content).await
    }

    pub async fn search_users(&self, query: &str) -> Result<Vec<User>, PulseError> {
        self.api.search_users(query).await
    }

    // --- inbound events ---

    /// Applies every already-delivered channel event; returns how many.
    pub fn apply_pending_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.reconciler.apply_event(event);
            applied += 1;
        }
        applied
    }

    /// Waits for the next channel event, applies it, and returns it so the
    /// view layer can react. `None` once the channel has shut down.
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        let event = self.events.recv().await?;
        self.reconciler.apply_event(event.clone());
        Some(event)
    }

    /// Ends the session: best-effort server logout, then scope cancellation
    /// tears down the channel. The local credential clears either way.
    pub async fn logout(self) {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "server logout failed, ending session anyway");
        }
        self.scope.cancel();
    }
}
