// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Pulse chat API.
//!
//! Provides [`ApiClient`], which attaches the current access credential to
//! every authorized call and recovers from credential expiry exactly once
//! per call: on a 401 the caller either leads a single-flight renewal
//! exchange or queues onto the pending one, then retries with the fresh
//! token. The renewal exchange itself is cookie-authenticated (the
//! long-lived credential lives in an HTTP-only cookie managed by the
//! transport, never by this crate).

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use async_trait::async_trait;
use pulse_config::ServerConfig;
use pulse_core::{ChatApi, Conversation, ConversationId, MessageRecord, PulseError, User};

use crate::credentials::CredentialStore;
use crate::renewal::{RenewalQueue, RenewalTicket};

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload for `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// The server wraps every response body in `{ "data": ... }`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// `data` payload of login/register responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthPayload {
    user: User,
    access_token: String,
}

/// `data` payload of the renewal exchange.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPayload {
    access_token: String,
}

/// Error body shape used by the API for rejections.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// HTTP client for the Pulse chat API.
///
/// Holds the credential store, the single-flight renewal queue, and the
/// session-scope token that doubles as the forced-logout signal.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: CredentialStore,
    renewal: RenewalQueue,
    session_scope: CancellationToken,
}

impl ApiClient {
    /// Creates a new API client.
    ///
    /// The cookie store is enabled so the HTTP-only refresh cookie set at
    /// login is replayed on `POST /auth/refresh` automatically.
    pub fn new(
        config: &ServerConfig,
        credentials: CredentialStore,
        session_scope: CancellationToken,
    ) -> Result<Self, PulseError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| PulseError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            renewal: RenewalQueue::new(),
            session_scope,
        })
    }

    /// The credential store this client reads from and renews into.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Session-scope token; cancelled on forced logout.
    pub fn session_scope(&self) -> &CancellationToken {
        &self.session_scope
    }

    // --- auth endpoints ---

    /// Authenticates with email/password and stores the issued credential.
    pub async fn login(&self, request: &LoginRequest) -> Result<User, PulseError> {
        let body = serde_json::to_value(request)
            .map_err(|e| PulseError::Internal(format!("failed to encode login request: {e}")))?;
        let response = self
            .dispatch(Method::POST, "/auth/login", &[], Some(&body), None)
            .await?;
        let response = check_status(response).await?;
        let payload: AuthPayload = decode_data(response).await?;
        self.credentials.set(Some(payload.access_token));
        info!(user = %payload.user.id, "logged in");
        Ok(payload.user)
    }

    /// Creates an account and stores the issued credential.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, PulseError> {
        let body = serde_json::to_value(request)
            .map_err(|e| PulseError::Internal(format!("failed to encode register request: {e}")))?;
        let response = self
            .dispatch(Method::POST, "/auth/register", &[], Some(&body), None)
            .await?;
        let response = check_status(response).await?;
        let payload: AuthPayload = decode_data(response).await?;
        self.credentials.set(Some(payload.access_token));
        info!(user = %payload.user.id, "registered");
        Ok(payload.user)
    }

    /// Restores a session from the refresh cookie alone: performs the
    /// renewal exchange directly, then resolves the session owner.
    ///
    /// Failure here means "no valid session" and leaves the session scope
    /// untouched; it is not a forced logout because no session existed yet.
    pub async fn restore_session(&self) -> Result<User, PulseError> {
        let token = self.exchange_refresh().await?;
        self.credentials.set(Some(token));
        let user = self.me().await?;
        info!(user = %user.id, "session restored");
        Ok(user)
    }

    /// Resolves the authenticated session owner.
    pub async fn me(&self) -> Result<User, PulseError> {
        self.authorized_json(Method::GET, "/auth/me", &[], None).await
    }

    /// Server-side logout; the local credential is cleared regardless of
    /// the server's answer.
    pub async fn logout(&self) -> Result<(), PulseError> {
        let result = self
            .authorized_response(Method::POST, "/auth/logout", &[], None)
            .await;
        self.credentials.clear();
        result.map(drop)
    }

    // --- request plumbing ---

    /// Issues an authorized request and decodes the `data` envelope.
    async fn authorized_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<T, PulseError> {
        let response = self.authorized_response(method, path, query, body).await?;
        decode_data(response).await
    }

    /// Issues an authorized request, renewing the credential and retrying
    /// exactly once on a 401. A 401 on the retried call, and every non-401
    /// failure, propagates as-is.
    async fn authorized_response(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<reqwest::Response, PulseError> {
        let token = self.credentials.get();
        let response = self
            .dispatch(method.clone(), path, query, body, token.as_deref())
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        debug!(path, "authorized call rejected, renewing credential");
        let fresh = self.renew().await?;
        let response = self
            .dispatch(method, path, query, body, Some(&fresh))
            .await?;
        check_status(response).await
    }

    /// Joins or leads the single-flight renewal and returns the new token.
    async fn renew(&self) -> Result<String, PulseError> {
        if self.session_scope.is_cancelled() {
            // Forced logout already happened; never renew again for this
            // session.
            return Err(PulseError::SessionExpired("session already ended".into()));
        }

        match self.renewal.join() {
            RenewalTicket::Waiter(rx) => match rx.await {
                Ok(Ok(token)) => Ok(token),
                Ok(Err(message)) => Err(PulseError::SessionExpired(message)),
                Err(_) => Err(PulseError::Internal(
                    "renewal leader dropped without settling".into(),
                )),
            },
            RenewalTicket::Leader => match self.exchange_refresh().await {
                Ok(token) => {
                    self.credentials.set(Some(token.clone()));
                    self.renewal.settle(Ok(token.clone()));
                    info!("access credential renewed");
                    Ok(token)
                }
                Err(err) => {
                    let message = err.to_string();
                    self.credentials.clear();
                    self.renewal.settle(Err(message.clone()));
                    warn!(error = %err, "credential renewal failed, forcing logout");
                    self.session_scope.cancel();
                    Err(PulseError::SessionExpired(message))
                }
            },
        }
    }

    /// Performs the renewal exchange against `POST /auth/refresh`.
    ///
    /// Cookie-authenticated: no bearer header. A 401 from this endpoint is
    /// a renewal failure like any other; it never recurses into renewal.
    async fn exchange_refresh(&self) -> Result<String, PulseError> {
        let response = self
            .dispatch(Method::POST, "/auth/refresh", &[], None, None)
            .await?;
        let response = check_status(response).await?;
        let payload: TokenPayload = decode_data(response).await?;
        Ok(payload.access_token)
    }

    /// Builds and sends one HTTP request. No retry logic lives here.
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, PulseError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(|e| PulseError::Transport {
            message: format!("request to {path} failed: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[async_trait]
impl ChatApi for ApiClient {
    async fn conversations(&self) -> Result<Vec<Conversation>, PulseError> {
        self.authorized_json(Method::GET, "/conversations", &[], None)
            .await
    }

    async fn messages(
        &self,
        conversation: &ConversationId,
    ) -> Result<Vec<MessageRecord>, PulseError> {
        let path = format!("/messages/{conversation}");
        self.authorized_json(Method::GET, &path, &[], None).await
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>, PulseError> {
        self.authorized_json(Method::GET, "/users/search", &[("query", query)], None)
            .await
    }
}

/// Maps non-2xx responses to [`PulseError::Http`], preferring the API's
/// `{"message": ...}` body over the raw text.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PulseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => parsed.message,
        Err(_) => body,
    };
    Err(PulseError::Http {
        status: status.as_u16(),
        message,
    })
}

/// Decodes a successful response's `{ "data": ... }` envelope.
async fn decode_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PulseError> {
    let body = response.text().await.map_err(|e| PulseError::Transport {
        message: format!("failed to read response body: {e}"),
        source: Some(Box::new(e)),
    })?;
    let envelope: Envelope<T> =
        serde_json::from_str(&body).map_err(|e| PulseError::Transport {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })?;
    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(uri: &str) -> (ApiClient, CredentialStore, CancellationToken) {
        let credentials = CredentialStore::new();
        let scope = CancellationToken::new();
        let config = ServerConfig {
            base_url: uri.to_string(),
            request_timeout_secs: 5,
        };
        let client = ApiClient::new(&config, credentials.clone(), scope.clone()).unwrap();
        (client, credentials, scope)
    }

    fn user_json(id: &str, username: &str) -> serde_json::Value {
        serde_json::json!({"id": id, "username": username})
    }

    fn conversation_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "participants": [user_json("u1", "alice"), user_json("u2", "bob")],
            "lastMessage": null
        })
    }

    #[tokio::test]
    async fn login_stores_credential_and_returns_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"user": user_json("u1", "alice"), "accessToken": "T1"}
            })))
            .mount(&server)
            .await;

        let (client, credentials, _) = test_client(&server.uri());
        let user = client
            .login(&LoginRequest {
                email: "alice@example.com".into(),
                password: "hunter2".into(),
            })
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(credentials.get().as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn authorized_call_attaches_bearer_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/conversations"))
            .and(header("authorization", "Bearer T1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (client, credentials, _) = test_client(&server.uri());
        credentials.set(Some("T1".into()));
        let conversations = client.conversations().await.unwrap();
        assert!(conversations.is_empty());
    }

    #[tokio::test]
    async fn expired_call_renews_once_and_retries_with_new_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/conversations"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"accessToken": "T2"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/conversations"))
            .and(header("authorization", "Bearer T2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [conversation_json("c1")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, credentials, scope) = test_client(&server.uri());
        credentials.set(Some("stale".into()));

        let conversations = client.conversations().await.unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(credentials.get().as_deref(), Some("T2"));
        assert!(!scope.is_cancelled());
    }

    #[tokio::test]
    async fn concurrent_expiries_share_a_single_renewal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/conversations"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"accessToken": "T2"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/conversations"))
            .and(header("authorization", "Bearer T2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})),
            )
            .mount(&server)
            .await;

        let (client, credentials, _) = test_client(&server.uri());
        credentials.set(Some("stale".into()));

        let results = join_all((0..5).map(|_| client.conversations())).await;
        for result in results {
            assert!(result.is_ok(), "got: {result:?}");
        }
        assert_eq!(credentials.get().as_deref(), Some("T2"));
        // `expect(1)` on the refresh mock verifies the single flight when
        // the server drops.
    }

    #[tokio::test]
    async fn renewal_failure_clears_credential_and_forces_logout_once() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/conversations"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "refresh token expired"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, credentials, scope) = test_client(&server.uri());
        credentials.set(Some("stale".into()));

        let err = client.conversations().await.unwrap_err();
        assert!(matches!(err, PulseError::SessionExpired(_)), "got: {err}");
        assert_eq!(credentials.get(), None);
        assert!(scope.is_cancelled());

        // A later call fails fast without a second renewal attempt; the
        // refresh mock's expect(1) holds when the server verifies.
        let err = client.conversations().await.unwrap_err();
        assert!(matches!(err, PulseError::SessionExpired(_)), "got: {err}");
    }

    #[tokio::test]
    async fn non_authorization_failures_pass_through() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/conversations"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "message": "database unavailable"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (client, credentials, _) = test_client(&server.uri());
        credentials.set(Some("T1".into()));

        let err = client.conversations().await.unwrap_err();
        match err {
            PulseError::Http { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "database unavailable");
            }
            other => panic!("expected Http error, got: {other}"),
        }
    }

    #[tokio::test]
    async fn second_401_after_retry_propagates_without_looping() {
        let server = MockServer::start().await;

        // Every conversations call is rejected, even with the fresh token.
        Mock::given(method("GET"))
            .and(path("/conversations"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"accessToken": "T2"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, credentials, scope) = test_client(&server.uri());
        credentials.set(Some("stale".into()));

        let err = client.conversations().await.unwrap_err();
        assert!(
            matches!(err, PulseError::Http { status: 401, .. }),
            "got: {err}"
        );
        // The renewal itself succeeded, so this is not a forced logout.
        assert!(!scope.is_cancelled());
        assert_eq!(credentials.get().as_deref(), Some("T2"));
    }

    #[tokio::test]
    async fn restore_session_refreshes_then_resolves_owner() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"accessToken": "T3"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer T3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": user_json("u1", "alice")
            })))
            .mount(&server)
            .await;

        let (client, credentials, scope) = test_client(&server.uri());
        let user = client.restore_session().await.unwrap();
        assert_eq!(user.id.0, "u1");
        assert_eq!(credentials.get().as_deref(), Some("T3"));
        assert!(!scope.is_cancelled());
    }

    #[tokio::test]
    async fn failed_restore_does_not_force_logout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let (client, credentials, scope) = test_client(&server.uri());
        assert!(client.restore_session().await.is_err());
        assert_eq!(credentials.get(), None);
        assert!(!scope.is_cancelled());
    }

    #[tokio::test]
    async fn search_users_sends_query_parameter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/search"))
            .and(query_param("query", "al"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [user_json("u1", "alice")]
            })))
            .mount(&server)
            .await;

        let (client, credentials, _) = test_client(&server.uri());
        credentials.set(Some("T1".into()));
        let users = client.search_users("al").await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "alice");
    }

    #[tokio::test]
    async fn message_history_deserializes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages/c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{
                    "id": "m1",
                    "conversationId": "c1",
                    "sender": "u2",
                    "receiver": "u1",
                    "content": "hey",
                    "createdAt": "2026-03-01T12:00:00Z"
                }]
            })))
            .mount(&server)
            .await;

        let (client, credentials, _) = test_client(&server.uri());
        credentials.set(Some("T1".into()));
        let messages = client
            .messages(&ConversationId("c1".into()))
            .await
            .unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "hey");
    }

    #[tokio::test]
    async fn logout_clears_credential_even_if_server_rejects() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "message": "boom"
            })))
            .mount(&server)
            .await;

        let (client, credentials, _) = test_client(&server.uri());
        credentials.set(Some("T1".into()));
        assert!(client.logout().await.is_err());
        assert_eq!(credentials.get(), None);
    }
}
