// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Pulse chat client core.

use thiserror::Error;

/// The primary error type used across the Pulse session and sync layers.
#[derive(Debug, Error)]
pub enum PulseError {
    /// Configuration errors (invalid TOML, malformed URLs, missing fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Non-2xx API responses passed through verbatim, including a 401 that
    /// survives the single renewal retry and any application-level rejection.
    #[error("API returned {status}: {message}")]
    Http { status: u16, message: String },

    /// Connect/fetch failures unrelated to authorization. Not retried by the
    /// core outside the realtime channel's bounded reconnect.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The credential renewal exchange failed; the session is unrecoverable
    /// and a forced-logout signal accompanies this error.
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// A send was attempted while the realtime channel was not connected.
    #[error("realtime channel is not connected")]
    NotConnected,

    /// Realtime channel faults (handshake failure, malformed frames).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
