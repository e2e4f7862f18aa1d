// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Pulse chat client.
//!
//! This crate provides the shared data model, the error taxonomy, and the
//! transport seam traits ([`ChatApi`], [`MessagePort`]) that decouple the
//! reconciliation layer from the concrete HTTP and WebSocket transports.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PulseError;
pub use traits::{ChatApi, MessagePort};
pub use types::{
    ChannelEvent, ChannelState, Conversation, ConversationId, MessageId, MessageRecord,
    OutboundMessage, User, UserId,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_error_has_all_variants() {
        let _config = PulseError::Config("test".into());
        let _http = PulseError::Http {
            status: 422,
            message: "validation failed".into(),
        };
        let _transport = PulseError::Transport {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _expired = PulseError::SessionExpired("refresh rejected".into());
        let _not_connected = PulseError::NotConnected;
        let _channel = PulseError::Channel {
            message: "test".into(),
            source: None,
        };
        let _internal = PulseError::Internal("test".into());
    }

    #[test]
    fn http_error_carries_status_in_display() {
        let err = PulseError::Http {
            status: 401,
            message: "unauthorized".into(),
        };
        assert!(err.to_string().contains("401"), "got: {err}");
    }

    #[test]
    fn seam_traits_are_object_safe() {
        // The reconciler holds `Arc<dyn ChatApi>` / `Arc<dyn MessagePort>`;
        // this won't compile if either trait loses object safety.
        fn _assert_api(_: &dyn ChatApi) {}
        fn _assert_port(_: &dyn MessagePort) {}
    }
}
