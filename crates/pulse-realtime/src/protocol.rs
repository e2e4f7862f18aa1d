// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire protocol for the realtime channel.
//!
//! Frames are JSON text messages tagged on `"event"`:
//!
//! Client -> Server:
//! ```json
//! {"event": "send-message", "receiverId": "u2", "content": "hi", "conversationId": "c1"}
//! ```
//!
//! Server -> Client:
//! ```json
//! {"event": "message-received", "message": {"id": "...", "conversationId": "...", ...}}
//! {"event": "message-confirmed", "message": {"id": "...", "conversationId": "...", ...}}
//! ```

use serde::{Deserialize, Serialize};

use pulse_core::{ChannelEvent, ConversationId, MessageRecord, OutboundMessage, UserId};

/// A frame on the realtime wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum WireFrame {
    /// Outbound send request.
    #[serde(rename_all = "camelCase")]
    SendMessage {
        receiver_id: UserId,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conversation_id: Option<ConversationId>,
    },
    /// A message pushed to this session as the receiving party.
    MessageReceived { message: MessageRecord },
    /// Echo of a message this session sent, with its server-assigned id.
    MessageConfirmed { message: MessageRecord },
}

impl From<OutboundMessage> for WireFrame {
    fn from(out: OutboundMessage) -> Self {
        WireFrame::SendMessage {
            receiver_id: out.receiver_id,
            content: out.content,
            conversation_id: out.conversation_id,
        }
    }
}

impl WireFrame {
    /// Converts an inbound frame to a channel event; `None` for frame kinds
    /// the server should never send.
    pub fn into_event(self) -> Option<ChannelEvent> {
        match self {
            WireFrame::MessageReceived { message } => {
                Some(ChannelEvent::MessageReceived(message))
            }
            WireFrame::MessageConfirmed { message } => {
                Some(ChannelEvent::MessageConfirmed(message))
            }
            WireFrame::SendMessage { .. } => None,
        }
    }
}
