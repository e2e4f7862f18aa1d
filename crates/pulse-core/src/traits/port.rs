// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound realtime seam consumed by the reconciler.

use async_trait::async_trait;

use crate::error::PulseError;
use crate::types::{ChannelState, OutboundMessage};

/// Fire-and-forget send port onto the realtime channel.
#[async_trait]
pub trait MessagePort {
    /// Current lifecycle state of the underlying channel.
    fn state(&self) -> ChannelState;

    /// Sends a message, rejecting immediately with
    /// [`PulseError::NotConnected`] unless the channel is
    /// [`ChannelState::Connected`]. There is no silent queuing.
    async fn send(&self, message: OutboundMessage) -> Result<(), PulseError>;
}
