// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock realtime port for deterministic testing.
//!
//! `MockPort` implements `MessagePort` with a settable lifecycle state and
//! captured outbound messages. Like the real channel it rejects sends
//! unless the state is `Connected`.

use std::sync::Mutex;

use async_trait::async_trait;

use pulse_core::{ChannelState, MessagePort, OutboundMessage, PulseError};

/// A scripted `MessagePort` with send capture.
pub struct MockPort {
    state: Mutex<ChannelState>,
    sent: Mutex<Vec<OutboundMessage>>,
}

impl MockPort {
    /// Starts out `Connected` so sends succeed by default.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChannelState::Connected),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn set_state(&self, state: ChannelState) {
        *lock(&self.state) = state;
    }

    /// Every message handed to `send()`, in order.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        lock(&self.sent).clone()
    }

    pub fn sent_count(&self) -> usize {
        lock(&self.sent).len()
    }
}

impl Default for MockPort {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl MessagePort for MockPort {
    fn state(&self) -> ChannelState {
        *lock(&self.state)
    }

    async fn send(&self, message: OutboundMessage) -> Result<(), PulseError> {
        if self.state() != ChannelState::Connected {
            return Err(PulseError::NotConnected);
        }
        lock(&self.sent).push(message);
        Ok(())
    }
}
