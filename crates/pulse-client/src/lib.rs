// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session facade and store reconciliation for the Pulse chat client.
//!
//! This crate owns the client-side state: the conversation list, the active
//! conversation's message log, and the session lifecycle around them.
//! [`ChatSession`] is the entry point; one exists per login and wires the
//! REST client, the realtime channel, and the [`Reconciler`] to a shared
//! cancellation scope.

pub mod reconcile;
pub mod session;
pub mod store;

pub use reconcile::Reconciler;
pub use session::ChatSession;
pub use store::{ConversationStore, MessageStore};
