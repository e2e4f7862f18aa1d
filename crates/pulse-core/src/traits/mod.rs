// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport seam traits.
//!
//! The reconciler talks to the HTTP API and the realtime channel only
//! through these traits, so it can be exercised against mocks without a
//! server. Both use `#[async_trait]` for dynamic dispatch.

pub mod api;
pub mod port;

pub use api::ChatApi;
pub use port::MessagePort;
