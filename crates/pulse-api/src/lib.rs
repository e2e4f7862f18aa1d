// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API layer for the Pulse chat client.
//!
//! Three pieces make every outbound authorized call resilient to credential
//! expiry exactly once per call:
//!
//! - [`CredentialStore`] — the in-memory access-credential cell.
//! - `RenewalQueue` — the explicit single-flight PendingRenewal with a FIFO
//!   queue of waiter continuations.
//! - [`ApiClient`] — attaches the bearer token, and on a 401 leads or joins
//!   the renewal before retrying once. A failed renewal clears the store
//!   and cancels the session scope (the forced-logout signal).

pub mod client;
pub mod credentials;
mod renewal;

pub use client::{ApiClient, LoginRequest, RegisterRequest};
pub use credentials::CredentialStore;
