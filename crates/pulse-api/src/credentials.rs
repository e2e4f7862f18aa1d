// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory access-credential store.
//!
//! The short-lived bearer token lives only in process memory; there is no
//! persistence and no change notification. Readers fetch the current value
//! at point of use, so a token renewed while a caller was suspended is
//! picked up automatically on the next read.

use std::sync::{Arc, Mutex};

/// Shared, cloneable handle to the session's access credential.
///
/// The store is the sole owner of the token; the API client and the
/// realtime channel read it but only the auth flow writes it.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    inner: Arc<Mutex<Option<String>>>,
}

impl CredentialStore {
    /// Creates an empty store (logged-out state).
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current credential. `None` clears it.
    pub fn set(&self, token: Option<String>) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard = token;
    }

    /// Returns a clone of the current credential, if any.
    pub fn get(&self) -> Option<String> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }

    /// Clears the credential (logout or unrecoverable renewal failure).
    pub fn clear(&self) {
        self.set(None);
    }
}
