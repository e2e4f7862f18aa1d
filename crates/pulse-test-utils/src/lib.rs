// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Pulse integration tests.
//!
//! Provides mock adapters and fixtures for fast, deterministic,
//! CI-runnable tests without a live server.
//!
//! # Components
//!
//! - [`MockChatApi`] - Mock REST backend with scripted data and call capture
//! - [`MockPort`] - Mock realtime port with settable state and send capture
//! - [`fixtures`] - Shorthand constructors for core record types

pub mod fixtures;
pub mod mock_api;
pub mod mock_port;

pub use mock_api::{ApiCall, MockChatApi};
pub use mock_port::MockPort;
