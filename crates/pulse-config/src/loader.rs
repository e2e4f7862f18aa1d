// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./pulse.toml` > `~/.config/pulse/pulse.toml` >
//! `/etc/pulse/pulse.toml` with environment variable overrides via the
//! `PULSE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PulseConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/pulse/pulse.toml` (system-wide)
/// 3. `~/.config/pulse/pulse.toml` (user XDG config)
/// 4. `./pulse.toml` (local directory)
/// 5. `PULSE_*` environment variables
pub fn load_config() -> Result<PulseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PulseConfig::default()))
        .merge(Toml::file("/etc/pulse/pulse.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("pulse/pulse.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("pulse.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PulseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PulseConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PulseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PulseConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so keys containing
/// underscores stay intact: `PULSE_SERVER_BASE_URL` must map to
/// `server.base_url`, not `server.base.url`.
fn env_provider() -> Env {
    Env::prefixed("PULSE_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("realtime_", "realtime.", 1);
        mapped.into()
    })
}
