// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as URL schemes and non-zero retry bounds.

use pulse_core::PulseError;

use crate::model::PulseConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects all violations rather than failing fast.
pub fn validate_config(config: &PulseConfig) -> Result<(), Vec<PulseError>> {
    let mut errors = Vec::new();

    let base_url = config.server.base_url.trim();
    if base_url.is_empty() {
        errors.push(PulseError::Config(
            "server.base_url must not be empty".to_string(),
        ));
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(PulseError::Config(format!(
            "server.base_url `{base_url}` must use http:// or https://"
        )));
    } else if base_url.ends_with('/') {
        errors.push(PulseError::Config(format!(
            "server.base_url `{base_url}` must not end with a trailing slash"
        )));
    }

    let ws_url = config.realtime.url.trim();
    if ws_url.is_empty() {
        errors.push(PulseError::Config(
            "realtime.url must not be empty".to_string(),
        ));
    } else if !ws_url.starts_with("ws://") && !ws_url.starts_with("wss://") {
        errors.push(PulseError::Config(format!(
            "realtime.url `{ws_url}` must use ws:// or wss://"
        )));
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(PulseError::Config(
            "server.request_timeout_secs must be greater than zero".to_string(),
        ));
    }

    if config.realtime.reconnect_attempts == 0 {
        errors.push(PulseError::Config(
            "realtime.reconnect_attempts must be greater than zero".to_string(),
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RealtimeConfig, ServerConfig};

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&PulseConfig::default()).is_ok());
    }

    #[test]
    fn rejects_wrong_schemes() {
        let config = PulseConfig {
            server: ServerConfig {
                base_url: "ftp://chat.example.com".into(),
                ..ServerConfig::default()
            },
            realtime: RealtimeConfig {
                url: "https://chat.example.com/ws".into(),
                ..RealtimeConfig::default()
            },
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn rejects_trailing_slash_base_url() {
        let config = PulseConfig {
            server: ServerConfig {
                base_url: "https://chat.example.com/".into(),
                ..ServerConfig::default()
            },
            ..PulseConfig::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_zero_reconnect_attempts() {
        let config = PulseConfig {
            realtime: RealtimeConfig {
                reconnect_attempts: 0,
                ..RealtimeConfig::default()
            },
            ..PulseConfig::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
