// SPDX-FileCopyrightText: 2026 Pulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Pulse chat client.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.
//!
//! # Usage
//!
//! ```no_run
//! use pulse_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("API endpoint: {}", config.server.base_url);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{PulseConfig, RealtimeConfig, ServerConfig};
pub use validation::validate_config;

use pulse_core::PulseError;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid [`PulseConfig`] or the list of everything wrong
/// with it.
pub fn load_and_validate() -> Result<PulseConfig, Vec<PulseError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![PulseError::Config(err.to_string())]),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<PulseConfig, Vec<PulseError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![PulseError::Config(err.to_string())]),
    }
}
