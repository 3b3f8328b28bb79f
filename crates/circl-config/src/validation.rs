// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as URL shape and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::CirclConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CirclConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base = config.api.base_url.trim();
    if base.is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.base_url must not be empty".to_string(),
        });
    } else if !base.starts_with("http://") && !base.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("api.base_url `{base}` must start with http:// or https://"),
        });
    }

    if config.api.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "api.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.credentials.store_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "credentials.store_path must not be empty".to_string(),
        });
    }

    // The waitlist section is all-or-nothing: a URL without a key (or the
    // reverse) cannot authenticate against Supabase.
    match (
        &config.waitlist.supabase_url,
        &config.waitlist.supabase_anon_key,
    ) {
        (Some(url), Some(_)) => {
            let url = url.trim();
            if !url.starts_with("http://") && !url.starts_with("https://") {
                errors.push(ConfigError::Validation {
                    message: format!(
                        "waitlist.supabase_url `{url}` must start with http:// or https://"
                    ),
                });
            }
        }
        (Some(_), None) => {
            errors.push(ConfigError::Validation {
                message: "waitlist.supabase_url is set but waitlist.supabase_anon_key is missing"
                    .to_string(),
            });
        }
        (None, Some(_)) => {
            errors.push(ConfigError::Validation {
                message: "waitlist.supabase_anon_key is set but waitlist.supabase_url is missing"
                    .to_string(),
            });
        }
        (None, None) => {}
    }

    let level = config.client.log_level.as_str();
    if !matches!(level, "trace" | "debug" | "info" | "warn" | "error") {
        errors.push(ConfigError::Validation {
            message: format!(
                "client.log_level `{level}` is not one of trace, debug, info, warn, error"
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
