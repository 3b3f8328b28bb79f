// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./circl.toml` > `~/.config/circl/circl.toml` > `/etc/circl/circl.toml`
//! with environment variable overrides via `CIRCL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CirclConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/circl/circl.toml` (system-wide)
/// 3. `~/.config/circl/circl.toml` (user XDG config)
/// 4. `./circl.toml` (local directory)
/// 5. `CIRCL_*` environment variables
pub fn load_config() -> Result<CirclConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CirclConfig::default()))
        .merge(Toml::file("/etc/circl/circl.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("circl/circl.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("circl.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<CirclConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CirclConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CirclConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CirclConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CIRCL_API_BASE_URL` must map to
/// `api.base_url`, not `api.base.url`.
fn env_provider() -> Env {
    Env::prefixed("CIRCL_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: CIRCL_WAITLIST_SUPABASE_URL -> "waitlist_supabase_url"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("client_", "client.", 1)
            .replacen("api_", "api.", 1)
            .replacen("waitlist_", "waitlist.", 1)
            .replacen("credentials_", "credentials.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_any_file() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.client.name, "circl");
        assert_eq!(config.api.timeout_secs, 300);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[api]
base_url = "http://localhost:8080"
"#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        // Untouched sections keep defaults.
        assert_eq!(config.client.log_level, "info");
    }
}
