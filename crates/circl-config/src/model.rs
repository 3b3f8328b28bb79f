// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Circl client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Circl configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CirclConfig {
    /// Client identity and logging settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Astralis API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Waitlist backend (Supabase) settings.
    #[serde(default)]
    pub waitlist: WaitlistConfig,

    /// Credential storage settings.
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Client identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Display name used in the shell prompt.
    #[serde(default = "default_client_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: default_client_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_client_name() -> String {
    "circl".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Astralis API configuration.
///
/// All service endpoints are derived from one base URL, mirroring the
/// backend's route layout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the Astralis deployment.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. Streaming responses can be
    /// long-lived, so this is generous by default.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Auth service root: `{base}/auth`.
    pub fn auth_url(&self) -> String {
        format!("{}/auth", self.base_url.trim_end_matches('/'))
    }

    /// Streaming search service root: `{base}/api/v1/astralis`.
    pub fn astralis_url(&self) -> String {
        format!("{}/api/v1/astralis", self.base_url.trim_end_matches('/'))
    }

    /// Session CRUD root: `{base}/api/v1/sessions`.
    pub fn sessions_url(&self) -> String {
        format!("{}/api/v1/sessions", self.base_url.trim_end_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.circl.app".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

/// Waitlist backend configuration.
///
/// The waitlist lives in a hosted Supabase project; both values come from
/// that project's settings. `None` disables the waitlist commands.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WaitlistConfig {
    /// Supabase project URL.
    #[serde(default)]
    pub supabase_url: Option<String>,

    /// Supabase anon key used for the `apikey` and bearer headers.
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
}

/// Credential storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Path to the JSON file holding the access/refresh token pair.
    #[serde(default = "default_credentials_path")]
    pub store_path: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            store_path: default_credentials_path(),
        }
    }
}

fn default_credentials_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("circl").join("credentials.json"))
        .unwrap_or_else(|| std::path::PathBuf::from("credentials.json"))
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls_derive_from_base() {
        let api = ApiConfig {
            base_url: "https://astralis.example.com".into(),
            timeout_secs: 300,
        };
        assert_eq!(api.auth_url(), "https://astralis.example.com/auth");
        assert_eq!(
            api.astralis_url(),
            "https://astralis.example.com/api/v1/astralis"
        );
        assert_eq!(
            api.sessions_url(),
            "https://astralis.example.com/api/v1/sessions"
        );
    }

    #[test]
    fn trailing_slash_in_base_url_is_tolerated() {
        let api = ApiConfig {
            base_url: "https://astralis.example.com/".into(),
            timeout_secs: 300,
        };
        assert_eq!(api.auth_url(), "https://astralis.example.com/auth");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let toml_str = r#"
[api]
base_url = "https://astralis.example.com"
basurl = "typo"
"#;
        assert!(toml::from_str::<CirclConfig>(toml_str).is_err());
    }

    #[test]
    fn waitlist_defaults_to_disabled() {
        let config = CirclConfig::default();
        assert!(config.waitlist.supabase_url.is_none());
        assert!(config.waitlist.supabase_anon_key.is_none());
    }
}
