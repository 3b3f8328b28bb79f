// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Circl client.

use thiserror::Error;

/// The primary error type used across the Circl client crates.
#[derive(Debug, Error)]
pub enum CirclError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// No access token is available; the caller must log in before retrying.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication errors (token exchange failure, refresh failure, rejected credentials).
    #[error("authentication error: {message}")]
    Auth {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transport errors (connection failure, request build failure, body read failure).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Server-reported application errors (non-2xx responses, in-stream error frames).
    #[error("api error: {message}")]
    Api {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Waitlist backend errors (duplicate email, invalid referral code, code exhaustion).
    #[error("waitlist error: {message}")]
    Waitlist {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CirclError {
    /// True for errors that should send the caller back to the login flow.
    pub fn is_auth(&self) -> bool {
        matches!(self, CirclError::AuthRequired | CirclError::Auth { .. })
    }
}
