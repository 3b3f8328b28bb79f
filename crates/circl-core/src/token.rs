// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token storage seam between the auth layer and its callers.
//!
//! The web client kept tokens in browser local storage; here the same
//! contract is a trait so the HTTP clients can be tested with an
//! in-memory fake and the CLI can persist to disk.

use serde::{Deserialize, Serialize};

/// An access/refresh token pair issued by the auth backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    /// Refresh responses may omit a new refresh token; `None` keeps the
    /// previously stored one.
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Credential storage used by every authenticated request.
///
/// Implementations must be safe to share across concurrent requests;
/// all methods take `&self`.
pub trait TokenStore: Send + Sync {
    /// Returns the current access token, if any.
    fn access_token(&self) -> Option<String>;

    /// Returns the current refresh token, if any.
    fn refresh_token(&self) -> Option<String>;

    /// Stores a new token pair. A pair without a refresh token keeps the
    /// existing refresh token in place.
    fn store(&self, pair: TokenPair);

    /// Removes all stored credentials.
    fn clear(&self);
}
