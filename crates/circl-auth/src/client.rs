// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Circl auth service.
//!
//! Provides [`AuthClient`] which handles the Google id_token exchange,
//! token validation, single-flight refresh, and the authenticated-request
//! capability used by every other client in the workspace: attach bearer,
//! on 401 refresh exactly once and retry the original request once, on
//! refresh failure clear stored credentials.

use std::sync::Arc;
use std::time::Duration;

use circl_core::{CirclError, TokenPair, TokenStore};
use reqwest::{Method, StatusCode, header::HeaderMap, header::HeaderValue};
use tracing::{debug, warn};

use crate::types::{LoginResponse, RefreshResponse, UserProfile};

/// Client for the auth service plus bearer-authenticated requests to any URL.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    /// Serializes refresh attempts so concurrent 401s trigger one refresh.
    refresh_lock: Arc<tokio::sync::Mutex<()>>,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.store.access_token().is_some())
            .finish()
    }
}

impl AuthClient {
    /// Creates a new auth client.
    ///
    /// # Arguments
    /// * `base_url` - auth service root, e.g. `https://api.circl.app/auth`
    /// * `store` - credential storage shared with the rest of the process
    /// * `timeout` - per-request timeout (generous: streamed responses pass
    ///   through this client too)
    pub fn new(
        base_url: String,
        store: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> Result<Self, CirclError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CirclError::Auth {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            base_url,
            store,
            refresh_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// True when an access token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.store.access_token().is_some()
    }

    /// Removes all stored credentials.
    pub fn logout(&self) {
        self.store.clear();
    }

    /// Exchanges a Google OIDC id_token for an application token pair.
    ///
    /// On success the pair is persisted and the user profile returned.
    pub async fn login_with_google(&self, id_token: &str) -> Result<UserProfile, CirclError> {
        let url = format!("{}/google/log-in", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "token": id_token }))
            .send()
            .await
            .map_err(transport_err)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CirclError::Auth {
                message: format!("log-in failed ({status}): {body}"),
                source: None,
            });
        }

        let login: LoginResponse = response.json().await.map_err(|e| CirclError::Auth {
            message: format!("failed to parse log-in response: {e}"),
            source: Some(Box::new(e)),
        })?;

        self.store.store(TokenPair {
            access_token: login.access_token,
            refresh_token: Some(login.refresh_token),
        });

        debug!(email = %login.user.email, "log-in token exchange complete");
        Ok(login.user)
    }

    /// Validates the stored access token against the auth service.
    ///
    /// A rejected token clears stored credentials, so the caller can fall
    /// back to the login flow.
    pub async fn validate(&self) -> Result<UserProfile, CirclError> {
        let token = self.store.access_token().ok_or(CirclError::AuthRequired)?;
        let url = format!("{}/validate", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(transport_err)?;

        let status = response.status();
        if !status.is_success() {
            self.store.clear();
            return Err(CirclError::Auth {
                message: format!("stored credentials rejected ({status})"),
                source: None,
            });
        }

        response.json().await.map_err(|e| CirclError::Auth {
            message: format!("failed to parse validate response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Sends a bearer-authenticated request to `url`.
    ///
    /// Fails with [`CirclError::AuthRequired`] before any network traffic if
    /// no access token is stored. On a 401 the token is refreshed exactly
    /// once and the request retried once; the retried response is returned
    /// as-is. On refresh failure credentials are cleared.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, CirclError> {
        let token = self.store.access_token().ok_or(CirclError::AuthRequired)?;

        let response = self
            .request(method.clone(), url, body.as_ref(), &token)
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(url, "401 received, attempting token refresh");
        self.refresh_once(&token).await?;

        let token = self.store.access_token().ok_or(CirclError::AuthRequired)?;
        self.request(method, url, body.as_ref(), &token).await
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        token: &str,
    ) -> Result<reqwest::Response, CirclError> {
        let mut builder = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder.send().await.map_err(transport_err)
    }

    /// Refreshes the token pair, serialized behind a mutex.
    ///
    /// `stale` is the access token that just got a 401: if another task
    /// already replaced it while we waited for the lock, the refresh is
    /// skipped and the new token used directly.
    async fn refresh_once(&self, stale: &str) -> Result<(), CirclError> {
        let _guard = self.refresh_lock.lock().await;

        if self.store.access_token().as_deref() != Some(stale) {
            debug!("token already refreshed by a concurrent request");
            return Ok(());
        }

        let refresh_token = match self.store.refresh_token() {
            Some(t) => t,
            None => {
                self.store.clear();
                return Err(CirclError::Auth {
                    message: "no refresh token available".into(),
                    source: None,
                });
            }
        };

        let url = format!("{}/refresh", self.base_url);
        let result = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                self.store.clear();
                return Err(CirclError::Auth {
                    message: format!("token refresh failed: {e}"),
                    source: Some(Box::new(e)),
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            self.store.clear();
            warn!(status = %status, "token refresh rejected, credentials cleared");
            return Err(CirclError::Auth {
                message: format!("token refresh failed ({status})"),
                source: None,
            });
        }

        let refreshed: RefreshResponse = match response.json().await {
            Ok(r) => r,
            Err(e) => {
                self.store.clear();
                return Err(CirclError::Auth {
                    message: format!("failed to parse refresh response: {e}"),
                    source: Some(Box::new(e)),
                });
            }
        };

        self.store.store(TokenPair {
            access_token: refreshed.access_token,
            refresh_token: refreshed.refresh_token,
        });
        debug!("token refresh complete");
        Ok(())
    }
}

fn transport_err(e: reqwest::Error) -> CirclError {
    CirclError::Transport {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}
