// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Waitlist client over the Supabase REST (PostgREST) API.
//!
//! Two tables: `waitlist` (email, used_code) and `referral_codes`
//! (code, owner_waitlist_id, uses). Signing up checks for a duplicate
//! email, validates and increments an optional referral code, inserts the
//! entry, then mints the new member's own referral code with a bounded
//! collision-checked retry.

use circl_core::CirclError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use crate::code;

/// Maximum attempts to find an unused referral code.
const MAX_CODE_ATTEMPTS: u32 = 10;

/// One accepted waitlist entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WaitlistEntry {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub used_code: Option<String>,
}

/// Result of a successful signup.
#[derive(Debug, Clone)]
pub struct WaitlistSignup {
    pub entry: WaitlistEntry,
    /// The referral code minted for the new member.
    pub referral_code: String,
}

#[derive(Debug, Deserialize)]
struct CodeRow {
    #[serde(default)]
    uses: Option<i64>,
}

/// Client for the hosted waitlist backend.
#[derive(Debug, Clone)]
pub struct WaitlistClient {
    http: reqwest::Client,
    base_url: String,
}

impl WaitlistClient {
    /// Creates a waitlist client for a Supabase project.
    ///
    /// The anon key rides on every request as both `apikey` and bearer,
    /// per Supabase REST conventions.
    pub fn new(supabase_url: String, anon_key: &str) -> Result<Self, CirclError> {
        let mut headers = HeaderMap::new();
        let key_value = HeaderValue::from_str(anon_key).map_err(|e| {
            CirclError::Config(format!("invalid supabase anon key header value: {e}"))
        })?;
        headers.insert("apikey", key_value.clone());
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {anon_key}")).map_err(|e| {
                CirclError::Config(format!("invalid supabase anon key header value: {e}"))
            })?;
        bearer.set_sensitive(true);
        headers.insert("authorization", bearer);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| CirclError::Waitlist {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            base_url: supabase_url.trim_end_matches('/').to_string(),
        })
    }

    /// Signs an email up, optionally crediting a referral code.
    pub async fn join(
        &self,
        email: &str,
        referral_code: Option<&str>,
    ) -> Result<WaitlistSignup, CirclError> {
        if self.email_registered(email).await? {
            return Err(CirclError::Waitlist {
                message: format!("{email} is already on the waitlist"),
                source: None,
            });
        }

        if let Some(code) = referral_code {
            self.credit_referral(code).await?;
        }

        let entry = self.insert_entry(email, referral_code).await?;
        let new_code = self.generate_unique_code(email).await?;
        self.insert_referral_code(&new_code, entry.id).await?;

        debug!(email, referral_code = %new_code, "waitlist signup complete");
        Ok(WaitlistSignup {
            entry,
            referral_code: new_code,
        })
    }

    async fn email_registered(&self, email: &str) -> Result<bool, CirclError> {
        let url = format!("{}/rest/v1/waitlist", self.base_url);
        let filter = format!("eq.{email}");
        let response = self
            .http
            .get(&url)
            .query(&[("select", "email"), ("email", filter.as_str())])
            .send()
            .await
            .map_err(waitlist_transport)?;

        let rows: Vec<serde_json::Value> = read_rows(response, "email lookup").await?;
        Ok(!rows.is_empty())
    }

    /// Validates a referral code and increments its use counter.
    async fn credit_referral(&self, code: &str) -> Result<(), CirclError> {
        let url = format!("{}/rest/v1/referral_codes", self.base_url);
        let filter = format!("eq.{code}");
        let response = self
            .http
            .get(&url)
            .query(&[("select", "uses"), ("code", filter.as_str())])
            .send()
            .await
            .map_err(waitlist_transport)?;

        let rows: Vec<CodeRow> = read_rows(response, "referral code lookup").await?;
        let Some(row) = rows.first() else {
            return Err(CirclError::Waitlist {
                message: format!("invalid referral code `{code}`"),
                source: None,
            });
        };

        let uses = row.uses.unwrap_or(0) + 1;
        let response = self
            .http
            .patch(&url)
            .query(&[("code", filter.as_str())])
            .json(&serde_json::json!({ "uses": uses }))
            .send()
            .await
            .map_err(waitlist_transport)?;

        ensure_success(response, "referral code update").await?;
        debug!(code, uses, "referral code credited");
        Ok(())
    }

    async fn insert_entry(
        &self,
        email: &str,
        used_code: Option<&str>,
    ) -> Result<WaitlistEntry, CirclError> {
        let url = format!("{}/rest/v1/waitlist", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("prefer", "return=representation")
            .json(&serde_json::json!({ "email": email, "used_code": used_code }))
            .send()
            .await
            .map_err(waitlist_transport)?;

        let mut rows: Vec<WaitlistEntry> = read_rows(response, "waitlist insert").await?;
        rows.pop().ok_or_else(|| CirclError::Waitlist {
            message: "waitlist insert returned no row".into(),
            source: None,
        })
    }

    async fn insert_referral_code(&self, code: &str, owner_id: i64) -> Result<(), CirclError> {
        let url = format!("{}/rest/v1/referral_codes", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "code": code,
                "owner_waitlist_id": owner_id,
                "uses": 0,
            }))
            .send()
            .await
            .map_err(waitlist_transport)?;

        ensure_success(response, "referral code insert").await
    }

    /// Mints a collision-checked referral code, bounded at
    /// [`MAX_CODE_ATTEMPTS`] tries.
    async fn generate_unique_code(&self, email: &str) -> Result<String, CirclError> {
        for attempt in 0..MAX_CODE_ATTEMPTS {
            let candidate = code::candidate(
                email,
                chrono::Utc::now().timestamp_millis(),
                &mut rand::thread_rng(),
            );
            if self.code_available(&candidate).await? {
                return Ok(candidate);
            }
            debug!(attempt, candidate, "referral code collision, retrying");
        }
        Err(CirclError::Waitlist {
            message: format!("unable to generate a unique referral code after {MAX_CODE_ATTEMPTS} attempts"),
            source: None,
        })
    }

    async fn code_available(&self, candidate: &str) -> Result<bool, CirclError> {
        let url = format!("{}/rest/v1/referral_codes", self.base_url);
        let filter = format!("eq.{candidate}");
        let response = self
            .http
            .get(&url)
            .query(&[("select", "code"), ("code", filter.as_str())])
            .send()
            .await
            .map_err(waitlist_transport)?;

        let rows: Vec<serde_json::Value> = read_rows(response, "code collision check").await?;
        Ok(rows.is_empty())
    }
}

async fn ensure_success(response: reqwest::Response, what: &str) -> Result<(), CirclError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(CirclError::Waitlist {
        message: format!("{what} failed ({status}): {body}"),
        source: None,
    })
}

async fn read_rows<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<Vec<T>, CirclError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CirclError::Waitlist {
            message: format!("{what} failed ({status}): {body}"),
            source: None,
        });
    }
    response.json().await.map_err(|e| CirclError::Waitlist {
        message: format!("{what} returned an unexpected body: {e}"),
        source: Some(Box::new(e)),
    })
}

fn waitlist_transport(e: reqwest::Error) -> CirclError {
    CirclError::Waitlist {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}
