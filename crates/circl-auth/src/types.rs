// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auth wire types.
//!
//! The auth service speaks camelCase JSON; these structs are the only
//! place that spelling appears.

use serde::{Deserialize, Serialize};

/// Profile of the authenticated user as returned by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "userID", default)]
    pub user_id: Option<String>,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(rename = "pfpURL", default)]
    pub pfp_url: Option<String>,
}

/// Response body of `POST {auth}/google/log-in`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub user: UserProfile,
}

/// Response body of `POST {auth}/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// The service may rotate the refresh token; absent means keep the old one.
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_deserializes_camel_case() {
        let json = r#"{
            "accessToken": "acc-1",
            "refreshToken": "ref-1",
            "user": {
                "userID": "u-1",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "summary": "analyst",
                "pfpURL": "https://cdn.example.com/ada.png"
            }
        }"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "acc-1");
        assert_eq!(resp.user.user_id.as_deref(), Some("u-1"));
        assert_eq!(resp.user.pfp_url.as_deref(), Some("https://cdn.example.com/ada.png"));
    }

    #[test]
    fn refresh_response_tolerates_missing_rotation() {
        let resp: RefreshResponse =
            serde_json::from_str(r#"{"accessToken": "acc-2"}"#).unwrap();
        assert_eq!(resp.access_token, "acc-2");
        assert!(resp.refresh_token.is_none());
    }
}
