// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Astralis search service.
//!
//! Provides [`AstralisClient`] for the two search operations: the
//! streaming query endpoint and the non-streaming summarize endpoint.
//! Every request goes through the auth layer, so the 401-refresh-retry
//! policy applies uniformly.

use circl_auth::AuthClient;
use circl_core::CirclError;
use reqwest::Method;
use tracing::debug;

use crate::stream::{FrameStream, parse_frame_stream};
use crate::types::SummarizeResponse;

/// Client for `{base}/query` and `{base}/summarize`.
#[derive(Debug, Clone)]
pub struct AstralisClient {
    auth: AuthClient,
    base_url: String,
}

impl AstralisClient {
    /// Creates a new search client rooted at the Astralis service URL.
    pub fn new(auth: AuthClient, base_url: String) -> Self {
        Self { auth, base_url }
    }

    /// Issues a streaming query and returns the typed frame stream.
    ///
    /// The caller consumes frames in arrival order until the stream ends
    /// (an `end` frame or transport EOF) or fails (an `error` frame, a
    /// transport error).
    pub async fn query(&self, session_id: &str, query: &str) -> Result<FrameStream, CirclError> {
        let url = format!("{}/query", self.base_url);
        let body = serde_json::json!({ "query": query, "session_id": session_id });

        let response = self.auth.send(Method::POST, &url, Some(body)).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CirclError::Api {
                message: format!("query failed ({status}): {body}"),
                source: None,
            });
        }

        debug!(session_id, "query stream opened");
        Ok(parse_frame_stream(response))
    }

    /// Requests a summary of a query within a session.
    pub async fn summarize(&self, session_id: &str, query: &str) -> Result<String, CirclError> {
        let url = format!("{}/summarize", self.base_url);
        let body = serde_json::json!({ "query": query, "session_id": session_id });

        let response = self.auth.send(Method::POST, &url, Some(body)).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CirclError::Api {
                message: format!("summarize failed ({status}): {body}"),
                source: None,
            });
        }

        let parsed: SummarizeResponse = response.json().await.map_err(|e| CirclError::Api {
            message: format!("failed to parse summarize response: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(parsed.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::StreamFrame;
    use circl_auth::MemoryTokenStore;
    use circl_core::TokenPair;
    use circl_test_utils::{MockAstralis, end_frame, error_frame, text_frame, users_found_frame};
    use futures::StreamExt;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn authed_client(base: &str) -> AstralisClient {
        let store = Arc::new(MemoryTokenStore::with_pair(TokenPair {
            access_token: "acc-1".into(),
            refresh_token: Some("ref-1".into()),
        }));
        let auth = AuthClient::new(base.to_string(), store, Duration::from_secs(5)).unwrap();
        AstralisClient::new(auth, base.to_string())
    }

    #[tokio::test]
    async fn query_yields_typed_frames_in_order() {
        let mock = MockAstralis::start().await;
        mock.mount_query(&[
            text_frame("thought", "Analyzing "),
            text_frame("thought", "your request"),
            users_found_frame(serde_json::json!({"name": "Sarah Chen"})),
            text_frame("response", "Found one match."),
            end_frame(),
        ])
        .await;

        let client = authed_client(&mock.uri());
        let frames: Vec<StreamFrame> = client
            .query("s-1", "data scientists in SF")
            .await
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0], StreamFrame::Thought("Analyzing ".into()));
        assert_eq!(frames[1], StreamFrame::Thought("your request".into()));
        assert!(matches!(&frames[2], StreamFrame::UsersFound(users) if users.len() == 1));
        assert_eq!(frames[3], StreamFrame::Response("Found one match.".into()));
    }

    #[tokio::test]
    async fn query_error_frame_rejects_with_server_message() {
        let mock = MockAstralis::start().await;
        mock.mount_query(&[text_frame("thought", "working"), error_frame("boom")])
            .await;

        let client = authed_client(&mock.uri());
        let mut stream = client.query("s-1", "anything").await.unwrap();

        assert!(stream.next().await.unwrap().is_ok());
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(err.to_string().contains("boom"), "got: {err}");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn query_http_failure_is_api_error() {
        let mock = MockAstralis::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
            .mount(mock.server())
            .await;

        let client = authed_client(&mock.uri());
        let err = client.query("s-1", "anything").await.err().unwrap();
        match err {
            CirclError::Api { message, .. } => {
                assert!(message.contains("500"), "got: {message}");
            }
            other => panic!("expected Api error, got {other}"),
        }
    }

    #[tokio::test]
    async fn query_without_credentials_fails_before_network() {
        let mock = MockAstralis::start().await;
        let store = Arc::new(MemoryTokenStore::new());
        let auth = AuthClient::new(mock.uri(), store, Duration::from_secs(5)).unwrap();
        let client = AstralisClient::new(auth, mock.uri());

        let err = client.query("s-1", "anything").await.err().unwrap();
        assert!(matches!(err, CirclError::AuthRequired));
    }

    #[tokio::test]
    async fn summarize_returns_summary_text() {
        let mock = MockAstralis::start().await;
        mock.mount_summarize("Three ML engineers, all in Berlin.").await;

        let client = authed_client(&mock.uri());
        let summary = client.summarize("s-1", "ML engineers").await.unwrap();
        assert_eq!(summary, "Three ML engineers, all in Berlin.");
    }

    #[tokio::test]
    async fn summarize_http_failure_is_api_error() {
        let mock = MockAstralis::start().await;
        Mock::given(method("POST"))
            .and(path("/summarize"))
            .respond_with(ResponseTemplate::new(502))
            .mount(mock.server())
            .await;

        let client = authed_client(&mock.uri());
        let err = client.summarize("s-1", "anything").await.unwrap_err();
        assert!(matches!(err, CirclError::Api { .. }));
    }
}
