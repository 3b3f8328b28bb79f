// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session CRUD against the Astralis session service.

use circl_auth::AuthClient;
use circl_core::CirclError;
use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::types::{
    CreateSessionResponse, MessagesResponse, Session, SessionDto, StoredMessage,
};

/// Client for `{base}` session CRUD routes.
#[derive(Debug, Clone)]
pub struct SessionClient {
    auth: AuthClient,
    base_url: String,
}

impl SessionClient {
    /// Creates a new session client rooted at the session service URL.
    pub fn new(auth: AuthClient, base_url: String) -> Self {
        Self { auth, base_url }
    }

    /// Creates a session, optionally bound to a user, returning its server id.
    pub async fn create(&self, user_id: Option<&str>) -> Result<String, CirclError> {
        let body = serde_json::json!({ "user_id": user_id });
        let response = self
            .auth
            .send(Method::POST, &self.base_url, Some(body))
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CirclError::Api {
                message: format!("failed to create session ({status})"),
                source: None,
            });
        }

        let created: CreateSessionResponse =
            response.json().await.map_err(|e| CirclError::Api {
                message: format!("failed to parse create-session response: {e}"),
                source: Some(Box::new(e)),
            })?;

        debug!(session_id = %created.session_id, "session created");
        Ok(created.session_id)
    }

    /// Lists the authenticated user's sessions.
    pub async fn list(&self) -> Result<Vec<Session>, CirclError> {
        let response = self.auth.send(Method::GET, &self.base_url, None).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CirclError::Api {
                message: format!("failed to list sessions ({status})"),
                source: None,
            });
        }

        let dtos: Vec<SessionDto> = response.json().await.map_err(|e| CirclError::Api {
            message: format!("failed to parse session list: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(dtos.into_iter().map(Session::from).collect())
    }

    /// Loads the persisted messages of one session.
    ///
    /// A 404 degrades to an empty history: the session may be brand new or
    /// already deleted server-side, and either way the composer should open.
    pub async fn messages(&self, session_id: &str) -> Result<Vec<StoredMessage>, CirclError> {
        let url = format!("{}/{}/messages", self.base_url, session_id);
        let response = self.auth.send(Method::GET, &url, None).await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(CirclError::Api {
                message: format!("failed to load session messages ({status})"),
                source: None,
            });
        }

        let parsed: MessagesResponse = response.json().await.map_err(|e| CirclError::Api {
            message: format!("failed to parse session messages: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(parsed.messages.into_iter().map(StoredMessage::from).collect())
    }

    /// Deletes a session server-side.
    pub async fn delete(&self, session_id: &str) -> Result<(), CirclError> {
        let url = format!("{}/{}", self.base_url, session_id);
        let response = self.auth.send(Method::DELETE, &url, None).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CirclError::Api {
                message: format!("failed to delete session ({status})"),
                source: None,
            });
        }

        debug!(session_id, "session deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circl_auth::MemoryTokenStore;
    use circl_core::TokenPair;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn authed_client(base: &str) -> SessionClient {
        let store = Arc::new(MemoryTokenStore::with_pair(TokenPair {
            access_token: "acc-1".into(),
            refresh_token: Some("ref-1".into()),
        }));
        let auth = AuthClient::new(base.to_string(), store, Duration::from_secs(5)).unwrap();
        SessionClient::new(auth, base.to_string())
    }

    #[tokio::test]
    async fn create_returns_server_session_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_json(serde_json::json!({ "user_id": "u-1" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "session_id": "s-42" })),
            )
            .mount(&server)
            .await;

        let client = authed_client(&server.uri());
        let id = client.create(Some("u-1")).await.unwrap();
        assert_eq!(id, "s-42");
    }

    #[tokio::test]
    async fn list_maps_snake_case_sessions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "session_id": "s-1",
                    "user_id": "u-1",
                    "title": "ML engineers",
                    "created_at": "2026-03-01T12:00:00Z"
                },
                { "session_id": "s-2", "title": "", "created_at": "2026-03-02T08:30:00Z" }
            ])))
            .mount(&server)
            .await;

        let client = authed_client(&server.uri());
        let sessions = client.list().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_id.as_deref(), Some("s-1"));
        assert_eq!(sessions[0].title.as_deref(), Some("ML engineers"));
        assert!(sessions[1].title.is_none());
    }

    #[tokio::test]
    async fn messages_returns_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s-1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": [
                    {
                        "message_id": "m-1",
                        "session_id": "s-1",
                        "role": "user",
                        "content": "find ML engineers",
                        "created_at": "2026-03-01T12:00:00Z"
                    },
                    {
                        "message_id": "m-2",
                        "session_id": "s-1",
                        "role": "assistant",
                        "content": "Found three matches.",
                        "created_at": "2026-03-01T12:00:30Z"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = authed_client(&server.uri());
        let messages = client.messages("s-1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].content, "Found three matches.");
    }

    #[tokio::test]
    async fn messages_404_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone/messages"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = authed_client(&server.uri());
        let messages = client.messages("gone").await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn delete_succeeds_on_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/s-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = authed_client(&server.uri());
        assert!(client.delete("s-1").await.is_ok());
    }

    #[tokio::test]
    async fn delete_failure_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/s-1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = authed_client(&server.uri());
        assert!(matches!(
            client.delete("s-1").await.unwrap_err(),
            CirclError::Api { .. }
        ));
    }
}
