// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat controller: the single writer over [`ChatState`].
//!
//! Composes the search and session clients with the reducer. Constructed
//! once with its dependencies injected -- there are no module-level
//! service singletons -- and shared by reference with whatever drives it.
//!
//! One send is modeled at a time: a second `send_message` while one is in
//! flight is rejected by a busy-guard. The loading flag is cleared on
//! every exit path; partial progress applied before a failure stays
//! visible.

use std::sync::Arc;

use circl_astralis::{AstralisClient, FoundUser, Session, SessionClient};
use circl_core::{CirclError, CorrelationId};
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::message::DraftMessage;
use crate::phase::SendPhase;
use crate::store::ChatState;

/// Maximum characters of the first message used as a session title.
const TITLE_PREFIX_LEN: usize = 50;

/// Callback receiving the full accumulated found-users list after every
/// `users_found` frame. Each call is the authoritative current set.
pub type FoundUsersObserver = Arc<dyn Fn(&[FoundUser]) + Send + Sync>;

/// Drives sends and session operations against one [`ChatState`].
pub struct ChatController {
    search: AstralisClient,
    session_api: SessionClient,
    state: Arc<Mutex<ChatState>>,
    observer: Option<FoundUsersObserver>,
    user_id: Option<String>,
}

impl ChatController {
    pub fn new(search: AstralisClient, session_api: SessionClient) -> Self {
        Self {
            search,
            session_api,
            state: Arc::new(Mutex::new(ChatState::new())),
            observer: None,
            user_id: None,
        }
    }

    /// Binds the controller to a user id used when creating sessions.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Registers the found-users snapshot callback.
    pub fn with_found_users_observer(mut self, observer: FoundUsersObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Shared state handle for render layers. All writes happen here.
    pub fn state(&self) -> Arc<Mutex<ChatState>> {
        Arc::clone(&self.state)
    }

    /// Sends one message and consumes its stream to completion.
    ///
    /// Appends the user message immediately, titles the session from its
    /// first message, then applies each streamed frame in arrival order.
    /// The caller gets the server's message as the error when the stream
    /// reports one.
    pub async fn send_message(&self, session_id: &str, text: &str) -> Result<(), CirclError> {
        {
            let mut state = self.state.lock().await;
            if state.is_loading {
                return Err(CirclError::Internal("a send is already in flight".into()));
            }
            state.is_loading = true;
            state.phase = SendPhase::Sending;

            let first_message = state.messages.is_empty();
            state.push_user_message(session_id, text);
            if first_message {
                state.set_title_once(session_id, derive_title(text));
            }
        }

        let correlation = CorrelationId::generate();
        debug!(session_id, %correlation, "send started");
        let result = self.drive_stream(session_id, text, &correlation).await;

        {
            let mut state = self.state.lock().await;
            state.is_loading = false;
            state.phase = match &result {
                Ok(()) => SendPhase::Completed,
                Err(_) => SendPhase::Errored,
            };
        }

        result
    }

    async fn drive_stream(
        &self,
        session_id: &str,
        text: &str,
        correlation: &CorrelationId,
    ) -> Result<(), CirclError> {
        let mut stream = self.search.query(session_id, text).await?;
        self.state.lock().await.phase = SendPhase::Streaming;

        while let Some(item) = stream.next().await {
            let frame = item?;
            let users_changed = {
                let mut state = self.state.lock().await;
                state.apply_frame(session_id, correlation, frame)
            };
            if users_changed {
                if let Some(observer) = &self.observer {
                    let snapshot = self.state.lock().await.found_users.clone();
                    observer(&snapshot);
                }
            }
        }
        Ok(())
    }

    /// Fetches the user's sessions and merges them into the local list.
    ///
    /// Network and server failures degrade to the locally known list (a
    /// fresh client shows "no sessions") rather than surfacing an error;
    /// only auth failures propagate, since those need the login flow.
    pub async fn load_sessions(&self) -> Result<(), CirclError> {
        match self.session_api.list().await {
            Ok(fetched) => {
                self.state.lock().await.merge_loaded(fetched);
                Ok(())
            }
            Err(e) if e.is_auth() => Err(e),
            Err(e) => {
                warn!(error = %e, "failed to load sessions, keeping local list");
                Ok(())
            }
        }
    }

    /// Makes a session active and reloads its history from the server.
    pub async fn select_session(&self, session_id: &str) -> Result<(), CirclError> {
        self.state.lock().await.select_session(session_id);
        let history = self.session_api.messages(session_id).await?;
        self.state.lock().await.load_history(history);
        Ok(())
    }

    /// Registers a freshly created session locally and makes it active,
    /// titled after the query that spawned it. Used when the composer
    /// hands off to a new chat tab; no history reload is needed.
    pub async fn open_session_tab(&self, session_id: &str, query: &str) {
        let mut state = self.state.lock().await;
        state.add_session(Session {
            session_id: Some(session_id.to_string()),
            user_id: self.user_id.clone(),
            title: Some(derive_title(query)),
            created_at: chrono::Utc::now(),
        });
        state.select_session(session_id);
        state.messages.clear();
    }

    /// Clears the active session for a fresh composer view. The session
    /// list is left untouched.
    pub async fn new_session(&self) {
        self.state.lock().await.clear_active();
    }

    /// Creates a session server-side, returning its id.
    pub async fn create_session(&self) -> Result<String, CirclError> {
        self.session_api.create(self.user_id.as_deref()).await
    }

    /// Optimistically removes a session locally, then best-effort deletes
    /// it server-side. A failed server delete is logged, not reconciled.
    pub async fn delete_session(&self, session_id: &str) -> Result<(), CirclError> {
        self.state.lock().await.remove_session(session_id);
        if let Err(e) = self.session_api.delete(session_id).await {
            warn!(session_id, error = %e, "server-side session delete failed");
        }
        Ok(())
    }

    /// Requests a summary for a query within a session.
    pub async fn summarize(&self, session_id: &str, query: &str) -> Result<String, CirclError> {
        self.search.summarize(session_id, query).await
    }

    /// Snapshot of the in-memory messages.
    pub async fn messages(&self) -> Vec<DraftMessage> {
        self.state.lock().await.messages.clone()
    }

    /// Snapshot of the session list, newest first.
    pub async fn sessions(&self) -> Vec<Session> {
        self.state.lock().await.sessions.clone()
    }

    /// Snapshot of the accumulated found users.
    pub async fn found_users(&self) -> Vec<FoundUser> {
        self.state.lock().await.found_users.clone()
    }
}

/// First `TITLE_PREFIX_LEN` characters of the message, ellipsized.
fn derive_title(text: &str) -> String {
    let prefix: String = text.chars().take(TITLE_PREFIX_LEN).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use circl_auth::{AuthClient, MemoryTokenStore};
    use circl_core::TokenPair;
    use circl_test_utils::{MockAstralis, end_frame, error_frame, text_frame, users_found_frame};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn controller_for(base: &str) -> ChatController {
        let store = Arc::new(MemoryTokenStore::with_pair(TokenPair {
            access_token: "acc-1".into(),
            refresh_token: Some("ref-1".into()),
        }));
        let auth = AuthClient::new(base.to_string(), store, Duration::from_secs(5)).unwrap();
        let search = AstralisClient::new(auth.clone(), base.to_string());
        let sessions = SessionClient::new(auth, base.to_string());
        ChatController::new(search, sessions).with_user("u-1")
    }

    #[tokio::test]
    async fn send_accumulates_thought_and_response_separately() {
        let mock = MockAstralis::start().await;
        mock.mount_query(&[
            text_frame("thought", "Analyz"),
            text_frame("thought", "ing "),
            text_frame("thought", "query"),
            text_frame("response", "Found "),
            text_frame("response", "3 matches."),
            end_frame(),
        ])
        .await;

        let controller = controller_for(&mock.uri());
        controller.open_session_tab("s-1", "find ML engineers").await;
        controller.send_message("s-1", "find ML engineers").await.unwrap();

        let messages = controller.messages().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "find ML engineers");
        assert_eq!(messages[1].thinking_text, "Analyzing query");
        assert!(messages[1].is_thinking);
        assert_eq!(messages[2].content, "Found 3 matches.");

        let state = controller.state();
        let state = state.lock().await;
        assert!(!state.is_loading);
        assert_eq!(state.phase, SendPhase::Completed);
    }

    #[tokio::test]
    async fn found_users_observer_sees_growing_snapshots() {
        let mock = MockAstralis::start().await;
        mock.mount_query(&[
            users_found_frame(serde_json::json!({"name": "a"})),
            users_found_frame(serde_json::json!({"name": "b"})),
            users_found_frame(serde_json::json!({"name": "c"})),
            end_frame(),
        ])
        .await;

        let lengths = Arc::new(std::sync::Mutex::new(Vec::new()));
        let observed = Arc::clone(&lengths);
        let observer: FoundUsersObserver = Arc::new(move |users: &[FoundUser]| {
            observed.lock().unwrap().push(users.len());
        });

        let controller = controller_for(&mock.uri()).with_found_users_observer(observer);
        controller.open_session_tab("s-1", "anyone").await;
        controller.send_message("s-1", "anyone").await.unwrap();

        assert_eq!(*lengths.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(controller.found_users().await.len(), 3);
    }

    #[tokio::test]
    async fn error_frame_fails_send_but_keeps_partial_progress() {
        let mock = MockAstralis::start().await;
        mock.mount_query(&[
            text_frame("thought", "halfway"),
            error_frame("boom"),
            text_frame("response", "never applied"),
        ])
        .await;

        let controller = controller_for(&mock.uri());
        controller.open_session_tab("s-1", "query").await;
        let err = controller.send_message("s-1", "query").await.unwrap_err();
        assert!(err.to_string().contains("boom"), "got: {err}");

        let messages = controller.messages().await;
        // User message plus the partially accumulated thought survive.
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].thinking_text, "halfway");

        let state = controller.state();
        let state = state.lock().await;
        assert!(!state.is_loading, "loading flag must clear on error paths");
        assert_eq!(state.phase, SendPhase::Errored);
    }

    #[tokio::test]
    async fn busy_guard_rejects_second_send_in_flight() {
        let mock = MockAstralis::start().await;
        let controller = controller_for(&mock.uri());
        controller.state().lock().await.is_loading = true;

        let err = controller.send_message("s-1", "query").await.unwrap_err();
        assert!(matches!(err, CirclError::Internal(_)));
    }

    #[tokio::test]
    async fn first_send_titles_the_session_once() {
        let mock = MockAstralis::start().await;
        mock.mount_query(&[end_frame()]).await;

        let controller = controller_for(&mock.uri());
        // Session known locally but still untitled.
        controller.state().lock().await.add_session(Session {
            session_id: Some("s-1".into()),
            user_id: None,
            title: None,
            created_at: chrono::Utc::now(),
        });
        controller.state().lock().await.select_session("s-1");

        let long_query = "q".repeat(80);
        controller.send_message("s-1", &long_query).await.unwrap();

        let sessions = controller.sessions().await;
        let title = sessions[0].title.clone().unwrap();
        assert_eq!(title, format!("{}...", "q".repeat(50)));
    }

    #[tokio::test]
    async fn load_sessions_degrades_to_local_list_on_server_failure() {
        let mock = MockAstralis::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(mock.server())
            .await;

        let controller = controller_for(&mock.uri());
        controller.load_sessions().await.unwrap();
        assert!(controller.sessions().await.is_empty());
    }

    #[tokio::test]
    async fn load_sessions_merges_and_orders_server_list() {
        let mock = MockAstralis::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "session_id": "old", "created_at": "2026-03-01T00:00:00Z" },
                { "session_id": "new", "created_at": "2026-03-03T00:00:00Z" },
                { "session_id": "mid", "created_at": "2026-03-02T00:00:00Z" }
            ])))
            .mount(mock.server())
            .await;

        let controller = controller_for(&mock.uri());
        controller.load_sessions().await.unwrap();

        let ids: Vec<_> = controller
            .sessions()
            .await
            .iter()
            .map(|s| s.session_id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn select_session_reloads_history_from_server() {
        let mock = MockAstralis::start().await;
        Mock::given(method("GET"))
            .and(path("/s-1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": [
                    { "message_id": "m-1", "role": "user", "content": "hello",
                      "created_at": "2026-03-01T00:00:00Z" }
                ]
            })))
            .mount(mock.server())
            .await;

        let controller = controller_for(&mock.uri());
        controller.select_session("s-1").await.unwrap();

        let messages = controller.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "hello");
    }

    #[tokio::test]
    async fn delete_session_is_optimistic_despite_server_failure() {
        let mock = MockAstralis::start().await;
        Mock::given(method("DELETE"))
            .and(path("/s-1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(mock.server())
            .await;

        let controller = controller_for(&mock.uri());
        controller.open_session_tab("s-1", "query").await;
        assert_eq!(controller.sessions().await.len(), 1);

        controller.delete_session("s-1").await.unwrap();
        assert!(controller.sessions().await.is_empty());

        let state = controller.state();
        let state = state.lock().await;
        assert!(state.active_session_id.is_none());
    }

    #[tokio::test]
    async fn open_session_tab_titles_and_activates() {
        let mock = MockAstralis::start().await;
        let controller = controller_for(&mock.uri());
        controller.open_session_tab("s-9", "short query").await;

        let state = controller.state();
        let state = state.lock().await;
        assert_eq!(state.active_session_id.as_deref(), Some("s-9"));
        assert_eq!(state.sessions[0].title.as_deref(), Some("short query..."));
        assert!(state.messages.is_empty());
    }
}
