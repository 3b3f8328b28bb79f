// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat state: the ordered session list, the active-session pointer, and
//! the in-memory message/result lists for the active session.
//!
//! All writes go through one owner (the controller); the render layer
//! only ever reads snapshots. Sessions are kept sorted by creation time,
//! newest first, and re-sorted on every insert to tolerate out-of-order
//! arrivals from concurrent loads.

use circl_astralis::{FoundUser, Session};
use tracing::debug;

use crate::message::DraftMessage;
use crate::phase::SendPhase;

/// The whole client-side chat state.
#[derive(Debug, Default)]
pub struct ChatState {
    /// All known sessions, newest first.
    pub sessions: Vec<Session>,
    /// At most one session is active at a time.
    pub active_session_id: Option<String>,
    /// In-memory messages of the active session only.
    pub messages: Vec<DraftMessage>,
    /// Profiles surfaced by the current search, in arrival order.
    /// Deliberately not deduplicated.
    pub found_users: Vec<FoundUser>,
    /// Last informational status line from the stream.
    pub status: Option<String>,
    /// True while a send operation is in flight.
    pub is_loading: bool,
    /// Phase of the outstanding (or last) send.
    pub phase: SendPhase,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a session at the head, then re-sorts the full list by
    /// `created_at` descending.
    pub fn add_session(&mut self, session: Session) {
        self.sessions.insert(0, session);
        self.sort_sessions();
    }

    /// Merges a freshly fetched session list into the local one.
    ///
    /// Keyed by `session_id`; for colliding entries each fetched field
    /// wins when present, while locally known values fill fields the
    /// server has not populated yet (a title still pending, say). Local
    /// sessions the server does not know are kept.
    pub fn merge_loaded(&mut self, fetched: Vec<Session>) {
        let mut merged = fetched;

        for local in self.sessions.drain(..) {
            match merged
                .iter_mut()
                .find(|s| s.session_id.is_some() && s.session_id == local.session_id)
            {
                Some(remote) => {
                    if remote.title.is_none() {
                        remote.title = local.title;
                    }
                    if remote.user_id.is_none() {
                        remote.user_id = local.user_id;
                    }
                }
                None => merged.push(local),
            }
        }

        self.sessions = merged;
        self.sort_sessions();
    }

    /// Makes a session active, clearing transient search-result state.
    /// History reload is the caller's responsibility.
    pub fn select_session(&mut self, session_id: &str) {
        self.active_session_id = Some(session_id.to_string());
        self.found_users.clear();
        self.status = None;
        debug!(session_id, "session selected");
    }

    /// Optimistically removes a session from the local list. If it was
    /// active, the active pointer and in-memory messages are cleared too.
    pub fn remove_session(&mut self, session_id: &str) {
        self.sessions
            .retain(|s| s.session_id.as_deref() != Some(session_id));
        if self.active_session_id.as_deref() == Some(session_id) {
            self.active_session_id = None;
            self.messages.clear();
            self.found_users.clear();
        }
    }

    /// Clears the active session and its in-memory state, leaving the
    /// session list untouched. This is the "new chat" operation.
    pub fn clear_active(&mut self) {
        self.active_session_id = None;
        self.messages.clear();
        self.found_users.clear();
        self.status = None;
    }

    /// Sets a session's title only while it is still empty; once set, a
    /// title is never replaced (and never reverts to empty).
    pub fn set_title_once(&mut self, session_id: &str, title: String) {
        if let Some(session) = self
            .sessions
            .iter_mut()
            .find(|s| s.session_id.as_deref() == Some(session_id))
        {
            if session.title.is_none() {
                session.title = Some(title);
            }
        }
    }

    fn sort_sessions(&mut self) {
        self.sessions
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
}
