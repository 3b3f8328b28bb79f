// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming-message reducer.
//!
//! Applies typed frames to the in-memory message list. Assistant content
//! arrives as fragments, not whole messages, so each frame either extends
//! an existing draft (matched by its [`StreamKey`]) or creates one. The
//! thought and response variants of one request are distinct drafts under
//! the same correlation id.
//!
//! Partial progress is never rolled back: fragments applied before a
//! later stream error stay visible.

use circl_astralis::{StoredMessage, StreamFrame};
use circl_core::{CorrelationId, StreamKey};
use tracing::debug;

use crate::message::DraftMessage;
use crate::store::ChatState;

impl ChatState {
    /// Appends a freshly composed user message.
    pub fn push_user_message(&mut self, session_id: &str, content: &str) {
        self.messages.push(DraftMessage::user(session_id, content));
    }

    /// Replaces the in-memory messages with history reloaded from the server.
    pub fn load_history(&mut self, history: Vec<StoredMessage>) {
        self.messages = history.into_iter().map(DraftMessage::from).collect();
    }

    /// Applies one streamed frame for the given request.
    ///
    /// Returns `true` when the found-users list changed, so the caller can
    /// publish the full accumulated snapshot (consumers always receive the
    /// authoritative current set, never a delta).
    pub fn apply_frame(
        &mut self,
        session_id: &str,
        correlation: &CorrelationId,
        frame: StreamFrame,
    ) -> bool {
        match frame {
            StreamFrame::Thought(fragment) => {
                let key = StreamKey::thought(correlation);
                self.draft_for(session_id, key, true).thinking_text.push_str(&fragment);
                false
            }
            StreamFrame::Response(fragment) => {
                let key = StreamKey::response(correlation);
                self.draft_for(session_id, key, false).content.push_str(&fragment);
                false
            }
            StreamFrame::UsersFound(users) => {
                self.found_users.extend(users);
                true
            }
            StreamFrame::Status(status) => {
                self.status = Some(status);
                false
            }
            // Narration the client does not render durably.
            StreamFrame::Action(_) | StreamFrame::Users(_) => false,
            // `end` terminates the stream before reaching the reducer.
            StreamFrame::End => {
                debug!("end frame reached reducer; no state change");
                false
            }
        }
    }

    /// Finds the draft keyed to one streamed variant, creating it on first
    /// fragment.
    fn draft_for(
        &mut self,
        session_id: &str,
        key: StreamKey,
        is_thinking: bool,
    ) -> &mut DraftMessage {
        let index = self
            .messages
            .iter()
            .position(|m| m.key.as_ref() == Some(&key));
        match index {
            Some(index) => &mut self.messages[index],
            None => {
                self.messages
                    .push(DraftMessage::streaming(session_id, key, is_thinking));
                self.messages.last_mut().expect("just pushed")
            }
        }
    }
}
