// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory message representation for the active session.

use chrono::{DateTime, Utc};
use circl_astralis::StoredMessage;
use circl_core::StreamKey;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Maps the wire spelling; anything unexpected renders as assistant.
    pub fn from_wire(role: &str) -> Self {
        if role == "user" { Role::User } else { Role::Assistant }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A client-side, possibly still-streaming message.
///
/// Assistant drafts grow in place: `thought` fragments extend
/// `thinking_text`, `response` fragments extend `content`. The composite
/// [`StreamKey`] routes fragments to the right draft; persisted messages
/// reloaded from the server carry no key.
#[derive(Debug, Clone)]
pub struct DraftMessage {
    pub message_id: Option<String>,
    pub session_id: Option<String>,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_thinking: bool,
    pub thinking_text: String,
    pub key: Option<StreamKey>,
}

impl DraftMessage {
    /// A freshly composed user message.
    pub fn user(session_id: &str, content: &str) -> Self {
        Self {
            message_id: Some(uuid::Uuid::new_v4().to_string()),
            session_id: Some(session_id.to_string()),
            role: Role::User,
            content: content.to_string(),
            created_at: Utc::now(),
            is_thinking: false,
            thinking_text: String::new(),
            key: None,
        }
    }

    /// An empty assistant draft keyed to one streamed variant.
    pub fn streaming(session_id: &str, key: StreamKey, is_thinking: bool) -> Self {
        Self {
            message_id: None,
            session_id: Some(session_id.to_string()),
            role: Role::Assistant,
            content: String::new(),
            created_at: Utc::now(),
            is_thinking,
            thinking_text: String::new(),
            key: Some(key),
        }
    }
}

impl From<StoredMessage> for DraftMessage {
    fn from(stored: StoredMessage) -> Self {
        Self {
            message_id: stored.message_id,
            session_id: stored.session_id,
            role: Role::from_wire(&stored.role),
            content: stored.content,
            created_at: stored.created_at,
            is_thinking: false,
            thinking_text: String::new(),
            key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_maps_wire_spelling() {
        assert_eq!(Role::from_wire("user"), Role::User);
        assert_eq!(Role::from_wire("assistant"), Role::Assistant);
        assert_eq!(Role::from_wire("system"), Role::Assistant);
    }

    #[test]
    fn user_message_carries_content_and_id() {
        let msg = DraftMessage::user("s-1", "find ML engineers");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "find ML engineers");
        assert!(msg.message_id.is_some());
        assert!(msg.key.is_none());
    }
}
