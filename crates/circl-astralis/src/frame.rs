// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frame decoding for the relaxed SSE dialect.
//!
//! Each complete line either carries one JSON event behind a `data:`
//! prefix or is noise. Decoding is best-effort: a malformed line is
//! skipped (the protocol is fragment-oriented, losing one fragment beats
//! aborting the stream), unknown event types are ignored so the backend
//! can grow new ones.

use tracing::{debug, warn};

use crate::types::{FoundUser, FoundUserDto, RawFrame};

/// A typed event from the streaming query endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    /// Incremental reasoning fragment.
    Thought(String),
    /// Tool/action narration fragment.
    Action(String),
    /// Raw user payload surfaced by some backends alongside `users_found`.
    Users(serde_json::Value),
    /// One or more discovered profiles.
    UsersFound(Vec<FoundUser>),
    /// Incremental answer fragment.
    Response(String),
    /// Informational progress text.
    Status(String),
    /// Terminates the stream successfully.
    End,
}

/// Result of decoding one line.
#[derive(Debug)]
pub enum FrameOutcome {
    /// A usable event.
    Frame(StreamFrame),
    /// Nothing to dispatch: not a data line, empty payload, malformed
    /// JSON, or an event type this client ignores.
    Skip,
    /// Server-reported failure; terminates the stream with this message.
    Error(String),
}

/// Decodes one complete line into a frame outcome.
pub fn decode_line(line: &str) -> FrameOutcome {
    let trimmed = line.trim();
    let Some(payload) = trimmed.strip_prefix("data:") else {
        return FrameOutcome::Skip;
    };
    let payload = payload.trim();
    if payload.is_empty() {
        return FrameOutcome::Skip;
    }

    let raw: RawFrame = match serde_json::from_str(payload) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(line = trimmed, error = %e, "skipping malformed frame");
            return FrameOutcome::Skip;
        }
    };

    match raw.type_.as_str() {
        "thought" => text_frame(raw.message, StreamFrame::Thought),
        "action" => text_frame(raw.message, StreamFrame::Action),
        // Intermediate tool output the client does not render.
        "raw_action" | "result" => FrameOutcome::Skip,
        "users" => FrameOutcome::Frame(StreamFrame::Users(raw.message)),
        "users_found" => decode_users_found(raw.message),
        "response" => text_frame(raw.message, StreamFrame::Response),
        "status" => text_frame(raw.message, StreamFrame::Status),
        "end" => FrameOutcome::Frame(StreamFrame::End),
        "error" => FrameOutcome::Error(error_message(raw.message)),
        other => {
            debug!(type_ = other, "ignoring unrecognized frame type");
            FrameOutcome::Skip
        }
    }
}

/// Text events carry a string payload; anything else is treated as noise.
fn text_frame(
    message: serde_json::Value,
    build: impl FnOnce(String) -> StreamFrame,
) -> FrameOutcome {
    match message {
        serde_json::Value::String(text) => FrameOutcome::Frame(build(text)),
        other => {
            warn!(payload = %other, "expected string payload for text frame");
            FrameOutcome::Skip
        }
    }
}

/// `users_found` carries either a single profile object or an array of them.
fn decode_users_found(message: serde_json::Value) -> FrameOutcome {
    let result = if message.is_array() {
        serde_json::from_value::<Vec<FoundUserDto>>(message)
    } else {
        serde_json::from_value::<FoundUserDto>(message).map(|dto| vec![dto])
    };

    match result {
        Ok(dtos) => FrameOutcome::Frame(StreamFrame::UsersFound(
            dtos.into_iter().map(FoundUser::from).collect(),
        )),
        Err(e) => {
            warn!(error = %e, "skipping undecodable users_found payload");
            FrameOutcome::Skip
        }
    }
}

fn error_message(message: serde_json::Value) -> String {
    match message {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}
