// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for the relaxed SSE dialect and a mock Astralis server.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One `data:` line carrying a typed event.
pub fn data_line(type_: &str, message: serde_json::Value) -> String {
    let event = serde_json::json!({ "type": type_, "message": message });
    format!("data: {event}\n")
}

/// A text-payload event line (`thought`, `response`, `status`, ...).
pub fn text_frame(type_: &str, text: &str) -> String {
    data_line(type_, serde_json::Value::String(text.to_string()))
}

/// A `users_found` event line; `message` may be an object or an array.
pub fn users_found_frame(message: serde_json::Value) -> String {
    data_line("users_found", message)
}

/// The stream terminator line.
pub fn end_frame() -> String {
    "data: {\"type\":\"end\"}\n".to_string()
}

/// A server error line.
pub fn error_frame(message: &str) -> String {
    data_line("error", serde_json::Value::String(message.to_string()))
}

/// Wiremock server pre-wired with Astralis routes.
pub struct MockAstralis {
    server: MockServer,
}

impl MockAstralis {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of the mock server.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Access to the underlying server for custom mounts.
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Mounts `POST /query` returning the given SSE body.
    pub async fn mount_query(&self, frames: &[String]) {
        let body: String = frames.concat();
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&self.server)
            .await;
    }

    /// Mounts `POST /summarize` returning the given summary.
    pub async fn mount_summarize(&self, summary: &str) {
        Mock::given(method("POST"))
            .and(path("/summarize"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "summary": summary })),
            )
            .mount(&self.server)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_line_is_newline_terminated() {
        let line = text_frame("thought", "hello");
        assert!(line.starts_with("data: "));
        assert!(line.ends_with('\n'));
        assert!(line.contains("\"type\":\"thought\""));
    }

    #[test]
    fn end_frame_parses_as_json() {
        let line = end_frame();
        let payload = line.trim().strip_prefix("data: ").unwrap();
        let value: serde_json::Value = serde_json::from_str(payload).unwrap();
        assert_eq!(value["type"], "end");
    }
}
