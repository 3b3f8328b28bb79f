// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental line framing for the streamed query response.
//!
//! The backend emits newline-terminated `data:` lines over a single HTTP
//! body. Network reads split that body at arbitrary byte boundaries, so
//! complete lines are yielded as they close and any trailing partial line
//! is buffered for the next chunk. A `\n` byte can never occur inside a
//! multi-byte UTF-8 sequence, so splitting on raw bytes before decoding
//! is safe even when a character straddles two reads.

/// Buffers raw bytes and yields complete lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes one network chunk, returning every line completed by it.
    ///
    /// Lines are decoded lossily (a malformed line is skipped downstream
    /// anyway) with any trailing `\r` removed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let rest = self.buffer.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.buffer, rest);
            line.pop(); // the `\n`
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Bytes of the unterminated trailing line, if any.
    ///
    /// Discarded at end of stream: a partial line after the final chunk
    /// was never a complete frame.
    pub fn partial(&self) -> &[u8] {
        &self.buffer
    }
}
