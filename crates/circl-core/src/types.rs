// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common identifier types shared across the Circl client crates.

use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Alphabet for correlation tokens. Matches base-36 lowercase digits.
const CORRELATION_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of a generated correlation token.
const CORRELATION_LEN: usize = 9;

/// Client-generated token scoping a single send operation's streamed fragments.
///
/// Only needs to be unique among concurrently-open streams in one process,
/// not globally. Generated once per send and held stable for the duration
/// of that request's stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// Generates a new 9-character base-36 correlation token.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let token: String = (0..CORRELATION_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..CORRELATION_ALPHABET.len());
                CORRELATION_ALPHABET[idx] as char
            })
            .collect();
        Self(token)
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which of the two streamed message variants a fragment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum StreamKind {
    /// Intermediate reasoning shown in the thinking indicator.
    Thought,
    /// The final assistant answer.
    Response,
}

/// Composite key routing streamed fragments to their in-progress message.
///
/// Replaces ad-hoc `"<id>_thought"` / `"response_<id>"` string keys with a
/// structured pair, so accumulation never depends on string parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamKey {
    pub correlation: CorrelationId,
    pub kind: StreamKind,
}

impl StreamKey {
    pub fn new(correlation: CorrelationId, kind: StreamKind) -> Self {
        Self { correlation, kind }
    }

    pub fn thought(correlation: &CorrelationId) -> Self {
        Self::new(correlation.clone(), StreamKind::Thought)
    }

    pub fn response(correlation: &CorrelationId) -> Self {
        Self::new(correlation.clone(), StreamKind::Response)
    }
}
