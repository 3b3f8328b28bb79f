// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-request send state machine.
//!
//! One send goes Idle -> Sending -> Streaming -> Completed | Errored.
//! Only one send is modeled at a time; the controller's busy-guard
//! rejects a second send while one is between Sending and Streaming.

/// Phase of the outstanding send request, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendPhase {
    /// No request outstanding.
    #[default]
    Idle,
    /// Request issued, no frame received yet.
    Sending,
    /// Frames arriving.
    Streaming,
    /// Last send finished cleanly.
    Completed,
    /// Last send failed; partial progress remains visible.
    Errored,
}

impl std::fmt::Display for SendPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendPhase::Idle => write!(f, "idle"),
            SendPhase::Sending => write!(f, "sending"),
            SendPhase::Streaming => write!(f, "streaming"),
            SendPhase::Completed => write!(f, "completed"),
            SendPhase::Errored => write!(f, "errored"),
        }
    }
}
