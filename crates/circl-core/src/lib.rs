// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Circl client workspace.
//!
//! Provides the shared error type, identifier types, and the token
//! storage trait used by the HTTP client crates.

pub mod error;
pub mod token;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CirclError;
pub use token::{TokenPair, TokenStore};
pub use types::{CorrelationId, MessageId, SessionId, StreamKey, StreamKind};
