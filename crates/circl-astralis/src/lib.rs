// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the Astralis search backend.
//!
//! Covers the three service surfaces the chat layer depends on:
//!
//! - the streaming query endpoint, whose response is a relaxed SSE dialect
//!   of newline-terminated `data:` lines parsed into [`StreamFrame`]s
//! - the non-streaming summarize endpoint
//! - session CRUD (create, list, load messages, delete)
//!
//! Wire DTOs live in [`types`]; everything else in the workspace works
//! with the domain types they map to.

pub mod client;
pub mod frame;
pub mod framer;
pub mod sessions;
pub mod stream;
pub mod types;

pub use client::AstralisClient;
pub use frame::{FrameOutcome, StreamFrame, decode_line};
pub use framer::LineFramer;
pub use sessions::SessionClient;
pub use stream::{FrameStream, frames_from_chunks, parse_frame_stream};
pub use types::{Education, Experience, FoundUser, Session, StoredMessage};
