// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat session store and streaming-message reducer.
//!
//! Turns the Astralis frame stream into an ordered, incrementally updated
//! message list plus a side list of discovered users. State is held in a
//! single [`ChatState`] written only by the [`ChatController`]; render
//! layers read snapshots.

pub mod controller;
pub mod message;
pub mod phase;
pub mod reducer;
pub mod store;

pub use controller::{ChatController, FoundUsersObserver};
pub use message::{DraftMessage, Role};
pub use phase::SendPhase;
pub use store::ChatState;
