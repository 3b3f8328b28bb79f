// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication for the Circl client.
//!
//! Exchanges a Google OIDC id_token for an application token pair, stores
//! it via a [`circl_core::TokenStore`], and exposes the bearer-authenticated
//! request capability the other client crates build on. The refresh policy
//! is fixed: one refresh per 401, one retry, credentials cleared on refresh
//! failure.

pub mod client;
pub mod store;
pub mod types;

pub use client::AuthClient;
pub use store::{FileTokenStore, MemoryTokenStore};
pub use types::UserProfile;
