// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Circl integration tests.
//!
//! Provides builders for the backend's relaxed SSE dialect and a wiremock
//! wrapper that mounts canned streaming responses, so tests never need
//! external services.

pub mod sse;

pub use sse::{MockAstralis, data_line, end_frame, error_frame, text_frame, users_found_frame};
