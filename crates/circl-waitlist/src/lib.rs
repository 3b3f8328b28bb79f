// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Waitlist signup for the Circl marketing flow.
//!
//! A thin client over the hosted Supabase backend: duplicate-email check,
//! referral code validation and crediting, entry insertion, and minting
//! of the new member's own referral code.

pub mod client;
pub mod code;

pub use client::{WaitlistClient, WaitlistEntry, WaitlistSignup};
