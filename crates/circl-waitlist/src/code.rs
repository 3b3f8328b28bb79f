// SPDX-FileCopyrightText: 2026 Circl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Referral code candidates.
//!
//! An 8-character uppercase code built from three fragments: a hash of the
//! owner's email (memorable prefix), the current millisecond timestamp in
//! base 36 (uniqueness over time), and random characters (uniqueness
//! within one millisecond). Collision checking against the backend is the
//! caller's job; candidates alone are not guaranteed unique.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::Rng;

/// Characters drawn for the random fragment.
const RANDOM_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Target code length.
const CODE_LEN: usize = 8;

/// Builds one candidate code from an email and timestamp.
pub fn candidate(email: &str, timestamp_ms: i64, rng: &mut impl Rng) -> String {
    let email_fragment: String = BASE64
        .encode(email)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(4)
        .collect::<String>()
        .to_uppercase();

    let ts = to_base36(timestamp_ms.unsigned_abs());
    let ts_fragment: String = ts
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<String>()
        .to_uppercase();

    let random_fragment: String = (0..2)
        .map(|_| {
            let idx = rng.gen_range(0..RANDOM_ALPHABET.len());
            RANDOM_ALPHABET[idx] as char
        })
        .collect();

    let mut code = format!("{email_fragment}{ts_fragment}{random_fragment}");
    code.truncate(CODE_LEN);
    code
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ASCII")
}
