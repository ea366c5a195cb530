//! Note identifier generation.
//!
//! An id is `"<base>-<counter>"` where `base` is the creation time in Unix
//! milliseconds written in lowercase base 36 and `counter` starts at 0. When
//! a candidate is already taken the counter is bumped until a free one is
//! found. Ids are predictable and not meant to be secret.

use chrono::{DateTime, Utc};

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Encode `value` in lowercase base 36.
pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(13);
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

/// Generate the first id for `at` that `taken` reports as free.
pub fn generate_id(at: DateTime<Utc>, taken: impl Fn(&str) -> bool) -> String {
    let base = to_base36(at.timestamp_millis().max(0) as u64);
    let mut counter: u64 = 0;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
