//! Suggestion identifier generation.
//!
//! Ids follow `s-<millis>-<suffix>`: a millisecond timestamp plus a random
//! base36 suffix.  Lexical ordering of ids therefore approximates creation
//! order, but near-simultaneous ids can sort either way — callers must not
//! assume strict monotonicity.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use redline_core::SuggestionId;

use crate::constants::ID_SUFFIX_LEN;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A fresh, session-unique suggestion identifier.
pub fn new_suggestion_id() -> SuggestionId {
    SuggestionId::new(format!("s-{}-{}", unix_millis(), base36_suffix(ID_SUFFIX_LEN)))
}

pub(crate) fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

pub(crate) fn base36_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────
