// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner-token digests and visitor fingerprints.

use nostalgic_core::{NostalgicError, Result, VisitorHash};
use sha2::{Digest, Sha256};

pub const OWNER_TOKEN_MIN_LEN: usize = 8;
pub const OWNER_TOKEN_MAX_LEN: usize = 16;

/// Hex characters kept from the visitor digest.
const VISITOR_HASH_LEN: usize = 16;

/// Reject tokens outside the accepted length window.
pub fn validate_owner_token(token: &str) -> Result<()> {
    let len = token.chars().count();
    if !(OWNER_TOKEN_MIN_LEN..=OWNER_TOKEN_MAX_LEN).contains(&len) {
        return Err(NostalgicError::validation(format!(
            "token must be {OWNER_TOKEN_MIN_LEN}-{OWNER_TOKEN_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Hex-encoded SHA-256 of the token. This is the only form that is persisted.
pub fn hash_owner_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn verify_owner_token(token: &str, stored_hash: &str) -> bool {
    constant_time_eq(hash_owner_token(token).as_bytes(), stored_hash.as_bytes())
}

/// Compare two byte strings without short-circuiting on the first mismatch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Salted fingerprint of an anonymous actor.
///
/// Stable for as long as the salt, address and user agent are; daily dedup
/// windows come from marker partitions, not from this value.
pub fn visitor_hash(salt: &str, ip: &str, user_agent: &str) -> VisitorHash {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(ip.as_bytes());
    hasher.update(user_agent.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(VISITOR_HASH_LEN);
    VisitorHash(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn token_length_window() {
        assert!(validate_owner_token("abcd1234").is_ok());
        assert!(validate_owner_token("abcdefghijklmnop").is_ok());
        assert!(validate_owner_token("short").is_err());
        assert!(validate_owner_token("abcdefghijklmnopq").is_err());
    }

    #[test]
    fn hash_is_hex_sha256() {
        let hash = hash_owner_token("abcd1234");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(hash, "abcd1234");
    }

    #[test]
    fn verify_accepts_only_matching_token() {
        let stored = hash_owner_token("abcd1234");
        assert!(verify_owner_token("abcd1234", &stored));
        assert!(!verify_owner_token("abcd1235", &stored));
        assert!(!verify_owner_token("abcd1234", "not-a-hash"));
    }

    #[test]
    fn constant_time_eq_length_mismatch() {
        assert!(constant_time_eq(b"", b""));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[test]
    fn visitor_hash_depends_on_every_input() {
        let base = visitor_hash("salt", "1.2.3.4", "ua");
        assert_eq!(base.as_str().len(), VISITOR_HASH_LEN);
        assert_eq!(base, visitor_hash("salt", "1.2.3.4", "ua"));
        assert_ne!(base, visitor_hash("other", "1.2.3.4", "ua"));
        assert_ne!(base, visitor_hash("salt", "1.2.3.5", "ua"));
        assert_ne!(base, visitor_hash("salt", "1.2.3.4", "ua2"));
    }

    proptest! {
        #[test]
        fn every_token_verifies_against_its_own_hash(token in "[ -~]{8,16}") {
            prop_assert!(verify_owner_token(&token, &hash_owner_token(&token)));
        }
    }
}
