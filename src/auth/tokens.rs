//! Single-use tokens for account activation and password reset.
//!
//! Issuance hands back the plaintext (delivered out-of-band) and its hash
//! (persisted) separately. Activation strings are stored in plaintext;
//! reset tokens only ever hit storage as their SHA-256 hash.

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

/// Random 32-byte token, hex-encoded.
pub fn generate() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// One-way hash used for stored reset tokens.
pub fn hash(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

/// Issue a token pair: the plaintext goes out by email, the hash into the
/// database.
pub fn issue() -> (String, String) {
    let plaintext = generate();
    let hashed = hash(&plaintext);
    (plaintext, hashed)
}

/// Hash the supplied value, compare against storage, and enforce the expiry
/// window.
pub fn verify(supplied: &str, stored_hash: &str, expires_at: OffsetDateTime) -> bool {
    if OffsetDateTime::now_utc() > expires_at {
        return false;
    }
    hash(supplied) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn issued_plaintext_is_never_its_stored_form() {
        let (plaintext, hashed) = issue();
        assert_ne!(plaintext, hashed);
        assert_eq!(hash(&plaintext), hashed);
    }

    #[test]
    fn verify_accepts_the_original_plaintext() {
        let (plaintext, hashed) = issue();
        let expires = OffsetDateTime::now_utc() + Duration::minutes(10);
        assert!(verify(&plaintext, &hashed, expires));
    }

    #[test]
    fn verify_rejects_any_other_value() {
        let (_, hashed) = issue();
        let expires = OffsetDateTime::now_utc() + Duration::minutes(10);
        assert!(!verify("some-other-token", &hashed, expires));
    }

    #[test]
    fn verify_rejects_an_expired_window() {
        let (plaintext, hashed) = issue();
        let expires = OffsetDateTime::now_utc() - Duration::seconds(1);
        assert!(!verify(&plaintext, &hashed, expires));
    }

    #[test]
    fn generated_tokens_are_unique() {
        assert_ne!(generate(), generate());
    }
}
