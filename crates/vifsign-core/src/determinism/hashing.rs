//! Digest helpers for vifsign.
//!
//! The signature scheme is fixed to SHA-512. There is no algorithm negotiation.

use sha2::{Digest, Sha512};

/// Length in bytes of a payload digest.
pub const DIGEST_LEN: usize = 64;

/// SHA-512 of the payload's UTF-8 bytes.
pub fn payload_digest(payload: &str) -> [u8; DIGEST_LEN] {
    let mut h = Sha512::new();
    h.update(payload.as_bytes());
    h.finalize().into()
}

/// Lowercase hex form of [`payload_digest`], for reports and logs.
pub fn payload_digest_hex(payload: &str) -> String {
    hex::encode(payload_digest(payload))
}
