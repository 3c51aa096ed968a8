//! Deterministic reconstruction of the signed byte sequence.

pub mod hashing;
pub mod normalize_text;

pub use hashing::{payload_digest, payload_digest_hex, DIGEST_LEN};
pub use normalize_text::{canonical_payload, render_signed, split_lines};
