//! In-place VIF signing.
//!
//! The signature is RSA PKCS#1 v1.5 over SHA-512, computed with the 64-byte
//! payload digest as the signed message. The base64 signature is appended
//! verbatim to the first line of the document.

use std::fs;
use std::io::Write;
use std::path::Path;

use base64::Engine;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use serde::Serialize;
use sha2::Sha512;
use tempfile::NamedTempFile;

use crate::determinism::{
    canonical_payload, payload_digest, payload_digest_hex, render_signed, split_lines,
};
use crate::errors::{IoResultExt, VifError, VifResult};
use crate::key::PrivateKey;

/// Signature material produced for one document.
#[derive(Debug, Clone, Serialize)]
pub struct SignedVif {
    /// Base64 signature appended to line 0.
    pub signature: String,
    /// Hex SHA-512 of the canonical payload.
    pub digest: String,
    /// Non-blank lines that made it into the payload.
    pub payload_lines: usize,
    pub payload_bytes: usize,
    /// Lines in the source document.
    pub line_count: usize,
}

#[derive(Debug, Clone)]
pub enum SignOutcome {
    Signed(SignedVif),
    /// Fewer than two lines; nothing was written.
    Skipped { line_count: usize },
}

impl SignOutcome {
    pub fn signed(&self) -> Option<&SignedVif> {
        match self {
            Self::Signed(s) => Some(s),
            Self::Skipped { .. } => None,
        }
    }
}

/// Sign a canonical payload and return the raw signature bytes.
pub fn sign_payload(payload: &str, key: &PrivateKey) -> VifResult<Vec<u8>> {
    let digest = payload_digest(payload);
    let signing_key = SigningKey::<Sha512>::new(key.rsa().clone());
    let signature = signing_key
        .try_sign(&digest)
        .map_err(|e| VifError::Signing(e.to_string()))?;
    Ok(signature.to_vec())
}

/// Sign document text. Returns the rendered signed text, or `None` for
/// documents too short to sign.
pub fn sign_text(text: &str, key: &PrivateKey) -> VifResult<(SignOutcome, Option<String>)> {
    let lines = split_lines(text);
    let Some(payload) = canonical_payload(&lines) else {
        return Ok((
            SignOutcome::Skipped {
                line_count: lines.len(),
            },
            None,
        ));
    };

    let signature = base64::engine::general_purpose::STANDARD.encode(sign_payload(&payload, key)?);
    let rendered = render_signed(&lines, &signature);

    let signed = SignedVif {
        digest: payload_digest_hex(&payload),
        payload_lines: if payload.is_empty() {
            0
        } else {
            payload.split('\n').count()
        },
        payload_bytes: payload.len(),
        line_count: lines.len(),
        signature,
    };
    Ok((SignOutcome::Signed(signed), Some(rendered)))
}

/// Sign the file at `path` in place.
///
/// The new content is written to a temporary file in the same directory and
/// renamed over `path`, so a failed run never leaves a truncated document.
pub fn sign_file(path: &Path, key: &PrivateKey, max_bytes: u64) -> VifResult<SignOutcome> {
    let len = fs::metadata(path).at(path)?.len();
    if len > max_bytes {
        return Err(VifError::document(
            path,
            format!("document is {len} bytes, limit is {max_bytes}"),
        ));
    }

    let raw = fs::read(path).at(path)?;
    let text = String::from_utf8(raw).map_err(|e| VifError::document(path, e.to_string()))?;

    let (outcome, rendered) = sign_text(&text, key)?;
    let Some(rendered) = rendered else {
        if let SignOutcome::Skipped { line_count } = outcome {
            tracing::warn!(
                path = %path.display(),
                line_count,
                "document has fewer than two lines; left unsigned"
            );
        }
        return Ok(outcome);
    };

    replace_atomically(path, rendered.as_bytes())?;

    if let Some(signed) = outcome.signed() {
        tracing::info!(
            path = %path.display(),
            digest = %signed.digest,
            payload_bytes = signed.payload_bytes,
            "signed document"
        );
    }
    Ok(outcome)
}

fn replace_atomically(path: &Path, bytes: &[u8]) -> VifResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).at(dir)?;
    tmp.write_all(bytes).at(tmp.path())?;
    tmp.as_file().sync_all().at(tmp.path())?;
    tmp.persist(path).map_err(|e| VifError::io(path, e.error))?;
    Ok(())
}
