//! vifsign-core
//!
//! Core primitives for vifsign:
//! - canonical payload reconstruction for Version Information Files
//! - SHA-512 digests and RSA PKCS#1 v1.5 signatures
//! - private key loading (.NET XML, PKCS#1 / PKCS#8 PEM)
//! - gzip archiving and per-run staging

pub mod archive;
pub mod config;
pub mod determinism;
pub mod errors;
pub mod key;
pub mod pipeline;
pub mod sign;

pub use crate::errors::{ErrorClass, VifError, VifResult};

/// Default values. The suffix and work dir name are part of the
/// observable output layout and must remain stable.
pub mod defaults {
    /// Appended to the signed file's name.
    pub const ARCHIVE_SUFFIX: &str = ".gz";
    /// gzip level used when the caller does not pick one.
    pub const COMPRESSION_LEVEL: u32 = 6;
    /// Directory under the work root that holds per-run directories.
    pub const WORK_DIR_NAME: &str = "vifsign";
}

/// Convenience re-exports.
pub mod prelude {
    pub use crate::archive::{archive_path, gzip_file, ArchiveOutcome};
    pub use crate::config::{validate_config, ArchiveConfig, LimitsConfig, PrepareConfig};
    pub use crate::determinism::{canonical_payload, payload_digest, render_signed, split_lines};
    pub use crate::key::{KeyFormat, PrivateKey};
    pub use crate::pipeline::{prepare, Milestone, PrepareReport, Workspace};
    pub use crate::sign::{sign_file, sign_payload, sign_text, SignOutcome, SignedVif};
    pub use crate::{ErrorClass, VifError, VifResult};
}
