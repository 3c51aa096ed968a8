//! Error types for vifsign-core.
//!
//! Every fallible operation in this crate returns [`VifResult`]. Each variant
//! belongs to one [`ErrorClass`], which higher layers map to process exit codes.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Coarse error taxonomy used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Path,
    OutputCollision,
    Crypto,
    Document,
    Io,
    Config,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::OutputCollision => "output-collision",
            Self::Crypto => "crypto",
            Self::Document => "document",
            Self::Io => "io",
            Self::Config => "config",
        }
    }
}

#[derive(Debug, Error)]
pub enum VifError {
    /// An input path is missing or is not a regular file.
    #[error("invalid path {path}: {reason}")]
    Path { path: PathBuf, reason: String },

    /// The destination artifact already exists and will not be overwritten.
    #[error("the file '{0}' already exists; move or remove it, then try again")]
    OutputExists(PathBuf),

    /// The private key file could not be parsed into a usable RSA key.
    #[error("invalid private key: {0}")]
    Key(String),

    /// The RSA signing primitive failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The source document is not valid UTF-8 text or exceeds limits.
    #[error("invalid document {path}: {reason}")]
    Document { path: PathBuf, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl VifError {
    pub fn path(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::Path {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn key(msg: impl Into<String>) -> Self {
        Self::Key(msg.into())
    }

    pub fn document(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::Document {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Path { .. } => ErrorClass::Path,
            Self::OutputExists(_) => ErrorClass::OutputCollision,
            Self::Key(_) | Self::Signing(_) => ErrorClass::Crypto,
            Self::Document { .. } => ErrorClass::Document,
            Self::Io { .. } => ErrorClass::Io,
            Self::Config(_) => ErrorClass::Config,
        }
    }
}

pub type VifResult<T> = std::result::Result<T, VifError>;

/// Attach a path to `std::io::Result` values.
pub(crate) trait IoResultExt<T> {
    fn at(self, path: impl AsRef<Path>) -> VifResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn at(self, path: impl AsRef<Path>) -> VifResult<T> {
        self.map_err(|e| VifError::io(path, e))
    }
}
