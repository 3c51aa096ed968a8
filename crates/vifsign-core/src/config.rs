//! Configuration structures for vifsign-core.
//!
//! The core crate itself does not read environment variables or flags. All
//! configuration is built by the caller (usually the CLI) and passed in.

use std::path::PathBuf;

use crate::errors::{VifError, VifResult};

/// Global configuration container for one `prepare` run.
#[derive(Debug, Clone)]
pub struct PrepareConfig {
    /// Root under which per-run staging directories are created.
    pub work_root: PathBuf,
    pub archive: ArchiveConfig,
    pub limits: LimitsConfig,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            work_root: std::env::temp_dir(),
            archive: ArchiveConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

/// Archiver settings.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Appended to the signed file's name to form the artifact name.
    pub suffix: String,
    /// gzip compression level, 0..=9.
    pub level: u32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            suffix: crate::defaults::ARCHIVE_SUFFIX.to_string(),
            level: crate::defaults::COMPRESSION_LEVEL,
        }
    }
}

/// Size limits on inputs read fully into memory.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_document_bytes: u64,
    pub max_key_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: 16 * 1024 * 1024,
            max_key_bytes: 64 * 1024,
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &PrepareConfig) -> VifResult<()> {
    if cfg.archive.suffix.is_empty() {
        return Err(VifError::config("archive suffix must not be empty"));
    }

    if cfg.archive.suffix.contains(['/', '\\']) {
        return Err(VifError::config(
            "archive suffix must not contain path separators",
        ));
    }

    if cfg.archive.level > 9 {
        return Err(VifError::config(format!(
            "compression level must be between 0 and 9, got {}",
            cfg.archive.level
        )));
    }

    if cfg.limits.max_document_bytes == 0 || cfg.limits.max_key_bytes == 0 {
        return Err(VifError::config("size limits must be greater than zero"));
    }

    Ok(())
}
