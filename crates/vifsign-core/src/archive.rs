//! gzip archiving of signed documents.
//!
//! The input is streamed through the encoder in one pass. Only the
//! decompressed content is stable: gzip headers may differ between encoder
//! versions, so callers should never compare compressed bytes.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;

use crate::errors::{IoResultExt, VifError, VifResult};

/// Result of archiving one file.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveOutcome {
    pub path: PathBuf,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// `path` with `suffix` appended to its file name (`a.txt` -> `a.txt.gz`).
pub fn archive_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Open `path` for writing, failing if anything already exists there.
pub(crate) fn create_new(path: &Path) -> VifResult<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => VifError::OutputExists(path.to_path_buf()),
            _ => VifError::io(path, e),
        })
}

/// Write a gzip copy of `path` next to it, leaving `path` unmodified.
pub fn gzip_file(path: &Path, suffix: &str, level: u32) -> VifResult<ArchiveOutcome> {
    let out_path = archive_path(path, suffix);

    let input = File::open(path).at(path)?;
    let output = create_new(&out_path)?;

    let mut reader = BufReader::new(input);
    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::new(level));
    let bytes_in = io::copy(&mut reader, &mut encoder).at(path)?;

    let mut writer = encoder.finish().at(&out_path)?;
    writer.flush().at(&out_path)?;
    drop(writer);

    let bytes_out = fs::metadata(&out_path).at(&out_path)?.len();
    tracing::info!(
        input = %path.display(),
        output = %out_path.display(),
        bytes_in,
        bytes_out,
        "compressed document"
    );

    Ok(ArchiveOutcome {
        path: out_path,
        bytes_in,
        bytes_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn gunzip(path: &Path) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(File::open(path).unwrap())
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn archive_path_appends_suffix() {
        assert_eq!(
            archive_path(Path::new("/x/plugin.txt"), ".gz"),
            PathBuf::from("/x/plugin.txt.gz")
        );
        assert_eq!(archive_path(Path::new("vif"), ".gz"), PathBuf::from("vif.gz"));
    }

    #[test]
    fn gzip_roundtrips_and_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugin.txt");
        let body = "Sig:abc\nA:1\nB:2\n:".repeat(50);
        fs::write(&path, &body).unwrap();

        let out = gzip_file(&path, ".gz", 6).unwrap();
        assert_eq!(out.path, dir.path().join("plugin.txt.gz"));
        assert_eq!(out.bytes_in, body.len() as u64);
        assert_eq!(gunzip(&out.path), body.as_bytes());
        assert_eq!(fs::read_to_string(&path).unwrap(), body);
    }

    #[test]
    fn empty_input_produces_valid_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        fs::write(&path, "").unwrap();

        let out = gzip_file(&path, ".gz", 0).unwrap();
        assert!(gunzip(&out.path).is_empty());
    }

    #[test]
    fn existing_output_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugin.txt");
        fs::write(&path, "a\nb").unwrap();
        fs::write(dir.path().join("plugin.txt.gz"), "keep").unwrap();

        let err = gzip_file(&path, ".gz", 6).unwrap_err();
        assert!(matches!(err, VifError::OutputExists(_)));
        assert_eq!(
            fs::read_to_string(dir.path().join("plugin.txt.gz")).unwrap(),
            "keep"
        );
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = gzip_file(&dir.path().join("nope"), ".gz", 6).unwrap_err();
        assert!(matches!(err, VifError::Io { .. }));
        assert!(!dir.path().join("nope.gz").exists());
    }
}
