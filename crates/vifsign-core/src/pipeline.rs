//! End-to-end preparation of a VIF for distribution.
//!
//! Steps, in order:
//! - validate the input and key paths and the destination
//! - load the private key
//! - stage a copy of the input in a fresh per-run directory
//! - sign the staged copy in place
//! - gzip the staged copy
//! - publish the archive next to the original input
//!
//! The original input is never modified. Staging directories are left behind
//! on both success and failure.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::archive::{archive_path, gzip_file};
use crate::config::{validate_config, PrepareConfig};
use crate::errors::{IoResultExt, VifError, VifResult};
use crate::key::{KeyFormat, PrivateKey};
use crate::sign::{sign_file, SignOutcome};

/// Progress points reported to the caller while `prepare` runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Milestone {
    Validated,
    Staged(PathBuf),
    Signed,
    /// Input had fewer than two lines and was archived unsigned.
    SkippedSigning,
    Compressed,
    Published(PathBuf),
}

/// Validated inputs of one run.
#[derive(Debug, Clone)]
pub struct PreparePlan {
    pub input: PathBuf,
    pub key_path: PathBuf,
    pub output: PathBuf,
}

impl PreparePlan {
    /// Check both paths and derive the destination, failing if it exists.
    pub fn new(input: &Path, key_path: &Path, cfg: &PrepareConfig) -> VifResult<Self> {
        validate_config(cfg)?;
        require_file(input)?;
        require_file(key_path)?;

        if input.file_name().is_none() {
            return Err(VifError::path(input, "path has no file name"));
        }

        let output = archive_path(input, &cfg.archive.suffix);
        if output.exists() {
            return Err(VifError::OutputExists(output));
        }

        Ok(Self {
            input: input.to_path_buf(),
            key_path: key_path.to_path_buf(),
            output,
        })
    }
}

fn require_file(path: &Path) -> VifResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(VifError::path(path, "not a regular file")),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(VifError::path(path, "no such file"))
        }
        Err(e) => Err(VifError::path(path, e.to_string())),
    }
}

/// A per-run staging directory: `<root>/vifsign/<uuid>`.
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    pub fn create(root: &Path) -> VifResult<Self> {
        let dir = root
            .join(crate::defaults::WORK_DIR_NAME)
            .join(Uuid::new_v4().to_string());
        fs::create_dir_all(&dir).at(&dir)?;
        tracing::debug!(dir = %dir.display(), "created workspace");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `input` into the workspace under its own file name.
    pub fn stage(&self, input: &Path) -> VifResult<PathBuf> {
        let name = input
            .file_name()
            .ok_or_else(|| VifError::path(input, "path has no file name"))?;
        let staged = self.dir.join(name);
        fs::copy(input, &staged).at(&staged)?;
        Ok(staged)
    }
}

/// Copy `src` to `dst`, refusing to replace an existing `dst`.
///
/// The bytes land in a temporary sibling first, so a failed copy never
/// leaves a partial artifact at `dst`.
pub fn publish(src: &Path, dst: &Path) -> VifResult<u64> {
    let dir = match dst.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut reader = fs::File::open(src).at(src)?;
    let mut tmp = NamedTempFile::new_in(dir).at(dir)?;
    let copied = io::copy(&mut reader, &mut tmp).at(tmp.path())?;
    tmp.as_file().sync_all().at(tmp.path())?;

    tmp.persist_noclobber(dst).map_err(|e| match e.error.kind() {
        io::ErrorKind::AlreadyExists => VifError::OutputExists(dst.to_path_buf()),
        _ => VifError::io(dst, e.error),
    })?;
    Ok(copied)
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct PrepareReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub work_dir: PathBuf,
    pub signed: bool,
    pub signature: Option<String>,
    pub digest: Option<String>,
    pub payload_lines: usize,
    pub line_count: usize,
    pub key_format: KeyFormat,
    pub key_bits: usize,
    pub archive_bytes: u64,
}

/// Run the whole preparation for one input.
pub fn prepare<F>(
    input: &Path,
    key_path: &Path,
    cfg: &PrepareConfig,
    mut on_milestone: F,
) -> VifResult<PrepareReport>
where
    F: FnMut(&Milestone),
{
    let plan = PreparePlan::new(input, key_path, cfg)?;
    let key = PrivateKey::load(&plan.key_path, cfg.limits.max_key_bytes)?;
    on_milestone(&Milestone::Validated);

    let workspace = Workspace::create(&cfg.work_root)?;
    let staged = workspace.stage(&plan.input)?;
    on_milestone(&Milestone::Staged(workspace.dir().to_path_buf()));

    let outcome = sign_file(&staged, &key, cfg.limits.max_document_bytes)?;
    match &outcome {
        SignOutcome::Signed(_) => on_milestone(&Milestone::Signed),
        SignOutcome::Skipped { .. } => on_milestone(&Milestone::SkippedSigning),
    }

    let archive = gzip_file(&staged, &cfg.archive.suffix, cfg.archive.level)?;
    on_milestone(&Milestone::Compressed);

    publish(&archive.path, &plan.output)?;
    on_milestone(&Milestone::Published(plan.output.clone()));
    tracing::info!(output = %plan.output.display(), "prepared VIF");

    let (signed, signature, digest, payload_lines, line_count) = match outcome {
        SignOutcome::Signed(s) => (
            true,
            Some(s.signature),
            Some(s.digest),
            s.payload_lines,
            s.line_count,
        ),
        SignOutcome::Skipped { line_count } => (false, None, None, 0, line_count),
    };

    Ok(PrepareReport {
        input: plan.input,
        output: plan.output,
        work_dir: workspace.dir().to_path_buf(),
        signed,
        signature,
        digest,
        payload_lines,
        line_count,
        key_format: key.format(),
        key_bits: key.bits(),
        archive_bytes: archive.bytes_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::tests::{test_rsa_key, to_dotnet_xml};
    use assert_matches::assert_matches;
    use flate2::read::GzDecoder;
    use std::io::Read;

    struct Fixture {
        _dir: tempfile::TempDir,
        input: PathBuf,
        key: PathBuf,
        cfg: PrepareConfig,
    }

    fn fixture(body: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("plugin.txt");
        let key = dir.path().join("key.xml");
        fs::write(&input, body).unwrap();
        fs::write(&key, to_dotnet_xml(&test_rsa_key(20))).unwrap();

        let cfg = PrepareConfig {
            work_root: dir.path().join("work"),
            ..PrepareConfig::default()
        };
        Fixture {
            _dir: dir,
            input,
            key,
            cfg,
        }
    }

    fn gunzip(path: &Path) -> String {
        let mut out = String::new();
        GzDecoder::new(fs::File::open(path).unwrap())
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn prepare_signs_and_publishes() {
        let body = ":\nMyPlugin:1.0\n:\n";
        let fx = fixture(body);

        let mut seen = Vec::new();
        let report = prepare(&fx.input, &fx.key, &fx.cfg, |m| seen.push(m.clone())).unwrap();

        assert!(report.signed);
        assert_eq!(report.key_format, KeyFormat::DotNetXml);
        assert_eq!(report.output, fx.input.with_file_name("plugin.txt.gz"));

        let signature = report.signature.clone().unwrap();
        assert_eq!(
            gunzip(&report.output),
            format!(":{signature}\nMyPlugin:1.0\n:")
        );
        assert_eq!(fs::read_to_string(&fx.input).unwrap(), body);
        assert!(report.work_dir.starts_with(fx.cfg.work_root.join("vifsign")));

        assert_eq!(seen.first(), Some(&Milestone::Validated));
        assert!(seen.contains(&Milestone::Signed));
        assert_eq!(seen.last(), Some(&Milestone::Published(report.output.clone())));
    }

    #[test]
    fn second_run_collides_and_keeps_artifact() {
        let fx = fixture(":\nA:1\n:");
        let first = prepare(&fx.input, &fx.key, &fx.cfg, |_| {}).unwrap();
        let before = fs::read(&first.output).unwrap();

        let err = prepare(&fx.input, &fx.key, &fx.cfg, |_| {}).unwrap_err();
        assert_matches!(err, VifError::OutputExists(_));
        assert_eq!(fs::read(&first.output).unwrap(), before);
    }

    #[test]
    fn runs_use_distinct_workspaces() {
        let root = tempfile::tempdir().unwrap();
        let a = Workspace::create(root.path()).unwrap();
        let b = Workspace::create(root.path()).unwrap();
        assert_ne!(a.dir(), b.dir());
    }

    #[test]
    fn short_input_is_archived_unsigned() {
        let fx = fixture("only line");
        let mut seen = Vec::new();
        let report = prepare(&fx.input, &fx.key, &fx.cfg, |m| seen.push(m.clone())).unwrap();

        assert!(!report.signed);
        assert!(seen.contains(&Milestone::SkippedSigning));
        assert_eq!(gunzip(&report.output), "only line");
    }

    #[test]
    fn malformed_key_fails_before_staging() {
        let fx = fixture(":\nA:1\n:");
        fs::write(&fx.key, "<RSAKeyValue><Modulus>AQAB</Modulus></RSAKeyValue>").unwrap();

        let err = prepare(&fx.input, &fx.key, &fx.cfg, |_| {}).unwrap_err();
        assert_matches!(err, VifError::Key(_));
        assert!(!fx.cfg.work_root.exists());
        assert!(!fx.input.with_file_name("plugin.txt.gz").exists());
    }

    #[test]
    fn missing_paths_are_path_errors() {
        let fx = fixture(":\nA:1\n:");
        let missing = fx.input.with_file_name("absent.txt");

        assert_matches!(
            prepare(&missing, &fx.key, &fx.cfg, |_| {}),
            Err(VifError::Path { .. })
        );
        assert_matches!(
            prepare(&fx.input, &missing, &fx.cfg, |_| {}),
            Err(VifError::Path { .. })
        );
        let dir = fx.input.parent().unwrap().to_path_buf();
        assert_matches!(
            prepare(&dir, &fx.key, &fx.cfg, |_| {}),
            Err(VifError::Path { .. })
        );
    }

    #[test]
    fn publish_refuses_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a");
        let dst = dir.path().join("b");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old").unwrap();

        assert_matches!(publish(&src, &dst), Err(VifError::OutputExists(_)));
        assert_eq!(fs::read_to_string(&dst).unwrap(), "old");
    }

    #[test]
    fn failed_publish_leaves_no_partial_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("missing");
        let dst = dir.path().join("out.gz");

        assert_matches!(publish(&src, &dst), Err(VifError::Io { .. }));
        assert!(!dst.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        let unreadable = dir.path().join("a-directory");
        fs::create_dir(&unreadable).unwrap();
        assert_matches!(publish(&unreadable, &dst), Err(VifError::Io { .. }));
        assert!(!dst.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
