use std::path::PathBuf;

use clap::{ArgAction, Parser};

use vifsign_core::config::{ArchiveConfig, PrepareConfig};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "vifsign",
    version,
    about = "Sign a KeePass plugin Version Information File and gzip the result"
)]
pub struct Cli {
    /// Version Information File to sign.
    pub vif: PathBuf,

    /// RSA private key (.NET RSAKeyValue XML, PKCS#1 or PKCS#8 PEM).
    pub key: PathBuf,

    /// Emit a JSON report on stdout instead of status lines.
    #[arg(long)]
    pub json: bool,

    /// Wait for Enter before exiting.
    #[arg(long)]
    pub pause: bool,

    /// Root for per-run staging directories (default: system temp dir).
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// gzip compression level.
    #[arg(long, default_value_t = vifsign_core::defaults::COMPRESSION_LEVEL,
          value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: u32,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn prepare_config(&self) -> PrepareConfig {
        let defaults = PrepareConfig::default();
        PrepareConfig {
            work_root: self.work_dir.clone().unwrap_or(defaults.work_root),
            archive: ArchiveConfig {
                level: self.level,
                ..ArchiveConfig::default()
            },
            limits: defaults.limits,
        }
    }
}
