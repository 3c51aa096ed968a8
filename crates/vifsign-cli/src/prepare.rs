use anyhow::{Context, Result};

use crate::args::Cli;
use crate::output;

pub fn run(cli: &Cli) -> Result<()> {
    let cfg = cli.prepare_config();
    tracing::debug!(
        vif = %cli.vif.display(),
        key = %cli.key.display(),
        work_root = %cfg.work_root.display(),
        level = cfg.archive.level,
        "starting"
    );

    let report = vifsign_core::pipeline::prepare(&cli.vif, &cli.key, &cfg, output::milestone)
        .with_context(|| format!("could not prepare '{}'", cli.vif.display()))?;

    output::report(&report)
}
