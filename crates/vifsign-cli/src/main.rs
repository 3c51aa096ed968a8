use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod exit;
mod output;
mod prepare;

const USAGE: &str = "Please supply the path of the plugin Version Information File you wish to sign, \
                     and the path to the RSA private key (XML or PEM).";

fn main() -> ExitCode {
    let cli = match args::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            output::eprintln_line(USAGE);
            let _ = e.print();
            return ExitCode::from(exit::USAGE);
        }
    };

    init_tracing(cli.verbose);
    output::init(cli.json);

    let code = match prepare::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::failure(&err);
            exit::code_for(&err)
        }
    };

    if cli.pause {
        output::pause();
    }
    code
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
