use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use vifsign_core::pipeline::{Milestone, PrepareReport};

use crate::exit;

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

pub fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}

fn stderr() -> StandardStream {
    StandardStream::stderr(ColorChoice::Auto)
}

/// One status line; suppressed in JSON mode.
pub fn status(msg: &str) {
    if is_json() {
        return;
    }
    let mut out = stdout();
    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = write!(out, "✓");
    let _ = out.reset();
    let _ = writeln!(out, " {msg}");
}

pub fn milestone(m: &Milestone) {
    match m {
        Milestone::Validated => status("Input paths and private key are valid."),
        Milestone::Staged(dir) => status(&format!("Staged a working copy in '{}'.", dir.display())),
        Milestone::Signed => status("Signed the VIF."),
        Milestone::SkippedSigning => {
            status("The VIF has fewer than two lines; it was left unsigned.")
        }
        Milestone::Compressed => status("GZipped the signed VIF."),
        Milestone::Published(path) => status(&format!(
            "Operation complete. The prepared VIF can be found at '{}'.",
            path.display()
        )),
    }
}

#[derive(Serialize)]
struct ReportOut<'a> {
    ok: bool,
    #[serde(flatten)]
    report: &'a PrepareReport,
}

pub fn report(report: &PrepareReport) -> anyhow::Result<()> {
    if is_json() {
        return print(&ReportOut { ok: true, report });
    }
    if let Some(digest) = &report.digest {
        tracing::info!(%digest, payload_lines = report.payload_lines, "payload digest");
    }
    Ok(())
}

#[derive(Serialize)]
struct FailureOut {
    ok: bool,
    class: &'static str,
    error: String,
}

/// Report a failed run on stderr (text) or stdout (JSON).
pub fn failure(err: &anyhow::Error) {
    if is_json() {
        let class = exit::core_error(err)
            .map(|e| e.class().as_str())
            .unwrap_or("io");
        let _ = print(&FailureOut {
            ok: false,
            class,
            error: format!("{err:#}"),
        });
        return;
    }

    let mut out = stderr();
    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(out, "error:");
    let _ = out.reset();
    let _ = writeln!(out, " {err:#}");
}

pub fn eprintln_line(msg: &str) {
    let _ = writeln!(io::stderr(), "{msg}");
}

/// Block until the operator presses Enter.
pub fn pause() {
    eprintln_line("Press Enter to exit...");
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}
