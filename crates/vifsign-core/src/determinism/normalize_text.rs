//! Text normalization rules for VIF documents.
//!
//! These functions define the exact byte sequence that gets hashed and signed.
//! A verifier rebuilds the same sequence from the signed file, so any change
//! here breaks every signature produced before it.
//!
//! All functions are pure (no I/O).

/// Split text into lines the way line-oriented readers do.
///
/// Rules:
/// - `\n`, `\r\n` and a lone `\r` each terminate a line
/// - a terminator at the very end does not open an extra empty line
/// - empty lines in the middle are preserved
/// - a leading UTF-8 BOM is dropped
pub fn split_lines(input: &str) -> Vec<String> {
    let s = input.strip_prefix('\u{FEFF}').unwrap_or(input);

    let mut lines = Vec::new();
    let mut rest = s;
    while !rest.is_empty() {
        match rest.find(['\r', '\n']) {
            Some(idx) => {
                lines.push(rest[..idx].to_string());
                let skip = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + skip..];
            }
            None => {
                lines.push(rest.to_string());
                break;
            }
        }
    }
    lines
}

/// Build the canonical payload from a document's lines.
///
/// Only lines strictly between the first and the last line take part. Each is
/// trimmed, blank results are dropped, survivors are joined with `\n`, and the
/// joined text loses any trailing whitespace.
///
/// Returns `None` when the document has fewer than two lines.
pub fn canonical_payload<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    if lines.len() < 2 {
        return None;
    }

    let body = &lines[1..lines.len() - 1];
    let joined = body
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Some(joined.trim_end().to_string())
}

/// Render a signed document: `signature` appended to line 0, lines joined with
/// `\n`, no trailing whitespace or terminator at the end of the text.
pub fn render_signed<S: AsRef<str>>(lines: &[S], signature: &str) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.as_ref());
        if i == 0 {
            out.push_str(signature);
        }
    }
    out.truncate(out.trim_end().len());
    out
}
