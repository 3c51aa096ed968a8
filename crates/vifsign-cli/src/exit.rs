//! Process exit codes, one per error class.

use std::process::ExitCode;

use vifsign_core::{ErrorClass, VifError};

pub const USAGE: u8 = 2;
pub const PATH: u8 = 3;
pub const OUTPUT_EXISTS: u8 = 4;
pub const CRYPTO: u8 = 5;
pub const DOCUMENT: u8 = 6;
pub const IO: u8 = 7;

/// Find the core error behind an `anyhow` chain, if any.
pub fn core_error(err: &anyhow::Error) -> Option<&VifError> {
    err.chain().find_map(|e| e.downcast_ref::<VifError>())
}

pub fn code_for_class(class: ErrorClass) -> u8 {
    match class {
        ErrorClass::Path => PATH,
        ErrorClass::OutputCollision => OUTPUT_EXISTS,
        ErrorClass::Crypto => CRYPTO,
        ErrorClass::Document => DOCUMENT,
        ErrorClass::Config => USAGE,
        ErrorClass::Io => IO,
    }
}

pub fn code_for(err: &anyhow::Error) -> ExitCode {
    let code = core_error(err)
        .map(|e| code_for_class(e.class()))
        .unwrap_or(IO);
    ExitCode::from(code)
}
