//! Snapshots of the process environment
//!
//! A FastCGI runtime hands every request its own environment table. These
//! helpers copy the table once and print it for diagnostics; nothing here
//! modifies the environment.

use crate::fastcgi::Params;

use std::env;
use std::io::{self, Write};

/// Copies the process environment as it is right now.
///
/// Names or values that are not valid Unicode are converted lossily.
pub fn snapshot() -> Params {
    env::vars_os()
        .map(|(name, value)| (name.to_string_lossy().into_owned(),
                              value.to_string_lossy().into_owned()))
        .collect()
}

/// Writes one `KEY=VALUE` line per parameter, in key order
pub fn dump_env<W: Write>(mut out: W, params: &Params) -> io::Result<()> {
    for (name, value) in params {
        writeln!(out, "{}={}", name, value)?;
    }

    out.flush()
}

/// Writes a snapshot of the process environment to standard output
pub fn dump_process_env() -> io::Result<()> {
    let stdout = io::stdout();
    dump_env(stdout.lock(), &snapshot())
}
