//! Command-line front end for the `mysql-locks` binary.
//!
//! CLI argument parsing uses clap derive macros, with the [`app::Cli`] struct
//! defined in [`app`] and shared between `main.rs` and `build.rs` (for man
//! page and completion generation) via `include!()`.
//!
//! Output modules follow one pattern: an async `execute` taking an
//! [`Inspector`](crate::diag::Inspector) and a `writer: &mut dyn Write`, so
//! tests can capture output in a `Vec<u8>` and the global `--output` flag can
//! redirect it to a file. The `wprintln!` and `wprint!` macros wrap
//! `writeln!`/`write!` to convert `io::Error` into `LocksError`.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`app`] | clap definition |
//! | [`prompt`] | Credential resolution: flags, defaults file, interactive prompts |
//! | [`inspect`] | Connect, detect version, dispatch, always disconnect |
//! | [`report`] | Report mode rendering |
//! | [`dump`] | Dump mode rendering |

pub mod app;
pub mod dump;
pub mod inspect;
pub mod prompt;
pub mod report;

/// Write a line to the given writer, converting io::Error to LocksError.
macro_rules! wprintln {
    ($w:expr) => {
        writeln!($w).map_err(|e| $crate::LocksError::Io(e.to_string()))
    };
    ($w:expr, $($arg:tt)*) => {
        writeln!($w, $($arg)*).map_err(|e| $crate::LocksError::Io(e.to_string()))
    };
}

/// Write (without newline) to the given writer, converting io::Error to LocksError.
macro_rules! wprint {
    ($w:expr, $($arg:tt)*) => {
        write!($w, $($arg)*).map_err(|e| $crate::LocksError::Io(e.to_string()))
    };
}

pub(crate) use wprint;
pub(crate) use wprintln;

use std::io::Write;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::LocksError;

/// Print a bold section label followed by a colon.
pub(crate) fn write_label(writer: &mut dyn Write, label: &str) -> Result<(), LocksError> {
    wprintln!(writer, "{}", format!("{}:", label).bold())
}

/// Serialize a value as pretty JSON to the writer.
pub(crate) fn write_json<T: serde::Serialize>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), LocksError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| LocksError::Io(format!("JSON serialization error: {}", e)))?;
    wprintln!(writer, "{}", json)
}

/// Create a stderr spinner for a statement that may take a while.
///
/// indicatif hides the spinner when stderr is not a terminal.
pub(crate) fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
