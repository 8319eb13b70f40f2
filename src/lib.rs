//! InnoDB lock contention and buffer pool health inspector.
//!
//! The `mysql-locks-helper` crate (library name `mlh`) connects to a live
//! MySQL 5.7 or 8.0 server, detects its version family, and either prints a
//! short contention/health report or dumps the raw InnoDB introspection
//! tables.
//!
//! # CLI Reference
//!
//! ```text
//! mysql-locks -h db1 -u admin            # report mode (prompts for password)
//! mysql-locks -h db1 -u admin -p secret -d   # dump mode
//! mysql-locks --defaults-file ~/.my.cnf --json
//! ```
//!
//! | Option | Purpose |
//! |--------|---------|
//! | `-h, --host` | Server host (prompted if missing) |
//! | `-P, --port` | Server port (default 3306) |
//! | `-u, --user` | User name (prompted if missing) |
//! | `-p, --password` | Password (prompted with hidden input if missing) |
//! | `-d, --dump` | Dump engine status and introspection tables instead of the report |
//! | `--defaults-file` | Read `[client]` credentials from a `.my.cnf` file |
//! | `--json` | Machine-readable output |
//! | `--color <auto\|always\|never>` | Control colored output (default `auto`) |
//! | `-o, --output <FILE>` | Write output to a file instead of stdout |
//! | `-v, --verbose` | Log to stderr; repeat for more detail (up to `-vvv`) |
//! | `-V, --version` | Show version |
//! | `-?, --help` | Show help |
//!
//! # Library API
//!
//! The report and dump pipelines run against any [`Session`](diag::session::Session),
//! so they can be driven by the scripted in-memory session in tests:
//!
//! ```no_run
//! use mlh::diag::session::ScriptedSession;
//! use mlh::diag::Inspector;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), mlh::LocksError> {
//! let mut session = ScriptedSession::new()
//!     .respond("SELECT VERSION()", vec![vec![Some("8.0.36".into())]]);
//! let cancel = CancellationToken::new();
//! let mut inspector = Inspector::new(&mut session, &cancel);
//! let dialect = inspector.detect_dialect().await?;
//! println!("{}", dialect);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`diag::dialect`] | Version detection and per-dialect query tables |
//! | [`diag::session`] | Session trait, MySQL-backed and scripted implementations |
//! | [`diag::status`] | Global status snapshot and health ratio math |
//! | [`diag::report`] | Report data collection |
//! | [`diag::dump`] | Dump plan and engine status |
//! | [`diag::table`] | Aligned text table rendering and full-table fetch |
//! | [`util::mysql`] | Connection settings and `.my.cnf` parsing |
//!
//! ## Feature flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli` | on | Builds the `mysql-locks` binary and the [`cli`] module. |

#[cfg(feature = "cli")]
pub mod cli;
pub mod diag;
pub mod util;

use thiserror::Error;

/// Errors returned by `mlh` operations.
#[derive(Error, Debug)]
pub enum LocksError {
    /// The server could not be reached or rejected the credentials.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server reported a version outside the 5.7 and 8.0 families.
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    /// The user interrupted the run (Ctrl+C).
    #[error("Interrupted")]
    Interrupted,

    /// A diagnostic statement failed or returned an unexpected shape.
    #[error("Query error: {0}")]
    Query(String),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// An invalid argument was supplied or could not be read.
    #[error("Invalid argument: {0}")]
    Argument(String),
}
