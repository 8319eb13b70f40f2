//! Connect, detect the server dialect, run report or dump, disconnect.

use std::io::Write;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::diag::session::{MysqlSession, Session};
use crate::diag::Inspector;
use crate::util::mysql::MysqlConfig;
use crate::LocksError;

/// What to print once connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Report,
    Dump,
}

/// Options for one inspection run.
pub struct InspectOptions {
    /// Resolved connection settings.
    pub config: MysqlConfig,
    /// Report or dump.
    pub mode: Mode,
    /// Emit output as JSON.
    pub json: bool,
    /// Cancelled by the Ctrl+C handler.
    pub cancel: CancellationToken,
}

/// Open the connection and run the session on a single-threaded runtime.
///
/// The connection attempt itself is cancellable. Once connected, the
/// connection is closed whatever the outcome of the run.
pub fn execute(opts: &InspectOptions, writer: &mut dyn Write) -> Result<(), LocksError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| LocksError::Io(format!("Cannot create async runtime: {}", e)))?;

    rt.block_on(async {
        let mut session = tokio::select! {
            biased;
            _ = opts.cancel.cancelled() => return Err(LocksError::Interrupted),
            session = MysqlSession::connect(&opts.config) => session?,
        };
        run_session(&mut session, &opts.cancel, opts.mode, opts.json, writer).await
    })
}

/// Drive a connected session, then close it on every exit path.
///
/// The dialect is resolved first; if that fails nothing else is queried.
pub async fn run_session(
    session: &mut dyn Session,
    cancel: &CancellationToken,
    mode: Mode,
    json: bool,
    writer: &mut dyn Write,
) -> Result<(), LocksError> {
    let result = {
        let mut inspector = Inspector::new(&mut *session, cancel);
        run(&mut inspector, mode, json, writer).await
    };

    let closed = session.close().await;
    match (result, closed) {
        (Err(e), Err(close_err)) => {
            warn!(error = %close_err, "failed to close connection");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), closed) => closed,
    }
}

async fn run(
    inspector: &mut Inspector<'_>,
    mode: Mode,
    json: bool,
    writer: &mut dyn Write,
) -> Result<(), LocksError> {
    let (version, dialect) = inspector.detect().await?;
    match mode {
        Mode::Report => {
            crate::cli::report::execute(inspector, &version, dialect, json, writer).await
        }
        Mode::Dump => {
            crate::cli::dump::execute(inspector, &version, dialect, json, writer).await
        }
    }
}
