//! Live-server diagnostics: version detection, report and dump collection.
//!
//! Everything here talks to the server through an [`Inspector`], which wraps
//! a [`Session`](session::Session) with a cancellation token. Statements run
//! strictly one after another; each one is raced against the token so a
//! Ctrl+C abandons the remaining work even while a statement is in flight.

pub mod dialect;
pub mod dump;
pub mod report;
pub mod session;
pub mod status;
pub mod table;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::LocksError;
use dialect::{Dialect, VERSION_QUERY};
use session::{Row, Session};

/// Sequential, cancellable statement runner over one session.
pub struct Inspector<'a> {
    session: &'a mut dyn Session,
    cancel: &'a CancellationToken,
}

impl<'a> Inspector<'a> {
    pub fn new(session: &'a mut dyn Session, cancel: &'a CancellationToken) -> Self {
        Inspector { session, cancel }
    }

    /// Run one statement to completion, or fail with
    /// [`LocksError::Interrupted`] once the token is cancelled.
    pub async fn query(&mut self, sql: &str) -> Result<Vec<Row>, LocksError> {
        let cancel = self.cancel;
        if cancel.is_cancelled() {
            return Err(LocksError::Interrupted);
        }
        debug!(sql = %single_line(sql), "executing statement");

        let session = &mut *self.session;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LocksError::Interrupted),
            rows = session.query(sql) => {
                let rows = rows?;
                debug!(rows = rows.len(), "statement finished");
                Ok(rows)
            }
        }
    }

    /// Run a statement and return only its first row.
    pub async fn query_first(&mut self, sql: &str) -> Result<Option<Row>, LocksError> {
        Ok(self.query(sql).await?.into_iter().next())
    }

    /// Read `VERSION()` and return the raw string.
    pub async fn server_version(&mut self) -> Result<String, LocksError> {
        let row = self.query_first(VERSION_QUERY).await?;
        Ok(row
            .and_then(|r| r.into_iter().next())
            .flatten()
            .unwrap_or_default())
    }

    /// Resolve the dialect. Must succeed before any diagnostic statement runs.
    pub async fn detect_dialect(&mut self) -> Result<Dialect, LocksError> {
        Ok(self.detect().await?.1)
    }

    /// Version string together with its dialect.
    pub async fn detect(&mut self) -> Result<(String, Dialect), LocksError> {
        let version = self.server_version().await?;
        let dialect = Dialect::from_version(&version)?;
        info!(%version, %dialect, "detected server version");
        Ok((version, dialect))
    }
}

/// Collapse whitespace so multi-line statements log on one line.
fn single_line(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use session::ScriptedSession;

    fn version_row(v: &str) -> Vec<Row> {
        vec![vec![Some(v.to_string())]]
    }

    #[tokio::test]
    async fn test_detect_dialect() {
        let mut s = ScriptedSession::new().respond("VERSION()", version_row("5.7.44-log"));
        let cancel = CancellationToken::new();
        let mut insp = Inspector::new(&mut s, &cancel);
        assert_eq!(insp.detect_dialect().await.unwrap(), Dialect::V57);
    }

    #[tokio::test]
    async fn test_null_version_is_unsupported() {
        let mut s = ScriptedSession::new().respond("VERSION()", vec![vec![None]]);
        let cancel = CancellationToken::new();
        let mut insp = Inspector::new(&mut s, &cancel);
        assert!(matches!(
            insp.detect_dialect().await,
            Err(LocksError::UnsupportedVersion(v)) if v.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_statement() {
        let mut s = ScriptedSession::new().respond("VERSION()", version_row("8.0.36"));
        let cancel = CancellationToken::new();
        cancel.cancel();
        {
            let mut insp = Inspector::new(&mut s, &cancel);
            assert!(matches!(insp.query("SELECT VERSION()").await, Err(LocksError::Interrupted)));
        }
        assert!(s.executed().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_during_statement() {
        let cancel = CancellationToken::new();
        let mut s = ScriptedSession::new().cancel_during("SLEEP", cancel.clone());
        let mut insp = Inspector::new(&mut s, &cancel);
        assert!(matches!(insp.query("SELECT SLEEP(3600)").await, Err(LocksError::Interrupted)));
    }

    #[tokio::test]
    async fn test_hung_statement_released_by_cancel_from_another_task() {
        let cancel = CancellationToken::new();
        let mut s = ScriptedSession::new()
            .hang("data_lock_waits")
            .respond("SELECT", vec![]);
        let trigger = cancel.clone();
        tokio::spawn(async move { trigger.cancel() });
        {
            let mut insp = Inspector::new(&mut s, &cancel);
            let result = insp.query("SELECT * FROM performance_schema.data_lock_waits").await;
            assert!(matches!(result, Err(LocksError::Interrupted)));
            assert!(matches!(insp.query("SELECT 1").await, Err(LocksError::Interrupted)));
        }
        assert_eq!(s.executed().len(), 1);
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("SELECT\n    a,\n    b\nFROM t"), "SELECT a, b FROM t");
    }
}
