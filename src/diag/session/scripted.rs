use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{Row, Session};
use crate::LocksError;

enum Reply {
    Rows(Vec<Row>),
    Fail(String),
    /// Never completes; optionally cancels a token first to simulate Ctrl+C
    /// arriving while the statement is in flight.
    Hang(Option<CancellationToken>),
}

/// An in-memory [`Session`] that answers from canned responses.
///
/// Each response is keyed by a fragment; the first fragment contained in the
/// executed SQL wins. Unmatched statements fail with [`LocksError::Query`].
/// Every executed statement is recorded in order.
pub struct ScriptedSession {
    replies: Vec<(String, Reply)>,
    executed: Vec<String>,
    closed: bool,
}

impl ScriptedSession {
    pub fn new() -> Self {
        ScriptedSession {
            replies: Vec::new(),
            executed: Vec::new(),
            closed: false,
        }
    }

    /// Answer statements containing `fragment` with `rows`.
    pub fn respond(mut self, fragment: &str, rows: Vec<Row>) -> Self {
        self.replies.push((fragment.to_string(), Reply::Rows(rows)));
        self
    }

    /// Fail statements containing `fragment` with `message`.
    pub fn fail(mut self, fragment: &str, message: &str) -> Self {
        self.replies
            .push((fragment.to_string(), Reply::Fail(message.to_string())));
        self
    }

    /// Block forever on statements containing `fragment`.
    pub fn hang(mut self, fragment: &str) -> Self {
        self.replies.push((fragment.to_string(), Reply::Hang(None)));
        self
    }

    /// Cancel `token` and then block forever on statements containing `fragment`.
    pub fn cancel_during(mut self, fragment: &str, token: CancellationToken) -> Self {
        self.replies
            .push((fragment.to_string(), Reply::Hang(Some(token))));
        self
    }

    /// Statements executed so far, in order.
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    /// Whether [`Session::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Default for ScriptedSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Session for ScriptedSession {
    async fn query(&mut self, sql: &str) -> Result<Vec<Row>, LocksError> {
        if self.closed {
            return Err(LocksError::Query("connection already closed".to_string()));
        }
        self.executed.push(sql.to_string());

        let reply = self
            .replies
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map(|(_, reply)| reply);

        match reply {
            Some(Reply::Rows(rows)) => Ok(rows.clone()),
            Some(Reply::Fail(msg)) => Err(LocksError::Query(msg.clone())),
            Some(Reply::Hang(token)) => {
                if let Some(token) = token {
                    token.cancel();
                }
                std::future::pending::<()>().await;
                Err(LocksError::Query("unreachable".to_string()))
            }
            None => Err(LocksError::Query(format!("no scripted response for: {}", sql))),
        }
    }

    async fn close(&mut self) -> Result<(), LocksError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_matching_fragment_wins() {
        let mut s = ScriptedSession::new()
            .respond("VERSION()", vec![vec![Some("8.0.36".to_string())]])
            .respond("SELECT", vec![]);
        let rows = s.query("SELECT VERSION()").await.unwrap();
        assert_eq!(rows, vec![vec![Some("8.0.36".to_string())]]);
        assert!(s.query("SELECT 1").await.unwrap().is_empty());
        assert_eq!(s.executed().len(), 2);
    }

    #[tokio::test]
    async fn test_unmatched_and_failing() {
        let mut s = ScriptedSession::new().fail("SHOW", "denied");
        assert!(matches!(
            s.query("SHOW ENGINE INNODB STATUS").await,
            Err(LocksError::Query(m)) if m == "denied"
        ));
        assert!(matches!(s.query("SELECT 1").await, Err(LocksError::Query(_))));
    }

    #[tokio::test]
    async fn test_closed_session_rejects_queries() {
        let mut s = ScriptedSession::new().respond("SELECT", vec![]);
        s.close().await.unwrap();
        assert!(s.is_closed());
        assert!(s.query("SELECT 1").await.is_err());
        assert!(s.executed().is_empty());
    }
}
