//! Session abstraction over a single server connection.
//!
//! The report and dump pipelines only ever need "run this statement, give me
//! the rows as text", so the seam is kept that narrow. [`MysqlSession`] backs
//! it with one `mysql_async` connection; [`ScriptedSession`] answers from
//! canned responses for tests.

mod mysql;
mod scripted;

pub use mysql::MysqlSession;
pub use scripted::ScriptedSession;

use async_trait::async_trait;

use crate::LocksError;

/// One value as returned by the server. `None` is SQL `NULL`.
pub type Cell = Option<String>;

/// One result row, in column order.
pub type Row = Vec<Cell>;

/// A live connection capable of running text-protocol statements.
#[async_trait]
pub trait Session: Send {
    /// Execute one statement and return every row, fully materialized.
    async fn query(&mut self, sql: &str) -> Result<Vec<Row>, LocksError>;

    /// Release the connection. Calling it more than once is a no-op.
    async fn close(&mut self) -> Result<(), LocksError>;
}

/// Render a cell for text output.
pub fn cell_text(cell: &Cell) -> &str {
    cell.as_deref().unwrap_or("NULL")
}
