//! Dump mode: engine status text and the raw introspection tables.

use serde::Serialize;

use crate::diag::dialect::{Dialect, TableRef};
use crate::diag::table::RenderedTable;
use crate::diag::Inspector;
use crate::LocksError;

pub const ENGINE_STATUS_QUERY: &str = "SHOW ENGINE INNODB STATUS";
pub const SECTION_ENGINE_STATUS: &str = "InnoDB engine status";

/// One labeled table in the dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpSection {
    pub label: &'static str,
    pub table: TableRef,
}

/// A dumped table together with its label, for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct DumpedTable {
    pub label: String,
    pub schema: String,
    pub table: String,
    #[serde(flatten)]
    pub data: RenderedTable,
}

/// Everything dump mode prints, in one serializable value.
#[derive(Debug, Clone, Serialize)]
pub struct Dump {
    pub version: String,
    pub dialect: Dialect,
    pub collected_at: String,
    pub engine_status: String,
    pub sections: Vec<DumpedTable>,
}

/// Tables dumped after the engine status, in output order.
pub fn dump_plan(dialect: Dialect) -> Vec<DumpSection> {
    let q = dialect.queries();
    let section = |label, table| DumpSection { label, table };
    vec![
        section("Process list", TableRef::new("information_schema", "processlist")),
        section("InnoDB transactions", TableRef::new("information_schema", "innodb_trx")),
        section(q.locks.0, q.locks.1),
        section(q.lock_waits_table.0, q.lock_waits_table.1),
        section("Threads", TableRef::new("performance_schema", "threads")),
        section("Table handles", TableRef::new("performance_schema", "table_handles")),
        section("Global status", q.status_table),
    ]
}

/// The free-form `Status` column of `SHOW ENGINE INNODB STATUS`.
pub async fn fetch_engine_status(inspector: &mut Inspector<'_>) -> Result<String, LocksError> {
    let row = inspector
        .query_first(ENGINE_STATUS_QUERY)
        .await?
        .ok_or_else(|| {
            LocksError::Query("SHOW ENGINE INNODB STATUS returned no rows".to_string())
        })?;
    match row.into_iter().nth(2) {
        Some(Some(text)) => Ok(text),
        Some(None) => Ok(String::new()),
        None => Err(LocksError::Query(
            "SHOW ENGINE INNODB STATUS returned fewer than 3 columns".to_string(),
        )),
    }
}
