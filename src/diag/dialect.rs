//! Server version detection and per-dialect statement tables.
//!
//! MySQL 5.7 exposes lock and status data through `information_schema`;
//! 8.0 moved most of it to `performance_schema`. Every statement or table
//! that differs between the two lives in a [`DialectQueries`] table so the
//! report and dump code never branch on the version themselves.

use std::fmt;

use serde::Serialize;

use crate::LocksError;

/// Statement used to read the server version string.
pub const VERSION_QUERY: &str = "SELECT VERSION()";

/// Supported server version families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dialect {
    /// MySQL 5.7.x
    #[serde(rename = "5.7")]
    V57,
    /// MySQL 8.0.x
    #[serde(rename = "8.0")]
    V80,
}

/// A fully qualified `schema.table` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableRef {
    pub schema: &'static str,
    pub table: &'static str,
}

impl TableRef {
    pub const fn new(schema: &'static str, table: &'static str) -> Self {
        TableRef { schema, table }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Dialect-specific statements and tables.
#[derive(Debug)]
pub struct DialectQueries {
    /// Waiting/blocking transaction pairs, six columns.
    pub lock_waits: &'static str,
    /// Full global status as `(VARIABLE_NAME, VARIABLE_VALUE)` rows.
    pub global_status: &'static str,
    /// Table backing `global_status`, dumped as-is in dump mode.
    pub status_table: TableRef,
    /// Held/requested locks table and its dump label.
    pub locks: (&'static str, TableRef),
    /// Lock wait table and its dump label.
    pub lock_waits_table: (&'static str, TableRef),
}

static V57_QUERIES: DialectQueries = DialectQueries {
    lock_waits: "\
SELECT
    r.trx_id AS waiting_trx_id,
    r.trx_mysql_thread_id AS waiting_thread,
    r.trx_query AS waiting_query,
    b.trx_id AS blocking_trx_id,
    b.trx_mysql_thread_id AS blocking_thread,
    b.trx_query AS blocking_query
FROM information_schema.INNODB_LOCK_WAITS w
INNER JOIN information_schema.INNODB_TRX b
    ON b.trx_id = w.blocking_trx_id
INNER JOIN information_schema.INNODB_TRX r
    ON r.trx_id = w.requesting_trx_id",
    global_status: "SELECT VARIABLE_NAME, VARIABLE_VALUE FROM information_schema.GLOBAL_STATUS",
    status_table: TableRef::new("information_schema", "global_status"),
    locks: (
        "InnoDB locks",
        TableRef::new("information_schema", "innodb_locks"),
    ),
    lock_waits_table: (
        "InnoDB lock waits",
        TableRef::new("information_schema", "innodb_lock_waits"),
    ),
};

static V80_QUERIES: DialectQueries = DialectQueries {
    lock_waits: "\
SELECT
    r.trx_id AS waiting_trx_id,
    r.trx_mysql_thread_id AS waiting_thread,
    r.trx_query AS waiting_query,
    b.trx_id AS blocking_trx_id,
    b.trx_mysql_thread_id AS blocking_thread,
    b.trx_query AS blocking_query
FROM performance_schema.data_lock_waits w
INNER JOIN information_schema.innodb_trx b
    ON b.trx_id = w.blocking_engine_transaction_id
INNER JOIN information_schema.innodb_trx r
    ON r.trx_id = w.requesting_engine_transaction_id",
    global_status: "SELECT VARIABLE_NAME, VARIABLE_VALUE FROM performance_schema.global_status",
    status_table: TableRef::new("performance_schema", "global_status"),
    locks: (
        "Data locks",
        TableRef::new("performance_schema", "data_locks"),
    ),
    lock_waits_table: (
        "Data lock waits",
        TableRef::new("performance_schema", "data_lock_waits"),
    ),
};

impl Dialect {
    /// Classify a `VERSION()` string.
    ///
    /// Only the 5.7 and 8.0 families are supported. Anything else, including
    /// MariaDB's `10.x` strings and newer MySQL lines, is rejected with the raw
    /// string attached.
    pub fn from_version(version: &str) -> Result<Self, LocksError> {
        let v = version.trim();
        if v.starts_with("5.7") {
            Ok(Dialect::V57)
        } else if v.starts_with("8.0") {
            Ok(Dialect::V80)
        } else {
            Err(LocksError::UnsupportedVersion(version.to_string()))
        }
    }

    /// Statement table for this dialect.
    pub fn queries(self) -> &'static DialectQueries {
        match self {
            Dialect::V57 => &V57_QUERIES,
            Dialect::V80 => &V80_QUERIES,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::V57 => write!(f, "MySQL 5.7"),
            Dialect::V80 => write!(f, "MySQL 8.0"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v57_prefix() {
        for v in ["5.7.44", "5.7.44-log", "5.7.21-21-percona"] {
            assert_eq!(Dialect::from_version(v).unwrap(), Dialect::V57);
        }
    }

    #[test]
    fn test_v80_prefix() {
        for v in ["8.0.36", "8.0.36-0ubuntu0.22.04.1", "8.0.11"] {
            assert_eq!(Dialect::from_version(v).unwrap(), Dialect::V80);
        }
    }

    #[test]
    fn test_unsupported_keeps_raw_string() {
        for v in ["10.6.16-MariaDB", "8.4.0", "5.6.51", "", "9.0.1"] {
            match Dialect::from_version(v) {
                Err(LocksError::UnsupportedVersion(raw)) => assert_eq!(raw, v),
                other => panic!("expected UnsupportedVersion for {:?}, got {:?}", v, other),
            }
        }
    }

    #[test]
    fn test_queries_differ_by_dialect() {
        let v57 = Dialect::V57.queries();
        let v80 = Dialect::V80.queries();
        assert!(v57.lock_waits.contains("INNODB_LOCK_WAITS"));
        assert!(v80.lock_waits.contains("performance_schema.data_lock_waits"));
        assert!(v57.global_status.contains("information_schema.GLOBAL_STATUS"));
        assert!(v80.global_status.contains("performance_schema.global_status"));
        assert_eq!(v57.locks.1.table, "innodb_locks");
        assert_eq!(v80.lock_waits_table.1.table, "data_lock_waits");
    }

    #[test]
    fn test_display() {
        assert_eq!(Dialect::V57.to_string(), "MySQL 5.7");
        assert_eq!(
            TableRef::new("performance_schema", "threads").to_string(),
            "performance_schema.threads"
        );
    }
}
