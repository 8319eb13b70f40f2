//! Report mode data collection: lock waits, storage size, health metrics.

use serde::Serialize;

use crate::diag::dialect::Dialect;
use crate::diag::session::{Cell, Row};
use crate::diag::status::{HealthMetrics, StatusSnapshot};
use crate::diag::Inspector;
use crate::LocksError;

pub const SECTION_LOCKS: &str = "Table locks";
pub const SECTION_STORAGE: &str = "Data currently in use by the InnoDB engine";
pub const SECTION_METRICS: &str = "Some important global metrics";

pub const BUFFER_POOL_QUERY: &str = "SHOW VARIABLES LIKE 'innodb_buffer_pool_size'";
pub const INNODB_SIZE_QUERY: &str =
    "SELECT SUM(data_length + index_length) FROM information_schema.tables WHERE engine = 'InnoDB'";

/// Column headers of the lock wait table.
pub const LOCK_WAIT_COLUMNS: [&str; 6] = [
    "waiting_trx_id",
    "waiting_thread",
    "waiting_query",
    "blocking_trx_id",
    "blocking_thread",
    "blocking_query",
];

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// A transaction blocked on a lock held by another transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockWait {
    pub waiting_trx_id: Cell,
    pub waiting_thread: Cell,
    pub waiting_query: Cell,
    pub blocking_trx_id: Cell,
    pub blocking_thread: Cell,
    pub blocking_query: Cell,
}

impl LockWait {
    fn from_row(row: Row) -> Result<Self, LocksError> {
        let n = row.len();
        let cells: [Cell; 6] = row.try_into().map_err(|_| {
            LocksError::Query(format!("lock wait row has {} columns, expected 6", n))
        })?;
        let [
            waiting_trx_id,
            waiting_thread,
            waiting_query,
            blocking_trx_id,
            blocking_thread,
            blocking_query,
        ] = cells;
        Ok(LockWait {
            waiting_trx_id,
            waiting_thread,
            waiting_query,
            blocking_trx_id,
            blocking_thread,
            blocking_query,
        })
    }

    /// Cells in [`LOCK_WAIT_COLUMNS`] order.
    pub fn cells(&self) -> Row {
        vec![
            self.waiting_trx_id.clone(),
            self.waiting_thread.clone(),
            self.waiting_query.clone(),
            self.blocking_trx_id.clone(),
            self.blocking_thread.clone(),
            self.blocking_query.clone(),
        ]
    }
}

/// InnoDB data+index size against the configured buffer pool, in GiB.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageSizes {
    pub innodb_data_gib: f64,
    pub buffer_pool_gib: f64,
}

/// Everything report mode prints, in one serializable value.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub version: String,
    pub dialect: Dialect,
    pub collected_at: String,
    pub lock_waits: Vec<LockWait>,
    pub storage: StorageSizes,
    pub health: HealthMetrics,
}

pub fn bytes_to_gib(bytes: f64) -> f64 {
    bytes / GIB
}

fn parse_number(cell: Option<&Cell>, what: &str) -> Result<f64, LocksError> {
    match cell {
        None | Some(None) => Ok(0.0),
        Some(Some(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| LocksError::Query(format!("{} is not numeric: {:?}", what, text))),
    }
}

/// Current lock waits for the dialect.
pub async fn fetch_lock_waits(
    inspector: &mut Inspector<'_>,
    dialect: Dialect,
) -> Result<Vec<LockWait>, LocksError> {
    inspector
        .query(dialect.queries().lock_waits)
        .await?
        .into_iter()
        .map(LockWait::from_row)
        .collect()
}

/// Buffer pool size and total InnoDB data+index size.
///
/// A server with no InnoDB tables reports a NULL sum, counted as zero.
pub async fn fetch_storage_sizes(
    inspector: &mut Inspector<'_>,
) -> Result<StorageSizes, LocksError> {
    let pool = inspector.query_first(BUFFER_POOL_QUERY).await?.ok_or_else(|| {
        LocksError::Query("innodb_buffer_pool_size is not set".to_string())
    })?;
    let buffer_pool_bytes = parse_number(pool.get(1), "innodb_buffer_pool_size")?;

    let size = inspector.query_first(INNODB_SIZE_QUERY).await?;
    let data_bytes = parse_number(size.as_ref().and_then(|r| r.first()), "InnoDB size")?;

    Ok(StorageSizes {
        innodb_data_gib: bytes_to_gib(data_bytes),
        buffer_pool_gib: bytes_to_gib(buffer_pool_bytes),
    })
}

/// Full global status for the dialect.
pub async fn fetch_global_status(
    inspector: &mut Inspector<'_>,
    dialect: Dialect,
) -> Result<StatusSnapshot, LocksError> {
    let rows = inspector.query(dialect.queries().global_status).await?;
    Ok(StatusSnapshot::from_rows(&rows))
}

/// Collect a complete report.
pub async fn collect(
    inspector: &mut Inspector<'_>,
    version: &str,
    dialect: Dialect,
) -> Result<Report, LocksError> {
    let lock_waits = fetch_lock_waits(inspector, dialect).await?;
    let storage = fetch_storage_sizes(inspector).await?;
    let status = fetch_global_status(inspector, dialect).await?;
    Ok(Report {
        version: version.to_string(),
        dialect,
        collected_at: chrono::Local::now().to_rfc3339(),
        lock_waits,
        storage,
        health: HealthMetrics::from_status(&status),
    })
}
