//! Global status snapshot and buffer pool health metrics.
//!
//! Status names are matched case-insensitively (5.7 reports them upper case,
//! 8.0 in mixed case). A counter that is absent or non-numeric is `None`, and
//! every ratio is defined for all inputs: a missing operand or a zero
//! denominator yields `None`, displayed as `n/a`.

use std::collections::HashMap;

use serde::Serialize;

use crate::diag::session::Row;

pub const PAGES_FREE: &str = "INNODB_BUFFER_POOL_PAGES_FREE";
pub const PAGES_TOTAL: &str = "INNODB_BUFFER_POOL_PAGES_TOTAL";
pub const WAIT_FREE: &str = "INNODB_BUFFER_POOL_WAIT_FREE";
pub const PAGES_FLUSHED: &str = "INNODB_BUFFER_POOL_PAGES_FLUSHED";
pub const POOL_READS: &str = "INNODB_BUFFER_POOL_READS";
pub const POOL_READ_REQUESTS: &str = "INNODB_BUFFER_POOL_READ_REQUESTS";
pub const TMP_DISK_TABLES: &str = "CREATED_TMP_DISK_TABLES";
pub const TMP_TABLES: &str = "CREATED_TMP_TABLES";

/// Global status variables keyed by upper-cased name.
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    values: HashMap<String, String>,
}

impl StatusSnapshot {
    /// Build from `(name, value)` rows. Rows with fewer than two columns or a
    /// NULL name are skipped; a NULL value is stored as missing.
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut values = HashMap::with_capacity(rows.len());
        for row in rows {
            if let (Some(Some(name)), Some(Some(value))) = (row.first(), row.get(1)) {
                values.insert(name.to_uppercase(), value.clone());
            }
        }
        StatusSnapshot { values }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        StatusSnapshot {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.to_uppercase(), v.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(&name.to_uppercase()).map(String::as_str)
    }

    /// Numeric value of a status counter.
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(|v| v.trim().parse().ok())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// `ceil(100 * numerator / denominator)`, or `None` when undefined.
pub fn ceil_percent(numerator: Option<u64>, denominator: Option<u64>) -> Option<u64> {
    let num = u128::from(numerator?);
    let den = u128::from(denominator?);
    if den == 0 {
        return None;
    }
    u64::try_from((num * 100).div_ceil(den)).ok()
}

/// Text form of an optional metric.
pub fn display_metric(value: Option<u64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "n/a".to_string(),
    }
}

/// Derived buffer pool and temporary table health signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthMetrics {
    /// Free pages as a percentage of all pages; should stay at or above 5.
    pub free_page_pct: Option<u64>,
    /// Times a thread waited for a free page; should be 0.
    pub wait_free: Option<u64>,
    /// Pages flushed from the pool; should be low.
    pub pages_flushed: Option<u64>,
    /// Reads that missed the pool, as a percentage of read requests.
    pub disk_read_pct: Option<u64>,
    /// Temporary tables created on disk, as a percentage of all temporary tables.
    pub tmp_disk_table_pct: Option<u64>,
}

impl HealthMetrics {
    pub fn from_status(status: &StatusSnapshot) -> Self {
        HealthMetrics {
            free_page_pct: ceil_percent(status.counter(PAGES_FREE), status.counter(PAGES_TOTAL)),
            wait_free: status.counter(WAIT_FREE),
            pages_flushed: status.counter(PAGES_FLUSHED),
            disk_read_pct: ceil_percent(
                status.counter(POOL_READS),
                status.counter(POOL_READ_REQUESTS),
            ),
            tmp_disk_table_pct: ceil_percent(
                status.counter(TMP_DISK_TABLES),
                status.counter(TMP_TABLES),
            ),
        }
    }

    /// Labeled rows in display order.
    pub fn labeled(&self) -> [(&'static str, Option<u64>); 5] {
        [
            ("Buffer pool free pages (%, optimal >= 5%)", self.free_page_pct),
            ("Waits for free pages (should not happen)", self.wait_free),
            ("Buffer pool pages flushed (should be low)", self.pages_flushed),
            ("Read from disk to buffer (%, should be low)", self.disk_read_pct),
            ("Tmp tables on disk (%, should be low)", self.tmp_disk_table_pct),
        ]
    }
}
