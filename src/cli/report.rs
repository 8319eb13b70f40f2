//! Report mode: three labeled sections, in order.
//!
//! 1. Table locks: every waiting/blocking transaction pair.
//! 2. InnoDB data + index size next to the configured buffer pool size.
//! 3. Buffer pool and temporary table health ratios from global status.

use std::io::Write;

use crate::cli::{write_json, write_label, wprintln};
use crate::diag::dialect::Dialect;
use crate::diag::report::{self, LockWait, StorageSizes, LOCK_WAIT_COLUMNS};
use crate::diag::status::{display_metric, HealthMetrics};
use crate::diag::table::{Align, RenderedTable};
use crate::diag::Inspector;
use crate::LocksError;

/// Collect and print the report.
///
/// Text output is written section by section as each statement finishes;
/// JSON output is written once everything has been collected.
pub async fn execute(
    inspector: &mut Inspector<'_>,
    version: &str,
    dialect: Dialect,
    json: bool,
    writer: &mut dyn Write,
) -> Result<(), LocksError> {
    if json {
        let report = report::collect(inspector, version, dialect).await?;
        return write_json(writer, &report);
    }

    let lock_waits = report::fetch_lock_waits(inspector, dialect).await?;
    write_label(writer, report::SECTION_LOCKS)?;
    wprintln!(writer, "{}", lock_table(&lock_waits)?)?;

    let sizes = report::fetch_storage_sizes(inspector).await?;
    write_label(writer, report::SECTION_STORAGE)?;
    wprintln!(writer, "{}", size_table(&sizes)?)?;

    let status = report::fetch_global_status(inspector, dialect).await?;
    write_label(writer, report::SECTION_METRICS)?;
    wprintln!(writer, "{}", metrics_table(&HealthMetrics::from_status(&status))?)?;

    Ok(())
}

pub fn lock_table(lock_waits: &[LockWait]) -> Result<RenderedTable, LocksError> {
    let mut table = RenderedTable::new(LOCK_WAIT_COLUMNS);
    for lw in lock_waits {
        table.push_row(lw.cells())?;
    }
    Ok(table)
}

pub fn size_table(sizes: &StorageSizes) -> Result<RenderedTable, LocksError> {
    let mut table = RenderedTable::new(["Total InnoDB Size (GB)", "InnoDB Buffer Size (GB)"])
        .with_align(0, Align::Right)
        .with_align(1, Align::Right);
    table.push_row(vec![
        Some(format!("{:.2}", sizes.innodb_data_gib)),
        Some(format!("{:.2}", sizes.buffer_pool_gib)),
    ])?;
    Ok(table)
}

/// Metric column left-aligned, value column right-aligned.
pub fn metrics_table(metrics: &HealthMetrics) -> Result<RenderedTable, LocksError> {
    let mut table = RenderedTable::new(["Metric", "Value"]).with_align(1, Align::Right);
    for (label, value) in metrics.labeled() {
        table.push_row(vec![Some(label.to_string()), Some(display_metric(value))])?;
    }
    Ok(table)
}
