//! Dump mode: `SHOW ENGINE INNODB STATUS` followed by seven raw tables.
//!
//! No health math happens here. Tables are printed as they arrive; a failing
//! statement aborts the rest of the dump instead of skipping the table.

use std::io::Write;

use tracing::info;

use crate::cli::{create_spinner, write_json, write_label, wprint, wprintln};
use crate::diag::dialect::Dialect;
use crate::diag::dump::{self, Dump, DumpedTable, SECTION_ENGINE_STATUS};
use crate::diag::table::fetch_table;
use crate::diag::Inspector;
use crate::LocksError;

pub async fn execute(
    inspector: &mut Inspector<'_>,
    version: &str,
    dialect: Dialect,
    json: bool,
    writer: &mut dyn Write,
) -> Result<(), LocksError> {
    let engine_status = dump::fetch_engine_status(inspector).await?;
    if !json {
        write_label(writer, SECTION_ENGINE_STATUS)?;
        wprint!(writer, "{}", engine_status)?;
        if !engine_status.ends_with('\n') {
            wprintln!(writer)?;
        }
        wprintln!(writer)?;
    }

    let mut sections = Vec::new();
    for section in dump::dump_plan(dialect) {
        let spinner = create_spinner(format!("Reading {}", section.table));
        let fetched = fetch_table(inspector, section.table).await;
        spinner.finish_and_clear();
        let data = fetched?;
        info!(table = %section.table, rows = data.rows().len(), "dumped table");

        if json {
            sections.push(DumpedTable {
                label: section.label.to_string(),
                schema: section.table.schema.to_string(),
                table: section.table.table.to_string(),
                data,
            });
        } else {
            write_label(writer, section.label)?;
            wprintln!(writer, "{}", data)?;
        }
    }

    if json {
        write_json(
            writer,
            &Dump {
                version: version.to_string(),
                dialect,
                collected_at: chrono::Local::now().to_rfc3339(),
                engine_status,
                sections,
            },
        )?;
    }
    Ok(())
}
