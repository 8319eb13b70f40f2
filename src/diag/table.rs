//! Bordered text tables and whole-table introspection.
//!
//! [`fetch_table`] reads a table's column list from
//! `information_schema.columns` (in ordinal order), selects every row, and
//! returns a [`RenderedTable`]. There is no row limit: the whole table is
//! held in memory, which is fine for the server's own introspection tables
//! but not for user data.

use std::fmt;

use prettytable as pt;
use prettytable::format::{Alignment, FormatBuilder, LinePosition, LineSeparator, TableFormat};
use serde::Serialize;

use crate::diag::dialect::TableRef;
use crate::diag::session::{cell_text, Cell, Row};
use crate::diag::Inspector;
use crate::LocksError;

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Column names plus rows of cells. Serializes as `{columns, rows}`; the
/// `Display` impl draws it as a bordered grid through `prettytable`, which
/// pads by display width so wide characters stay aligned.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedTable {
    columns: Vec<String>,
    #[serde(skip)]
    align: Vec<Align>,
    rows: Vec<Row>,
}

impl RenderedTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let align = vec![Align::Left; columns.len()];
        RenderedTable {
            columns,
            align,
            rows: Vec::new(),
        }
    }

    /// Set the alignment of one column. Out-of-range indexes are ignored.
    pub fn with_align(mut self, column: usize, align: Align) -> Self {
        if let Some(a) = self.align.get_mut(column) {
            *a = align;
        }
        self
    }

    /// Append a row. The row must have exactly one cell per column.
    pub fn push_row(&mut self, row: Row) -> Result<(), LocksError> {
        if row.len() != self.columns.len() {
            return Err(LocksError::Query(format!(
                "row has {} values, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn to_grid(&self) -> pt::Table {
        let mut table = pt::Table::new();
        table.set_format(grid_format(!self.rows.is_empty()));
        table.set_titles(pt::Row::new(self.columns.iter().map(|c| pt::Cell::new(c)).collect()));
        for row in &self.rows {
            let cells = row
                .iter()
                .zip(&self.align)
                .map(|(cell, align)| {
                    let alignment = match align {
                        Align::Left => Alignment::LEFT,
                        Align::Right => Alignment::RIGHT,
                    };
                    pt::Cell::new_align(&display_text(cell), alignment)
                })
                .collect();
            table.add_row(pt::Row::new(cells));
        }
        table
    }
}

/// `+---+` borders and a rule under the header, with no rules between rows.
/// A table without rows closes right after the header.
fn grid_format(has_rows: bool) -> TableFormat {
    let positions: &[LinePosition] = if has_rows {
        &[LinePosition::Top, LinePosition::Title, LinePosition::Bottom]
    } else {
        &[LinePosition::Top, LinePosition::Bottom]
    };
    FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separators(positions, LineSeparator::new('-', '+', '+', '+'))
        .padding(1, 1)
        .build()
}

/// Cell text as printed. Tabs have no fixed display width, so they are
/// expanded to spaces; embedded newlines become extra lines of the row.
fn display_text(cell: &Cell) -> String {
    cell_text(cell).replace('\t', TAB_SPACES)
}

const TAB_SPACES: &str = "    ";

impl fmt::Display for RenderedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_grid())
    }
}

/// Quote an identifier with backticks.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a string literal with single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Column list of a table, in catalog order.
pub fn columns_query(table: TableRef) -> String {
    format!(
        "SELECT COLUMN_NAME FROM information_schema.columns \
         WHERE TABLE_SCHEMA = {} AND TABLE_NAME = {} ORDER BY ORDINAL_POSITION",
        quote_literal(table.schema),
        quote_literal(table.table)
    )
}

/// `SELECT` of the given columns over the whole table.
pub fn select_all_query(table: TableRef, columns: &[String]) -> String {
    let list: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    format!(
        "SELECT {} FROM {}.{}",
        list.join(", "),
        quote_ident(table.schema),
        quote_ident(table.table)
    )
}

/// Introspect and read a whole table.
pub async fn fetch_table(
    inspector: &mut Inspector<'_>,
    table: TableRef,
) -> Result<RenderedTable, LocksError> {
    let columns: Vec<String> = inspector
        .query(&columns_query(table))
        .await?
        .into_iter()
        .filter_map(|row| row.into_iter().next().flatten())
        .collect();
    if columns.is_empty() {
        return Err(LocksError::Query(format!(
            "table {} not found or has no columns",
            table
        )));
    }

    let rows = inspector.query(&select_all_query(table, &columns)).await?;
    let mut rendered = RenderedTable::new(columns);
    for row in rows {
        rendered.push_row(row)?;
    }
    Ok(rendered)
}
