use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, Value};
use tracing::debug;

use super::{Cell, Row, Session};
use crate::util::mysql::MysqlConfig;
use crate::LocksError;

/// A [`Session`] backed by exactly one `mysql_async` connection.
pub struct MysqlSession {
    conn: Option<Conn>,
    endpoint: String,
}

impl MysqlSession {
    /// Open the connection. No retries: a refused or rejected connection is
    /// reported immediately as [`LocksError::Connection`].
    pub async fn connect(config: &MysqlConfig) -> Result<Self, LocksError> {
        let endpoint = config.endpoint();
        debug!(%endpoint, "connecting");
        let conn = Conn::new(config.to_opts())
            .await
            .map_err(|e| LocksError::Connection(format!("{}: {}", endpoint, e)))?;
        Ok(MysqlSession {
            conn: Some(conn),
            endpoint,
        })
    }
}

#[async_trait]
impl Session for MysqlSession {
    async fn query(&mut self, sql: &str) -> Result<Vec<Row>, LocksError> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| LocksError::Query("connection already closed".to_string()))?;
        let rows: Vec<mysql_async::Row> = conn
            .query(sql)
            .await
            .map_err(|e| LocksError::Query(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|row| row.unwrap().into_iter().map(value_to_cell).collect())
            .collect())
    }

    async fn close(&mut self) -> Result<(), LocksError> {
        if let Some(conn) = self.conn.take() {
            debug!(endpoint = %self.endpoint, "disconnecting");
            conn.disconnect()
                .await
                .map_err(|e| LocksError::Connection(format!("{}: {}", self.endpoint, e)))?;
        }
        Ok(())
    }
}

/// Convert a protocol value into display text.
///
/// The text protocol delivers nearly everything as `Bytes`; the remaining
/// arms cover values the driver already decoded.
fn value_to_cell(value: Value) -> Cell {
    match value {
        Value::NULL => None,
        Value::Bytes(b) => Some(String::from_utf8_lossy(&b).into_owned()),
        Value::Int(i) => Some(i.to_string()),
        Value::UInt(u) => Some(u.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Double(d) => Some(d.to_string()),
        Value::Date(y, mo, d, h, mi, s, us) => {
            let mut text = format!("{:04}-{:02}-{:02} {:02}:{:02}:{:02}", y, mo, d, h, mi, s);
            if us > 0 {
                text.push_str(&format!(".{:06}", us));
            }
            Some(text)
        }
        Value::Time(neg, days, h, mi, s, us) => {
            let hours = u64::from(days) * 24 + u64::from(h);
            let mut text = format!(
                "{}{:02}:{:02}:{:02}",
                if neg { "-" } else { "" },
                hours,
                mi,
                s
            );
            if us > 0 {
                text.push_str(&format!(".{:06}", us));
            }
            Some(text)
        }
    }
}
