use std::path::Path;

use rusqlite::{Connection, Row, params};

use crate::facade::{OrderStatusFacade, PersistenceError};
use crate::model::OrderStatus;

const TABLE: &str = "order_status";

/// Statuses a fresh store is seeded with.
pub const DEFAULT_STATUSES: &[(&str, &str)] = &[
    ("PENDING_PAYMENT", "Order placed, waiting for payment"),
    ("READY_TO_SHIP", "Payment received, order ready to ship"),
    ("SHIPPED", "Order shipped to the customer"),
    ("CANCELLED_PAYMENT", "Order cancelled because payment failed"),
    ("CANCELLED_MANUAL", "Order cancelled by an operator"),
];

/// Order statuses stored in a single SQLite table, ordered by id.
#[derive(Debug)]
pub struct SqliteFacade {
    conn: Connection,
}

impl SqliteFacade {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path.as_ref())?;

        // WAL + NORMAL sync: faster writes for a single local user
        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        let _ = conn.pragma_update(None, "synchronous", "NORMAL");

        tracing::debug!(path = %path.as_ref().display(), "opened order status store");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, PersistenceError> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY,
                status TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT ''
            )",
            ident(TABLE)
        ))?;
        Ok(Self { conn })
    }

    /// Insert the stock statuses when the table is empty. Returns how many rows were added.
    pub fn seed_defaults(&mut self) -> Result<usize, PersistenceError> {
        if self.count()? > 0 {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (status, description) VALUES (?1, ?2)",
                ident(TABLE)
            ))?;
            for (status, description) in DEFAULT_STATUSES {
                stmt.execute(params![status, description])?;
            }
        }
        tx.commit()?;
        tracing::info!(rows = DEFAULT_STATUSES.len(), "seeded default order statuses");
        Ok(DEFAULT_STATUSES.len())
    }
}

impl OrderStatusFacade for SqliteFacade {
    fn count(&self) -> Result<usize, PersistenceError> {
        let n: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", ident(TABLE)),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(n).unwrap_or_default())
    }

    fn fetch_range(&self, start: usize, end: usize) -> Result<Vec<OrderStatus>, PersistenceError> {
        if end <= start {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, status, description FROM {} ORDER BY id LIMIT ?1 OFFSET ?2",
            ident(TABLE)
        ))?;
        let limit = to_sql_int(end - start)?;
        let offset = to_sql_int(start)?;
        let rows = stmt
            .query_map(params![limit, offset], row_to_order_status)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(start, end, fetched = rows.len(), "fetched order status range");
        Ok(rows)
    }

    fn create(&mut self, item: &OrderStatus) -> Result<OrderStatus, PersistenceError> {
        validate(item)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {} (status, description) VALUES (?1, ?2)",
                ident(TABLE)
            ),
            params![item.status, item.description],
        )?;
        let stored = OrderStatus {
            id: Some(self.conn.last_insert_rowid()),
            ..item.clone()
        };
        tracing::info!(id = ?stored.id, status = %stored.status, "created order status");
        Ok(stored)
    }

    fn update(&mut self, item: &OrderStatus) -> Result<(), PersistenceError> {
        let id = stored_id(item)?;
        validate(item)?;
        let changed = self.conn.execute(
            &format!(
                "UPDATE {} SET status = ?1, description = ?2 WHERE id = ?3",
                ident(TABLE)
            ),
            params![item.status, item.description, id],
        )?;
        if changed == 0 {
            return Err(PersistenceError::NotFound(id));
        }
        tracing::info!(id, status = %item.status, "updated order status");
        Ok(())
    }

    fn delete(&mut self, item: &OrderStatus) -> Result<(), PersistenceError> {
        let id = stored_id(item)?;
        let changed = self
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1", ident(TABLE)), [id])?;
        if changed == 0 {
            return Err(PersistenceError::NotFound(id));
        }
        tracing::info!(id, "deleted order status");
        Ok(())
    }
}

fn row_to_order_status(row: &Row) -> rusqlite::Result<OrderStatus> {
    Ok(OrderStatus {
        id: Some(row.get(0)?),
        status: row.get(1)?,
        description: row.get(2)?,
    })
}

fn validate(item: &OrderStatus) -> Result<(), PersistenceError> {
    if item.status.trim().is_empty() {
        return Err(PersistenceError::Invalid("status must not be empty".into()));
    }
    Ok(())
}

fn stored_id(item: &OrderStatus) -> Result<i64, PersistenceError> {
    item.id
        .ok_or_else(|| PersistenceError::Invalid("order status has not been saved yet".into()))
}

fn to_sql_int(n: usize) -> Result<i64, PersistenceError> {
    i64::try_from(n).map_err(|_| PersistenceError::Invalid(format!("index {n} out of range")))
}

// Quote identifiers with double-quotes, and escape inner quotes
fn ident(name: &str) -> String {
    let escaped = name.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}
