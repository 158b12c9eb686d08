//! SQLite-backed storage.
//!
//! [`Store`] owns the connection and creates the schema on open. Table access lives in
//! plain functions taking a `&Connection`, so the same code runs against the connection
//! or inside a [`rusqlite::Transaction`] (which derefs to `Connection`).

use std::path::Path;

use rusqlite::{Connection, Transaction};

use crate::error::WicsResult;

pub mod counts;
pub mod materials;
pub(crate) mod schema;
pub mod soh;
pub mod staging;

/// Handle to a WICS database.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> WicsResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened database");
        Self::init(conn)
    }

    /// Open a private in-memory database (tests, dry runs).
    pub fn open_in_memory() -> WicsResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> WicsResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(schema::DDL)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Start a transaction. Dropping it without `commit` rolls back.
    pub fn transaction(&mut self) -> WicsResult<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}
