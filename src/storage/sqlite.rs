//! SQLite storage implementation.
//!
//! [`SqliteStorage`] owns the single connection to a project file. The
//! connection lives exactly as long as the storage value (or until
//! [`SqliteStorage::close`]); there is no process-wide registry.
//!
//! Domain operations live in sibling modules as further `impl` blocks:
//! items, versioning, labels, media and project metadata.

use crate::config::default_project_name;
use crate::error::{Error, Result};
use crate::storage::schema::{self, apply_pragmas, create_schema};
use crate::storage::uid::{UidGenerator, UidSource};
use rusqlite::{Connection, DatabaseName, Params, Row, Transaction};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Oldest SQLite release with `RETURNING`, which every insert relies on.
pub const MIN_SQLITE_VERSION: i32 = 3_035_000;

/// Busy timeout applied when the caller doesn't pick one.
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based storage backend for one project file.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Option<Connection>,
    path: Option<PathBuf>,
    uids: UidGenerator,
}

/// Fail unless the linked SQLite library can run this store.
fn check_driver() -> Result<()> {
    let linked = rusqlite::version_number();
    if linked < MIN_SQLITE_VERSION {
        return Err(Error::Configuration(format!(
            "SQLite {} is older than the required 3.35.0",
            rusqlite::version()
        )));
    }
    Ok(())
}

impl SqliteStorage {
    /// Open a project file at the given path.
    ///
    /// A missing (or zero-length) file is created and receives the full
    /// schema plus an `Info` row named after the file. An existing file is
    /// opened as is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if SQLite is unusable or the path is a
    /// directory, [`Error::Schema`] if creation fails, and
    /// [`Error::Integrity`] if an existing file is not a project file.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a project file with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// See [`SqliteStorage::open`].
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        check_driver()?;

        if path.is_dir() {
            return Err(Error::Configuration(format!(
                "{} is a directory, not a project file",
                path.display()
            )));
        }

        let is_new = std::fs::metadata(path).map_or(true, |meta| meta.len() == 0);

        let conn = Connection::open(path).map_err(|e| Error::query("open store", e))?;
        let timeout = timeout_ms.map_or(DEFAULT_BUSY_TIMEOUT, Duration::from_millis);
        conn.busy_timeout(timeout)
            .map_err(|e| Error::query("set busy timeout", e))?;
        apply_pragmas(&conn)?;

        if is_new {
            let name = default_project_name(path);
            info!(path = %path.display(), name = %name, "Creating project file");
            if let Err(e) = create_schema(&conn, &name) {
                drop(conn);
                if let Err(io) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), error = %io, "Could not remove half-created project file");
                }
                return Err(e);
            }
        } else if !schema::table_exists(&conn, "Info")? {
            return Err(Error::Integrity(format!(
                "{} is not an orq project file",
                path.display()
            )));
        } else {
            let rows: i64 = conn
                .query_row("SELECT COUNT(*) FROM Info", [], |row| row.get(0))
                .map_err(|e| Error::query("read Info", e))?;
            if rows == 0 {
                return Err(Error::Integrity(format!(
                    "{} has no Info row",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "Opened existing project file");
        }

        Ok(Self {
            conn: Some(conn),
            path: Some(path.to_path_buf()),
            uids: UidGenerator::default(),
        })
    }

    /// Open an in-memory project (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        check_driver()?;
        let conn = Connection::open_in_memory().map_err(|e| Error::query("open store", e))?;
        apply_pragmas(&conn)?;
        create_schema(&conn, "untitled")?;
        Ok(Self {
            conn: Some(conn),
            path: None,
            uids: UidGenerator::default(),
        })
    }

    /// Whether the connection is still held.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// File backing this store, `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Release the connection. Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite reports a failure while closing; the
    /// connection is released either way.
    pub fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| Error::query("close store", e))?;
            info!(path = ?self.path, "Closed project file");
        }
        Ok(())
    }

    /// Get a reference to the underlying connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] after [`SqliteStorage::close`].
    pub fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(Error::Closed)
    }

    pub(crate) fn conn_and_uids(&mut self) -> Result<(&Connection, &mut UidGenerator)> {
        let conn = self.conn.as_ref().ok_or(Error::Closed)?;
        Ok((conn, &mut self.uids))
    }

    /// Replace the uid source (for testing and deterministic imports).
    pub fn set_uid_source(&mut self, source: impl UidSource + Send + 'static) {
        self.uids = UidGenerator::with_source(source);
    }

    fn conn_mut(&mut self) -> Result<&mut Connection> {
        self.conn.as_mut().ok_or(Error::Closed)
    }

    /// Run a parameterized statement, returning the number of changed rows.
    ///
    /// # Errors
    ///
    /// Returns a query error carrying SQLite's message.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        self.conn()?
            .execute(sql, params)
            .map_err(|e| Error::query("execute", e))
    }

    /// Run a parameterized query and map every row with `f`.
    ///
    /// # Errors
    ///
    /// Returns a query error carrying SQLite's message, including errors
    /// raised by `f`.
    pub fn query<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql).map_err(|e| Error::query("prepare", e))?;
        stmt.query_map(params, f)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<T>>>())
            .map_err(|e| Error::query("query", e))
    }

    /// Execute a mutation inside an IMMEDIATE transaction.
    ///
    /// Commits when `f` returns `Ok`; the transaction is rolled back when it
    /// returns an error.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a query error if the transaction cannot
    /// begin or commit.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn_mut()?
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
            .map_err(|e| Error::query(format!("begin {op}"), e))?;

        let result = f(&tx)?;

        tx.commit()
            .map_err(|e| Error::query(format!("commit {op}"), e))?;
        debug!(op, "Mutation committed");

        Ok(result)
    }

    /// Copy the whole store to `dest` while it stays open.
    ///
    /// # Errors
    ///
    /// Returns a query error if the backup fails.
    pub fn backup_to(&self, dest: &Path) -> Result<()> {
        self.conn()?
            .backup(DatabaseName::Main, dest, None)
            .map_err(|e| Error::query("backup", e))?;
        info!(dest = %dest.display(), "Backup complete");
        Ok(())
    }

    /// Names of all tables in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if `sqlite_master` cannot be read.
    pub fn schema_tables(&self) -> Result<Vec<String>> {
        self.query(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
            [],
            |row| row.get(0),
        )
    }

    /// Count rows in one of the store's tables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a table outside the schema.
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        let Some(def) = schema::TABLES.iter().find(|t| t.name == table) else {
            return Err(Error::InvalidArgument(format!("unknown table '{table}'")));
        };
        self.conn()?
            .query_row(&format!("SELECT COUNT(*) FROM {}", def.name), [], |row| row.get(0))
            .map_err(|e| Error::query(format!("count {}", def.name), e))
    }
}
