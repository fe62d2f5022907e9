//! Database schema definitions.
//!
//! The schema is created once, when a new project file is made. Each table is
//! created by its own statement so a failure can be reported against the table
//! that caused it; the whole creation runs in one transaction and nothing is
//! left behind when any statement fails.

use crate::error::{Error, Result};
use rusqlite::Connection;
use tracing::{debug, error};

/// File format version written to `Info.version`.
pub const SCHEMA_VERSION: i64 = 1;

/// A named `CREATE TABLE` statement.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub sql: &'static str,
}

/// All tables, in creation order.
///
/// Foreign keys may point forward (`Solutions.parent` references
/// `Requirements`); SQLite resolves them when rows are written.
///
/// Note: `created` columns hold Unix milliseconds.
pub const TABLES: &[TableDef] = &[
    TableDef {
        name: "Info",
        sql: "CREATE TABLE Info (
            id INTEGER PRIMARY KEY,
            version INTEGER DEFAULT 1,
            name TEXT,
            created INTEGER DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
        )",
    },
    TableDef {
        name: "Solutions",
        sql: "CREATE TABLE Solutions (
            id INTEGER PRIMARY KEY,
            uid INTEGER,
            parent INTEGER,
            label INTEGER,
            description TEXT,
            link TEXT,
            FOREIGN KEY (parent) REFERENCES Requirements(id),
            FOREIGN KEY (label) REFERENCES Labels(id)
        )",
    },
    TableDef {
        name: "Projects",
        sql: "CREATE TABLE Projects (
            id INTEGER PRIMARY KEY,
            name TEXT,
            created INTEGER DEFAULT (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
        )",
    },
    TableDef {
        name: "ItemVersions",
        sql: "CREATE TABLE ItemVersions (
            id INTEGER PRIMARY KEY,
            version INTEGER,
            item INTEGER,
            itemV INTEGER DEFAULT 1,
            type INTEGER,
            FOREIGN KEY (version) REFERENCES Projects(id)
        )",
    },
    TableDef {
        name: "Requirements",
        sql: "CREATE TABLE Requirements (
            id INTEGER PRIMARY KEY,
            uid INTEGER,
            parent INTEGER,
            label INTEGER,
            description TEXT,
            rationale TEXT,
            fitCriterion TEXT,
            FOREIGN KEY (parent) REFERENCES Solutions(id),
            FOREIGN KEY (label) REFERENCES Labels(id)
        )",
    },
    TableDef {
        name: "LabelItems",
        sql: "CREATE TABLE LabelItems (
            id INTEGER PRIMARY KEY,
            label INTEGER,
            item INTEGER,
            type INTEGER,
            FOREIGN KEY (label) REFERENCES Labels(id)
        )",
    },
    TableDef {
        name: "Media",
        sql: "CREATE TABLE Media (
            id INTEGER PRIMARY KEY,
            parent INTEGER NOT NULL,
            format TEXT DEFAULT 'webp',
            data BLOB,
            FOREIGN KEY (parent) REFERENCES Solutions(id)
        )",
    },
    TableDef {
        name: "Labels",
        sql: "CREATE TABLE Labels (
            id INTEGER PRIMARY KEY,
            tag TEXT,
            color INTEGER
        )",
    },
];

/// Set connection pragmas. Runs on every open.
///
/// # Errors
///
/// Returns an error if a pragma cannot be set.
pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| Error::query("enable foreign keys", e))?;
    Ok(())
}

/// Create every table and the `Info` row of a new project file.
///
/// # Errors
///
/// Returns [`Error::Schema`] naming the first table that failed, or a query
/// error if the `Info` row cannot be written. Nothing is committed on error.
pub fn create_schema(conn: &Connection, project_name: &str) -> Result<()> {
    create_tables(conn, TABLES, project_name)
}

pub(crate) fn create_tables(conn: &Connection, tables: &[TableDef], project_name: &str) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::query("begin schema creation", e))?;

    for table in tables {
        debug!(table = table.name, "Creating table");
        tx.execute_batch(table.sql).map_err(|source| {
            error!(table = table.name, error = %source, "Failed to create table");
            Error::Schema {
                table: table.name,
                source,
            }
        })?;
    }

    tx.execute("INSERT INTO Info (name) VALUES (?1)", [project_name])
        .map_err(|e| Error::query("insert Info", e))?;

    tx.commit()
        .map_err(|e| Error::query("commit schema creation", e))?;
    Ok(())
}

/// Check if a table exists.
///
/// # Errors
///
/// Returns an error if `sqlite_master` cannot be read.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")
        .and_then(|mut stmt| stmt.exists([table]))
        .map_err(|e| Error::query("inspect schema", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        apply_pragmas(&conn).unwrap();
        create_schema(&conn, "demo").expect("Failed to create schema");
        conn
    }

    fn columns(conn: &Connection, table: &str) -> Vec<String> {
        conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
            .unwrap()
            .query_map([table], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap()
    }

    fn foreign_keys(conn: &Connection, table: &str) -> Vec<(String, String, String)> {
        let mut keys: Vec<(String, String, String)> = conn
            .prepare(r#"SELECT "from", "table", "to" FROM pragma_foreign_key_list(?1)"#)
            .unwrap()
            .query_map([table], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        keys.sort();
        keys
    }

    #[test]
    fn test_create_schema_tables() {
        let conn = fresh();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();

        assert_eq!(
            tables,
            vec![
                "Info",
                "ItemVersions",
                "LabelItems",
                "Labels",
                "Media",
                "Projects",
                "Requirements",
                "Solutions"
            ]
        );
    }

    #[test]
    fn test_schema_columns() {
        let conn = fresh();

        assert_eq!(columns(&conn, "Info"), ["id", "version", "name", "created"]);
        assert_eq!(
            columns(&conn, "Solutions"),
            ["id", "uid", "parent", "label", "description", "link"]
        );
        assert_eq!(columns(&conn, "Projects"), ["id", "name", "created"]);
        assert_eq!(
            columns(&conn, "ItemVersions"),
            ["id", "version", "item", "itemV", "type"]
        );
        assert_eq!(
            columns(&conn, "Requirements"),
            ["id", "uid", "parent", "label", "description", "rationale", "fitCriterion"]
        );
        assert_eq!(columns(&conn, "LabelItems"), ["id", "label", "item", "type"]);
        assert_eq!(columns(&conn, "Media"), ["id", "parent", "format", "data"]);
        assert_eq!(columns(&conn, "Labels"), ["id", "tag", "color"]);
    }

    #[test]
    fn test_schema_foreign_keys() {
        let conn = fresh();
        let fk = |from: &str, table: &str, to: &str| (from.to_string(), table.to_string(), to.to_string());

        assert_eq!(
            foreign_keys(&conn, "Solutions"),
            vec![fk("label", "Labels", "id"), fk("parent", "Requirements", "id")]
        );
        assert_eq!(
            foreign_keys(&conn, "Requirements"),
            vec![fk("label", "Labels", "id"), fk("parent", "Solutions", "id")]
        );
        assert_eq!(foreign_keys(&conn, "ItemVersions"), vec![fk("version", "Projects", "id")]);
        assert_eq!(foreign_keys(&conn, "LabelItems"), vec![fk("label", "Labels", "id")]);
        assert_eq!(foreign_keys(&conn, "Media"), vec![fk("parent", "Solutions", "id")]);
        assert!(foreign_keys(&conn, "Labels").is_empty());
    }

    #[test]
    fn test_info_row_inserted_with_defaults() {
        let conn = fresh();
        let (count, version, name, created): (i64, i64, String, i64) = conn
            .query_row(
                "SELECT COUNT(*), MAX(version), MAX(name), MAX(created) FROM Info",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(version, SCHEMA_VERSION);
        assert_eq!(name, "demo");
        assert!(created > 1_600_000_000_000);
    }

    #[test]
    fn test_media_parent_not_null_and_format_default() {
        let conn = fresh();
        conn.execute("INSERT INTO Solutions (uid) VALUES (1)", []).unwrap();

        assert!(conn.execute("INSERT INTO Media (data) VALUES (x'00')", []).is_err());

        conn.execute("INSERT INTO Media (parent, data) VALUES (1, x'00')", [])
            .unwrap();
        let format: String = conn
            .query_row("SELECT format FROM Media", [], |row| row.get(0))
            .unwrap();
        assert_eq!(format, "webp");
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let conn = fresh();
        let result = conn.execute("INSERT INTO Requirements (uid, parent) VALUES (1, 42)", []);
        assert!(result.is_err());
    }

    #[test]
    fn test_first_ddl_failure_aborts_and_names_table() {
        let conn = Connection::open_in_memory().unwrap();
        let tables = [
            TABLES[0],
            TableDef {
                name: "Broken",
                sql: "CREATE TABLE Broken (id INTEGER PRIMARY KEY,",
            },
            TABLES[7],
        ];

        let err = create_tables(&conn, &tables, "demo").unwrap_err();
        assert!(matches!(err, Error::Schema { table: "Broken", .. }));

        // Nothing from the failed run survives
        assert!(!table_exists(&conn, "Info").unwrap());
        assert!(!table_exists(&conn, "Labels").unwrap());
    }

    #[test]
    fn test_create_schema_twice_fails() {
        let conn = fresh();
        let err = create_schema(&conn, "again").unwrap_err();
        assert!(matches!(err, Error::Schema { table: "Info", .. }));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM Info", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
