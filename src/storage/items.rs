//! Item reads.
//!
//! Every query picks its table by matching on [`ItemType`]; identifiers are
//! never bound as parameters.

use crate::error::{Error, Result};
use crate::model::{Item, ItemType, ItemVersion};
use crate::storage::SqliteStorage;
use rusqlite::{Connection, OptionalExtension, Params};

const REQUIREMENT_SELECT: &str = "SELECT t.id AS id, t.uid AS uid, t.parent AS parent, t.label AS label,
        t.description AS description, t.rationale AS rationale, t.fitCriterion AS fitCriterion
     FROM Requirements t";

const SOLUTION_SELECT: &str = "SELECT t.id AS id, t.uid AS uid, t.parent AS parent, t.label AS label,
        t.description AS description, t.link AS link
     FROM Solutions t";

pub(crate) const ITEM_VERSION_SELECT: &str = "SELECT iv.id AS id, iv.version AS version, iv.item AS item,
        iv.itemV AS itemV, iv.type AS type
     FROM ItemVersions iv";

const fn select_sql(item_type: ItemType) -> &'static str {
    match item_type {
        ItemType::Requirement => REQUIREMENT_SELECT,
        ItemType::Solution => SOLUTION_SELECT,
    }
}

/// Select items of one type; `tail` follows the `FROM <table> t` clause.
pub(crate) fn select_items<P: Params>(
    conn: &Connection,
    item_type: ItemType,
    tail: &str,
    params: P,
) -> Result<Vec<Item>> {
    let table = item_type.table();
    let sql = format!("{} {tail}", select_sql(item_type));
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::query(format!("read {table}"), e))?;
    let rows = stmt
        .query_map(params, |row| Item::from_row(item_type, row))
        .map_err(|e| Error::query(format!("read {table}"), e))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::from_row(table, e))
}

pub(crate) fn select_item_versions<P: Params>(
    conn: &Connection,
    tail: &str,
    params: P,
) -> Result<Vec<ItemVersion>> {
    let sql = format!("{ITEM_VERSION_SELECT} {tail}");
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::query("read ItemVersions", e))?;
    let rows = stmt
        .query_map(params, ItemVersion::from_row)
        .map_err(|e| Error::query("read ItemVersions", e))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::from_row("ItemVersions", e))
}

/// Check if a row exists in the table for `item_type`.
pub(crate) fn item_exists(conn: &Connection, item_type: ItemType, id: i64) -> Result<bool> {
    let sql = match item_type {
        ItemType::Requirement => "SELECT 1 FROM Requirements WHERE id = ?1",
        ItemType::Solution => "SELECT 1 FROM Solutions WHERE id = ?1",
    };
    conn.query_row(sql, [id], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
        .map_err(|e| Error::query(format!("look up {}", item_type.table()), e))
}

/// Check whether `uid` is used by any row of the table for `item_type`.
pub(crate) fn uid_in_table(conn: &Connection, item_type: ItemType, uid: i64) -> Result<bool> {
    let sql = match item_type {
        ItemType::Requirement => "SELECT 1 FROM Requirements WHERE uid = ?1 LIMIT 1",
        ItemType::Solution => "SELECT 1 FROM Solutions WHERE uid = ?1 LIMIT 1",
    };
    conn.query_row(sql, [uid], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
        .map_err(|e| Error::query(format!("look up {}", item_type.table()), e))
}

impl SqliteStorage {
    /// Get an item by row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed.
    pub fn get_item(&self, item_type: ItemType, id: i64) -> Result<Option<Item>> {
        let mut items = select_items(self.conn()?, item_type, "WHERE t.id = ?1", [id])?;
        Ok(items.pop())
    }

    /// List every stored row of one type, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn list_items(&self, item_type: ItemType) -> Result<Vec<Item>> {
        select_items(self.conn()?, item_type, "ORDER BY t.id", [])
    }

    /// Items linked to a project version, requirements first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn items_in_version(&self, project_version: i64) -> Result<Vec<Item>> {
        let conn = self.conn()?;
        let mut items = Vec::new();
        for item_type in [ItemType::Requirement, ItemType::Solution] {
            items.extend(select_items(
                conn,
                item_type,
                "JOIN ItemVersions iv ON iv.item = t.id AND iv.type = ?2
                 WHERE iv.version = ?1
                 ORDER BY t.id",
                rusqlite::params![project_version, item_type],
            )?);
        }
        Ok(items)
    }

    /// `ItemVersions` rows of a project version.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn item_versions(&self, project_version: i64) -> Result<Vec<ItemVersion>> {
        select_item_versions(
            self.conn()?,
            "WHERE iv.version = ?1 ORDER BY iv.id",
            [project_version],
        )
    }

    /// Version lineage of the item named by `uid`, oldest revision first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn item_history(&self, item_type: ItemType, uid: i64) -> Result<Vec<ItemVersion>> {
        let tail = match item_type {
            ItemType::Requirement => {
                "JOIN Requirements t ON t.id = iv.item
                 WHERE iv.type = ?1 AND t.uid = ?2
                 ORDER BY iv.itemV, iv.id"
            }
            ItemType::Solution => {
                "JOIN Solutions t ON t.id = iv.item
                 WHERE iv.type = ?1 AND t.uid = ?2
                 ORDER BY iv.itemV, iv.id"
            }
        };
        select_item_versions(self.conn()?, tail, rusqlite::params![item_type, uid])
    }

    /// Items whose `parent` is `item`. Children live in the other table.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn children(&self, item: &Item) -> Result<Vec<Item>> {
        let Some(id) = item.id() else {
            return Ok(Vec::new());
        };
        select_items(
            self.conn()?,
            item.item_type().parent_type(),
            "WHERE t.parent = ?1 ORDER BY t.id",
            [id],
        )
    }

    /// The item `item.parent` points at, resolved through the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed.
    pub fn parent_of(&self, item: &Item) -> Result<Option<Item>> {
        match item.parent() {
            Some(parent) => self.get_item(item.item_type().parent_type(), parent),
            None => Ok(None),
        }
    }

    /// Items of one type with no parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn roots(&self, item_type: ItemType) -> Result<Vec<Item>> {
        select_items(self.conn()?, item_type, "WHERE t.parent IS NULL ORDER BY t.id", [])
    }
}
