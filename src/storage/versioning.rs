//! Versioning controller.
//!
//! [`SqliteStorage::update_item`] writes an item's current field values under
//! a project version. If the version already holds a pending row for the item,
//! that row is amended in place. Otherwise a new row is inserted and linked to
//! the version through `ItemVersions`, continuing the lineage of the item's
//! uid.
//!
//! History is append-only: rows belonging to other project versions are never
//! touched.

use crate::error::{Error, Result};
use crate::model::{Item, ItemType, ItemVersion};
use crate::storage::SqliteStorage;
use crate::storage::items::{item_exists, select_item_versions, uid_in_table};
use crate::storage::labels::label_exists;
use crate::storage::projects::project_version_exists;
use rusqlite::{Connection, params, params_from_iter};
use serde::Serialize;
use tracing::{debug, info};

/// What [`SqliteStorage::update_item`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The pending row `id` was updated in place.
    Amended { id: i64 },
    /// A new row `id` was written as revision `item_version` of the item.
    Forked { id: i64, item_version: i64 },
}

impl UpdateOutcome {
    /// Row id now holding the item's values for this project version.
    #[must_use]
    pub const fn id(&self) -> i64 {
        match self {
            Self::Amended { id } | Self::Forked { id, .. } => *id,
        }
    }
}

impl SqliteStorage {
    /// Apply `item` to the store under `project_version`.
    ///
    /// Amending writes only the type's mutable fields (description,
    /// rationale and fit criterion for requirements; description and link
    /// for solutions). Forking writes every field and records revision
    /// `1 + max(itemV)` of the item's uid, so a brand-new uid starts at 1.
    ///
    /// `item` is not modified; use [`UpdateOutcome::id`] to learn the row it
    /// now lives in.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the project version doesn't exist
    /// - [`Error::Integrity`] if the pending row points at a missing item, or
    ///   the parent, label or uid references are invalid
    /// - [`Error::Query`] naming the failing step for any SQL failure
    ///
    /// Nothing is written when an error is returned.
    pub fn update_item(&mut self, item: &Item, project_version: i64) -> Result<UpdateOutcome> {
        let item_type = item.item_type();

        let outcome = self.mutate("update_item", |tx| {
            if !project_version_exists(tx, project_version)? {
                return Err(Error::NotFound {
                    kind: "Project version",
                    id: project_version,
                });
            }

            let pending = pending_for(tx, project_version, item)?;

            match pending {
                Some(pending) => amend(tx, item, &pending),
                None => fork(tx, item, project_version),
            }
        })?;

        match outcome {
            UpdateOutcome::Amended { id } => {
                debug!(%item_type, id, project_version, "Amended pending version");
            }
            UpdateOutcome::Forked { id, item_version } => {
                info!(%item_type, id, item_version, project_version, "Forked new item version");
            }
        }
        Ok(outcome)
    }

    /// The pending `ItemVersions` row for an item under a project version.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn pending_version(
        &self,
        project_version: i64,
        item_type: ItemType,
        item_id: i64,
    ) -> Result<Option<ItemVersion>> {
        find_pending(self.conn()?, project_version, item_type, item_id)
    }

    /// The pending row `update_item` would amend for `item`, if any.
    ///
    /// Matches the item's row id first, then any row of the same uid already
    /// written under `project_version`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn pending_for_item(&self, project_version: i64, item: &Item) -> Result<Option<ItemVersion>> {
        pending_for(self.conn()?, project_version, item)
    }
}

/// A project version holds at most one pending row per conceptual item, so a
/// caller still holding an older row id of the same uid lands on that row.
fn pending_for(conn: &Connection, project_version: i64, item: &Item) -> Result<Option<ItemVersion>> {
    let item_type = item.item_type();
    if let Some(id) = item.id() {
        if let Some(pending) = find_pending(conn, project_version, item_type, id)? {
            return Ok(Some(pending));
        }
    }
    find_pending_by_uid(conn, project_version, item_type, item.uid())
}

fn find_pending_by_uid(
    conn: &Connection,
    project_version: i64,
    item_type: ItemType,
    uid: i64,
) -> Result<Option<ItemVersion>> {
    let tail = match item_type {
        ItemType::Requirement => {
            "JOIN Requirements t ON t.id = iv.item
             WHERE iv.version = ?1 AND iv.type = ?2 AND t.uid = ?3
             ORDER BY iv.id LIMIT 1"
        }
        ItemType::Solution => {
            "JOIN Solutions t ON t.id = iv.item
             WHERE iv.version = ?1 AND iv.type = ?2 AND t.uid = ?3
             ORDER BY iv.id LIMIT 1"
        }
    };
    let mut rows = select_item_versions(conn, tail, params![project_version, item_type, uid])?;
    Ok(rows.pop())
}

/// Row ids of Requirements and Solutions overlap, so the type is part of the
/// key.
fn find_pending(
    conn: &Connection,
    project_version: i64,
    item_type: ItemType,
    item_id: i64,
) -> Result<Option<ItemVersion>> {
    let mut rows = select_item_versions(
        conn,
        "WHERE iv.version = ?1 AND iv.item = ?2 AND iv.type = ?3 ORDER BY iv.id LIMIT 1",
        params![project_version, item_id, item_type],
    )?;
    Ok(rows.pop())
}

fn amend(conn: &Connection, item: &Item, pending: &ItemVersion) -> Result<UpdateOutcome> {
    let item_type = item.item_type();
    let changed = match item {
        Item::Requirement(r) => conn.execute(
            "UPDATE Requirements SET description = ?1, rationale = ?2, fitCriterion = ?3
             WHERE id = ?4",
            params![r.description, r.rationale, r.fit_criterion, pending.item],
        ),
        Item::Solution(s) => conn.execute(
            "UPDATE Solutions SET description = ?1, link = ?2 WHERE id = ?3",
            params![s.description, s.link, pending.item],
        ),
    }
    .map_err(|e| Error::query(format!("update {}", item_type.table()), e))?;

    if changed == 0 {
        return Err(Error::Integrity(format!(
            "pending version {} refers to {} {}, which no longer exists",
            pending.id, item_type, pending.item
        )));
    }
    Ok(UpdateOutcome::Amended { id: pending.item })
}

fn fork(conn: &Connection, item: &Item, project_version: i64) -> Result<UpdateOutcome> {
    let item_type = item.item_type();
    check_references(conn, item)?;

    let item_version = next_item_version(conn, item_type, item.uid())?;
    let id = insert_row(conn, item)?;

    conn.execute(
        "INSERT INTO ItemVersions (version, item, itemV, type) VALUES (?1, ?2, ?3, ?4)",
        params![project_version, id, item_version, item_type],
    )
    .map_err(|e| Error::query("insert ItemVersions", e))?;

    Ok(UpdateOutcome::Forked { id, item_version })
}

/// Insert every field except `id` and return the id SQLite assigned.
fn insert_row(conn: &Connection, item: &Item) -> Result<i64> {
    let result = match item {
        Item::Requirement(r) => {
            let values = r.to_values();
            conn.query_row(
                "INSERT INTO Requirements (uid, parent, label, description, rationale, fitCriterion)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING id",
                params_from_iter(&values[1..]),
                |row| row.get(0),
            )
        }
        Item::Solution(s) => {
            let values = s.to_values();
            conn.query_row(
                "INSERT INTO Solutions (uid, parent, label, description, link)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING id",
                params_from_iter(&values[1..]),
                |row| row.get(0),
            )
        }
    };
    result.map_err(|e| Error::query(format!("insert {}", item.item_type().table()), e))
}

fn next_item_version(conn: &Connection, item_type: ItemType, uid: i64) -> Result<i64> {
    let sql = match item_type {
        ItemType::Requirement => {
            "SELECT COALESCE(MAX(iv.itemV), 0) + 1 FROM ItemVersions iv
             JOIN Requirements t ON t.id = iv.item
             WHERE iv.type = ?1 AND t.uid = ?2"
        }
        ItemType::Solution => {
            "SELECT COALESCE(MAX(iv.itemV), 0) + 1 FROM ItemVersions iv
             JOIN Solutions t ON t.id = iv.item
             WHERE iv.type = ?1 AND t.uid = ?2"
        }
    };
    conn.query_row(sql, params![item_type, uid], |row| row.get(0))
        .map_err(|e| Error::query("read ItemVersions", e))
}

/// A uid belongs to one conceptual item, so it may repeat within its own
/// table (one row per version) but never appear in the other one.
fn check_references(conn: &Connection, item: &Item) -> Result<()> {
    let item_type = item.item_type();
    let parent_type = item_type.parent_type();

    if uid_in_table(conn, parent_type, item.uid())? {
        return Err(Error::Integrity(format!(
            "uid {} already belongs to a {parent_type}",
            item.uid()
        )));
    }

    if let Some(parent) = item.parent() {
        if !item_exists(conn, parent_type, parent)? {
            return Err(Error::Integrity(format!(
                "{item_type} parent {parent} is not an existing {parent_type}"
            )));
        }
    }

    if let Some(label) = item.label() {
        if !label_exists(conn, label)? {
            return Err(Error::Integrity(format!("label {label} does not exist")));
        }
    }

    Ok(())
}
