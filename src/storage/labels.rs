//! Label storage.

use crate::error::{Error, Result};
use crate::model::{Color, ItemType, Label, LabelItem};
use crate::storage::SqliteStorage;
use crate::storage::items::item_exists;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

pub(crate) fn label_exists(conn: &Connection, id: i64) -> Result<bool> {
    conn.query_row("SELECT 1 FROM Labels WHERE id = ?1", [id], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
        .map_err(|e| Error::query("look up Labels", e))
}

impl SqliteStorage {
    /// Create a label.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_label(&mut self, tag: &str, color: Option<Color>) -> Result<Label> {
        self.mutate("create_label", |tx| {
            tx.query_row(
                "INSERT INTO Labels (tag, color) VALUES (?1, ?2) RETURNING id, tag, color",
                params![tag, color],
                Label::from_row,
            )
            .map_err(|e| Error::query("insert Labels", e))
        })
    }

    /// Get a label by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed.
    pub fn get_label(&self, id: i64) -> Result<Option<Label>> {
        self.conn()?
            .query_row(
                "SELECT id, tag, color FROM Labels WHERE id = ?1",
                [id],
                Label::from_row,
            )
            .optional()
            .map_err(|e| Error::from_row("Labels", e))
    }

    /// All labels, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn list_labels(&self) -> Result<Vec<Label>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, tag, color FROM Labels ORDER BY id")
            .map_err(|e| Error::query("read Labels", e))?;
        let rows = stmt
            .query_map([], Label::from_row)
            .map_err(|e| Error::query("read Labels", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::from_row("Labels", e))
    }

    /// Link a label to an item through `LabelItems`.
    ///
    /// Attaching the same label twice returns the existing link.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Integrity`] if the label or the item doesn't exist.
    pub fn attach_label(&mut self, label: i64, item_type: ItemType, item: i64) -> Result<LabelItem> {
        self.mutate("attach_label", |tx| {
            if !label_exists(tx, label)? {
                return Err(Error::Integrity(format!("label {label} does not exist")));
            }
            if !item_exists(tx, item_type, item)? {
                return Err(Error::Integrity(format!("{item_type} {item} does not exist")));
            }

            let existing = tx
                .query_row(
                    "SELECT id, label, item, type FROM LabelItems
                     WHERE label = ?1 AND item = ?2 AND type = ?3",
                    params![label, item, item_type],
                    LabelItem::from_row,
                )
                .optional()
                .map_err(|e| Error::from_row("LabelItems", e))?;
            if let Some(link) = existing {
                debug!(label, item, "Label already attached");
                return Ok(link);
            }

            tx.query_row(
                "INSERT INTO LabelItems (label, item, type) VALUES (?1, ?2, ?3)
                 RETURNING id, label, item, type",
                params![label, item, item_type],
                LabelItem::from_row,
            )
            .map_err(|e| Error::query("insert LabelItems", e))
        })
    }

    /// Remove a label link. Returns whether a link existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn detach_label(&mut self, label: i64, item_type: ItemType, item: i64) -> Result<bool> {
        self.mutate("detach_label", |tx| {
            let removed = tx
                .execute(
                    "DELETE FROM LabelItems WHERE label = ?1 AND item = ?2 AND type = ?3",
                    params![label, item, item_type],
                )
                .map_err(|e| Error::query("delete LabelItems", e))?;
            Ok(removed > 0)
        })
    }

    /// Labels linked to an item through `LabelItems`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn labels_for_item(&self, item_type: ItemType, item: i64) -> Result<Vec<Label>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT l.id AS id, l.tag AS tag, l.color AS color
                 FROM Labels l JOIN LabelItems li ON li.label = l.id
                 WHERE li.item = ?1 AND li.type = ?2
                 ORDER BY l.id",
            )
            .map_err(|e| Error::query("read LabelItems", e))?;
        let rows = stmt
            .query_map(params![item, item_type], Label::from_row)
            .map_err(|e| Error::query("read LabelItems", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::from_row("Labels", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_requirement() -> SqliteStorage {
        let storage = SqliteStorage::open_memory().unwrap();
        storage
            .execute("INSERT INTO Requirements (id, uid) VALUES (1, 100)", [])
            .unwrap();
        storage
    }

    #[test]
    fn test_create_and_list_labels() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let red = storage
            .create_label("blocker", Some(Color::from_rgb(255, 0, 0)))
            .unwrap();
        let plain = storage.create_label("later", None).unwrap();

        assert_eq!(red.tag.as_deref(), Some("blocker"));
        assert_eq!(red.color.map(Color::packed), Some(0x00FF_0000));
        assert_eq!(storage.list_labels().unwrap(), vec![red.clone(), plain]);
        assert_eq!(storage.get_label(red.id).unwrap(), Some(red));
    }

    #[test]
    fn test_attach_label_is_idempotent() {
        let mut storage = with_requirement();
        let label = storage.create_label("safety", None).unwrap();

        let first = storage.attach_label(label.id, ItemType::Requirement, 1).unwrap();
        let second = storage.attach_label(label.id, ItemType::Requirement, 1).unwrap();
        assert_eq!(first, second);
        assert_eq!(storage.count_rows("LabelItems").unwrap(), 1);

        let labels = storage.labels_for_item(ItemType::Requirement, 1).unwrap();
        assert_eq!(labels, vec![label]);
        assert!(storage.labels_for_item(ItemType::Solution, 1).unwrap().is_empty());
    }

    #[test]
    fn test_attach_requires_existing_rows() {
        let mut storage = with_requirement();
        let label = storage.create_label("safety", None).unwrap();

        assert!(matches!(
            storage.attach_label(99, ItemType::Requirement, 1),
            Err(Error::Integrity(_))
        ));
        assert!(matches!(
            storage.attach_label(label.id, ItemType::Solution, 1),
            Err(Error::Integrity(_))
        ));
    }

    #[test]
    fn test_detach_label() {
        let mut storage = with_requirement();
        let label = storage.create_label("safety", None).unwrap();
        storage.attach_label(label.id, ItemType::Requirement, 1).unwrap();

        assert!(storage.detach_label(label.id, ItemType::Requirement, 1).unwrap());
        assert!(!storage.detach_label(label.id, ItemType::Requirement, 1).unwrap());
    }
}
