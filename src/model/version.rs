//! Item version lineage.

use crate::model::ItemType;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// One `ItemVersions` row: "row `item` of the `item_type` table belongs to
/// project version `version`, as revision `item_v` of its uid".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemVersion {
    pub id: i64,
    /// Project version (`Projects.id`).
    pub version: i64,
    /// Row id in the table named by `item_type`.
    pub item: i64,
    /// Per-item revision counter, starting at 1.
    pub item_v: i64,
    pub item_type: ItemType,
}

impl ItemVersion {
    /// Decode a row selected as `id, version, item, itemV, type`.
    ///
    /// # Errors
    ///
    /// Returns the driver error for a missing column or an unknown type code.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            version: row.get("version")?,
            item: row.get("item")?,
            item_v: row.get("itemV")?,
            item_type: row.get("type")?,
        })
    }
}
