//! Media attached to solutions.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Format used when none is given.
pub const DEFAULT_MEDIA_FORMAT: &str = "webp";

/// A stored media blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: i64,
    /// Owning solution (`Solutions.id`), never null.
    pub parent: i64,
    pub format: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Media {
    /// # Errors
    ///
    /// Returns the driver error for a missing column or a mistyped value.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            parent: row.get("parent")?,
            format: row.get("format")?,
            data: row.get::<_, Option<Vec<u8>>>("data")?.unwrap_or_default(),
        })
    }
}

/// Media metadata without the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub id: i64,
    pub parent: i64,
    pub format: String,
    /// Payload length in bytes.
    pub size: i64,
}

impl MediaInfo {
    /// Decode a row selected as `id, parent, format, size`.
    ///
    /// # Errors
    ///
    /// Returns the driver error for a missing column or a mistyped value.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            parent: row.get("parent")?,
            format: row.get("format")?,
            size: row.get("size")?,
        })
    }
}
