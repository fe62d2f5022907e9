//! Project metadata models.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// The singleton `Info` row describing the project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub id: i64,
    /// File format version.
    pub version: i64,
    /// Display name, defaulted from the file name on creation.
    pub name: Option<String>,
    /// Creation timestamp (Unix milliseconds)
    pub created: i64,
}

impl Info {
    /// # Errors
    ///
    /// Returns the driver error for a missing column or a mistyped value.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            version: row.get("version")?,
            name: row.get("name")?,
            created: row.get("created")?,
        })
    }
}

/// A point in the project's revision timeline (`Projects` row).
///
/// Items are attached to a project version through `ItemVersions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectVersion {
    pub id: i64,
    pub name: Option<String>,
    /// Creation timestamp (Unix milliseconds)
    pub created: i64,
}

impl ProjectVersion {
    /// # Errors
    ///
    /// Returns the driver error for a missing column or a mistyped value.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            created: row.get("created")?,
        })
    }
}
