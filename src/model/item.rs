//! Item model for orq.
//!
//! Items are the nodes of a project: requirements and the solutions that
//! satisfy them. The two alternate in a parent chain (a requirement hangs off
//! a solution, a solution off a requirement), so every item carries an
//! explicit [`ItemType`] tag instead of relying on its concrete type.

use crate::error::Error;
use rusqlite::Row;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminator stored in `ItemVersions.type` and `LabelItems.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Requirement,
    Solution,
}

impl ItemType {
    /// Integer code written to the database.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Requirement => 0,
            Self::Solution => 1,
        }
    }

    /// Decode a stored discriminator.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Requirement),
            1 => Some(Self::Solution),
            _ => None,
        }
    }

    /// Table holding rows of this type.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Requirement => "Requirements",
            Self::Solution => "Solutions",
        }
    }

    /// Type of the item a `parent` column points at.
    ///
    /// Also the type of this item's children.
    #[must_use]
    pub const fn parent_type(self) -> Self {
        match self {
            Self::Requirement => Self::Solution,
            Self::Solution => Self::Requirement,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requirement => "Requirement",
            Self::Solution => "Solution",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "requirement" | "requirements" | "req" | "r" => Ok(Self::Requirement),
            "solution" | "solutions" | "sol" | "s" => Ok(Self::Solution),
            other => Err(Error::InvalidArgument(format!("unknown item type '{other}'"))),
        }
    }
}

impl ToSql for ItemType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for ItemType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = i64::column_result(value)?;
        Self::from_code(code).ok_or(FromSqlError::OutOfRange(code))
    }
}

/// A requirement row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Row id in `Requirements`; `None` until the row is written.
    pub id: Option<i64>,
    /// Stable identity shared by every version of this requirement.
    pub uid: i64,
    /// Row id of the containing solution.
    pub parent: Option<i64>,
    pub label: Option<i64>,
    pub description: Option<String>,
    pub rationale: Option<String>,
    pub fit_criterion: Option<String>,
}

impl Requirement {
    /// Stored column names, in binding order.
    pub const COLUMNS: [&'static str; 7] = [
        "id",
        "uid",
        "parent",
        "label",
        "description",
        "rationale",
        "fitCriterion",
    ];

    /// A requirement that has not been stored yet.
    #[must_use]
    pub fn new(uid: i64) -> Self {
        Self {
            uid,
            ..Self::default()
        }
    }

    /// Decode from a row selected with [`Self::COLUMNS`].
    ///
    /// # Errors
    ///
    /// Returns the driver error for a missing column or a mistyped value.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            uid: row.get("uid")?,
            parent: row.get("parent")?,
            label: row.get("label")?,
            description: row.get("description")?,
            rationale: row.get("rationale")?,
            fit_criterion: row.get("fitCriterion")?,
        })
    }

    /// Values to bind, aligned with [`Self::COLUMNS`].
    #[must_use]
    pub fn to_values(&self) -> [Value; 7] {
        [
            self.id.into(),
            self.uid.into(),
            self.parent.into(),
            self.label.into(),
            self.description.clone().into(),
            self.rationale.clone().into(),
            self.fit_criterion.clone().into(),
        ]
    }
}

/// A solution row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Row id in `Solutions`; `None` until the row is written.
    pub id: Option<i64>,
    /// Stable identity shared by every version of this solution.
    pub uid: i64,
    /// Row id of the requirement this solution addresses.
    pub parent: Option<i64>,
    pub label: Option<i64>,
    pub description: Option<String>,
    pub link: Option<String>,
}

impl Solution {
    /// Stored column names, in binding order.
    pub const COLUMNS: [&'static str; 6] = ["id", "uid", "parent", "label", "description", "link"];

    /// A solution that has not been stored yet.
    #[must_use]
    pub fn new(uid: i64) -> Self {
        Self {
            uid,
            ..Self::default()
        }
    }

    /// Decode from a row selected with [`Self::COLUMNS`].
    ///
    /// # Errors
    ///
    /// Returns the driver error for a missing column or a mistyped value.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            uid: row.get("uid")?,
            parent: row.get("parent")?,
            label: row.get("label")?,
            description: row.get("description")?,
            link: row.get("link")?,
        })
    }

    /// Values to bind, aligned with [`Self::COLUMNS`].
    #[must_use]
    pub fn to_values(&self) -> [Value; 6] {
        [
            self.id.into(),
            self.uid.into(),
            self.parent.into(),
            self.label.into(),
            self.description.clone().into(),
            self.link.clone().into(),
        ]
    }
}

/// Either kind of item, tagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    Requirement(Requirement),
    Solution(Solution),
}

impl Item {
    /// Decode a row of the table belonging to `item_type`.
    ///
    /// # Errors
    ///
    /// Returns the driver error for a missing column or a mistyped value.
    pub fn from_row(item_type: ItemType, row: &Row<'_>) -> rusqlite::Result<Self> {
        match item_type {
            ItemType::Requirement => Requirement::from_row(row).map(Self::Requirement),
            ItemType::Solution => Solution::from_row(row).map(Self::Solution),
        }
    }

    #[must_use]
    pub const fn item_type(&self) -> ItemType {
        match self {
            Self::Requirement(_) => ItemType::Requirement,
            Self::Solution(_) => ItemType::Solution,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Option<i64> {
        match self {
            Self::Requirement(r) => r.id,
            Self::Solution(s) => s.id,
        }
    }

    #[must_use]
    pub const fn uid(&self) -> i64 {
        match self {
            Self::Requirement(r) => r.uid,
            Self::Solution(s) => s.uid,
        }
    }

    #[must_use]
    pub const fn parent(&self) -> Option<i64> {
        match self {
            Self::Requirement(r) => r.parent,
            Self::Solution(s) => s.parent,
        }
    }

    #[must_use]
    pub const fn label(&self) -> Option<i64> {
        match self {
            Self::Requirement(r) => r.label,
            Self::Solution(s) => s.label,
        }
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Requirement(r) => r.description.as_deref(),
            Self::Solution(s) => s.description.as_deref(),
        }
    }

    /// Column names and values to bind, in table order.
    #[must_use]
    pub fn bound_values(&self) -> Vec<(&'static str, Value)> {
        match self {
            Self::Requirement(r) => Requirement::COLUMNS.into_iter().zip(r.to_values()).collect(),
            Self::Solution(s) => Solution::COLUMNS.into_iter().zip(s.to_values()).collect(),
        }
    }

    /// Copy of this item pointing at a different row.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        match &mut self {
            Self::Requirement(r) => r.id = Some(id),
            Self::Solution(s) => s.id = Some(id),
        }
        self
    }
}

impl From<Requirement> for Item {
    fn from(r: Requirement) -> Self {
        Self::Requirement(r)
    }
}

impl From<Solution> for Item {
    fn from(s: Solution) -> Self {
        Self::Solution(s)
    }
}
