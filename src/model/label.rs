//! Label model for orq.
//!
//! Labels are colored tags. An item references one label directly through its
//! `label` column and any number through `LabelItems`.

use crate::error::Error;
use crate::model::ItemType;
use rusqlite::Row;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Packed `0xRRGGBB` color stored in `Labels.color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    pub const MAX: u32 = 0x00FF_FFFF;

    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// # Errors
    ///
    /// Returns an error if `packed` has bits above the 24-bit RGB range.
    pub fn from_packed(packed: u32) -> Result<Self, Error> {
        if packed > Self::MAX {
            return Err(Error::InvalidArgument(format!(
                "color {packed:#x} is outside 0xRRGGBB"
            )));
        }
        Ok(Self(packed))
    }

    #[must_use]
    pub const fn packed(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parse `#rrggbb` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return Err(Error::InvalidArgument(format!(
                "invalid color '{s}', expected #rrggbb"
            )));
        }
        u32::from_str_radix(hex, 16)
            .map(Self)
            .map_err(|_| Error::InvalidArgument(format!("invalid color '{s}', expected #rrggbb")))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl ToSql for Color {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(self.0)))
    }
}

impl FromSql for Color {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        u32::try_from(raw)
            .ok()
            .filter(|packed| *packed <= Self::MAX)
            .map(Self)
            .ok_or(FromSqlError::OutOfRange(raw))
    }
}

/// A `Labels` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub tag: Option<String>,
    pub color: Option<Color>,
}

impl Label {
    /// # Errors
    ///
    /// Returns the driver error for a missing column or an out-of-range color.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            tag: row.get("tag")?,
            color: row.get("color")?,
        })
    }
}

/// A `LabelItems` row linking a label to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelItem {
    pub id: i64,
    pub label: i64,
    pub item: i64,
    pub item_type: ItemType,
}

impl LabelItem {
    /// # Errors
    ///
    /// Returns the driver error for a missing column or an unknown type code.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            label: row.get("label")?,
            item: row.get("item")?,
            item_type: row.get("type")?,
        })
    }
}
