//! Media storage.
//!
//! Payloads are streamed into a zero-filled blob after the row is inserted,
//! so large images never need a second in-memory copy for binding.

use crate::error::{Error, Result};
use crate::model::{ItemType, Media, MediaInfo};
use crate::storage::SqliteStorage;
use crate::storage::items::item_exists;
use rusqlite::blob::ZeroBlob;
use rusqlite::{DatabaseName, OptionalExtension, params};
use std::io::Write;
use tracing::debug;

const MEDIA_INFO_SELECT: &str =
    "SELECT id, parent, format, COALESCE(length(data), 0) AS size FROM Media";

impl SqliteStorage {
    /// Attach media to a solution. `format` defaults to `webp`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Integrity`] if the solution doesn't exist, and
    /// [`Error::InvalidArgument`] if the payload is too large for a blob.
    pub fn add_media(&mut self, solution: i64, format: Option<&str>, data: &[u8]) -> Result<MediaInfo> {
        let len = i32::try_from(data.len()).map_err(|_| {
            Error::InvalidArgument(format!("media payload of {} bytes is too large", data.len()))
        })?;

        let info = self.mutate("add_media", |tx| {
            if !item_exists(tx, ItemType::Solution, solution)? {
                return Err(Error::Integrity(format!(
                    "media parent {solution} is not an existing Solution"
                )));
            }

            let inserted = match format {
                Some(format) => tx.query_row(
                    "INSERT INTO Media (parent, format, data) VALUES (?1, ?2, ?3)
                     RETURNING id, parent, format, length(data) AS size",
                    params![solution, format, ZeroBlob(len)],
                    MediaInfo::from_row,
                ),
                None => tx.query_row(
                    "INSERT INTO Media (parent, data) VALUES (?1, ?2)
                     RETURNING id, parent, format, length(data) AS size",
                    params![solution, ZeroBlob(len)],
                    MediaInfo::from_row,
                ),
            }
            .map_err(|e| Error::query("insert Media", e))?;

            let mut blob = tx
                .blob_open(DatabaseName::Main, "Media", "data", inserted.id, false)
                .map_err(|e| Error::query("open Media blob", e))?;
            blob.write_all(data)?;
            blob.close().map_err(|e| Error::query("close Media blob", e))?;

            Ok(inserted)
        })?;

        debug!(id = info.id, solution, size = info.size, "Stored media");
        Ok(info)
    }

    /// Media attached to a solution, without payloads.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn media_for_solution(&self, solution: i64) -> Result<Vec<MediaInfo>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!("{MEDIA_INFO_SELECT} WHERE parent = ?1 ORDER BY id"))
            .map_err(|e| Error::query("read Media", e))?;
        let rows = stmt
            .query_map([solution], MediaInfo::from_row)
            .map_err(|e| Error::query("read Media", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::from_row("Media", e))
    }

    /// Read a media row including its payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is malformed.
    pub fn read_media(&self, id: i64) -> Result<Option<Media>> {
        self.conn()?
            .query_row(
                "SELECT id, parent, format, data FROM Media WHERE id = ?1",
                [id],
                Media::from_row,
            )
            .optional()
            .map_err(|e| Error::from_row("Media", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_solution() -> SqliteStorage {
        let storage = SqliteStorage::open_memory().unwrap();
        storage
            .execute("INSERT INTO Solutions (id, uid) VALUES (1, 100)", [])
            .unwrap();
        storage
    }

    #[test]
    fn test_add_and_read_media() {
        let mut storage = with_solution();
        let payload: Vec<u8> = (0..=255).collect();

        let info = storage.add_media(1, None, &payload).unwrap();
        assert_eq!(info.format, "webp");
        assert_eq!(info.size, 256);

        let media = storage.read_media(info.id).unwrap().unwrap();
        assert_eq!(media.parent, 1);
        assert_eq!(media.data, payload);
    }

    #[test]
    fn test_explicit_format_and_listing() {
        let mut storage = with_solution();
        storage.add_media(1, Some("png"), b"\x89PNG").unwrap();
        storage.add_media(1, None, b"").unwrap();

        let listed = storage.media_for_solution(1).unwrap();
        let formats: Vec<&str> = listed.iter().map(|m| m.format.as_str()).collect();
        assert_eq!(formats, vec!["png", "webp"]);
        assert_eq!(listed[0].size, 4);
        assert_eq!(listed[1].size, 0);
    }

    #[test]
    fn test_media_requires_solution() {
        let mut storage = with_solution();
        let err = storage.add_media(2, None, b"data").unwrap_err();
        assert!(matches!(err, Error::Integrity(_)));
        assert_eq!(storage.count_rows("Media").unwrap(), 0);
    }
}
