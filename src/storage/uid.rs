//! Item uid generation.
//!
//! A uid names a conceptual item across all of its versions, independent of
//! row ids. Fresh uids are drawn at random and checked against both item
//! tables before they are handed out.

use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use rusqlite::Connection;
use std::collections::HashSet;
use tracing::warn;

/// Source of candidate uids.
pub trait UidSource: std::fmt::Debug {
    fn next_uid(&mut self) -> i64;
}

/// Uniform 64-bit values from the system's UUID v4 generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomUid;

impl UidSource for RandomUid {
    fn next_uid(&mut self) -> i64 {
        // v4 fixes version bits in the high half and variant bits in the low
        // half; folding the halves leaves all 64 bits uniform.
        let (high, low) = uuid::Uuid::new_v4().as_u64_pair();
        i64::from_ne_bytes((high ^ low).to_ne_bytes())
    }
}

/// Hands out uids unused by any stored item and never repeated by this
/// generator.
///
/// The check-then-use is only safe with a single writer per file.
///
/// Issued uids are remembered for the generator's lifetime (one per open
/// store), so memory grows with the number of uids drawn in that session.
#[derive(Debug)]
pub struct UidGenerator {
    source: Box<dyn UidSource + Send>,
    issued: HashSet<i64>,
}

impl Default for UidGenerator {
    fn default() -> Self {
        Self::with_source(RandomUid)
    }
}

impl UidGenerator {
    #[must_use]
    pub fn with_source(source: impl UidSource + Send + 'static) -> Self {
        Self {
            source: Box::new(source),
            issued: HashSet::new(),
        }
    }

    /// Draw candidates until one is free.
    ///
    /// # Errors
    ///
    /// Returns a query error if the existence check fails.
    pub fn generate(&mut self, conn: &Connection) -> Result<i64> {
        loop {
            let uid = self.source.next_uid();
            if !self.issued.contains(&uid) && !uid_exists(conn, uid)? {
                self.issued.insert(uid);
                return Ok(uid);
            }
            warn!(uid, "Uid collision, drawing again");
        }
    }
}

/// Check whether any requirement or solution row already uses `uid`.
///
/// # Errors
///
/// Returns a query error if the lookup fails.
pub fn uid_exists(conn: &Connection, uid: i64) -> Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) FROM
            (SELECT uid FROM Requirements UNION SELECT uid FROM Solutions)
         WHERE uid = ?1",
        [uid],
        |row| row.get::<_, i64>(0),
    )
    .map(|count| count > 0)
    .map_err(|e| Error::query("check uid", e))
}

impl SqliteStorage {
    /// Generate a uid for a new item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] on a closed store, or a query error if the
    /// existence check fails.
    pub fn generate_uid(&mut self) -> Result<i64> {
        let (conn, uids) = self.conn_and_uids()?;
        uids.generate(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays a fixed list of candidates.
    #[derive(Debug)]
    struct Scripted(VecDeque<i64>);

    impl UidSource for Scripted {
        fn next_uid(&mut self) -> i64 {
            self.0.pop_front().expect("script exhausted")
        }
    }

    fn scripted(values: &[i64]) -> Scripted {
        Scripted(values.iter().copied().collect())
    }

    #[test]
    fn test_generate_on_empty_store() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.set_uid_source(scripted(&[42]));
        assert_eq!(storage.generate_uid().unwrap(), 42);
    }

    #[test]
    fn test_skips_uids_in_either_table() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage
            .execute("INSERT INTO Requirements (uid) VALUES (1)", [])
            .unwrap();
        storage
            .execute("INSERT INTO Solutions (uid) VALUES (2)", [])
            .unwrap();

        storage.set_uid_source(scripted(&[1, 2, 3]));
        assert_eq!(storage.generate_uid().unwrap(), 3);
    }

    #[test]
    fn test_never_repeats_within_a_sequence() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.set_uid_source(scripted(&[5, 5, 6, 5, 6, 7]));

        let uids: Vec<i64> = (0..3).map(|_| storage.generate_uid().unwrap()).collect();
        assert_eq!(uids, vec![5, 6, 7]);
    }

    #[test]
    fn test_random_uids_are_distinct_from_existing() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        for _ in 0..50 {
            let uid = storage.generate_uid().unwrap();
            storage
                .execute("INSERT INTO Requirements (uid) VALUES (?1)", [uid])
                .unwrap();
        }

        let mut seen = HashSet::new();
        for _ in 0..200 {
            let uid = storage.generate_uid().unwrap();
            assert!(!uid_exists(storage.conn().unwrap(), uid).unwrap());
            assert!(seen.insert(uid));
        }
    }

    #[test]
    fn test_generate_on_closed_store() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.close().unwrap();
        assert!(matches!(storage.generate_uid(), Err(Error::Closed)));
    }
}
