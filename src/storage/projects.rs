//! Project metadata: the `Info` row and the project version timeline.

use crate::error::{Error, Result};
use crate::model::{Info, ProjectVersion};
use crate::storage::SqliteStorage;
use rusqlite::{Connection, OptionalExtension};
use tracing::info;

const PROJECT_VERSION_SELECT: &str = "SELECT id, name, created FROM Projects";

pub(crate) fn project_version_exists(conn: &Connection, id: i64) -> Result<bool> {
    conn.query_row("SELECT 1 FROM Projects WHERE id = ?1", [id], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
        .map_err(|e| Error::query("look up Projects", e))
}

impl SqliteStorage {
    /// Read the singleton `Info` row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Integrity`] if the row is missing.
    pub fn info(&self) -> Result<Info> {
        self.conn()?
            .query_row(
                "SELECT id, version, name, created FROM Info ORDER BY id LIMIT 1",
                [],
                Info::from_row,
            )
            .optional()
            .map_err(|e| Error::from_row("Info", e))?
            .ok_or_else(|| Error::Integrity("project file has no Info row".to_string()))
    }

    /// Change the project display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails or the `Info` row is missing.
    pub fn rename_project(&mut self, name: &str) -> Result<()> {
        let id = self.info()?.id;
        self.mutate("rename_project", |tx| {
            tx.execute("UPDATE Info SET name = ?1 WHERE id = ?2", rusqlite::params![name, id])
                .map_err(|e| Error::query("update Info", e))?;
            Ok(())
        })
    }

    /// Start a new project version.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_project_version(&mut self, name: &str) -> Result<ProjectVersion> {
        let version = self.mutate("create_project_version", |tx| {
            tx.query_row(
                "INSERT INTO Projects (name) VALUES (?1) RETURNING id, name, created",
                [name],
                ProjectVersion::from_row,
            )
            .map_err(|e| Error::query("insert Projects", e))
        })?;
        info!(id = version.id, name, "Created project version");
        Ok(version)
    }

    /// Get a project version by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_project_version(&self, id: i64) -> Result<Option<ProjectVersion>> {
        self.conn()?
            .query_row(
                &format!("{PROJECT_VERSION_SELECT} WHERE id = ?1"),
                [id],
                ProjectVersion::from_row,
            )
            .optional()
            .map_err(|e| Error::from_row("Projects", e))
    }

    /// All project versions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_project_versions(&self) -> Result<Vec<ProjectVersion>> {
        self.query(
            &format!("{PROJECT_VERSION_SELECT} ORDER BY id"),
            [],
            ProjectVersion::from_row,
        )
    }

    /// The most recently created project version.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn latest_project_version(&self) -> Result<Option<ProjectVersion>> {
        self.conn()?
            .query_row(
                &format!("{PROJECT_VERSION_SELECT} ORDER BY id DESC LIMIT 1"),
                [],
                ProjectVersion::from_row,
            )
            .optional()
            .map_err(|e| Error::from_row("Projects", e))
    }
}
