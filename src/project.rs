//! Project handle.
//!
//! A [`Project`] owns the storage for one `.orq` file. Dropping it (or
//! calling [`Project::close`]) releases the connection.

use crate::config::with_orq_extension;
use crate::error::{Error, Result};
use crate::model::ProjectVersion;
use crate::storage::SqliteStorage;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An open project file.
#[derive(Debug)]
pub struct Project {
    path: PathBuf,
    storage: SqliteStorage,
}

impl Project {
    /// Open the project at `path`, creating it if the file doesn't exist.
    ///
    /// The `.orq` extension is appended when missing, so `open("demo")`
    /// works on `demo.orq`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = with_orq_extension(path.as_ref());
        let storage = SqliteStorage::open(&path)?;
        debug!(path = %path.display(), "Opened project");
        Ok(Self { path, storage })
    }

    /// Create a new project file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInitialized`] if the file already exists.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = with_orq_extension(path.as_ref());
        if path.exists() {
            return Err(Error::AlreadyInitialized { path });
        }
        Self::open(path)
    }

    /// Path of the project file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name from the `Info` row.
    ///
    /// # Errors
    ///
    /// Returns an error if the `Info` row cannot be read.
    pub fn name(&self) -> Result<String> {
        Ok(self.storage.info()?.name.unwrap_or_default())
    }

    #[must_use]
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut SqliteStorage {
        &mut self.storage
    }

    /// Project versions, oldest first, read from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the `Projects` table cannot be read.
    pub fn versions(&self) -> Result<Vec<ProjectVersion>> {
        self.storage.list_project_versions()
    }

    /// Start a new project version.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn new_version(&mut self, name: &str) -> Result<ProjectVersion> {
        self.storage.create_project_version(name)
    }

    /// Release the connection. Later storage calls return [`Error::Closed`].
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite refuses to close the connection.
    pub fn close(&mut self) -> Result<()> {
        self.storage.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Item, ItemType, Requirement};
    use crate::storage::UpdateOutcome;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_orq_file_named_after_path() {
        let dir = TempDir::new().unwrap();
        let project = Project::open(dir.path().join("demo")).unwrap();

        assert_eq!(project.path(), dir.path().join("demo.orq"));
        assert!(dir.path().join("demo.orq").is_file());
        assert_eq!(project.name().unwrap(), "demo");
        assert!(project.versions().unwrap().is_empty());
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        drop(Project::create(dir.path().join("demo")).unwrap());

        let err = Project::create(dir.path().join("demo.orq")).unwrap_err();
        assert!(matches!(err, Error::AlreadyInitialized { .. }));
    }

    #[test]
    fn test_reopen_loads_versions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("demo");
        {
            let mut project = Project::open(&path).unwrap();
            project.new_version("draft").unwrap();
            project.new_version("review").unwrap();
            project.close().unwrap();
        }

        let project = Project::open(&path).unwrap();
        let names: Vec<_> = project
            .versions()
            .unwrap()
            .iter()
            .map(|v| v.name.clone().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["draft", "review"]);
        assert_eq!(project.storage().count_rows("Info").unwrap(), 1);
    }

    #[test]
    fn test_versions_include_those_created_through_storage() {
        let dir = TempDir::new().unwrap();
        let mut project = Project::open(dir.path().join("demo")).unwrap();
        project.new_version("draft").unwrap();
        project.storage_mut().create_project_version("direct").unwrap();

        let versions = project.versions().unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[1].name.as_deref(), Some("direct"));
    }

    #[test]
    fn test_demo_walkthrough() {
        let dir = TempDir::new().unwrap();
        let mut project = Project::open(dir.path().join("demo")).unwrap();
        let version = project.new_version("v1").unwrap();
        let storage = project.storage_mut();

        storage
            .execute("INSERT INTO Solutions (id, uid) VALUES (7, 700)", [])
            .unwrap();
        let mut req = Requirement::new(123);
        req.parent = Some(7);
        req.description = Some("D".to_string());

        let first = storage.update_item(&Item::from(req.clone()), version.id).unwrap();
        let UpdateOutcome::Forked { id, item_version } = first else {
            panic!("expected a fork, got {first:?}");
        };
        assert_eq!(item_version, 1);

        req.id = Some(id);
        req.description = Some("D2".to_string());
        let second = storage.update_item(&Item::from(req), version.id).unwrap();
        assert_eq!(second, UpdateOutcome::Amended { id });

        assert_eq!(storage.count_rows("ItemVersions").unwrap(), 1);
        let stored = storage.get_item(ItemType::Requirement, id).unwrap().unwrap();
        assert_eq!(stored.description(), Some("D2"));
    }

    #[test]
    fn test_close_then_use_is_closed_error() {
        let dir = TempDir::new().unwrap();
        let mut project = Project::open(dir.path().join("demo")).unwrap();
        project.close().unwrap();
        assert!(matches!(project.name(), Err(Error::Closed)));
    }
}
