//! Configuration management.
//!
//! Resolves which project file a command operates on and derives names from
//! project paths.
//!
//! Priority for the project file:
//! 1. Explicit `--project` flag
//! 2. `ORQ_PROJECT` environment variable
//! 3. **Error** ([`Error::NotInitialized`]), no guessing

use crate::error::{Error, Result};

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// File extension of project files.
pub const ORQ_EXTENSION: &str = "orq";

/// Environment variable naming the default project file.
pub const PROJECT_ENV: &str = "ORQ_PROJECT";

/// Name given to projects whose path has no usable base name.
pub const FALLBACK_PROJECT_NAME: &str = "untitled";

/// Append `.orq` unless the path already carries it.
///
/// `demo` becomes `demo.orq`, `demo.orq` is left alone and `notes.v2`
/// becomes `notes.v2.orq`.
#[must_use]
pub fn with_orq_extension(path: &Path) -> PathBuf {
    if path.extension() == Some(OsStr::new(ORQ_EXTENSION)) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ORQ_EXTENSION);
    PathBuf::from(name)
}

/// Project name derived from a file path: the base name, extension stripped.
#[must_use]
pub fn default_project_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| FALLBACK_PROJECT_NAME.to_string())
}

/// Resolve the project file path.
///
/// The result always carries the `.orq` extension.
///
/// # Errors
///
/// Returns [`Error::NotInitialized`] if neither the flag nor the environment
/// names a project.
pub fn resolve_project_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(with_orq_extension(path));
    }

    std::env::var(PROJECT_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(|value| with_orq_extension(Path::new(value.trim())))
        .ok_or(Error::NotInitialized)
}
