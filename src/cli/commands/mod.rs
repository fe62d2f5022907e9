//! Command implementations.

pub mod backup;
pub mod completions;
pub mod info;
pub mod init;
pub mod item;
pub mod label;
pub mod media;
pub mod project_version;
pub mod version;

use crate::config::resolve_project_path;
use crate::error::{Error, Result};
use crate::project::Project;
use serde::Serialize;
use std::path::PathBuf;

/// Open the project named by `--project` or `ORQ_PROJECT`.
///
/// Unlike [`Project::open`], a missing file is an error here: only `init`
/// creates project files from the command line.
pub(crate) fn open_project(explicit: Option<&PathBuf>) -> Result<Project> {
    let path = resolve_project_path(explicit.map(PathBuf::as_path))?;
    if !path.is_file() {
        return Err(Error::NotInitialized);
    }
    Project::open(path)
}

/// Print a value as one line of JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Render a millisecond timestamp as RFC 3339.
pub(crate) fn format_timestamp(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}
