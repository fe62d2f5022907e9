//! Backup command: online copy of the project file.

use super::{open_project, print_json};
use crate::error::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct BackupOutput<'a> {
    source: &'a Path,
    dest: &'a Path,
}

/// Execute the backup command.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `dest` already exists, or any error
/// from the copy.
pub fn execute(project_path: Option<&PathBuf>, dest: &Path, json: bool) -> Result<()> {
    if dest.exists() {
        return Err(Error::InvalidArgument(format!(
            "backup destination {} already exists",
            dest.display()
        )));
    }
    let project = open_project(project_path)?;
    project.storage().backup_to(dest)?;

    if json {
        return print_json(&BackupOutput {
            source: project.path(),
            dest,
        });
    }
    println!("Backed up {} to {}", project.path().display(), dest.display());
    Ok(())
}
