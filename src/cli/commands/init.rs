//! Create a new project file.

use crate::error::Result;
use crate::project::Project;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct InitOutput {
    path: PathBuf,
    name: String,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns [`crate::Error::AlreadyInitialized`] if the file exists, or any
/// error from creating the schema.
pub fn execute(path: &Path, name: Option<&str>, json: bool, quiet: bool) -> Result<()> {
    let mut project = Project::create(path)?;
    if let Some(name) = name {
        project.storage_mut().rename_project(name)?;
    }
    let output = InitOutput {
        path: project.path().to_path_buf(),
        name: project.name()?,
    };
    project.close()?;

    if json {
        return super::print_json(&output);
    }
    if !quiet {
        println!(
            "{} project {} at {}",
            "Created".green(),
            output.name.bold(),
            output.path.display()
        );
    }
    Ok(())
}
