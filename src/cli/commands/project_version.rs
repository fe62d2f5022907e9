//! Project version commands.
//!
//! - `orq project-version create <name>` - Start a new project version
//! - `orq project-version list` - List the timeline

use super::{format_timestamp, open_project, print_json};
use crate::cli::ProjectVersionCommands;
use crate::error::Result;
use crate::model::ProjectVersion;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct VersionOutput {
    id: i64,
    name: Option<String>,
    created: i64,
    created_at: String,
}

impl From<ProjectVersion> for VersionOutput {
    fn from(v: ProjectVersion) -> Self {
        Self {
            id: v.id,
            name: v.name,
            created: v.created,
            created_at: format_timestamp(v.created),
        }
    }
}

#[derive(Serialize)]
struct VersionListOutput {
    versions: Vec<VersionOutput>,
    count: usize,
}

/// Execute a project version command.
///
/// # Errors
///
/// Returns an error if the project cannot be opened or the write fails.
pub fn execute(
    command: &ProjectVersionCommands,
    project_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let mut project = open_project(project_path)?;

    match command {
        ProjectVersionCommands::Create { name } => {
            let version = VersionOutput::from(project.new_version(name)?);
            if json {
                return print_json(&version);
            }
            println!("Created project version {} {}", version.id.to_string().cyan(), name.bold());
        }
        ProjectVersionCommands::List => {
            let versions: Vec<VersionOutput> = project
                .versions()?
                .into_iter()
                .map(VersionOutput::from)
                .collect();
            if json {
                let count = versions.len();
                return print_json(&VersionListOutput { versions, count });
            }
            if versions.is_empty() {
                println!("No project versions yet.");
            }
            for v in &versions {
                println!(
                    "{:>4}  {:<24} {}",
                    v.id.to_string().cyan(),
                    v.name.as_deref().unwrap_or(""),
                    v.created_at.dimmed()
                );
            }
        }
    }
    Ok(())
}
