//! Project info and rename commands.

use super::{format_timestamp, open_project, print_json};
use crate::error::Result;
use crate::model::ProjectVersion;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// Tables reported by `orq info`, in display order.
const COUNTED_TABLES: [&str; 6] = [
    "Requirements",
    "Solutions",
    "ItemVersions",
    "Projects",
    "Labels",
    "Media",
];

#[derive(Serialize)]
struct InfoOutput {
    path: PathBuf,
    name: Option<String>,
    schema_version: i64,
    created: i64,
    created_at: String,
    latest_version: Option<ProjectVersion>,
    counts: Vec<TableCount>,
}

#[derive(Serialize)]
struct TableCount {
    table: &'static str,
    rows: i64,
}

/// Execute the info command.
///
/// # Errors
///
/// Returns an error if the project cannot be opened or read.
pub fn execute(project_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let project = open_project(project_path)?;
    let storage = project.storage();
    let info = storage.info()?;

    let counts = COUNTED_TABLES
        .into_iter()
        .map(|table| Ok(TableCount { table, rows: storage.count_rows(table)? }))
        .collect::<Result<Vec<_>>>()?;

    let output = InfoOutput {
        path: project.path().to_path_buf(),
        name: info.name,
        schema_version: info.version,
        created: info.created,
        created_at: format_timestamp(info.created),
        latest_version: storage.latest_project_version()?,
        counts,
    };

    if json {
        return print_json(&output);
    }

    println!(
        "{} {}",
        output.name.as_deref().unwrap_or("(unnamed)").bold(),
        format!("({})", output.path.display()).dimmed()
    );
    println!("  Schema version: {}", output.schema_version);
    println!("  Created:        {}", output.created_at);
    match &output.latest_version {
        Some(v) => println!(
            "  Latest version: {} {}",
            v.id.to_string().cyan(),
            v.name.as_deref().unwrap_or("")
        ),
        None => println!("  Latest version: {}", "none".dimmed()),
    }
    for count in &output.counts {
        println!("  {:<14}  {}", count.table, count.rows);
    }
    Ok(())
}

#[derive(Serialize)]
struct RenameOutput<'a> {
    name: &'a str,
}

/// Execute the rename command.
///
/// # Errors
///
/// Returns an error if the project cannot be opened or updated.
pub fn rename(project_path: Option<&PathBuf>, name: &str, json: bool) -> Result<()> {
    let mut project = open_project(project_path)?;
    project.storage_mut().rename_project(name)?;

    if json {
        return print_json(&RenameOutput { name });
    }
    println!("Renamed project to {}", name.bold());
    Ok(())
}
