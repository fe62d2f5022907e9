//! Media commands.

use super::{open_project, print_json};
use crate::cli::MediaCommands;
use crate::error::{Error, Result};
use crate::model::MediaInfo;
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct MediaListOutput {
    solution: i64,
    media: Vec<MediaInfo>,
    count: usize,
}

#[derive(Serialize)]
struct ExportOutput<'a> {
    id: i64,
    format: &'a str,
    file: &'a Path,
    size: usize,
}

/// Execute a media command.
///
/// # Errors
///
/// Returns an error if the project cannot be opened, the file cannot be read
/// or written, or the solution doesn't exist.
pub fn execute(command: &MediaCommands, project_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut project = open_project(project_path)?;
    let storage = project.storage_mut();

    match command {
        MediaCommands::Add {
            solution,
            file,
            format,
        } => {
            let data = fs::read(file)?;
            let format = format.clone().or_else(|| format_from_path(file));
            let info = storage.add_media(*solution, format.as_deref(), &data)?;
            if json {
                return print_json(&info);
            }
            println!(
                "Stored media {} ({}, {} bytes) on solution {solution}",
                info.id.to_string().cyan(),
                info.format,
                info.size
            );
        }
        MediaCommands::List { solution } => {
            let media = storage.media_for_solution(*solution)?;
            if json {
                let count = media.len();
                return print_json(&MediaListOutput {
                    solution: *solution,
                    media,
                    count,
                });
            }
            if media.is_empty() {
                println!("No media on solution {solution}.");
            }
            for m in &media {
                println!(
                    "{:>4}  {:<6} {}",
                    m.id.to_string().cyan(),
                    m.format,
                    format!("{} bytes", m.size).dimmed()
                );
            }
        }
        MediaCommands::Export { id, file } => {
            let media = storage.read_media(*id)?.ok_or(Error::NotFound {
                kind: "Media",
                id: *id,
            })?;
            fs::write(file, &media.data)?;
            if json {
                return print_json(&ExportOutput {
                    id: media.id,
                    format: &media.format,
                    file,
                    size: media.data.len(),
                });
            }
            println!("Wrote {} bytes to {}", media.data.len(), file.display());
        }
    }
    Ok(())
}

/// Lowercased file extension, if any.
fn format_from_path(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}
