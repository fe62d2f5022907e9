//! Label commands.

use super::{open_project, print_json};
use crate::cli::LabelCommands;
use crate::error::Result;
use crate::model::{ItemType, Label, LabelItem};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct LabelListOutput {
    labels: Vec<Label>,
    count: usize,
}

#[derive(Serialize)]
struct DetachOutput {
    label: i64,
    item_type: ItemType,
    item: i64,
    removed: bool,
}

/// Execute a label command.
///
/// # Errors
///
/// Returns an error if the project cannot be opened or a referenced row is
/// missing.
pub fn execute(command: &LabelCommands, project_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut project = open_project(project_path)?;
    let storage = project.storage_mut();

    match command {
        LabelCommands::Add { tag, color } => {
            let label = storage.create_label(tag, *color)?;
            if json {
                return print_json(&label);
            }
            println!("Created label {} {}", label.id.to_string().cyan(), describe(&label));
        }
        LabelCommands::List => {
            let labels = storage.list_labels()?;
            if json {
                let count = labels.len();
                return print_json(&LabelListOutput { labels, count });
            }
            if labels.is_empty() {
                println!("No labels.");
            }
            for label in &labels {
                println!("{:>4}  {}", label.id.to_string().cyan(), describe(label));
            }
        }
        LabelCommands::Attach { label, item_type, id } => {
            let link: LabelItem = storage.attach_label(*label, *item_type, *id)?;
            if json {
                return print_json(&link);
            }
            println!("Attached label {label} to {item_type} {id}");
        }
        LabelCommands::Detach { label, item_type, id } => {
            let removed = storage.detach_label(*label, *item_type, *id)?;
            if json {
                return print_json(&DetachOutput {
                    label: *label,
                    item_type: *item_type,
                    item: *id,
                    removed,
                });
            }
            if removed {
                println!("Detached label {label} from {item_type} {id}");
            } else {
                println!("Label {label} was not attached to {item_type} {id}");
            }
        }
    }
    Ok(())
}

fn describe(label: &Label) -> String {
    let tag = label.tag.as_deref().unwrap_or("(untagged)");
    match label.color {
        Some(color) => {
            let (r, g, b) = color.rgb();
            format!("{} {}", tag.truecolor(r, g, b).bold(), color.to_string().dimmed())
        }
        None => tag.bold().to_string(),
    }
}
