//! Item commands.
//!
//! - `orq item add <type>` - Write a new item under a project version
//! - `orq item update <type> <id>` - Amend or fork an item
//! - `orq item show <type> <id>` - Item with labels, parent, children, media
//! - `orq item list` - Stored items, optionally by version and type
//! - `orq item history <type> <uid>` - Version lineage
//! - `orq item children <type> <id>` - Direct children

use super::{open_project, print_json};
use crate::cli::{ItemCommands, ItemFields};
use crate::error::{Error, Result};
use crate::model::{Item, ItemType, ItemVersion, Label, MediaInfo, Requirement, Solution};
use crate::storage::uid::uid_exists;
use crate::storage::{SqliteStorage, UpdateOutcome};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct WriteOutput {
    version: i64,
    outcome: UpdateOutcome,
    item: Item,
}

#[derive(Serialize)]
struct ShowOutput {
    item: Item,
    parent: Option<Item>,
    labels: Vec<Label>,
    children: Vec<Item>,
    media: Vec<MediaInfo>,
}

#[derive(Serialize)]
struct ItemListOutput {
    items: Vec<Item>,
    count: usize,
}

#[derive(Serialize)]
struct HistoryOutput {
    item_type: ItemType,
    uid: i64,
    history: Vec<ItemVersion>,
    count: usize,
}

/// Execute an item command.
///
/// # Errors
///
/// Returns an error if the project cannot be opened, a referenced row is
/// missing, or the store rejects the operation.
pub fn execute(command: &ItemCommands, project_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut project = open_project(project_path)?;
    let storage = project.storage_mut();

    match command {
        ItemCommands::Add {
            item_type,
            version,
            uid,
            fields,
        } => add(storage, *item_type, *version, *uid, fields, json),
        ItemCommands::Update {
            item_type,
            id,
            version,
            fields,
        } => update(storage, *item_type, *id, *version, fields, json),
        ItemCommands::Show { item_type, id } => show(storage, *item_type, *id, json),
        ItemCommands::List { version, item_type } => list(storage, *version, *item_type, json),
        ItemCommands::History { item_type, uid } => history(storage, *item_type, *uid, json),
        ItemCommands::Children { item_type, id } => children(storage, *item_type, *id, json),
    }
}

/// Pick the project version to write under: the given one, else the latest.
fn resolve_version(storage: &SqliteStorage, version: Option<i64>) -> Result<i64> {
    match version {
        Some(id) => storage
            .get_project_version(id)?
            .map(|v| v.id)
            .ok_or(Error::NotFound {
                kind: "Project version",
                id,
            }),
        None => storage
            .latest_project_version()?
            .map(|v| v.id)
            .ok_or_else(|| {
                Error::InvalidArgument(
                    "no project version exists; run `orq project-version create <name>` first"
                        .to_string(),
                )
            }),
    }
}

fn find_item(storage: &SqliteStorage, item_type: ItemType, id: i64) -> Result<Item> {
    storage.get_item(item_type, id)?.ok_or(Error::NotFound {
        kind: item_type.as_str(),
        id,
    })
}

/// Overwrite the fields that were given on the command line.
fn apply_fields(item: &mut Item, fields: &ItemFields) -> Result<()> {
    let ItemFields {
        description,
        rationale,
        fit_criterion,
        link,
        parent,
        label,
    } = fields.clone();

    match item {
        Item::Requirement(r) => {
            if link.is_some() {
                return Err(Error::InvalidArgument(
                    "--link applies to solutions only".to_string(),
                ));
            }
            r.description = description.or(r.description.take());
            r.rationale = rationale.or(r.rationale.take());
            r.fit_criterion = fit_criterion.or(r.fit_criterion.take());
            r.parent = parent.or(r.parent);
            r.label = label.or(r.label);
        }
        Item::Solution(s) => {
            if rationale.is_some() || fit_criterion.is_some() {
                return Err(Error::InvalidArgument(
                    "--rationale and --fit-criterion apply to requirements only".to_string(),
                ));
            }
            s.description = description.or(s.description.take());
            s.link = link.or(s.link.take());
            s.parent = parent.or(s.parent);
            s.label = label.or(s.label);
        }
    }
    Ok(())
}

fn add(
    storage: &mut SqliteStorage,
    item_type: ItemType,
    version: Option<i64>,
    uid: Option<i64>,
    fields: &ItemFields,
    json: bool,
) -> Result<()> {
    let version = resolve_version(storage, version)?;
    let uid = match uid {
        Some(uid) => {
            if uid_exists(storage.conn()?, uid)? {
                return Err(Error::InvalidArgument(format!(
                    "uid {uid} already exists; use `orq item update` to revise it"
                )));
            }
            uid
        }
        None => storage.generate_uid()?,
    };
    let mut item = match item_type {
        ItemType::Requirement => Item::from(Requirement::new(uid)),
        ItemType::Solution => Item::from(Solution::new(uid)),
    };
    apply_fields(&mut item, fields)?;

    write(storage, item, version, json)
}

fn update(
    storage: &mut SqliteStorage,
    item_type: ItemType,
    id: i64,
    version: Option<i64>,
    fields: &ItemFields,
    json: bool,
) -> Result<()> {
    let version = resolve_version(storage, version)?;
    let mut item = find_item(storage, item_type, id)?;
    let links_before = (item.parent(), item.label());
    apply_fields(&mut item, fields)?;

    // An amend only rewrites the mutable text fields
    if (item.parent(), item.label()) != links_before {
        if let Some(pending) = storage.pending_for_item(version, &item)? {
            return Err(Error::InvalidArgument(format!(
                "--parent and --label cannot change {item_type} {} while it is pending in version {version}; \
                 create a new project version to revise them",
                pending.item
            )));
        }
    }

    write(storage, item, version, json)
}

fn write(storage: &mut SqliteStorage, item: Item, version: i64, json: bool) -> Result<()> {
    let item_type = item.item_type();
    let outcome = storage.update_item(&item, version)?;
    let item = find_item(storage, item_type, outcome.id())?;

    if json {
        return print_json(&WriteOutput {
            version,
            outcome,
            item,
        });
    }

    match outcome {
        UpdateOutcome::Amended { id } => println!(
            "{} {} {} in version {version}",
            "Amended".yellow(),
            item.item_type(),
            id.to_string().cyan()
        ),
        UpdateOutcome::Forked { id, item_version } => println!(
            "{} {} {} (uid {}, revision {item_version}) in version {version}",
            "Created".green(),
            item.item_type(),
            id.to_string().cyan(),
            item.uid()
        ),
    }
    Ok(())
}

fn show(storage: &SqliteStorage, item_type: ItemType, id: i64, json: bool) -> Result<()> {
    let item = find_item(storage, item_type, id)?;
    let media = match item_type {
        ItemType::Solution => storage.media_for_solution(id)?,
        ItemType::Requirement => Vec::new(),
    };
    let output = ShowOutput {
        parent: storage.parent_of(&item)?,
        labels: storage.labels_for_item(item_type, id)?,
        children: storage.children(&item)?,
        media,
        item,
    };

    if json {
        return print_json(&output);
    }

    print_item_detail(&output.item);
    if let Some(parent) = &output.parent {
        println!("  Parent:      {}", item_line(parent));
    }
    if !output.labels.is_empty() {
        let tags: Vec<String> = output
            .labels
            .iter()
            .map(|l| l.tag.clone().unwrap_or_else(|| format!("#{}", l.id)))
            .collect();
        println!("  Labels:      {}", tags.join(", "));
    }
    if !output.children.is_empty() {
        println!("  Children:");
        for child in &output.children {
            println!("    {}", item_line(child));
        }
    }
    for m in &output.media {
        println!("  Media:       {} {} ({} bytes)", m.id, m.format, m.size);
    }
    Ok(())
}

fn list(
    storage: &SqliteStorage,
    version: Option<i64>,
    item_type: Option<ItemType>,
    json: bool,
) -> Result<()> {
    let mut items = match version {
        Some(v) => storage.items_in_version(v)?,
        None => {
            let mut all = storage.list_items(ItemType::Requirement)?;
            all.extend(storage.list_items(ItemType::Solution)?);
            all
        }
    };
    if let Some(t) = item_type {
        items.retain(|item| item.item_type() == t);
    }

    if json {
        let count = items.len();
        return print_json(&ItemListOutput { items, count });
    }
    if items.is_empty() {
        println!("No items found.");
    }
    for item in &items {
        println!("{}", item_line(item));
    }
    Ok(())
}

fn history(storage: &SqliteStorage, item_type: ItemType, uid: i64, json: bool) -> Result<()> {
    let history = storage.item_history(item_type, uid)?;

    if json {
        let count = history.len();
        return print_json(&HistoryOutput {
            item_type,
            uid,
            history,
            count,
        });
    }
    if history.is_empty() {
        println!("No history for {item_type} uid {uid}.");
    }
    for entry in &history {
        println!(
            "  rev {:<3} version {:<4} row {}",
            entry.item_v,
            entry.version,
            entry.item.to_string().cyan()
        );
    }
    Ok(())
}

fn children(storage: &SqliteStorage, item_type: ItemType, id: i64, json: bool) -> Result<()> {
    let item = find_item(storage, item_type, id)?;
    let items = storage.children(&item)?;

    if json {
        let count = items.len();
        return print_json(&ItemListOutput { items, count });
    }
    for child in &items {
        println!("{}", item_line(child));
    }
    Ok(())
}

fn item_line(item: &Item) -> String {
    let id = item.id().map_or_else(|| "-".to_string(), |id| id.to_string());
    let kind = match item.item_type() {
        ItemType::Requirement => "REQ".blue(),
        ItemType::Solution => "SOL".magenta(),
    };
    format!(
        "{kind} {:>4}  {}  {}",
        id.cyan(),
        format!("uid {}", item.uid()).dimmed(),
        item.description().unwrap_or("")
    )
}

fn print_item_detail(item: &Item) {
    println!("{}", item_line(item).bold());
    match item {
        Item::Requirement(r) => {
            if let Some(rationale) = &r.rationale {
                println!("  Rationale:   {rationale}");
            }
            if let Some(fit) = &r.fit_criterion {
                println!("  Fit:         {fit}");
            }
        }
        Item::Solution(s) => {
            if let Some(link) = &s.link {
                println!("  Link:        {link}");
            }
        }
    }
}
