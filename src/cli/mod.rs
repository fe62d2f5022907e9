//! CLI definitions using clap.

use crate::model::{Color, ItemType};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// orq - versioned requirements and solutions in a single file
#[derive(Parser, Debug)]
#[command(name = "orq", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project file (the .orq extension may be omitted)
    #[arg(short, long, global = true, env = "ORQ_PROJECT")]
    pub project: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new project file
    Init {
        /// Path of the project file
        path: PathBuf,

        /// Display name (default: file name without extension)
        #[arg(long)]
        name: Option<String>,
    },

    /// Show project info and row counts
    Info,

    /// Rename the project
    Rename {
        /// New display name
        name: String,
    },

    /// Print version information
    Version,

    /// Project version timeline
    #[command(name = "project-version", alias = "pv")]
    ProjectVersion {
        #[command(subcommand)]
        command: ProjectVersionCommands,
    },

    /// Requirements and solutions
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },

    /// Labels
    Label {
        #[command(subcommand)]
        command: LabelCommands,
    },

    /// Media attached to solutions
    Media {
        #[command(subcommand)]
        command: MediaCommands,
    },

    /// Copy the project file to a new location
    Backup {
        /// Destination file
        dest: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Project Version Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum ProjectVersionCommands {
    /// Start a new project version
    Create {
        /// Version name
        name: String,
    },

    /// List project versions, oldest first
    List,
}

// ============================================================================
// Item Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Add a new item under a project version
    Add {
        /// Item type (requirement, solution)
        item_type: ItemType,

        /// Project version (default: latest)
        #[arg(long)]
        version: Option<i64>,

        /// Explicit uid (default: generated)
        #[arg(long)]
        uid: Option<i64>,

        #[command(flatten)]
        fields: ItemFields,
    },

    /// Update an item under a project version (amends or forks)
    Update {
        /// Item type (requirement, solution)
        item_type: ItemType,

        /// Row id of the item
        id: i64,

        /// Project version (default: latest)
        #[arg(long)]
        version: Option<i64>,

        #[command(flatten)]
        fields: ItemFields,
    },

    /// Show an item with its labels, children and media
    Show {
        /// Item type (requirement, solution)
        item_type: ItemType,

        /// Row id of the item
        id: i64,
    },

    /// List items
    List {
        /// Only items linked to this project version
        #[arg(long)]
        version: Option<i64>,

        /// Only items of this type
        #[arg(long = "type")]
        item_type: Option<ItemType>,
    },

    /// Version lineage of an item
    History {
        /// Item type (requirement, solution)
        item_type: ItemType,

        /// Item uid
        uid: i64,
    },

    /// Items whose parent is the given item
    Children {
        /// Item type (requirement, solution)
        item_type: ItemType,

        /// Row id of the item
        id: i64,
    },
}

/// Field values for add/update. Unset fields are left unchanged on update.
#[derive(Args, Debug, Default, Clone)]
pub struct ItemFields {
    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Rationale (requirements only)
    #[arg(long)]
    pub rationale: Option<String>,

    /// Fit criterion (requirements only)
    #[arg(long)]
    pub fit_criterion: Option<String>,

    /// Link (solutions only)
    #[arg(long)]
    pub link: Option<String>,

    /// Row id of the parent item (of the opposite type)
    #[arg(long)]
    pub parent: Option<i64>,

    /// Primary label id
    #[arg(long)]
    pub label: Option<i64>,
}

// ============================================================================
// Label Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum LabelCommands {
    /// Create a label
    Add {
        /// Label tag
        tag: String,

        /// Color as #rrggbb
        #[arg(long)]
        color: Option<Color>,
    },

    /// List labels
    List,

    /// Attach a label to an item
    Attach {
        /// Label id
        label: i64,

        /// Item type (requirement, solution)
        item_type: ItemType,

        /// Row id of the item
        id: i64,
    },

    /// Detach a label from an item
    Detach {
        /// Label id
        label: i64,

        /// Item type (requirement, solution)
        item_type: ItemType,

        /// Row id of the item
        id: i64,
    },
}

// ============================================================================
// Media Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum MediaCommands {
    /// Attach a file to a solution
    Add {
        /// Row id of the solution
        solution: i64,

        /// File to store
        file: PathBuf,

        /// Media format (default: file extension, else webp)
        #[arg(long)]
        format: Option<String>,
    },

    /// List media attached to a solution
    List {
        /// Row id of the solution
        solution: i64,
    },

    /// Write a stored media payload to a file
    Export {
        /// Media id
        id: i64,

        /// Destination file
        file: PathBuf,
    },
}
