//! project-viewer: CLI harness for the project tree and saved workspace states.
//!
//! Works on the same files an editor integration uses (`projects.json`,
//! `config.json`, `states/`) and drives the core through a dry-run host that
//! prints every host call instead of touching an editor.
//!
//! ## Subcommands
//!
//! - `list`: Print the tree with selection and group markers
//! - `move`: Relocate a node next to another one and save
//! - `drag`: Run the full drag-and-drop protocol against one target row
//! - `open`: Switch to a project against the dry-run host
//! - `key`: Print the state key for a path set
//! - `states`: List saved workspace states

mod commands;
mod logging;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use viewer_core::StorageConfig;

#[derive(Parser)]
#[command(name = "project-viewer")]
#[command(about = "Project tree and workspace state tool")]
#[command(version)]
struct Cli {
    /// Storage root (defaults to ~/.project-viewer)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the project tree
    List {
        /// Paths of the currently open window, to mark the open project
        #[arg(long = "active", value_name = "PATH")]
        active: Vec<String>,
    },

    /// Move a node before or after another node and save the tree
    Move {
        #[arg(value_name = "DRAGGED")]
        dragged: String,

        #[arg(value_name = "TARGET")]
        target: String,

        /// Insert before the target instead of after it
        #[arg(long)]
        before: bool,
    },

    /// Drag a node over a target row and drop it there
    Drag {
        #[arg(value_name = "DRAGGED")]
        dragged: String,

        #[arg(value_name = "TARGET")]
        target: String,

        /// Pointer position while hovering the target
        #[arg(long, allow_negative_numbers = true)]
        pointer_y: f64,

        /// Top edge of the target row
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        top: f64,

        /// Height of the target row
        #[arg(long, default_value_t = 24.0)]
        height: f64,
    },

    /// Open a project against a dry-run host
    Open {
        #[arg(value_name = "UUID")]
        uuid: String,

        /// Invert the configured new-window preference
        #[arg(long)]
        reverse: bool,

        /// Paths of the currently open window
        #[arg(long = "active", value_name = "PATH")]
        active: Vec<String>,
    },

    /// Print the saved-state key for an ordered path set
    Key {
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<String>,
    },

    /// List saved workspace states
    States,
}

fn main() {
    let cli = Cli::parse();
    let storage = cli
        .root
        .map(StorageConfig::with_root)
        .unwrap_or_default();
    let _logging_guard = logging::init(&storage);

    let result = match cli.command {
        Commands::List { active } => commands::list(&storage, active),
        Commands::Move {
            dragged,
            target,
            before,
        } => commands::move_node(&storage, &dragged, &target, before),
        Commands::Drag {
            dragged,
            target,
            pointer_y,
            top,
            height,
        } => commands::drag(&storage, &dragged, &target, pointer_y, top, height),
        Commands::Open {
            uuid,
            reverse,
            active,
        } => commands::open(&storage, &uuid, reverse, active),
        Commands::Key { paths } => Ok(commands::key(&paths)),
        Commands::States => commands::states(&storage),
    };

    match result {
        Ok(output) => print!("{}", output),
        Err(e) => {
            tracing::error!(error = %e, "project-viewer failed");
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
