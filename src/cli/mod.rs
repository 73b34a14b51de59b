mod commands;
pub mod error;
pub mod utils;

#[cfg(test)]
#[path = "utils_test.rs"]
mod utils_test;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::sync::{TransferManager, get_data_dir};

#[derive(Parser)]
#[command(name = "cams")]
#[command(author, version, about = "Camp data maintenance CLI", long_about = None)]
pub struct Cli {
    /// Override the data directory (default: CAMS_DATA_DIR env or ~/.local/share/cams)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and any missing data files
    Init,
    /// Load every data file and report problems without changing anything
    Check {
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show per-file record counts
    Status {
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Load and save every data file, dropping malformed rows
    Rewrite {
        /// Prune dangling references instead of refusing to save
        #[arg(long)]
        acknowledge: bool,
    },
    /// Camp commands
    Camp {
        #[command(subcommand)]
        command: CampCommands,
    },
}

#[derive(Subcommand)]
enum CampCommands {
    /// List camps
    List {
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List the members of a camp
    Roster {
        /// Camp name
        camp: String,
        /// Which members to list (all, attendees or committee)
        #[arg(long, default_value = "all")]
        filter: String,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Delete a camp and everything attached to it
    Delete {
        /// Camp name
        camp: String,
        /// ID of the staff member in charge
        #[arg(long)]
        staff: String,
    },
}

pub fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    let manager = TransferManager::with_data_dir(get_data_dir(cli.data_dir.as_deref()));

    let output = match cli.command {
        Some(Commands::Init) => commands::data::init(&manager)?,
        Some(Commands::Check { format }) => commands::data::check(&manager, &format)?,
        Some(Commands::Status { format }) => commands::data::status(&manager, &format)?,
        Some(Commands::Rewrite { acknowledge }) => commands::data::rewrite(&manager, acknowledge)?,
        Some(Commands::Camp { command }) => match command {
            CampCommands::List { format } => commands::camp::list_camps(&manager, &format)?,
            CampCommands::Roster {
                camp,
                filter,
                format,
            } => commands::camp::camp_roster(&manager, &camp, &filter, &format)?,
            CampCommands::Delete { camp, staff } => {
                commands::camp::delete_camp(&manager, &staff, &camp)?
            }
        },
        None => {
            // Show help when no command provided
            let _ = Cli::parse_from(["cams", "--help"]);
            return Ok(());
        }
    };

    println!("{}", output);
    Ok(())
}
