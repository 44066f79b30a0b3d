//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cabin-mark")]
#[command(version)]
#[command(about = "Cabin Auto-Mark - record cabin door inspection photos and export a composite report")]
pub struct Cli {
    /// Data directory (database, settings, logs). Defaults to the platform data dir.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Store an already-stamped photo for one door
    Import {
        #[arg(short, long)]
        aircraft: String,

        #[arg(short, long)]
        door: String,

        /// Image file
        file: PathBuf,
    },

    /// Replace the image of an existing photo
    Retake {
        id: String,

        /// Image file
        file: PathBuf,
    },

    /// List stored photos (thumbnails only)
    List {
        #[arg(short, long)]
        aircraft: Option<String>,
    },

    /// Write the full-resolution image of one photo to a file
    Show {
        id: String,

        /// Output file; defaults to a generated name in the current directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Delete photos
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete every photo and the inspection details of one aircraft
    Clear { aircraft: String },

    /// Inspection details (registration, inspection label)
    Inspect {
        #[command(subcommand)]
        action: InspectAction,
    },

    /// Compose every photo of one aircraft into a single long JPEG
    Export {
        #[arg(short, long)]
        aircraft: String,

        /// Output file or directory; defaults to the Exports data folder
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Photo count per aircraft
    Counts,

    /// Known aircraft types and their doors
    Layouts,
}

#[derive(Debug, Subcommand)]
pub enum InspectAction {
    Set {
        #[arg(short, long)]
        aircraft: String,

        #[arg(short, long)]
        registration: String,

        #[arg(short, long)]
        label: String,
    },
    Show {
        #[arg(short, long)]
        aircraft: String,
    },
}
