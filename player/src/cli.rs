//! CLI command definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cartvox")]
#[command(about = "Streaming speech player for cartvox track packs")]
pub struct Cli {
    /// Config file to use instead of the one in the user config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a track pack in real time with a terminal status panel
    Play {
        /// Path to the .cvxp pack
        pack: PathBuf,
    },

    /// Run the engine headless and write its output to a WAV file
    Render {
        /// Path to the .cvxp pack
        pack: PathBuf,

        /// Output WAV path
        #[arg(long, short)]
        out: PathBuf,

        /// Number of ticks to run (default: one pass over every track)
        #[arg(long)]
        ticks: Option<u64>,

        /// TOML input script
        #[arg(long)]
        script: Option<PathBuf>,
    },

    /// Encode WAV files into a track pack
    Pack {
        /// Output .cvxp path
        out: PathBuf,

        /// Input WAV files, one track each, in playback order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Print the tracks in a pack
    List {
        /// Path to the .cvxp pack
        pack: PathBuf,
    },
}
