//! CLI argument definitions for bfme2
//!
//! All clap-derived structs and enums for command parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bfme2")]
#[command(about = "Battle for Middle-earth II Save Editor", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the chunks of a save file
    #[command(visible_alias = "i")]
    Inspect {
        /// Path to .BfME2Campaign file
        input: PathBuf,
    },

    /// List the entries of one chunk
    #[command(visible_alias = "e")]
    Entries {
        /// Path to .BfME2Campaign file
        input: PathBuf,

        /// Chunk index or normalized identifier (e.g. "CHUNK_CampaignKOLB")
        chunk: String,

        /// Show a hex preview of each entry's bytes
        #[arg(long)]
        hex: bool,
    },

    /// Overwrite a fixed-size field in place
    Patch {
        /// Path to .BfME2Campaign file
        input: PathBuf,

        /// Absolute byte offset of the field
        offset: usize,

        /// Allocated size of the field in bytes (including terminator)
        size: usize,

        /// Replacement ASCII value
        value: String,

        /// Write to this path instead of editing in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Insert a new upgrade token under a hero
    AddUpgrade {
        /// Path to .BfME2Campaign file
        input: PathBuf,

        /// Chunk index or normalized identifier
        chunk: String,

        /// Hero display name the upgrade belongs to
        owner: String,

        /// Upgrade token to insert (e.g. "Upgrade_ElvenSword")
        upgrade: String,

        /// Write to this path instead of editing in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the parsed chunk model as JSON
    Export {
        /// Path to .BfME2Campaign file
        input: PathBuf,
    },
}
