mod cli;
mod commands;
mod file_io;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { input } => commands::inspect::inspect(&input),

        Commands::Entries { input, chunk, hex } => {
            commands::inspect::entries(&input, &chunk, hex)
        }

        Commands::Patch {
            input,
            offset,
            size,
            value,
            output,
        } => commands::edit::patch(&input, offset, size, &value, output.as_deref()),

        Commands::AddUpgrade {
            input,
            chunk,
            owner,
            upgrade,
            output,
        } => commands::edit::add_upgrade(&input, &chunk, &owner, &upgrade, output.as_deref()),

        Commands::Export { input } => commands::inspect::export(&input),
    }
}
