//! Read-only inspection commands

use std::path::Path;

use anyhow::{Context, Result};
use bfme2::reference::chunk_title;
use bfme2::{Location, SaveGameFile};

use crate::file_io::read_save;

/// Handle `inspect`: one line per chunk.
pub fn inspect(input: &Path) -> Result<()> {
    let file = load(input)?;

    for (index, chunk) in file.chunks.iter().enumerate() {
        let title = chunk_title(&chunk.name);
        match chunk.location {
            Location::Written(offset) => println!(
                "[{index}] {} @0x{offset:X} ({} bytes, {} entries)  {title}",
                chunk.name,
                chunk.length,
                chunk.entries.len()
            ),
            Location::Pending => println!(
                "[{index}] {} (synthetic, {} entries)  {title}",
                chunk.name,
                chunk.entries.len()
            ),
        }
    }
    Ok(())
}

/// Handle `entries`: dump one chunk's decoded entries.
pub fn entries(input: &Path, selector: &str, hex: bool) -> Result<()> {
    let file = load(input)?;
    let (_, chunk) = super::resolve_chunk(&file, selector)?;

    println!("{chunk}  {}", chunk_title(&chunk.name));
    for entry in &chunk.entries {
        let offset = match entry.location {
            Location::Written(offset) => format!("0x{offset:X}"),
            Location::Pending => "pending".to_string(),
        };
        let owner = entry
            .owner
            .as_ref()
            .map(|o| format!("  [owner: {} #{}]", o.name, o.index))
            .unwrap_or_default();

        println!(
            "  {:<12} {:<10} @{offset:<10} {:>4}B  {}{owner}",
            entry.label.to_string(),
            format!("{:?}", entry.kind),
            entry.size,
            entry.display_value
        );
        if hex {
            println!("      {}", entry.hex_preview(&file.raw));
        }
    }
    Ok(())
}

/// Handle `export`: the full chunk model as JSON on stdout.
pub fn export(input: &Path) -> Result<()> {
    let file = load(input)?;
    let json =
        serde_json::to_string_pretty(&file.chunks).context("Failed to serialize chunk model")?;
    println!("{json}");
    Ok(())
}

fn load(input: &Path) -> Result<SaveGameFile> {
    let raw = read_save(input)?;
    SaveGameFile::parse(raw).context("Failed to parse save file")
}
