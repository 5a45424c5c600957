//! File read/write helpers
//!
//! All persistent storage interaction lives here; the library only ever
//! sees byte buffers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Read a save file into memory.
pub fn read_save(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write the mutated buffer back, either in place or to `output`.
pub fn write_save(input: &Path, output: Option<&Path>, raw: &[u8]) -> Result<()> {
    let target = output.unwrap_or(input);
    fs::write(target, raw).with_context(|| format!("Failed to write {}", target.display()))?;
    eprintln!("Wrote {} bytes to {}", raw.len(), target.display());
    Ok(())
}
