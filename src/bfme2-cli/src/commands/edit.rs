//! Editing commands: in-place patch and insertion

use std::path::Path;

use anyhow::{Context, Result};
use bfme2::{patch_ascii, SaveGameFile};

use crate::file_io::{read_save, write_save};

/// Handle `patch`: overwrite a fixed-size field and write the buffer back.
pub fn patch(
    input: &Path,
    offset: usize,
    size: usize,
    value: &str,
    output: Option<&Path>,
) -> Result<()> {
    let mut raw = read_save(input)?;

    patch_ascii(&mut raw, offset, size, value)
        .with_context(|| format!("Failed to patch {size}-byte field at 0x{offset:X}"))?;

    write_save(input, output, &raw)?;
    eprintln!("Patched field at 0x{offset:X}");
    Ok(())
}

/// Handle `add-upgrade`: insert a new property under a hero and write the
/// grown buffer back.
pub fn add_upgrade(
    input: &Path,
    selector: &str,
    owner: &str,
    upgrade: &str,
    output: Option<&Path>,
) -> Result<()> {
    let raw = read_save(input)?;
    let mut file = SaveGameFile::parse(raw).context("Failed to parse save file")?;

    let (index, _) = super::resolve_chunk(&file, selector)?;
    let offset = file
        .add_upgrade(index, owner, upgrade)
        .with_context(|| format!("Failed to insert {upgrade} under {owner}"))?;

    write_save(input, output, &file.raw)?;
    eprintln!("Inserted {upgrade} at 0x{offset:X}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_save() -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(b"ALAE2STR");
        raw.extend_from_slice(b"CHUNK_CampaignKOLBH\0");
        raw.extend_from_slice(b"GandalfTheWhite\0");
        raw.extend_from_slice(b"Upgrade_Staff\0");
        raw.extend_from_slice(b"SG_EOF\0\0");
        raw
    }

    #[test]
    fn test_patch_roundtrip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("test.BfME2Campaign");
        let output = dir.path().join("edited.BfME2Campaign");
        fs::write(&input, sample_save()).unwrap();

        // "Upgrade_Staff" starts right after the 15-char hero + terminator
        let offset = 8 + 20 + 16;
        patch(&input, offset, 14, "Upgrade_Sword", Some(&output)).unwrap();

        let edited = fs::read(&output).unwrap();
        let file = SaveGameFile::parse(edited).unwrap();
        let chunk = &file.chunks[file.chunk_index("CHUNK_CampaignKOLB").unwrap()];
        assert!(chunk
            .entries
            .iter()
            .any(|e| e.display_value == "Upgrade_Sword"));

        // The input file is untouched when an output path is given
        assert_eq!(fs::read(&input).unwrap(), sample_save());
    }

    #[test]
    fn test_add_upgrade_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("test.BfME2Campaign");
        fs::write(&input, sample_save()).unwrap();

        add_upgrade(
            &input,
            "CHUNK_CampaignKOLB",
            "GandalfTheWhite",
            "Upgrade_MountedGandalf",
            None,
        )
        .unwrap();

        let file = SaveGameFile::parse(fs::read(&input).unwrap()).unwrap();
        let chunk = &file.chunks[file.chunk_index("CHUNK_CampaignKOLB").unwrap()];
        let added = chunk
            .entries
            .iter()
            .find(|e| e.display_value == "Upgrade_MountedGandalf")
            .unwrap();
        assert_eq!(added.owner.as_ref().unwrap().name, "GandalfTheWhite");
    }

    #[test]
    fn test_patch_overflow_reports_max_length() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("test.BfME2Campaign");
        fs::write(&input, sample_save()).unwrap();

        let err = patch(&input, 8, 4, "far too long for four bytes", None).unwrap_err();
        assert!(err.root_cause().to_string().contains("at most 4"));
        // Failed patches never touch the file
        assert_eq!(fs::read(&input).unwrap(), sample_save());
    }
}
