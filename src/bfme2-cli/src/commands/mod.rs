//! Command handlers

pub mod edit;
pub mod inspect;

use anyhow::{Context, Result};
use bfme2::{Chunk, SaveGameFile};

/// Resolve a chunk selector that is either a list index or a normalized
/// identifier.
pub fn resolve_chunk<'a>(file: &'a SaveGameFile, selector: &str) -> Result<(usize, &'a Chunk)> {
    if let Ok(index) = selector.parse::<usize>() {
        let chunk = file
            .chunks
            .get(index)
            .with_context(|| format!("no chunk at index {index}"))?;
        return Ok((index, chunk));
    }

    let index = file
        .chunk_index(selector)
        .with_context(|| format!("no chunk named {selector}"))?;
    Ok((index, &file.chunks[index]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SaveGameFile {
        let mut raw = Vec::new();
        raw.extend_from_slice(b"ALAE2STR");
        raw.extend_from_slice(b"CHUNK_CampaignKOLBH\0");
        raw.extend_from_slice(b"GandalfTheWhite\0");
        raw.extend_from_slice(b"SG_EOF\0\0");
        SaveGameFile::parse(raw).unwrap()
    }

    #[test]
    fn test_resolve_chunk_by_index_and_name() {
        let file = sample();
        let (index, chunk) = resolve_chunk(&file, "0").unwrap();
        assert_eq!(index, 0);
        assert_eq!(chunk.name, "CHUNK_CampaignKOLB");

        let (by_name, _) = resolve_chunk(&file, "chunk_campaignkolb").unwrap();
        assert_eq!(by_name, 0);

        assert!(resolve_chunk(&file, "5").is_err());
        assert!(resolve_chunk(&file, "CHUNK_NopeKOLB").is_err());
    }
}
