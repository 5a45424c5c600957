//! Save file parsing, querying, and editing.
//!
//! A [`SaveGameFile`] owns the byte-exact file contents plus the chunk
//! model extracted from them. All entry offsets index into that buffer and
//! stay valid across in-place patches; insertions replace the buffer and
//! renumber the model in the same call.

use std::collections::HashSet;

use log::{debug, warn};
use thiserror::Error;

use crate::binary::{extract_binary_entries, is_binary_payload_chunk};
use crate::chunk::{
    chunk_end, locate_chunk_starts, normalize_chunk_name, Chunk, Entry, EntryKind, Label, Location,
    OwnerRef, GLOBAL_SCIENCES,
};
use crate::extract::{extract_entries, starts_with_ignore_case, SCIENCE_PREFIX};
use crate::patch::{insert_ascii_z, patch_ascii, property_insert_offset, PatchError};
use crate::scan::starts_with_ascii;

/// 8-byte signature the format is expected to begin with. Checked but not
/// enforced; files written by other game versions may differ and still
/// parse.
pub const FILE_SIGNATURE: &str = "ALAE2STR";

/// Smallest buffer worth parsing: the signature header.
const MIN_FILE_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Fatal: the buffer cannot even hold the 8-byte header.
    #[error("file is {len} bytes, smaller than the 8-byte header")]
    FileTooSmall { len: usize },
}

/// A loaded save file: raw bytes plus the structured chunk model.
#[derive(Debug)]
pub struct SaveGameFile {
    /// Byte-exact file contents. Mutated in place by patches, replaced
    /// wholesale by insertions.
    pub raw: Vec<u8>,
    /// Chunks in ascending offset order. A synthetic science chunk may be
    /// prepended; it is not backed by a contiguous byte range.
    pub chunks: Vec<Chunk>,
}

impl SaveGameFile {
    /// Parse a raw save buffer into the chunk model.
    pub fn parse(raw: Vec<u8>) -> Result<SaveGameFile, ParseError> {
        if raw.len() < MIN_FILE_LEN {
            return Err(ParseError::FileTooSmall { len: raw.len() });
        }

        if !starts_with_ascii(&raw, 0, FILE_SIGNATURE) {
            warn!("signature mismatch, expected {FILE_SIGNATURE:?}; parsing anyway");
        }

        let starts = locate_chunk_starts(&raw);
        debug!("located {} validated chunk starts", starts.len());

        let mut chunks = Vec::with_capacity(starts.len() + 1);
        for (i, start) in starts.iter().enumerate() {
            let next = starts.get(i + 1).map_or(raw.len(), |n| n.offset);
            let end = chunk_end(&raw, start.offset, next);

            let mut name = normalize_chunk_name(&start.token);
            if name.trim().is_empty() {
                name = format!("CHUNK_?@0x{:X}", start.offset);
                warn!("chunk at 0x{:X} has no readable name, using {name}", start.offset);
            }

            let entries = if is_binary_payload_chunk(&name) {
                extract_binary_entries(&raw, start.offset, end)
            } else {
                extract_entries(&raw, start.offset, end)
            };
            debug!("{name}: {} entries in [0x{:X}, 0x{end:X})", entries.len(), start.offset);

            chunks.push(Chunk {
                name,
                location: Location::Written(start.offset),
                length: end - start.offset,
                entries,
            });
        }

        // A stale aggregation chunk from an earlier pass must not feed the
        // new one.
        chunks.retain(|c| !c.name.eq_ignore_ascii_case(GLOBAL_SCIENCES));

        let sciences = build_sciences_chunk(&chunks);
        if !sciences.entries.is_empty() {
            chunks.insert(0, sciences);
        }

        Ok(SaveGameFile { raw, chunks })
    }

    /// Index of the chunk with the given normalized identifier.
    pub fn chunk_index(&self, name: &str) -> Option<usize> {
        self.chunks
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Patch the fixed-size field at `offset` and refresh the display
    /// value of every entry backed by exactly that span.
    pub fn patch_field(
        &mut self,
        offset: usize,
        allocated: usize,
        value: &str,
    ) -> Result<(), PatchError> {
        patch_ascii(&mut self.raw, offset, allocated, value)?;

        for chunk in &mut self.chunks {
            for entry in &mut chunk.entries {
                if entry.location == Location::Written(offset) && entry.size == allocated {
                    entry.display_value = value.to_string();
                }
            }
        }
        Ok(())
    }

    /// Insert a new upgrade token under `owner` in the chunk at `chunk`.
    ///
    /// The new zero-terminated field lands just past the owner's marker
    /// and existing properties; every downstream offset is renumbered and
    /// the new entry is appended to the chunk's entry list. Returns the
    /// new entry's offset.
    pub fn add_upgrade(
        &mut self,
        chunk: usize,
        owner: &str,
        value: &str,
    ) -> Result<usize, PatchError> {
        let (insert_at, owner_ref) = {
            let target = self
                .chunks
                .get(chunk)
                .ok_or(PatchError::NoSuchChunk { index: chunk })?;
            let insert_at = property_insert_offset(target, owner)?;
            let owner_ref = owner_index(target, owner).map(|index| OwnerRef {
                name: owner.to_string(),
                index,
            });
            (insert_at, owner_ref)
        };

        let offset = insert_ascii_z(self, insert_at, value)?;

        self.chunks[chunk].entries.push(Entry {
            kind: EntryKind::AsciiZ,
            label: Label::Upgrade,
            location: Location::Written(offset),
            size: value.len() + 1,
            display_value: value.to_string(),
            owner: owner_ref,
        });
        Ok(offset)
    }
}

/// The owner's discovery sequence number within `chunk`: its position
/// among the hero markers, or the index an existing property already
/// recorded for it.
fn owner_index(chunk: &Chunk, owner: &str) -> Option<usize> {
    let mut heroes = 0;
    for entry in &chunk.entries {
        if entry.label == Label::Hero {
            if entry.display_value == owner {
                return Some(heroes);
            }
            heroes += 1;
        }
        if let Some(o) = &entry.owner {
            if o.name == owner {
                return Some(o.index);
            }
        }
    }
    None
}

/// Collect every science token scattered across the real chunks into one
/// synthetic chunk, deduplicated by source offset (overlapping heuristics
/// can discover the same value twice).
fn build_sciences_chunk(chunks: &[Chunk]) -> Chunk {
    let mut entries: Vec<Entry> = Vec::new();
    let mut seen = HashSet::new();

    for chunk in chunks {
        if chunk.name.eq_ignore_ascii_case(GLOBAL_SCIENCES) {
            continue;
        }
        for entry in &chunk.entries {
            if !starts_with_ignore_case(&entry.display_value, SCIENCE_PREFIX) {
                continue;
            }
            let Some(offset) = entry.location.written() else {
                continue;
            };
            if !seen.insert(offset) {
                continue;
            }
            entries.push(Entry {
                kind: entry.kind,
                label: Label::Science,
                location: entry.location,
                size: entry.size,
                display_value: entry.display_value.clone(),
                owner: None,
            });
        }
    }

    Chunk {
        name: GLOBAL_SCIENCES.to_string(),
        location: Location::Pending,
        length: entries.len(),
        entries,
    }
}
