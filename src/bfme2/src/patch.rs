//! In-place field patching and variable-length insertion.
//!
//! Patching rewrites a fixed-size span without moving anything. Insertion
//! grows the file: a new buffer is built and swapped in atomically, then
//! every chunk and entry offset downstream of the splice point is
//! renumbered. Both operations either fully succeed or leave the buffer
//! byte-identical; there are no partial writes.

use thiserror::Error;

use crate::chunk::{Chunk, Label};
use crate::save::SaveGameFile;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    /// Replacement text does not fit the field's allocated span.
    #[error("new value is {actual} bytes, field allows at most {max}")]
    ValueTooLarge { max: usize, actual: usize },

    #[error("offset {offset} is outside the {len}-byte buffer")]
    OffsetOutOfRange { offset: usize, len: usize },

    /// The format stores edited fields as 8-bit ASCII only.
    #[error("value contains non-ASCII characters")]
    ValueNotAscii,

    /// Target chunk or entry has no backing bytes yet.
    #[error("target is not backed by written bytes")]
    NotWritten,

    #[error("no chunk at index {index}")]
    NoSuchChunk { index: usize },
}

/// Overwrite a fixed-size ASCII field in place.
///
/// `allocated` is the full field span including any terminator. The whole
/// span is zero-filled before the new bytes are copied in, so a shorter
/// value stays zero-terminated without extra bookkeeping.
pub fn patch_ascii(
    raw: &mut [u8],
    offset: usize,
    allocated: usize,
    value: &str,
) -> Result<(), PatchError> {
    if !value.is_ascii() {
        return Err(PatchError::ValueNotAscii);
    }

    let end = offset
        .checked_add(allocated)
        .filter(|&end| end <= raw.len())
        .ok_or(PatchError::OffsetOutOfRange {
            offset,
            len: raw.len(),
        })?;

    let bytes = value.as_bytes();
    if bytes.len() > allocated {
        return Err(PatchError::ValueTooLarge {
            max: allocated,
            actual: bytes.len(),
        });
    }

    let target = &mut raw[offset..end];
    target.fill(0);
    target[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

/// Splice a new zero-terminated ASCII field into the file at
/// `insert_offset`.
///
/// The buffer is rebuilt and replaced wholesale (a reader holding the old
/// buffer sees a consistent pre-edit snapshot), then every written chunk
/// and entry location at or past the splice point shifts by the payload
/// length. Returns the new field's offset.
pub fn insert_ascii_z(
    file: &mut SaveGameFile,
    insert_offset: usize,
    value: &str,
) -> Result<usize, PatchError> {
    if !value.is_ascii() {
        return Err(PatchError::ValueNotAscii);
    }
    if insert_offset > file.raw.len() {
        return Err(PatchError::OffsetOutOfRange {
            offset: insert_offset,
            len: file.raw.len(),
        });
    }

    let mut payload = Vec::with_capacity(value.len() + 1);
    payload.extend_from_slice(value.as_bytes());
    payload.push(0);
    let delta = payload.len();

    let mut grown = Vec::with_capacity(file.raw.len() + delta);
    grown.extend_from_slice(&file.raw[..insert_offset]);
    grown.extend_from_slice(&payload);
    grown.extend_from_slice(&file.raw[insert_offset..]);
    file.raw = grown;

    fixup_offsets(&mut file.chunks, insert_offset, delta);

    Ok(insert_offset)
}

/// Renumber every written location at or past `insert_offset` by `delta`.
///
/// Must run exactly once per insertion, before anything else relies on the
/// extracted offsets; it is the only thing keeping them valid once the
/// buffer has grown.
fn fixup_offsets(chunks: &mut [Chunk], insert_offset: usize, delta: usize) {
    for chunk in chunks.iter_mut() {
        chunk.location = chunk.location.shifted(insert_offset, delta);
        for entry in chunk.entries.iter_mut() {
            entry.location = entry.location.shifted(insert_offset, delta);
        }
    }
}

/// Byte offset where a new property for `owner` belongs inside `chunk`:
/// just past the last entry that is either the owner's marker or one of
/// its attributed properties. Falls back to the chunk's own start when no
/// entry matches (the marker entry itself qualifies in any well-formed
/// chunk, so the fallback should not fire in practice).
pub fn property_insert_offset(chunk: &Chunk, owner: &str) -> Result<usize, PatchError> {
    let mut best: Option<usize> = None;

    for entry in &chunk.entries {
        let marks_owner = entry.label == Label::Hero && entry.display_value == owner;
        let owned = entry.owner.as_ref().is_some_and(|o| o.name == owner);
        if !marks_owner && !owned {
            continue;
        }
        if let Some(offset) = entry.location.written() {
            let end = offset + entry.size;
            best = Some(best.map_or(end, |b| b.max(end)));
        }
    }

    match best {
        Some(offset) => Ok(offset),
        None => chunk.location.written().ok_or(PatchError::NotWritten),
    }
}
