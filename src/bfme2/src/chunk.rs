//! Chunk and entry model, plus chunk boundary location.
//!
//! A save file is a sequence of named chunks. Each chunk starts with a
//! `CHUNK_` marker token and usually closes with an `SG_EOF` sentinel that
//! may be stored either as 8-bit ASCII or as UTF-16LE. Neither boundary is
//! guaranteed: markers can be missing or mangled in files written by other
//! game versions, so location is validate-and-fall-back throughout.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::scan::{find_ascii, find_utf16le};

/// Marker token every chunk starts with.
pub const CHUNK_MARKER: &str = "CHUNK_";

/// Sentinel closing a chunk's payload, in either encoding.
pub const END_SENTINEL: &str = "SG_EOF";

/// Identifier of the synthetic science aggregation chunk.
pub const GLOBAL_SCIENCES: &str = "GLOBAL_SCIENCES";

/// Shortest token accepted as a real chunk marker. Incidental `CHUNK_`
/// byte runs inside binary payloads are almost always shorter.
const MIN_CHUNK_TOKEN_LEN: usize = 10;

/// Longest chunk-name run read at a chunk start.
const CHUNK_NAME_SCAN_CAP: usize = 128;

/// Where a chunk or entry lives relative to the raw buffer.
///
/// `Pending` marks objects created in memory that are not yet backed by
/// bytes; arithmetic and fixup only ever touch `Written` locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Location {
    /// Created in memory, no backing bytes yet.
    Pending,
    /// Absolute byte offset into the raw buffer.
    Written(usize),
}

impl Location {
    /// The absolute offset, or `None` for a pending object.
    pub fn written(self) -> Option<usize> {
        match self {
            Location::Written(offset) => Some(offset),
            Location::Pending => None,
        }
    }

    /// Shift a written location at or past `at` forward by `delta`.
    pub(crate) fn shifted(self, at: usize, delta: usize) -> Location {
        match self {
            Location::Written(offset) if offset >= at => Location::Written(offset + delta),
            other => other,
        }
    }
}

/// Decoded field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    /// Zero-terminated ASCII string.
    AsciiZ,
    /// ASCII string with a one-byte length prefix.
    AsciiLen8,
    /// UTF-16LE string with a one-byte character-count prefix.
    Utf16Len8,
    U32,
    I32,
    /// Seen in fields that other game versions store as 16-bit counters.
    U16,
    F32,
    Byte,
    Unknown,
}

/// Role tag attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Label {
    Hero,
    Upgrade,
    Science,
    Map,
    Path,
    /// Generic string with no recognized role.
    Text,
    /// Synthetic per-kind tag from the binary-payload decoder (`W32_3`, ...).
    Field(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Hero => f.write_str("Hero"),
            Label::Upgrade => f.write_str("Upgrade"),
            Label::Science => f.write_str("Science"),
            Label::Map => f.write_str("Map"),
            Label::Path => f.write_str("Path"),
            Label::Text => f.write_str("String"),
            Label::Field(tag) => f.write_str(tag),
        }
    }
}

/// Back-reference from a property entry to the owner it was attributed to.
///
/// Carries the owner's display string by value. This is a lookup key, not a
/// relation into the entry list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerRef {
    pub name: String,
    /// Discovery sequence number of the owner within its chunk.
    pub index: usize,
}

/// One decoded field inside a chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub kind: EntryKind,
    pub label: Label,
    pub location: Location,
    /// Byte span including any terminator or length-prefix byte.
    pub size: usize,
    /// Human-readable decoded value.
    pub display_value: String,
    pub owner: Option<OwnerRef>,
}

impl Entry {
    /// The first `min(32, size)` bytes of the entry's span as spaced
    /// uppercase hex pairs, or an empty string for a pending entry.
    pub fn hex_preview(&self, raw: &[u8]) -> String {
        let Some(offset) = self.location.written() else {
            return String::new();
        };
        let end = offset.saturating_add(self.size.min(32)).min(raw.len());
        let bytes = raw.get(offset..end).unwrap_or(&[]);
        hex::encode_upper(bytes)
            .as_bytes()
            .chunks(2)
            .filter_map(|pair| std::str::from_utf8(pair).ok())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A named byte range of the save file with its decoded entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    /// Normalized identifier, stable across game-version suffix variants.
    pub name: String,
    pub location: Location,
    /// Byte length of the chunk region; entry count for a synthetic chunk.
    pub length: usize,
    /// Entries in ascending scan order; entries created in memory are
    /// appended at the end until an insertion gives them a real offset.
    pub entries: Vec<Entry>,
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Location::Written(offset) => {
                write!(f, "{} @0x{:X} ({} bytes)", self.name, offset, self.length)
            }
            Location::Pending => write!(f, "{} (synthetic, {} entries)", self.name, self.length),
        }
    }
}

/// A validated chunk start: marker offset plus the raw token found there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkStart {
    pub offset: usize,
    pub token: String,
}

#[inline]
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Maximal run of `[A-Za-z0-9_]` bytes starting at `offset`.
pub(crate) fn read_token(data: &[u8], offset: usize) -> String {
    data.get(offset..)
        .unwrap_or(&[])
        .iter()
        .take(CHUNK_NAME_SCAN_CAP)
        .take_while(|&&b| is_token_byte(b))
        .map(|&b| b as char)
        .collect()
}

/// Accept a marker hit as a real chunk start only if the token carries the
/// `KOLB` family tag and is long enough to be a plausible identifier.
fn is_valid_chunk_token(token: &str) -> bool {
    token.len() >= MIN_CHUNK_TOKEN_LEN && token.to_ascii_uppercase().contains("KOLB")
}

/// Find every validated chunk start, in ascending offset order with exact
/// duplicates removed.
pub fn locate_chunk_starts(raw: &[u8]) -> Vec<ChunkStart> {
    let mut starts = Vec::new();
    let mut cursor = 0;

    while let Some(hit) = find_ascii(raw, CHUNK_MARKER, cursor) {
        let token = read_token(raw, hit);
        if is_valid_chunk_token(&token) {
            starts.push(ChunkStart { offset: hit, token });
        }
        cursor = hit + CHUNK_MARKER.len();
    }

    starts.sort_by_key(|s| s.offset);
    starts.dedup_by_key(|s| s.offset);
    starts
}

/// End offset for a chunk starting at `start`, bounded by `next` (the next
/// validated start, or the buffer end).
///
/// The sentinel is searched in both encodings and the earliest hit wins;
/// the end lands just past the marker and any run of zero padding. A chunk
/// with no sentinel simply runs to `next`.
pub fn chunk_end(raw: &[u8], start: usize, next: usize) -> usize {
    let narrow = find_ascii(raw, END_SENTINEL, start).filter(|&i| i < next);
    let wide = find_utf16le(raw, END_SENTINEL, start).filter(|&i| i < next);

    let hit = match (narrow, wide) {
        (Some(a), Some(w)) if w < a => Some((w, END_SENTINEL.len() * 2)),
        (Some(a), _) => Some((a, END_SENTINEL.len())),
        (None, Some(w)) => Some((w, END_SENTINEL.len() * 2)),
        (None, None) => None,
    };

    match hit {
        Some((pos, marker_len)) => {
            let mut end = pos + marker_len;
            while end < next && raw.get(end) == Some(&0) {
                end += 1;
            }
            end.min(next)
        }
        None => {
            debug!("no end sentinel for chunk at 0x{start:X}, running to 0x{next:X}");
            next
        }
    }
}

/// Collapse a one-letter game-version suffix: a single trailing alphabetic
/// character immediately after a terminal `KOLB` is stripped, so e.g.
/// `CHUNK_CampaignKOLBH` and `CHUNK_CampaignKOLBE` share one identifier.
pub(crate) fn normalize_kolb_suffix(name: &str) -> String {
    let upper = name.to_ascii_uppercase();
    if let Some(idx) = upper.rfind("KOLB") {
        if idx + 4 == name.len() - 1 {
            let last = name.as_bytes()[name.len() - 1];
            if last.is_ascii_alphabetic() {
                return name[..name.len() - 1].to_string();
            }
        }
    }
    name.to_string()
}

/// Normalize a raw chunk-start token into the canonical identifier: keep
/// the leading `[A-Za-z0-9_]` run, then collapse the version suffix.
pub(crate) fn normalize_chunk_name(token: &str) -> String {
    let trimmed = token.trim();
    let head: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    normalize_kolb_suffix(&head)
}
