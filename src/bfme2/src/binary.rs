//! Structured binary-payload decoding for known fixed-layout chunks.
//!
//! A handful of chunk identifiers are known to carry structured binary
//! data between the chunk name and the end sentinel instead of freeform
//! strings. The decoder walks that payload left to right with a fixed
//! trial order; the order is load-bearing, since each successful trial
//! consumes bytes the later trials would interpret differently.

use byteorder::{ByteOrder, LittleEndian};

use crate::chunk::{Entry, EntryKind, Label, Location, END_SENTINEL};
use crate::extract::is_valid_ascii_run;
use crate::scan::{find_ascii, find_utf16le, is_printable, read_ascii_z};

/// Chunk identifiers with a structured binary payload. Exact
/// post-normalization matches only; this is a format-specific whitelist,
/// not a pattern.
pub const BINARY_PAYLOAD_CHUNKS: &[&str] = &[
    "CHUNK_LivingWorldLogicKOLB",
    "CHUNK_GameStateMapKOLB",
    "CHUNK_GameStateKOLB",
    "CHUNK_GameLogicKOLB",
    "CHUNK_AudioKOLB",
];

/// Longest chunk-name run scanned when locating the payload.
const NAME_SCAN_CAP: usize = 256;

/// Character-count bounds for a length-prefixed UTF-16LE string.
const UTF16_LEN_RANGE: std::ops::RangeInclusive<usize> = 4..=120;

/// Byte-count bounds for a length-prefixed ASCII string.
const ASCII_LEN_RANGE: std::ops::RangeInclusive<usize> = 4..=80;

pub fn is_binary_payload_chunk(name: &str) -> bool {
    BINARY_PAYLOAD_CHUNKS
        .iter()
        .any(|id| id.eq_ignore_ascii_case(name))
}

/// Payload range of a binary chunk: the bytes between the zero-terminated
/// chunk name and the nearest end sentinel in either encoding. `None` when
/// the name does not terminate, no sentinel is found, or the range is
/// empty.
fn payload_range(raw: &[u8], chunk_start: usize, chunk_end: usize) -> Option<(usize, usize)> {
    let name = read_ascii_z(raw, chunk_start, NAME_SCAN_CAP);
    if name.is_empty() || name.len() >= NAME_SCAN_CAP {
        return None;
    }
    let terminator = chunk_start + name.len();
    if raw.get(terminator) != Some(&0) {
        return None;
    }

    let payload_start = terminator + 1;
    if payload_start >= chunk_end {
        return None;
    }

    let narrow = find_ascii(raw, END_SENTINEL, payload_start).filter(|&i| i <= chunk_end);
    let wide = find_utf16le(raw, END_SENTINEL, payload_start).filter(|&i| i <= chunk_end);
    let payload_end = match (narrow, wide) {
        (Some(a), Some(w)) => a.min(w),
        (Some(a), None) => a,
        (None, Some(w)) => w,
        (None, None) => return None,
    };

    (payload_start < payload_end).then_some((payload_start, payload_end))
}

/// A length-prefixed UTF-16LE string: one count byte, then `count` code
/// units of (printable low, zero high).
fn try_len_prefixed_utf16(raw: &[u8], i: usize, end: usize) -> Option<(String, usize)> {
    let count = raw[i] as usize;
    if !UTF16_LEN_RANGE.contains(&count) {
        return None;
    }
    let size = 1 + count * 2;
    if i + size > end {
        return None;
    }

    let mut text = String::with_capacity(count);
    for pair in raw[i + 1..i + size].chunks_exact(2) {
        if pair[1] != 0 || !is_printable(pair[0]) {
            return None;
        }
        text.push(pair[0] as char);
    }

    is_valid_ascii_run(&text).then_some((text, size))
}

/// A length-prefixed ASCII string: one count byte, then `count` printable
/// bytes.
fn try_len_prefixed_ascii(raw: &[u8], i: usize, end: usize) -> Option<(String, usize)> {
    let count = raw[i] as usize;
    if !ASCII_LEN_RANGE.contains(&count) {
        return None;
    }
    let size = 1 + count;
    if i + size > end {
        return None;
    }

    let body = &raw[i + 1..i + size];
    if !body.iter().all(|&b| is_printable(b)) {
        return None;
    }

    let text: String = body.iter().map(|&b| b as char).collect();
    is_valid_ascii_run(&text).then_some((text, size))
}

/// A zero-terminated ASCII string: a printable run of at least four bytes
/// immediately followed by a zero byte.
fn try_ascii_z(raw: &[u8], i: usize, end: usize) -> Option<(String, usize)> {
    if !is_printable(raw[i]) {
        return None;
    }

    let mut j = i;
    while j < end && is_printable(raw[j]) {
        j += 1;
    }
    let len = j - i;
    if len < 4 || j >= end || raw[j] != 0 {
        return None;
    }

    let text: String = raw[i..j].iter().map(|&b| b as char).collect();
    is_valid_ascii_run(&text).then_some((text, len + 1))
}

/// Render a 4-byte little-endian word under all three interpretations.
///
/// The float reading wins when its bit pattern is finite and of plausible
/// magnitude; the `0`, `1` and `1.0f` patterns get literal annotations
/// since they dominate real payloads.
fn render_word(bytes: &[u8]) -> (EntryKind, String) {
    let unsigned = LittleEndian::read_u32(bytes);
    let signed = unsigned as i32;
    let float = f32::from_bits(unsigned);

    match unsigned {
        0x0000_0000 => return (EntryKind::U32, "false (0x00000000)".to_string()),
        0x0000_0001 => return (EntryKind::U32, "true (0x00000001)".to_string()),
        0x3F80_0000 => return (EntryKind::F32, "1.0f (0x3F800000)".to_string()),
        _ => {}
    }

    if float.is_finite() && (1e-6..=1e6).contains(&float.abs()) {
        return (
            EntryKind::F32,
            format!("{float} (u32 {unsigned} / i32 {signed})"),
        );
    }

    if signed < 0 {
        (
            EntryKind::I32,
            format!("0x{unsigned:08X} ({unsigned} / {signed})"),
        )
    } else {
        (EntryKind::U32, format!("0x{unsigned:08X} ({unsigned})"))
    }
}

/// Decode the structured payload of the chunk at `[chunk_start, chunk_end)`.
///
/// Trial order per position: length-prefixed UTF-16LE, length-prefixed
/// ASCII, zero-terminated ASCII, 4-byte word, raw byte. The three string
/// forms share one label counter; words and bytes each have their own, all
/// reset per chunk.
pub fn extract_binary_entries(raw: &[u8], chunk_start: usize, chunk_end: usize) -> Vec<Entry> {
    let chunk_end = chunk_end.min(raw.len());
    let Some((start, end)) = payload_range(raw, chunk_start, chunk_end) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    let mut string_index = 0usize;
    let mut word_index = 0usize;
    let mut byte_index = 0usize;

    let push = |entries: &mut Vec<Entry>, kind, tag: String, offset, size, value: String| {
        entries.push(Entry {
            kind,
            label: Label::Field(tag),
            location: Location::Written(offset),
            size,
            display_value: value,
            owner: None,
        });
    };

    let mut i = start;
    while i < end {
        if let Some((text, size)) = try_len_prefixed_utf16(raw, i, end) {
            push(
                &mut entries,
                EntryKind::Utf16Len8,
                format!("String_{string_index}"),
                i,
                size,
                text,
            );
            string_index += 1;
            i += size;
            continue;
        }

        if let Some((text, size)) = try_len_prefixed_ascii(raw, i, end) {
            push(
                &mut entries,
                EntryKind::AsciiLen8,
                format!("String_{string_index}"),
                i,
                size,
                text,
            );
            string_index += 1;
            i += size;
            continue;
        }

        if let Some((text, size)) = try_ascii_z(raw, i, end) {
            push(
                &mut entries,
                EntryKind::AsciiZ,
                format!("String_{string_index}"),
                i,
                size,
                text,
            );
            string_index += 1;
            i += size;
            continue;
        }

        if i + 4 <= end {
            let (kind, text) = render_word(&raw[i..i + 4]);
            push(
                &mut entries,
                kind,
                format!("W32_{word_index}"),
                i,
                4,
                text,
            );
            word_index += 1;
            i += 4;
            continue;
        }

        let b = raw[i];
        push(
            &mut entries,
            EntryKind::Byte,
            format!("B_{byte_index}"),
            i,
            1,
            format!("0x{b:02X} ({b})"),
        );
        byte_index += 1;
        i += 1;
    }

    entries
}
