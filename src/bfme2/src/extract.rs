//! String-heuristic entry extraction for generic chunks.
//!
//! Generic chunks interleave readable tokens with binary noise in no
//! documented order. The scanner walks the chunk byte by byte, trying a
//! UTF-16LE printable run first and an 8-bit ASCII run second; anything
//! that fails sanitation or validation advances the cursor a single byte.
//!
//! Tokens are classified on the fly: hero names establish an owner context
//! that following `Upgrade_` tokens are attributed to, until the next hero
//! appears. The hero test is a camel-case heuristic tuned against observed
//! saves; it has no schema to validate against.

use crate::chunk::{
    normalize_kolb_suffix, Entry, EntryKind, Label, Location, OwnerRef, CHUNK_MARKER, END_SENTINEL,
};
use crate::scan::is_printable;

/// Longest accepted token, in characters.
const MAX_TOKEN_LEN: usize = 512;

/// Shortest accepted token, in characters.
const MIN_TOKEN_LEN: usize = 4;

/// Prefix marking a property token attributed to the current owner.
const UPGRADE_PREFIX: &str = "Upgrade_";

/// Prefix marking a science (power) token.
pub(crate) const SCIENCE_PREFIX: &str = "SCIENCE_";

/// Case-insensitive prefix check that never slices across a char boundary.
pub(crate) fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

pub(crate) fn contains_ignore_case(s: &str, needle: &str) -> bool {
    s.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())
}

fn is_chunk_token(s: &str) -> bool {
    starts_with_ignore_case(s, CHUNK_MARKER)
}

/// Strip decoding artifacts from a raw token.
///
/// Chunk-style tokens keep only their leading `[A-Za-z0-9_]` run (dropping
/// trailing punctuation noise) and collapse the version suffix. Map-path
/// fragments lose the leading comma/space delimiters the binary stream
/// packs in front of them. Everything else is just trimmed.
pub fn sanitize_token(s: &str) -> String {
    let trimmed = s.trim();

    if is_chunk_token(trimmed) {
        let head: String = trimmed
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        return normalize_kolb_suffix(&head);
    }

    if starts_with_ignore_case(trimmed, ",maps\\") || starts_with_ignore_case(trimmed, ",maps/") {
        return trimmed.trim_start_matches([',', ' ']).to_string();
    }

    trimmed.to_string()
}

/// Accept or reject a sanitized token.
///
/// Chunk-style tokens must be pure `[A-Za-z0-9_]`. Other tokens may also
/// contain `\ / . -` and spaces, with at most one in four characters
/// outside that set - enough slack for minor decoding noise without
/// admitting garbage.
pub fn is_valid_ascii_run(s: &str) -> bool {
    if s.trim().is_empty() {
        return false;
    }
    if s.len() < MIN_TOKEN_LEN || s.len() > MAX_TOKEN_LEN {
        return false;
    }

    if is_chunk_token(s) {
        return s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    }

    let weird = s
        .chars()
        .filter(|&c| {
            !(c.is_ascii_alphanumeric() || matches!(c, '_' | '\\' | '/' | '.' | '-' | ' '))
        })
        .count();
    weird <= s.len() / 4
}

/// Camel-case owner heuristic.
///
/// `Fellowship*` and `Campaign*` tokens are always owners. Otherwise a
/// token qualifies when it has no underscore, is 6-64 chars, starts with a
/// letter, is purely alphanumeric, and carries at least two uppercase
/// letters (compound hero identifiers like `GandalfTheWhite`).
fn is_hero_owner(s: &str) -> bool {
    if s.trim().is_empty() {
        return false;
    }
    if starts_with_ignore_case(s, UPGRADE_PREFIX) || starts_with_ignore_case(s, SCIENCE_PREFIX) {
        return false;
    }
    if s.contains('\\') || s.contains('/') || contains_ignore_case(s, ".map") {
        return false;
    }
    if starts_with_ignore_case(s, "Fellowship") || starts_with_ignore_case(s, "Campaign") {
        return true;
    }

    if s.contains('_') {
        return false;
    }
    if s.len() < 6 || s.len() > 64 {
        return false;
    }
    if !s.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }

    s.chars().filter(|c| c.is_ascii_uppercase()).count() >= 2
}

fn is_property(s: &str) -> bool {
    starts_with_ignore_case(s, UPGRADE_PREFIX)
}

/// Best-effort role for a token that is neither an owner nor a property.
fn guess_label(value: &str) -> Label {
    if starts_with_ignore_case(value, "Fellowship") || starts_with_ignore_case(value, "Campaign") {
        return Label::Hero;
    }
    if starts_with_ignore_case(value, UPGRADE_PREFIX) {
        return Label::Upgrade;
    }
    if starts_with_ignore_case(value, SCIENCE_PREFIX) {
        return Label::Science;
    }
    if contains_ignore_case(value, ".map") {
        return Label::Map;
    }
    if contains_ignore_case(value, "maps\\") {
        return Label::Path;
    }
    Label::Text
}

/// A UTF-16LE printable run at an even offset: low byte printable, high
/// byte zero for every code unit, closed by a two-zero terminator.
/// Returns the decoded text and the byte span including the terminator.
fn try_utf16_run(raw: &[u8], i: usize, end: usize) -> Option<(String, usize)> {
    if i % 2 != 0 || i + 3 >= end {
        return None;
    }
    if !is_printable(raw[i]) || raw[i + 1] != 0 {
        return None;
    }

    let mut j = i;
    let mut chars = 0usize;
    while j + 1 < end {
        if raw[j + 1] != 0 || !is_printable(raw[j]) {
            break;
        }
        chars += 1;
        j += 2;
        if chars > MAX_TOKEN_LEN {
            break;
        }
    }

    let terminated = j + 1 < end && raw[j] == 0 && raw[j + 1] == 0;
    if chars < MIN_TOKEN_LEN || !terminated {
        return None;
    }

    let text: String = raw[i..j].iter().step_by(2).map(|&b| b as char).collect();
    Some((text, chars * 2 + 2))
}

/// An 8-bit printable run of at least four bytes. Returns the decoded
/// text, the byte span, and whether a zero terminator followed (the
/// terminator is part of the span when present).
fn try_ascii_run(raw: &[u8], i: usize, end: usize) -> Option<(String, usize, bool)> {
    if !is_printable(raw[i]) {
        return None;
    }

    let mut j = i;
    while j < end && is_printable(raw[j]) {
        j += 1;
    }
    let len = j - i;
    if len < MIN_TOKEN_LEN {
        return None;
    }

    let text: String = raw[i..j].iter().map(|&b| b as char).collect();
    let zero_terminated = j < end && raw[j] == 0;
    let size = if zero_terminated { len + 1 } else { len };
    Some((text, size, zero_terminated))
}

/// Owner context carried across one forward pass of a chunk.
#[derive(Default)]
struct OwnerState {
    current: Option<OwnerRef>,
    discovered: usize,
}

impl OwnerState {
    fn promote(&mut self, name: &str) {
        self.current = Some(OwnerRef {
            name: name.to_string(),
            index: self.discovered,
        });
        self.discovered += 1;
    }
}

/// Classify a validated token and build its entry. Returns `None` for the
/// end sentinel, which is consumed without producing an entry.
fn classify(
    token: &str,
    kind: EntryKind,
    offset: usize,
    size: usize,
    state: &mut OwnerState,
) -> Option<Entry> {
    if token.eq_ignore_ascii_case(END_SENTINEL) {
        return None;
    }

    if is_hero_owner(token) {
        state.promote(token);
        return Some(Entry {
            kind,
            label: Label::Hero,
            location: Location::Written(offset),
            size,
            display_value: token.to_string(),
            owner: None,
        });
    }

    let property = is_property(token);
    Some(Entry {
        kind,
        label: if property {
            Label::Upgrade
        } else {
            guess_label(token)
        },
        location: Location::Written(offset),
        size,
        display_value: token.to_string(),
        owner: if property { state.current.clone() } else { None },
    })
}

/// Extract entries from the chunk byte range `[start, end)`.
pub fn extract_entries(raw: &[u8], start: usize, end: usize) -> Vec<Entry> {
    let end = end.min(raw.len());
    let mut entries = Vec::new();
    let mut state = OwnerState::default();

    let mut i = start;
    while i < end {
        if let Some((text, size)) = try_utf16_run(raw, i, end) {
            let token = sanitize_token(&text);
            if !is_valid_ascii_run(&token) {
                i += 1;
                continue;
            }
            if let Some(entry) = classify(&token, EntryKind::Unknown, i, size, &mut state) {
                entries.push(entry);
            }
            i += size;
            continue;
        }

        if let Some((text, size, terminated)) = try_ascii_run(raw, i, end) {
            let token = sanitize_token(&text);
            if is_valid_ascii_run(&token) {
                let kind = if terminated {
                    EntryKind::AsciiZ
                } else {
                    EntryKind::Unknown
                };
                if let Some(entry) = classify(&token, kind, i, size, &mut state) {
                    entries.push(entry);
                }
                i += size;
                continue;
            }
        }

        i += 1;
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_chunk_token() {
        assert_eq!(
            sanitize_token("CHUNK_CampaignKOLBH'|"),
            "CHUNK_CampaignKOLB"
        );
        assert_eq!(sanitize_token("  plain token  "), "plain token");
    }

    #[test]
    fn test_sanitize_map_path_delimiters() {
        assert_eq!(
            sanitize_token(",maps\\map mp fords of isen"),
            "maps\\map mp fords of isen"
        );
        assert_eq!(sanitize_token(",maps/mp_harad"), "maps/mp_harad");
    }

    #[test]
    fn test_is_valid_ascii_run() {
        assert!(is_valid_ascii_run("GandalfTheWhite"));
        assert!(is_valid_ascii_run("maps\\map wor harad.map"));
        assert!(!is_valid_ascii_run("abc"));
        assert!(!is_valid_ascii_run("    "));
        // Chunk tokens must be pure identifier characters
        assert!(is_valid_ascii_run("CHUNK_AudioKOLB"));
        assert!(!is_valid_ascii_run("CHUNK_Audio KOLB"));
        // More than one in four characters outside the permitted set
        assert!(!is_valid_ascii_run("a!b?c!d?"));
    }

    #[test]
    fn test_hero_owner_heuristic() {
        assert!(is_hero_owner("GandalfTheWhite"));
        assert!(is_hero_owner("AragornElessar"));
        assert!(is_hero_owner("FellowshipTheRing"));
        assert!(is_hero_owner("Campaign01"));

        // One uppercase letter is not enough for the camel-case rule
        assert!(!is_hero_owner("Aragorn"));
        assert!(!is_hero_owner("Upgrade_Sword"));
        assert!(!is_hero_owner("SCIENCE_Heal"));
        assert!(!is_hero_owner("Gandalf_White"));
        assert!(!is_hero_owner("maps\\GandalfTheWhite"));
        assert!(!is_hero_owner("GandalfTheWhite.map"));
        assert!(!is_hero_owner("AbCde"));
    }

    #[test]
    fn test_guess_label() {
        assert_eq!(guess_label("FellowshipTheRing"), Label::Hero);
        assert_eq!(guess_label("SCIENCE_Heal"), Label::Science);
        assert_eq!(guess_label("map wor harad.map"), Label::Map);
        assert_eq!(guess_label("maps\\map wor harad"), Label::Path);
        assert_eq!(guess_label("miscellaneous"), Label::Text);
    }

    #[test]
    fn test_ownership_propagation() {
        let mut raw = Vec::new();
        raw.extend_from_slice(b"AragornElessar\0");
        raw.extend_from_slice(b"Upgrade_Sword\0");
        raw.extend_from_slice(b"LegolasGreenleaf\0");
        raw.extend_from_slice(b"Upgrade_Bow\0");

        let entries = extract_entries(&raw, 0, raw.len());
        assert_eq!(entries.len(), 4);

        assert_eq!(entries[0].label, Label::Hero);
        assert_eq!(entries[0].owner, None);

        assert_eq!(entries[1].label, Label::Upgrade);
        let owner = entries[1].owner.as_ref().unwrap();
        assert_eq!(owner.name, "AragornElessar");
        assert_eq!(owner.index, 0);

        assert_eq!(entries[2].label, Label::Hero);

        let owner = entries[3].owner.as_ref().unwrap();
        assert_eq!(owner.name, "LegolasGreenleaf");
        assert_eq!(owner.index, 1);
    }

    #[test]
    fn test_utf16_run_requires_terminator_and_even_offset() {
        // "Rohan" in UTF-16LE, two-zero terminated, at offset 0
        let raw = b"R\0o\0h\0a\0n\0\0\0tail";
        let entries = extract_entries(raw, 0, raw.len());
        assert_eq!(entries[0].display_value, "Rohan");
        assert_eq!(entries[0].size, 12);
        assert_eq!(entries[0].kind, EntryKind::Unknown);

        // Same run at an odd offset decodes nothing
        let mut odd = vec![0u8];
        odd.extend_from_slice(b"R\0o\0h\0a\0n\0\0\0");
        let entries = extract_entries(&odd, 0, odd.len());
        assert!(entries.is_empty());
    }

    #[test]
    fn test_unterminated_ascii_run_has_no_terminator_byte() {
        let raw = b"standalone";
        let entries = extract_entries(raw, 0, raw.len());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].size, raw.len());
        assert_eq!(entries[0].kind, EntryKind::Unknown);
    }

    #[test]
    fn test_end_sentinel_consumed_silently() {
        let mut raw = Vec::new();
        raw.extend_from_slice(b"AragornElessar\0");
        raw.extend_from_slice(b"SG_EOF\0");
        raw.extend_from_slice(b"LegolasGreenleaf\0");

        let entries = extract_entries(&raw, 0, raw.len());
        let values: Vec<&str> = entries.iter().map(|e| e.display_value.as_str()).collect();
        assert_eq!(values, vec!["AragornElessar", "LegolasGreenleaf"]);
    }

    #[test]
    fn test_scanner_skips_binary_noise() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&[0x01, 0xFF, 0x7F, 0x80]);
        raw.extend_from_slice(b"Upgrade_Bow\0");
        raw.extend_from_slice(&[0xFE, 0x02]);

        let entries = extract_entries(&raw, 0, raw.len());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_value, "Upgrade_Bow");
        assert_eq!(entries[0].location, Location::Written(4));
    }

    #[test]
    fn test_property_before_any_owner_has_no_owner() {
        let raw = b"Upgrade_Sword\0";
        let entries = extract_entries(raw, 0, raw.len());
        assert_eq!(entries[0].label, Label::Upgrade);
        assert_eq!(entries[0].owner, None);
    }
}
