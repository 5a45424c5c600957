//! Display titles for known chunk identifiers.
//!
//! Frontends consult this table for labels only; parsing never depends on
//! it. Identifiers are the normalized forms, so one title covers every
//! game-version suffix variant.

/// A normalized chunk identifier with its display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkTitle {
    pub id: &'static str,
    pub title: &'static str,
}

/// All chunk identifiers with known meanings.
pub const CHUNK_TITLES: &[ChunkTitle] = &[
    ChunkTitle {
        id: "CHUNK_LivingWorldLogicKOLB",
        title: "World / Map State",
    },
    ChunkTitle {
        id: "CHUNK_GameStateMapKOLB",
        title: "World / Map State (Details)",
    },
    ChunkTitle {
        id: "CHUNK_GameStateKOLB",
        title: "Game State",
    },
    ChunkTitle {
        id: "CHUNK_GameLogicKOLB",
        title: "Game Logic",
    },
    ChunkTitle {
        id: "CHUNK_CampaignKOLB",
        title: "Campaign / Heroes",
    },
    ChunkTitle {
        id: "CHUNK_AudioKOLB",
        title: "Audio State",
    },
    ChunkTitle {
        id: "GLOBAL_SCIENCES",
        title: "Global Powers / Spells",
    },
];

/// Display title for a normalized chunk identifier, falling back to the
/// identifier itself.
pub fn chunk_title(id: &str) -> &str {
    CHUNK_TITLES
        .iter()
        .find(|c| c.id.eq_ignore_ascii_case(id))
        .map(|c| c.title)
        .unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_title_lookup() {
        assert_eq!(chunk_title("CHUNK_CampaignKOLB"), "Campaign / Heroes");
        assert_eq!(chunk_title("chunk_campaignkolb"), "Campaign / Heroes");
        assert_eq!(chunk_title("GLOBAL_SCIENCES"), "Global Powers / Spells");
        assert_eq!(chunk_title("CHUNK_UnknownKOLB"), "CHUNK_UnknownKOLB");
    }
}
