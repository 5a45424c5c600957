//! # bfme2
//!
//! Battle for Middle-earth II save editor library - chunk extraction,
//! entry decoding, and byte-accurate patching.
//!
//! The `.BfME2Campaign` format is undocumented and versioned: chunk
//! boundaries, field types, and string encodings are inferred
//! heuristically from byte patterns. This library provides functionality
//! to:
//! - Locate and validate chunk boundaries in a raw save buffer
//! - Extract typed entries per chunk (heuristic strings or structured
//!   binary payload, depending on the chunk identifier)
//! - Attribute upgrade tokens to the hero that owns them
//! - Patch fixed-size fields in place and insert new zero-terminated
//!   fields with full offset renumbering
//!
//! ## Example
//!
//! ```no_run
//! use std::fs;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let raw = fs::read("Campaign1.BfME2Campaign")?;
//! let mut save = bfme2::SaveGameFile::parse(raw)?;
//!
//! for chunk in &save.chunks {
//!     println!("{chunk}");
//! }
//!
//! // Give a hero a new upgrade and write the file back
//! let idx = save.chunk_index("CHUNK_CampaignKOLB").ok_or("no campaign chunk")?;
//! save.add_upgrade(idx, "GandalfTheWhite", "Upgrade_MountedGandalf")?;
//! fs::write("Campaign1.BfME2Campaign", &save.raw)?;
//! # Ok(())
//! # }
//! ```

pub mod binary;
pub mod chunk;
pub mod extract;
pub mod patch;
pub mod reference;
pub mod save;
pub mod scan;

// Re-export commonly used items
#[doc(inline)]
pub use chunk::{Chunk, Entry, EntryKind, Label, Location, OwnerRef};
#[doc(inline)]
pub use patch::{insert_ascii_z, patch_ascii, PatchError};
#[doc(inline)]
pub use save::{ParseError, SaveGameFile, FILE_SIGNATURE};
