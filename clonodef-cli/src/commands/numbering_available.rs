//! Numbering-available command implementation

use anyhow::Result;
use clonodef_core::numbering::NumberingAvailabilityCache;
use clonodef_core::types::NUMBERING_SCHEMES;
use std::path::PathBuf;

use super::{load_snapshot, parse_anchor, print_json};

pub fn execute(snapshot: PathBuf, anchor: String) -> Result<()> {
    let pool = load_snapshot(&snapshot)?;
    let anchor = parse_anchor(&anchor)?;

    let available = NumberingAvailabilityCache::new().resolve(&pool, Some(&anchor));
    match available {
        Some(true) => log::info!("Numbering available, schemes: {}", NUMBERING_SCHEMES.join(", ")),
        Some(false) => log::info!("Numbering not available for {}", anchor),
        None => log::warn!("Dataset {} is not present in the snapshot", anchor),
    }
    print_json(&available)
}
