//! Command implementations for the clonodef CLI

pub mod example_config;
pub mod fasta;
pub mod label;
pub mod numbering;
pub mod numbering_available;
pub mod options;
pub mod outputs;
pub mod stats;

use anyhow::{Context, Result};
use clonodef_core::{PlRef, SnapshotPool};
use serde::Serialize;
use std::path::Path;

use crate::error::{require_file, CliError};

pub(crate) fn load_snapshot(path: &Path) -> Result<SnapshotPool> {
    require_file(path)?;
    let pool = SnapshotPool::from_file(path).map_err(CliError::from)?;
    log::info!("Loaded {} published columns from {}", pool.columns.len(), path.display());
    Ok(pool)
}

pub(crate) fn parse_anchor(raw: &str) -> Result<PlRef> {
    Ok(raw.parse::<PlRef>().map_err(CliError::validation)?)
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}
