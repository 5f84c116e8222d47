//! Stats command implementation - parse a clonotype count report

use anyhow::{Context, Result};
use clonodef_core::stats::{try_parse_stats, StatsError};
use std::path::PathBuf;

use super::print_json;
use crate::error::{require_file, CliError};

pub fn execute(input: PathBuf) -> Result<()> {
    require_file(&input)?;
    let text = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read stats report: {}", input.display()))?;

    match try_parse_stats(&text) {
        Ok(record) => print_json(&record),
        Err(StatsError::Empty) => {
            log::warn!("Stats report {} is empty", input.display());
            print_json(&serde_json::Value::Null)
        }
        Err(e) => Err(CliError::parse(input.display().to_string(), e.to_string()).into()),
    }
}
