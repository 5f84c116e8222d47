//! Fasta command implementation - export assembling-feature sequences

use anyhow::Result;
use clonodef_core::fasta::export_fasta_file;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::require_file;

pub fn execute(
    config: &Config,
    input: PathBuf,
    output: PathBuf,
    key_column: Option<String>,
    final_clonotypes: Option<PathBuf>,
) -> Result<()> {
    require_file(&input)?;
    if let Some(path) = &final_clonotypes {
        require_file(path)?;
    }

    let key_column = key_column.unwrap_or_else(|| config.fasta.key_column.clone());
    log::info!("Exporting {} keyed by {}", input.display(), key_column);

    let written = export_fasta_file(&input, &key_column, &output, final_clonotypes.as_deref())?;
    log::info!("Export completed: {} sequences", written);
    Ok(())
}
