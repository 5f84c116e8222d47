//! Numbering command implementation - per-region sequences from ANARCI output

use anyhow::Result;
use clonodef_core::regions::{build_numbering_table, NumberingRun};
use clonodef_core::NumberingScheme;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::require_file;

#[allow(clippy::too_many_arguments)]
pub fn execute(
    config: &Config,
    input: PathBuf,
    output: PathBuf,
    scheme: Option<NumberingScheme>,
    h_csv: Option<PathBuf>,
    kl_csv: Option<PathBuf>,
    cdr_mapping_h: Option<String>,
    cdr_mapping_kl: Option<String>,
) -> Result<()> {
    require_file(&input)?;
    let scheme = scheme.unwrap_or(config.numbering.scheme);
    log::info!("Building {} numbering table from {}", scheme, input.display());

    let run = NumberingRun {
        input_tsv: &input,
        scheme,
        h_csv: h_csv.as_deref(),
        kl_csv: kl_csv.as_deref(),
        cdr_mapping_h: cdr_mapping_h.as_deref(),
        cdr_mapping_kl: cdr_mapping_kl.as_deref(),
        out_tsv: &output,
    };
    let rows = build_numbering_table(&run)?;
    log::info!("Numbering table completed: {} clonotypes", rows);
    Ok(())
}
