//! Options command implementation - list selectable datasets and columns

use anyhow::Result;
use clonodef_core::options::{resolve_clonotype_definition_options, resolve_dataset_options};
use serde_json::json;
use std::path::PathBuf;

use super::{load_snapshot, parse_anchor, print_json};

pub fn execute(snapshot: PathBuf, anchor: Option<String>) -> Result<()> {
    let pool = load_snapshot(&snapshot)?;
    let anchor = anchor.as_deref().map(parse_anchor).transpose()?;

    let datasets = resolve_dataset_options(&pool);
    log::info!("Found {} datasets", datasets.len());

    let definitions = resolve_clonotype_definition_options(&pool, anchor.as_ref());
    if let (Some(anchor), None) = (&anchor, &definitions) {
        log::warn!("Dataset {} is not present in the snapshot", anchor);
    }

    print_json(&json!({
        "datasetOptions": datasets,
        "clonotypeDefinitionOptions": definitions,
    }))
}
