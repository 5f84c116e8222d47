//! Outputs command implementation - evaluate the whole block model
//!
//! Mirrors one reactive evaluation of the block: resolves every output,
//! synchronises the default label with the resolved column labels and
//! reports the presentation metadata next to the outputs.

use anyhow::{Context, Result};
use clonodef_core::model::{BlockModel, Section, UiState, STATS_OUTPUT};
use clonodef_core::{BlockArgs, BlockOutputs, StaticEngineOutputs};
use serde::Serialize;
use std::path::PathBuf;

use super::{load_snapshot, parse_anchor, print_json};
use crate::config::Config;
use crate::error::{require_file, CliError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    args: &'a BlockArgs,
    is_valid: bool,
    title: &'a str,
    subtitle: &'a str,
    progress: bool,
    sections: Vec<Section>,
    outputs: &'a BlockOutputs,
}

fn load_args(path: Option<PathBuf>) -> Result<BlockArgs> {
    let Some(path) = path else {
        return Ok(BlockArgs::default());
    };
    require_file(&path)?;
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read block arguments: {}", path.display()))?;
    let args: BlockArgs = serde_json::from_str(&text)
        .map_err(|e| CliError::parse(path.display().to_string(), e.to_string()))?;
    Ok(args)
}

fn engine_state(stats: Option<PathBuf>, running: bool) -> Result<StaticEngineOutputs> {
    let mut engine = if running {
        StaticEngineOutputs::running()
    } else {
        StaticEngineOutputs::finished()
    };
    if let Some(path) = stats {
        require_file(&path)?;
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read stats report: {}", path.display()))?;
        engine = engine.with_artifact(STATS_OUTPUT, text);
    }
    Ok(engine)
}

pub fn execute(
    config: &Config,
    snapshot: PathBuf,
    args: Option<PathBuf>,
    anchor: Option<String>,
    stats: Option<PathBuf>,
    running: bool,
) -> Result<()> {
    let pool = load_snapshot(&snapshot)?;

    let mut args = load_args(args)?;
    if let Some(anchor) = anchor {
        args.anchor_ref = Some(parse_anchor(&anchor)?);
    }

    let ui_state = UiState {
        title: config.block.title.clone(),
    };
    let mut model = BlockModel::with_args(args).with_ui_state(ui_state);
    let engine = engine_state(stats, running)?;

    let outputs = model.outputs(&pool, Some(&engine));
    if model.sync_default_label(outputs.clonotype_definition_options.as_deref()) {
        log::info!("Default block label set to {:?}", model.args().default_block_label);
    }
    if !model.is_valid() {
        log::warn!("Block arguments are not valid yet: choose a dataset and at least one column");
    }

    print_json(&Report {
        args: model.args(),
        is_valid: model.is_valid(),
        title: model.title(),
        subtitle: model.subtitle(),
        progress: model.progress(Some(&engine)),
        sections: model.sections(),
        outputs: &outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clonodef_core::EngineOutputs;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_args_file_means_defaults() {
        assert_eq!(load_args(None).unwrap(), BlockArgs::default());
    }

    #[test]
    fn test_args_file_is_parsed() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, r#"{{"anchorRef": {{"blockId": "b", "name": "n"}}, "customBlockLabel": "Mine"}}"#).unwrap();
        let args = load_args(Some(f.path().to_path_buf())).unwrap();
        assert_eq!(args.display_label(), "Mine");
        assert!(args.anchor_ref.is_some());
    }

    #[test]
    fn test_engine_state_carries_stats() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "nClonotypesBefore\tnClonotypesAfter\n3\t2\n").unwrap();
        let engine = engine_state(Some(f.path().to_path_buf()), false).unwrap();
        assert!(engine.is_ready_or_error());
        assert!(engine.resolve_as_string(STATS_OUTPUT).is_some());

        let running = engine_state(None, true).unwrap();
        assert!(!running.is_ready_or_error());
    }
}
