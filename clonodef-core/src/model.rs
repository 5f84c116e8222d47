//! Block model: arguments, UI state, derived outputs and routing.
//!
//! The host owns the arguments and calls into the model whenever they or the
//! published metadata change; every output is recomputed from scratch except
//! numbering availability, which is kept until its inputs change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::label::{compute_default_label, definition_labels};
use crate::numbering::NumberingAvailabilityCache;
use crate::options::{resolve_clonotype_definition_options, resolve_dataset_options};
use crate::pool::{OptionEntry, ResultPool};
use crate::stats::{parse_stats, StatsRecord};
use crate::types::{ColumnRef, NumberingScheme, PlRef};

/// Name of the engine output holding the clonotype count report.
pub const STATS_OUTPUT: &str = "statsTsvContent";

pub const DEFAULT_TITLE: &str = "Redefine Clonotypes";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_ref: Option<PlRef>,

    #[serde(default)]
    pub clonotype_definition: Vec<ColumnRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numbering_scheme: Option<NumberingScheme>,

    #[serde(default)]
    pub default_block_label: String,

    #[serde(default)]
    pub custom_block_label: String,
}

impl BlockArgs {
    /// The engine may run once a dataset and at least one definition column
    /// are chosen.
    pub fn is_valid(&self) -> bool {
        self.anchor_ref.is_some() && !self.clonotype_definition.is_empty()
    }

    /// Label shown for the block; a user-entered label wins.
    pub fn display_label(&self) -> &str {
        if self.custom_block_label.is_empty() {
            &self.default_block_label
        } else {
            &self.custom_block_label
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub title: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Results of the external computation as seen by the block.
pub trait EngineOutputs {
    /// Raw text of a named output artifact, if it has been produced.
    fn resolve_as_string(&self, name: &str) -> Option<String>;

    /// `true` once the computation has finished, successfully or not.
    fn is_ready_or_error(&self) -> bool;
}

/// Fixed engine state, for hosts that already hold the artifacts in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticEngineOutputs {
    pub artifacts: BTreeMap<String, String>,
    pub ready_or_error: bool,
}

impl StaticEngineOutputs {
    pub fn running() -> Self {
        Self::default()
    }

    pub fn finished() -> Self {
        Self {
            artifacts: BTreeMap::new(),
            ready_or_error: true,
        }
    }

    pub fn with_artifact<K: Into<String>, V: Into<String>>(mut self, name: K, content: V) -> Self {
        self.artifacts.insert(name.into(), content.into());
        self
    }
}

impl EngineOutputs for StaticEngineOutputs {
    fn resolve_as_string(&self, name: &str) -> Option<String> {
        self.artifacts.get(name).cloned()
    }

    fn is_ready_or_error(&self) -> bool {
        self.ready_or_error
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockOutputs {
    pub dataset_options: Vec<OptionEntry<PlRef>>,
    pub clonotype_definition_options: Option<Vec<OptionEntry<ColumnRef>>>,
    pub numbering_available: Option<bool>,
    pub stats: Option<StatsRecord>,
    pub is_running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub href: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    MainPage,
}

/// Whether the engine is still computing. No engine yet means not running.
pub fn is_running(engine: Option<&dyn EngineOutputs>) -> bool {
    engine.is_some_and(|e| !e.is_ready_or_error())
}

#[derive(Debug, Default)]
pub struct BlockModel {
    args: BlockArgs,
    ui_state: UiState,
    numbering: NumberingAvailabilityCache,
}

impl BlockModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_args(args: BlockArgs) -> Self {
        Self {
            args,
            ..Self::default()
        }
    }

    pub fn with_ui_state(mut self, ui_state: UiState) -> Self {
        self.ui_state = ui_state;
        self
    }

    pub fn args(&self) -> &BlockArgs {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut BlockArgs {
        &mut self.args
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui_state
    }

    pub fn is_valid(&self) -> bool {
        self.args.is_valid()
    }

    pub fn outputs<P: ResultPool + ?Sized>(
        &mut self,
        pool: &P,
        engine: Option<&dyn EngineOutputs>,
    ) -> BlockOutputs {
        let anchor = self.args.anchor_ref.as_ref();
        let stats_text = engine.and_then(|e| e.resolve_as_string(STATS_OUTPUT));

        BlockOutputs {
            dataset_options: resolve_dataset_options(pool),
            clonotype_definition_options: resolve_clonotype_definition_options(pool, anchor),
            numbering_available: self.numbering.resolve(pool, anchor),
            stats: parse_stats(stats_text.as_deref()),
            is_running: is_running(engine),
        }
    }

    /// Recompute the default label from the labels of the selected columns.
    /// Hosts call this whenever the resolved label set changes; returns
    /// whether the label changed.
    pub fn sync_default_label(&mut self, options: Option<&[OptionEntry<ColumnRef>]>) -> bool {
        let labels = definition_labels(&self.args.clonotype_definition, options);
        let label = compute_default_label(&labels);
        if label == self.args.default_block_label {
            return false;
        }
        log::debug!("Default block label: {:?} -> {:?}", self.args.default_block_label, label);
        self.args.default_block_label = label;
        true
    }

    pub fn title(&self) -> &str {
        &self.ui_state.title
    }

    pub fn subtitle(&self) -> &str {
        self.args.display_label()
    }

    pub fn progress(&self, engine: Option<&dyn EngineOutputs>) -> bool {
        is_running(engine)
    }

    pub fn sections(&self) -> Vec<Section> {
        vec![Section {
            kind: SectionKind::Link,
            href: "/".to_string(),
            label: "Main".to_string(),
        }]
    }

    pub fn routes(&self) -> BTreeMap<&'static str, Page> {
        BTreeMap::from([("/", Page::MainPage)])
    }
}
