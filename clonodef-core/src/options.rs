//! Option lists offered to the user.

use crate::pool::{
    AnchorSet, AxisSelector, ColumnSelector, LabelOptions, OptionEntry, ResultPool, MAIN_ANCHOR,
};
use crate::types::{names, ColumnRef, DatasetMode, PlRef};

/// Anchor-marked clonotype datasets, bulk and single-cell.
pub fn dataset_selectors() -> Vec<ColumnSelector> {
    [names::CLONOTYPE_KEY, names::SC_CLONOTYPE_KEY]
        .iter()
        .map(|key| {
            ColumnSelector::new()
                .with_axis(AxisSelector::named(names::SAMPLE_ID))
                .with_axis(AxisSelector::named(*key))
                .with_annotation(names::IS_ANCHOR, "true")
        })
        .collect()
}

pub fn resolve_dataset_options<P: ResultPool + ?Sized>(pool: &P) -> Vec<OptionEntry<PlRef>> {
    let label = LabelOptions {
        include_native_label: false,
    };
    pool.get_options(&dataset_selectors(), &label)
}

/// Sequence and gene-hit columns keyed by the anchor's clonotype axis.
/// Single-cell datasets only offer sequences of the primary chains.
pub fn clonotype_definition_selectors(mode: DatasetMode) -> Vec<ColumnSelector> {
    let mut sequence = ColumnSelector::new()
        .with_name(names::SEQUENCE)
        .with_axis(AxisSelector::anchored(MAIN_ANCHOR, 1));
    if mode.is_single_cell() {
        sequence = sequence.with_domain(names::SC_CHAIN_INDEX, "primary");
    }

    let gene_hit = ColumnSelector::new()
        .with_name(names::GENE_HIT)
        .with_axis(AxisSelector::anchored(MAIN_ANCHOR, 1));

    vec![sequence, gene_hit]
}

/// Columns that can define a clonotype for the chosen dataset; `None` until
/// a dataset is chosen and its metadata is available.
pub fn resolve_clonotype_definition_options<P: ResultPool + ?Sized>(
    pool: &P,
    anchor: Option<&PlRef>,
) -> Option<Vec<OptionEntry<ColumnRef>>> {
    let anchor = anchor?;
    let Some(anchor_spec) = pool.get_spec(anchor) else {
        log::debug!("Anchor {} is not published yet", anchor);
        return None;
    };
    let mode = DatasetMode::of(&anchor_spec);

    let mut anchors = AnchorSet::new();
    anchors.insert(MAIN_ANCHOR.to_string(), anchor.clone());
    pool.get_canonical_options(&anchors, &clonotype_definition_selectors(mode))
}
